//! Standings derived from completed matches (used for round robin).

use crate::models::{GameMatch, Participant};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate record of one participant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub participant: Participant,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub score_for: u64,
    pub score_against: u64,
}

impl Standing {
    fn new(participant: Participant) -> Self {
        Self {
            participant,
            played: 0,
            wins: 0,
            losses: 0,
            score_for: 0,
            score_against: 0,
        }
    }

    pub fn score_difference(&self) -> i128 {
        i128::from(self.score_for) - i128::from(self.score_against)
    }
}

/// Standings over every completed two-sided match, best first (wins, then score difference).
///
/// Walkovers count as neither played nor won.
pub fn standings(matches: &[GameMatch]) -> Vec<Standing> {
    let mut table: HashMap<Participant, Standing> = HashMap::new();

    for m in matches.iter().filter(|m| m.is_completed()) {
        let (Some(home), Some(away), Some(winner)) = (m.home, m.away, m.winner) else {
            continue;
        };
        let home_score = m.home_score.unwrap_or(0);
        let away_score = m.away_score.unwrap_or(0);

        let sides = [(home, home_score, away_score), (away, away_score, home_score)];
        for (me, scored, conceded) in sides {
            let row = table.entry(me).or_insert_with(|| Standing::new(me));
            row.played += 1;
            row.score_for = row.score_for.saturating_add(u64::from(scored));
            row.score_against = row.score_against.saturating_add(u64::from(conceded));
            if me == winner {
                row.wins += 1;
            } else {
                row.losses += 1;
            }
        }
    }

    let mut rows: Vec<Standing> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.score_difference().cmp(&a.score_difference()))
            .then(b.score_for.cmp(&a.score_for))
            .then(a.participant.id().cmp(&b.participant.id()))
    });
    rows
}
