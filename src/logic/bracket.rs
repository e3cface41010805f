//! Bracket construction and the match arena it produces.
//!
//! A bracket is a flat list of matches addressed by [`MatchKey`]. Nothing links
//! one match to the next; advancement derives destinations from round and
//! position.

use crate::logic::seeding::bracket_size;
use crate::models::{
    BracketSegment, Entry, GameMatch, MatchId, MatchKey, Participant, Tournament,
    TournamentError, TournamentFormat, TournamentId, TournamentResult,
};
use std::collections::HashMap;

/// All matches of one tournament, indexed by key.
#[derive(Clone, Debug, Default)]
pub struct Bracket {
    matches: Vec<GameMatch>,
    index: HashMap<MatchKey, usize>,
}

impl Bracket {
    pub fn from_matches(matches: Vec<GameMatch>) -> Self {
        let index = matches
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key(), i))
            .collect();
        Self { matches, index }
    }

    pub fn find(&self, key: MatchKey) -> Option<&GameMatch> {
        self.index.get(&key).map(|&i| &self.matches[i])
    }

    pub fn find_mut(&mut self, key: MatchKey) -> Option<&mut GameMatch> {
        self.index.get(&key).map(|&i| &mut self.matches[i])
    }

    pub fn get(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, key: MatchKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn matches(&self) -> &[GameMatch] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<GameMatch> {
        self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matches of one segment, in round then position order.
    pub fn segment(&self, segment: BracketSegment) -> Vec<&GameMatch> {
        let mut found: Vec<&GameMatch> = self
            .matches
            .iter()
            .filter(|m| m.segment == segment)
            .collect();
        found.sort_by_key(|m| (m.round, m.position));
        found
    }

    /// Highest round number in a segment (0 if the segment is empty).
    pub fn rounds(&self, segment: BracketSegment) -> u32 {
        self.matches
            .iter()
            .filter(|m| m.segment == segment)
            .map(|m| m.round)
            .max()
            .unwrap_or(0)
    }
}

/// Build the full match skeleton for a tournament from seeded slots.
///
/// `slots` comes from [`seed_entries`](crate::logic::seed_entries): adjacent pairs
/// form round-1 matches, `None` marks a bye. Round robin ignores the pairing and
/// schedules every filled slot against every other.
pub fn build_bracket(
    tournament: &Tournament,
    slots: &[Option<Entry>],
) -> TournamentResult<Vec<GameMatch>> {
    let participants: Vec<Option<Participant>> = slots
        .iter()
        .map(|s| s.as_ref().map(|e| e.participant))
        .collect();
    let entrant_count = participants.iter().flatten().count();
    if entrant_count < 2 {
        return Err(TournamentError::InsufficientEntrants {
            found: entrant_count,
        });
    }

    // Seeding already pads to a power of two; a wider slot list widens the bracket.
    let size = bracket_size(entrant_count).max(slots.len().next_power_of_two());

    let matches = match tournament.format {
        TournamentFormat::SingleElimination => build_upper(tournament.id, &participants, size),
        TournamentFormat::DoubleElimination => {
            let mut matches = build_upper(tournament.id, &participants, size);
            matches.extend(build_lower(tournament.id, size));
            matches.push(GameMatch::empty(tournament.id, MatchKey::grand_final()));
            matches
        }
        TournamentFormat::RoundRobin => {
            let entrants: Vec<Participant> = participants.into_iter().flatten().collect();
            build_round_robin(tournament.id, &entrants)
        }
    };

    log::info!(
        "Built {:?} bracket for tournament {}: {} entrants, {} matches",
        tournament.format,
        tournament.id,
        entrant_count,
        matches.len()
    );
    Ok(matches)
}

/// Upper (winners') bracket: populated round 1, then empty rounds halving down to the final.
fn build_upper(
    tournament_id: TournamentId,
    participants: &[Option<Participant>],
    size: usize,
) -> Vec<GameMatch> {
    let rounds = size.trailing_zeros();
    let slot = |i: usize| participants.get(i).copied().flatten();

    let mut matches: Vec<GameMatch> = (1..=size / 2)
        .map(|position| {
            GameMatch::new(
                tournament_id,
                MatchKey::upper(1, position as u32),
                slot(2 * position - 2),
                slot(2 * position - 1),
            )
        })
        .collect();

    let mut count = size / 2;
    for round in 2..=rounds {
        count /= 2;
        matches.extend(
            (1..=count).map(|p| GameMatch::empty(tournament_id, MatchKey::upper(round, p as u32))),
        );
    }
    matches
}

/// Number of matches in lower round `round` for an upper bracket of `size` slots.
///
/// Rounds come in pairs of equal size (a consolidation round followed by a round
/// that takes in fresh upper-bracket losers), halving after every pair.
pub fn lower_round_matches(size: usize, round: u32) -> usize {
    ((size / 4) >> ((round - 1) / 2)).max(1)
}

/// Lower (losers') bracket skeleton, all slots empty.
fn build_lower(tournament_id: TournamentId, size: usize) -> Vec<GameMatch> {
    let upper_rounds = size.trailing_zeros();
    let lower_rounds = if upper_rounds > 1 {
        (upper_rounds - 1) * 2
    } else {
        1
    };

    (1..=lower_rounds)
        .flat_map(move |round| {
            (1..=lower_round_matches(size, round)).map(move |p| {
                GameMatch::empty(tournament_id, MatchKey::lower(round, p as u32))
            })
        })
        .collect()
}

/// Circle-method schedule: every entrant meets every other exactly once.
///
/// An odd field is padded with a bye; pairings against it are skipped. Index 0
/// stays fixed and after each round the last entry moves to index 1.
fn build_round_robin(tournament_id: TournamentId, entrants: &[Participant]) -> Vec<GameMatch> {
    let mut circle: Vec<Option<Participant>> = entrants.iter().copied().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }
    let n = circle.len();

    let mut matches = Vec::with_capacity(n / 2 * (n - 1));
    for round in 1..n as u32 {
        let mut position = 0;
        for i in 0..n / 2 {
            if let (Some(home), Some(away)) = (circle[i], circle[n - 1 - i]) {
                position += 1;
                matches.push(GameMatch::new(
                    tournament_id,
                    MatchKey::upper(round, position),
                    Some(home),
                    Some(away),
                ));
            }
        }
        if let Some(last) = circle.pop() {
            circle.insert(1, last);
        }
    }
    matches
}
