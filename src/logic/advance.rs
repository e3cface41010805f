//! Match advancement: route the winner (and in double elimination the loser) of
//! a completed match into the slot of a later match.
//!
//! Destinations are pure round/position arithmetic:
//!
//! - Upper winner: round `r + 1`, position `ceil(p / 2)`, HOME if `p` is odd.
//!   Past the upper final the winner goes to the grand final HOME slot (double
//!   elimination) or the tournament ends (single elimination).
//! - Upper loser (double elimination): from round 1 to lower round 1, position
//!   `ceil(p / 2)`, HOME if `p` is odd; from round `r > 1` to lower round
//!   `2(r - 1)`, same position, AWAY.
//! - Lower winner: round `r + 1`. Odd rounds keep the position and take HOME,
//!   leaving AWAY for the incoming upper loser. Even rounds consolidate to
//!   `ceil(p / 2)` with HOME for odd positions. Past the lower final the winner
//!   goes to the grand final AWAY slot.
//! - Grand final: ends the tournament.
//!
//! Every write fills the designated slot, or the other slot if the designated
//! one is taken. When both are taken the write is skipped and recorded as a
//! structural conflict instead of overwriting.

use crate::logic::bracket::Bracket;
use crate::models::{
    BracketSegment, GameMatch, MatchKey, Participant, Slot, TournamentError, TournamentFormat,
    TournamentResult,
};
use serde::Serialize;

/// A participant written into a match slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Placement {
    pub key: MatchKey,
    pub slot: Slot,
    pub participant: Participant,
}

/// Everything one advancement step changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Advancement {
    pub placements: Vec<Placement>,
    /// Destinations that could not be written (both slots already occupied, or missing).
    pub conflicts: Vec<MatchKey>,
    /// Set when the completed match decided the tournament.
    pub champion: Option<Participant>,
    pub tournament_completed: bool,
}

impl Advancement {
    fn finish(&mut self, champion: Participant) {
        self.champion = Some(champion);
        self.tournament_completed = true;
    }

    /// Keys of every match this step wrote into.
    pub fn touched(&self) -> Vec<MatchKey> {
        let mut keys: Vec<MatchKey> = self.placements.iter().map(|p| p.key).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn merge(&mut self, other: Advancement) {
        self.placements.extend(other.placements);
        self.conflicts.extend(other.conflicts);
        if other.tournament_completed {
            self.champion = other.champion;
            self.tournament_completed = true;
        }
    }
}

/// Where the winner of an upper-bracket match goes next.
pub fn upper_winner_destination(round: u32, position: u32) -> (MatchKey, Slot) {
    (
        MatchKey::upper(round + 1, position.div_ceil(2)),
        Slot::for_position(position),
    )
}

/// Where the loser of an upper-bracket match drops in the lower bracket.
pub fn upper_loser_destination(round: u32, position: u32) -> (MatchKey, Slot) {
    if round == 1 {
        (
            MatchKey::lower(1, position.div_ceil(2)),
            Slot::for_position(position),
        )
    } else {
        (MatchKey::lower((round - 1) * 2, position), Slot::Away)
    }
}

/// Where the winner of a lower-bracket match goes next.
pub fn lower_winner_destination(round: u32, position: u32) -> (MatchKey, Slot) {
    if round % 2 == 0 {
        (
            MatchKey::lower(round + 1, position.div_ceil(2)),
            Slot::for_position(position),
        )
    } else {
        (MatchKey::lower(round + 1, position), Slot::Home)
    }
}

/// Validate that `winner` played in `game`.
pub fn check_winner(game: &GameMatch, winner: Participant) -> TournamentResult<()> {
    if !game.has_participant(winner) {
        return Err(TournamentError::InvalidWinner(winner.id()));
    }
    Ok(())
}

/// Advance the result of the completed match at `key` through `bracket`.
///
/// The match must already be marked completed with its winner set. Returns an
/// error only for an invalid winner; structural conflicts, including a `key`
/// with no match behind it, are logged and reported in the returned
/// [`Advancement`].
pub fn advance(
    bracket: &mut Bracket,
    format: TournamentFormat,
    key: MatchKey,
) -> TournamentResult<Advancement> {
    let Some(game) = bracket.find(key) else {
        log::warn!("No match at {key} to advance from");
        return Ok(Advancement {
            conflicts: vec![key],
            ..Advancement::default()
        });
    };
    let winner = match game.winner {
        Some(w) => w,
        None => return Ok(Advancement::default()),
    };
    check_winner(game, winner)?;
    let loser = game.loser();

    let mut outcome = Advancement::default();
    if format == TournamentFormat::RoundRobin {
        return Ok(outcome);
    }

    match key.segment {
        BracketSegment::Upper => {
            let (next, slot) = upper_winner_destination(key.round, key.position);
            if bracket.contains(next) {
                place(bracket, next, slot, winner, &mut outcome);
            } else if format == TournamentFormat::DoubleElimination {
                place(bracket, MatchKey::grand_final(), Slot::Home, winner, &mut outcome);
            } else {
                outcome.finish(winner);
            }

            if format == TournamentFormat::DoubleElimination {
                if let Some(loser) = loser {
                    let (drop, slot) = upper_loser_destination(key.round, key.position);
                    place(bracket, drop, slot, loser, &mut outcome);
                }
            }
        }
        BracketSegment::Lower => {
            let (next, slot) = lower_winner_destination(key.round, key.position);
            if bracket.contains(next) {
                place(bracket, next, slot, winner, &mut outcome);
            } else {
                place(bracket, MatchKey::grand_final(), Slot::Away, winner, &mut outcome);
            }
        }
        BracketSegment::GrandFinal => outcome.finish(winner),
    }

    if let Some(champion) = outcome.champion {
        log::info!("Match {} decided the tournament; champion {:?}", key, champion);
    }
    Ok(outcome)
}

/// Write `participant` into `slot` of the match at `key`, falling back to the
/// other slot. Records a conflict when neither slot is free or the match is missing.
fn place(
    bracket: &mut Bracket,
    key: MatchKey,
    slot: Slot,
    participant: Participant,
    outcome: &mut Advancement,
) {
    let Some(target) = bracket.find_mut(key) else {
        log::warn!("Advancement destination {} does not exist; skipping write", key);
        outcome.conflicts.push(key);
        return;
    };

    let chosen = [slot, slot.other()]
        .into_iter()
        .find(|&s| target.slot(s).is_none());
    match chosen {
        Some(s) => {
            *target.slot_mut(s) = Some(participant);
            log::debug!("Placed {:?} into {} {:?}", participant, key, s);
            outcome.placements.push(Placement {
                key,
                slot: s,
                participant,
            });
        }
        None => {
            log::warn!(
                "Both slots of {} are occupied; {:?} was not placed",
                key,
                participant
            );
            outcome.conflicts.push(key);
        }
    }
}
