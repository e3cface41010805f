//! Bye resolution: walk round 1 once and hand every one-sided match to its sole participant.

use crate::logic::advance::{advance, Advancement};
use crate::logic::bracket::Bracket;
use crate::models::{BracketSegment, MatchKey, MatchStatus, TournamentFormat, TournamentResult};

/// Complete each round-1 upper match that has exactly one participant and advance the walkover.
///
/// This is a single forward pass over round 1. A later-round match that ends up
/// one-sided because both of its feeders were byes or empty is left pending.
/// Round robin has no byes to resolve.
pub fn resolve_byes(bracket: &mut Bracket, format: TournamentFormat) -> TournamentResult<Advancement> {
    let mut outcome = Advancement::default();
    if !format.is_elimination() {
        return Ok(outcome);
    }

    let byes: Vec<MatchKey> = bracket
        .segment(BracketSegment::Upper)
        .into_iter()
        .filter(|m| m.round == 1 && m.is_bye())
        .map(|m| m.key())
        .collect();

    for key in byes {
        let Some(game) = bracket.find_mut(key) else {
            continue;
        };
        let walkover = game.sole_participant();
        game.winner = walkover;
        game.status = MatchStatus::Completed;
        log::debug!("Resolved bye at {} for {:?}", key, walkover);

        outcome.merge(advance(bracket, format, key)?);
    }
    Ok(outcome)
}
