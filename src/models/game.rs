//! Match, its bracket address, and the HOME/AWAY slots.

use crate::models::entrant::Participant;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Sub-structure of a bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSegment {
    /// Winners' bracket; the only segment used by single elimination and round robin.
    Upper,
    /// Losers' bracket (double elimination).
    Lower,
    GrandFinal,
}

/// Side of a match a participant occupies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Home,
    Away,
}

impl Slot {
    /// HOME for odd positions, AWAY for even ones.
    pub fn for_position(position: u32) -> Self {
        if position % 2 == 1 {
            Slot::Home
        } else {
            Slot::Away
        }
    }

    pub fn other(self) -> Self {
        match self {
            Slot::Home => Slot::Away,
            Slot::Away => Slot::Home,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Address of a match inside its tournament. Unique per tournament; advancement
/// computes destinations from it instead of storing links between matches.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MatchKey {
    pub segment: BracketSegment,
    pub round: u32,
    pub position: u32,
}

impl MatchKey {
    pub fn new(segment: BracketSegment, round: u32, position: u32) -> Self {
        Self {
            segment,
            round,
            position,
        }
    }

    pub fn upper(round: u32, position: u32) -> Self {
        Self::new(BracketSegment::Upper, round, position)
    }

    pub fn lower(round: u32, position: u32) -> Self {
        Self::new(BracketSegment::Lower, round, position)
    }

    pub fn grand_final() -> Self {
        Self::new(BracketSegment::GrandFinal, 1, 1)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} R{} P{}", self.segment, self.round, self.position)
    }
}

/// A single match between two slots, either of which may still be empty.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub segment: BracketSegment,
    pub round: u32,
    pub position: u32,
    pub home: Option<Participant>,
    pub away: Option<Participant>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// Set once the match is completed; always one of `home` / `away`.
    pub winner: Option<Participant>,
    pub status: MatchStatus,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        key: MatchKey,
        home: Option<Participant>,
        away: Option<Participant>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            segment: key.segment,
            round: key.round,
            position: key.position,
            home,
            away,
            home_score: None,
            away_score: None,
            winner: None,
            status: MatchStatus::Pending,
        }
    }

    /// An empty match (both slots open) at `key`.
    pub fn empty(tournament_id: TournamentId, key: MatchKey) -> Self {
        Self::new(tournament_id, key, None, None)
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.segment, self.round, self.position)
    }

    pub fn slot(&self, slot: Slot) -> Option<Participant> {
        match slot {
            Slot::Home => self.home,
            Slot::Away => self.away,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<Participant> {
        match slot {
            Slot::Home => &mut self.home,
            Slot::Away => &mut self.away,
        }
    }

    /// The sole participant of a one-sided match, if exactly one slot is filled.
    pub fn sole_participant(&self) -> Option<Participant> {
        match (self.home, self.away) {
            (Some(p), None) | (None, Some(p)) => Some(p),
            _ => None,
        }
    }

    /// A pending match with exactly one participant.
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Pending && self.sole_participant().is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn has_participant(&self, participant: Participant) -> bool {
        self.home == Some(participant) || self.away == Some(participant)
    }

    /// The participant that did not win, once a winner is set and both slots are filled.
    pub fn loser(&self) -> Option<Participant> {
        let winner = self.winner?;
        match (self.home, self.away) {
            (Some(home), Some(away)) if home == winner => Some(away),
            (Some(home), Some(away)) if away == winner => Some(home),
            _ => None,
        }
    }
}
