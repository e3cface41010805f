//! Tournament, its format/seeding options, lifecycle state, and errors.

use crate::models::entrant::{EntrantMode, Participant};
use crate::models::game::{BracketSegment, MatchId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Need at least 2 entrants to build a bracket (found {found})")]
    InsufficientEntrants { found: usize },

    #[error("Unknown seeding method: {0}")]
    InvalidSeedingMethod(String),

    #[error("Unknown tournament format: {0}")]
    InvalidFormat(String),

    /// The given winner is not one of the match's two participants.
    #[error("Participant {0} did not play in this match")]
    InvalidWinner(Uuid),

    #[error("Scores are tied and no winner was given")]
    TiedResult,

    /// Both slots of an advancement destination are already filled.
    #[error("Both slots of {segment:?} round {round} position {position} are already occupied")]
    StructuralConflict {
        segment: BracketSegment,
        round: u32,
        position: u32,
    },

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Tournament not in correct state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: TournamentState,
        actual: TournamentState,
    },

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Participant already registered")]
    AlreadyRegistered,

    #[error("Participant mode {actual:?} does not match tournament mode {expected:?}")]
    ModeMismatch {
        expected: EntrantMode,
        actual: EntrantMode,
    },

    #[error("Match does not have two participants yet")]
    MatchNotReady,

    #[error("Match already has a final result")]
    MatchClosed,

    #[error("Bracket of a completed tournament cannot be changed")]
    BracketLocked,

    #[error("Store error: {0}")]
    Store(String),
}

pub type TournamentResult<T> = Result<T, TournamentError>;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
}

impl TournamentFormat {
    pub fn is_elimination(self) -> bool {
        !matches!(self, TournamentFormat::RoundRobin)
    }
}

impl FromStr for TournamentFormat {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_elimination" => Ok(TournamentFormat::SingleElimination),
            "double_elimination" => Ok(TournamentFormat::DoubleElimination),
            "round_robin" => Ok(TournamentFormat::RoundRobin),
            _ => Err(TournamentError::InvalidFormat(s.to_string())),
        }
    }
}

/// How ranked entrants are placed into bracket slots.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Mirrored seeding: 1 vs N, then 2 vs N-1 spread across the bracket halves.
    #[default]
    Standard,
    /// Rank order straight into slot order.
    Sequential,
    /// Shuffle, then sequential.
    Random,
}

impl FromStr for SeedingMethod {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(SeedingMethod::Standard),
            "sequential" => Ok(SeedingMethod::Sequential),
            "random" => Ok(SeedingMethod::Random),
            _ => Err(TournamentError::InvalidSeedingMethod(s.to_string())),
        }
    }
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    #[default]
    Draft,
    /// Accepting entries; the bracket has not been generated.
    Registration,
    /// Bracket generated; results are being recorded.
    InProgress,
    Completed,
}

/// Tournament configuration and lifecycle state. Entries and matches are kept by the store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub seeding: SeedingMethod,
    /// Entries with fewer qualifier points are left out of the bracket.
    pub qualifier_threshold: Option<i32>,
    pub mode: EntrantMode,
    pub max_entrants: u32,
    pub state: TournamentState,
    pub champion: Option<Participant>,
}

impl Tournament {
    /// Create a new tournament in Draft state.
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        seeding: SeedingMethod,
        mode: EntrantMode,
        max_entrants: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            seeding,
            qualifier_threshold: None,
            mode,
            max_entrants,
            state: TournamentState::Draft,
            champion: None,
        }
    }

    pub fn with_qualifier_threshold(mut self, threshold: i32) -> Self {
        self.qualifier_threshold = Some(threshold);
        self
    }

    fn expect_state(&self, expected: TournamentState) -> TournamentResult<()> {
        if self.state != expected {
            return Err(TournamentError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Draft -> Registration.
    pub fn open_registration(&mut self) -> TournamentResult<()> {
        self.expect_state(TournamentState::Draft)?;
        self.state = TournamentState::Registration;
        Ok(())
    }

    /// Check that a participant may register given the current entry count.
    pub fn check_registration(
        &self,
        participant: Participant,
        registered: usize,
    ) -> TournamentResult<()> {
        self.expect_state(TournamentState::Registration)?;
        if participant.mode() != self.mode {
            return Err(TournamentError::ModeMismatch {
                expected: self.mode,
                actual: participant.mode(),
            });
        }
        if registered >= self.max_entrants as usize {
            return Err(TournamentError::TournamentFull);
        }
        Ok(())
    }

    /// Bracket (re)generation is allowed before play and while in progress.
    pub fn check_bracket_generation(&self) -> TournamentResult<()> {
        match self.state {
            TournamentState::Registration | TournamentState::InProgress => Ok(()),
            TournamentState::Completed => Err(TournamentError::BracketLocked),
            TournamentState::Draft => Err(TournamentError::InvalidState {
                expected: TournamentState::Registration,
                actual: self.state,
            }),
        }
    }

    pub fn start(&mut self) {
        self.state = TournamentState::InProgress;
        self.champion = None;
    }

    /// Mark the tournament finished with its champion.
    pub fn complete(&mut self, champion: Option<Participant>) {
        self.state = TournamentState::Completed;
        self.champion = champion;
    }

    /// Back to Registration after the bracket has been deleted.
    pub fn reset_bracket(&mut self) -> TournamentResult<()> {
        match self.state {
            TournamentState::Completed => Err(TournamentError::BracketLocked),
            TournamentState::InProgress => {
                self.state = TournamentState::Registration;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
