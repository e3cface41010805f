//! Participants (solo entrants or teams) and their tournament entries.

use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an individual entrant.
pub type EntrantId = Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Unique identifier for a registration.
pub type EntryId = Uuid;

/// Whether a tournament is played by individuals or by teams.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrantMode {
    #[default]
    Solo,
    Team,
}

/// Whoever occupies a match slot: an individual or a team, never both.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum Participant {
    Solo(EntrantId),
    Team(TeamId),
}

impl Participant {
    /// The underlying entrant or team id.
    pub fn id(&self) -> Uuid {
        match self {
            Participant::Solo(id) | Participant::Team(id) => *id,
        }
    }

    pub fn mode(&self) -> EntrantMode {
        match self {
            Participant::Solo(_) => EntrantMode::Solo,
            Participant::Team(_) => EntrantMode::Team,
        }
    }
}

/// A participant registered into one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub tournament_id: TournamentId,
    pub participant: Participant,
    /// Manually assigned seed (1 = best). Unseeded entries rank after seeded ones.
    pub seed: Option<u32>,
    pub qualifier_points: i32,
    pub registered_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new entry registered now, unseeded and without qualifier points.
    pub fn new(tournament_id: TournamentId, participant: Participant) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            participant,
            seed: None,
            qualifier_points: 0,
            registered_at: Utc::now(),
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_qualifier_points(mut self, points: i32) -> Self {
        self.qualifier_points = points;
        self
    }
}
