//! Tournament bracket engine: seeding, bracket generation, bye resolution,
//! match advancement and rating updates.

pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::{EngineConfig, ServerConfig};
pub use logic::{
    advance, build_bracket, resolve_byes, seed_entries, standings, Advancement, Bracket,
    Placement, Standing,
};
pub use models::{
    BracketSegment, EntrantId, EntrantMode, Entry, EntryId, GameMatch, MatchId, MatchKey,
    MatchStatus, Participant, SeedingMethod, Slot, TeamId, Tournament, TournamentError,
    TournamentFormat, TournamentId, TournamentResult, TournamentState,
};
pub use service::{plan_bracket, BracketService};
pub use store::{MemoryStore, TournamentStore};
