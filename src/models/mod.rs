//! Data structures for tournaments: entrants, entries, matches, tournament state.

mod entrant;
mod game;
mod tournament;

pub use entrant::{EntrantId, EntrantMode, Entry, EntryId, Participant, TeamId};
pub use game::{BracketSegment, GameMatch, MatchId, MatchKey, MatchStatus, Slot};
pub use tournament::{
    SeedingMethod, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentResult,
    TournamentState,
};
