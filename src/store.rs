//! Storage collaborators the engine is given, plus an in-memory implementation.

use crate::models::{
    Entry, GameMatch, MatchId, MatchKey, Participant, Tournament, TournamentError, TournamentId,
    TournamentResult,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Persistence operations used by [`BracketService`](crate::BracketService).
///
/// Implementations must make `replace_matches` atomic: readers see either the
/// old match set or the new one, never a mix.
pub trait TournamentStore: Send + Sync {
    fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// Insert or overwrite a tournament.
    fn save_tournament(&self, tournament: &Tournament) -> TournamentResult<()>;

    /// Entries of a tournament in registration order.
    fn list_entries(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Entry>>;

    fn insert_entry(&self, entry: Entry) -> TournamentResult<()>;

    fn update_entry(&self, entry: &Entry) -> TournamentResult<()>;

    fn list_matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<GameMatch>>;

    /// Clear every match of the tournament and insert `matches` in one step.
    fn replace_matches(
        &self,
        tournament_id: TournamentId,
        matches: Vec<GameMatch>,
    ) -> TournamentResult<()>;

    fn find_match(
        &self,
        tournament_id: TournamentId,
        key: MatchKey,
    ) -> TournamentResult<Option<GameMatch>>;

    fn get_match(&self, id: MatchId) -> TournamentResult<Option<GameMatch>>;

    fn update_match(&self, game: &GameMatch) -> TournamentResult<()>;

    fn rating(&self, participant: Participant) -> TournamentResult<Option<i32>>;

    fn update_rating(&self, participant: Participant, rating: i32) -> TournamentResult<()>;

    /// Persist everything one recorded result changed: the new ratings, the
    /// completed and advanced matches, and the tournament.
    ///
    /// The default writes ratings first, so a failed rating write leaves the
    /// match unrecorded and the result can be submitted again. Stores that can
    /// write all of it in one transaction should override this.
    fn commit_result(
        &self,
        tournament: &Tournament,
        matches: &[GameMatch],
        ratings: &[(Participant, i32)],
    ) -> TournamentResult<()> {
        for &(participant, rating) in ratings {
            self.update_rating(participant, rating)?;
        }
        for game in matches {
            self.update_match(game)?;
        }
        self.save_tournament(tournament)
    }
}

#[derive(Default)]
struct Inner {
    tournaments: HashMap<TournamentId, Tournament>,
    entries: HashMap<TournamentId, Vec<Entry>>,
    matches: HashMap<TournamentId, Vec<GameMatch>>,
    ratings: HashMap<Participant, i32>,
}

/// Process-local store behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TournamentResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| TournamentError::Store("lock error".to_string()))
    }

    fn write(&self) -> TournamentResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| TournamentError::Store("lock error".to_string()))
    }
}

impl TournamentStore for MemoryStore {
    fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn save_tournament(&self, tournament: &Tournament) -> TournamentResult<()> {
        self.write()?
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn list_entries(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Entry>> {
        let mut entries = self
            .read()?
            .entries
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default();
        entries.sort_by_key(|e| e.registered_at);
        Ok(entries)
    }

    fn insert_entry(&self, entry: Entry) -> TournamentResult<()> {
        self.write()?
            .entries
            .entry(entry.tournament_id)
            .or_default()
            .push(entry);
        Ok(())
    }

    fn update_entry(&self, entry: &Entry) -> TournamentResult<()> {
        let mut g = self.write()?;
        let existing = g
            .entries
            .get_mut(&entry.tournament_id)
            .and_then(|list| list.iter_mut().find(|e| e.id == entry.id))
            .ok_or_else(|| TournamentError::Store(format!("entry {} not found", entry.id)))?;
        *existing = entry.clone();
        Ok(())
    }

    fn list_matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<GameMatch>> {
        Ok(self
            .read()?
            .matches
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_matches(
        &self,
        tournament_id: TournamentId,
        matches: Vec<GameMatch>,
    ) -> TournamentResult<()> {
        let mut g = self.write()?;
        if matches.is_empty() {
            g.matches.remove(&tournament_id);
        } else {
            g.matches.insert(tournament_id, matches);
        }
        Ok(())
    }

    fn find_match(
        &self,
        tournament_id: TournamentId,
        key: MatchKey,
    ) -> TournamentResult<Option<GameMatch>> {
        Ok(self
            .read()?
            .matches
            .get(&tournament_id)
            .and_then(|list| list.iter().find(|m| m.key() == key))
            .cloned())
    }

    fn get_match(&self, id: MatchId) -> TournamentResult<Option<GameMatch>> {
        Ok(self
            .read()?
            .matches
            .values()
            .flatten()
            .find(|m| m.id == id)
            .cloned())
    }

    fn update_match(&self, game: &GameMatch) -> TournamentResult<()> {
        let mut g = self.write()?;
        let existing = g
            .matches
            .get_mut(&game.tournament_id)
            .and_then(|list| list.iter_mut().find(|m| m.id == game.id))
            .ok_or(TournamentError::MatchNotFound(game.id))?;
        *existing = game.clone();
        Ok(())
    }

    fn rating(&self, participant: Participant) -> TournamentResult<Option<i32>> {
        Ok(self.read()?.ratings.get(&participant).copied())
    }

    fn update_rating(&self, participant: Participant, rating: i32) -> TournamentResult<()> {
        self.write()?.ratings.insert(participant, rating);
        Ok(())
    }

    fn commit_result(
        &self,
        tournament: &Tournament,
        matches: &[GameMatch],
        ratings: &[(Participant, i32)],
    ) -> TournamentResult<()> {
        let mut g = self.write()?;
        let list = g
            .matches
            .get_mut(&tournament.id)
            .ok_or(TournamentError::TournamentNotFound(tournament.id))?;
        // Resolve every slot before writing anything.
        let mut targets = Vec::with_capacity(matches.len());
        for game in matches {
            let index = list
                .iter()
                .position(|m| m.id == game.id)
                .ok_or(TournamentError::MatchNotFound(game.id))?;
            targets.push(index);
        }
        for (index, game) in targets.into_iter().zip(matches) {
            list[index] = game.clone();
        }
        g.ratings.extend(ratings.iter().copied());
        g.tournaments.insert(tournament.id, tournament.clone());
        Ok(())
    }
}
