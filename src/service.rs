//! Caller-facing bracket operations over a [`TournamentStore`].
//!
//! Every mutating operation holds the tournament's lock for its whole
//! read-modify-write, so two results feeding the same destination match are
//! applied one after the other.

use crate::config::EngineConfig;
use crate::logic::{
    advance, apply_result, build_bracket, resolve_byes, seed_entries, standings, Bracket,
    Standing,
};
use crate::models::{
    Entry, EntryId, GameMatch, MatchId, MatchStatus, Participant, Tournament, TournamentError,
    TournamentFormat, TournamentId, TournamentResult, TournamentState,
};
use crate::store::TournamentStore;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Seed, build and resolve byes for a tournament without touching any store.
pub fn plan_bracket<R: Rng + ?Sized>(
    tournament: &Tournament,
    entries: &[Entry],
    rng: &mut R,
) -> TournamentResult<Vec<GameMatch>> {
    let slots = seed_entries(
        entries,
        tournament.seeding,
        tournament.qualifier_threshold,
        rng,
    )?;
    let mut bracket = Bracket::from_matches(build_bracket(tournament, &slots)?);
    let byes = resolve_byes(&mut bracket, tournament.format)?;
    if !byes.conflicts.is_empty() {
        log::warn!(
            "Bye resolution for tournament {} hit occupied slots at {:?}",
            tournament.id,
            byes.conflicts
        );
    }
    Ok(bracket.into_matches())
}

/// Pick the winner of a two-sided match from an explicit id or the scores.
fn decide_winner(
    home: Participant,
    away: Participant,
    home_score: u32,
    away_score: u32,
    explicit: Option<Uuid>,
) -> TournamentResult<Participant> {
    if let Some(id) = explicit {
        return [home, away]
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or(TournamentError::InvalidWinner(id));
    }
    match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => Ok(home),
        std::cmp::Ordering::Less => Ok(away),
        std::cmp::Ordering::Equal => Err(TournamentError::TiedResult),
    }
}

fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bracket engine bound to a store.
pub struct BracketService<S: TournamentStore> {
    store: S,
    config: EngineConfig,
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl<S: TournamentStore> BracketService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The tournament's lock, shared by every caller working on it.
    ///
    /// Entries nobody else holds are dropped on the way. The guarded value is
    /// `()`, so a lock poisoned by a panicking caller is taken over as is.
    fn tournament_lock(&self, id: TournamentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(id).or_default().clone()
    }

    pub fn tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .get_tournament(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn create_tournament(&self, tournament: Tournament) -> TournamentResult<Tournament> {
        self.store.save_tournament(&tournament)?;
        log::info!(
            "Created {:?} tournament {} ({})",
            tournament.format,
            tournament.id,
            tournament.name
        );
        Ok(tournament)
    }

    pub fn open_registration(&self, id: TournamentId) -> TournamentResult<Tournament> {
        let lock = self.tournament_lock(id);
        let _guard = hold(&lock);
        let mut tournament = self.tournament(id)?;
        tournament.open_registration()?;
        self.store.save_tournament(&tournament)?;
        Ok(tournament)
    }

    /// Register an entry (tournament must be in Registration).
    pub fn register_entry(&self, entry: Entry) -> TournamentResult<Entry> {
        let lock = self.tournament_lock(entry.tournament_id);
        let _guard = hold(&lock);
        let tournament = self.tournament(entry.tournament_id)?;
        let entries = self.store.list_entries(tournament.id)?;
        tournament.check_registration(entry.participant, entries.len())?;
        if entries.iter().any(|e| e.participant == entry.participant) {
            return Err(TournamentError::AlreadyRegistered);
        }
        self.store.insert_entry(entry.clone())?;
        Ok(entry)
    }

    /// Change an entry's qualifier points; only allowed before the bracket exists.
    pub fn update_qualifier_points(
        &self,
        tournament_id: TournamentId,
        entry_id: EntryId,
        points: i32,
    ) -> TournamentResult<Entry> {
        let lock = self.tournament_lock(tournament_id);
        let _guard = hold(&lock);
        let tournament = self.tournament(tournament_id)?;
        if !matches!(
            tournament.state,
            TournamentState::Draft | TournamentState::Registration
        ) {
            return Err(TournamentError::InvalidState {
                expected: TournamentState::Registration,
                actual: tournament.state,
            });
        }
        let mut entry = self
            .store
            .list_entries(tournament_id)?
            .into_iter()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| TournamentError::Store(format!("entry {} not found", entry_id)))?;
        entry.qualifier_points = points;
        self.store.update_entry(&entry)?;
        Ok(entry)
    }

    pub fn set_rating(&self, participant: Participant, rating: i32) -> TournamentResult<()> {
        self.store.update_rating(participant, rating)
    }

    pub fn rating(&self, participant: Participant) -> TournamentResult<i32> {
        Ok(self
            .store
            .rating(participant)?
            .unwrap_or(self.config.default_rating))
    }

    pub fn matches(&self, id: TournamentId) -> TournamentResult<Vec<GameMatch>> {
        self.tournament(id)?;
        self.store.list_matches(id)
    }

    pub fn standings(&self, id: TournamentId) -> TournamentResult<Vec<Standing>> {
        Ok(standings(&self.matches(id)?))
    }

    /// Seed the tournament's entries, build the bracket, resolve byes, and
    /// replace any existing match set in one write.
    pub fn generate_bracket(&self, id: TournamentId) -> TournamentResult<Vec<GameMatch>> {
        self.generate_bracket_with(id, &mut rand::thread_rng())
    }

    /// [`generate_bracket`](Self::generate_bracket) with a caller-supplied RNG for random seeding.
    pub fn generate_bracket_with<R: Rng + ?Sized>(
        &self,
        id: TournamentId,
        rng: &mut R,
    ) -> TournamentResult<Vec<GameMatch>> {
        let lock = self.tournament_lock(id);
        let _guard = hold(&lock);
        let mut tournament = self.tournament(id)?;
        tournament.check_bracket_generation()?;

        let entries = self.store.list_entries(id)?;
        let matches = plan_bracket(&tournament, &entries, rng)?;
        self.store.replace_matches(id, matches.clone())?;

        tournament.start();
        self.store.save_tournament(&tournament)?;
        log::info!(
            "Generated bracket for tournament {}: {} matches",
            id,
            matches.len()
        );
        Ok(matches)
    }

    /// Remove every match and return the tournament to Registration.
    pub fn delete_bracket(&self, id: TournamentId) -> TournamentResult<()> {
        let lock = self.tournament_lock(id);
        let _guard = hold(&lock);
        let mut tournament = self.tournament(id)?;
        tournament.reset_bracket()?;
        self.store.replace_matches(id, Vec::new())?;
        self.store.save_tournament(&tournament)?;
        log::info!("Deleted bracket of tournament {}", id);
        Ok(())
    }

    /// Record a match result, advance the winner (and loser) and update ratings.
    ///
    /// The winner is `winner_id` when given, otherwise the side with the higher
    /// score. Everything is worked out first and handed to the store in one
    /// [`commit_result`](TournamentStore::commit_result), so validation or
    /// store failures leave the result unrecorded.
    pub fn record_result(
        &self,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        winner_id: Option<Uuid>,
    ) -> TournamentResult<GameMatch> {
        let found = self
            .store
            .get_match(match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let lock = self.tournament_lock(found.tournament_id);
        let _guard = hold(&lock);

        let mut tournament = self.tournament(found.tournament_id)?;
        if tournament.state != TournamentState::InProgress {
            return Err(TournamentError::InvalidState {
                expected: TournamentState::InProgress,
                actual: tournament.state,
            });
        }

        let mut bracket = Bracket::from_matches(self.store.list_matches(tournament.id)?);
        let game = bracket
            .get(match_id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if matches!(game.status, MatchStatus::Completed | MatchStatus::Cancelled) {
            return Err(TournamentError::MatchClosed);
        }
        let (Some(home), Some(away)) = (game.home, game.away) else {
            return Err(TournamentError::MatchNotReady);
        };
        for p in [home, away] {
            if p.mode() != tournament.mode {
                return Err(TournamentError::ModeMismatch {
                    expected: tournament.mode,
                    actual: p.mode(),
                });
            }
        }
        let winner = decide_winner(home, away, home_score, away_score, winner_id)?;
        let loser = if winner == home { away } else { home };

        let key = game.key();
        if let Some(m) = bracket.find_mut(key) {
            m.home_score = Some(home_score);
            m.away_score = Some(away_score);
            m.winner = Some(winner);
            m.status = MatchStatus::Completed;
        }
        let outcome = advance(&mut bracket, tournament.format, key)?;
        if !outcome.conflicts.is_empty() {
            log::warn!(
                "Tournament {} has structural conflicts at {:?}; delete and regenerate the bracket",
                tournament.id,
                outcome.conflicts
            );
        }

        if outcome.tournament_completed {
            tournament.complete(outcome.champion);
        } else if tournament.format == TournamentFormat::RoundRobin
            && bracket
                .matches()
                .iter()
                .all(|m| matches!(m.status, MatchStatus::Completed | MatchStatus::Cancelled))
        {
            let champion = standings(bracket.matches()).first().map(|s| s.participant);
            tournament.complete(champion);
        }

        let ratings = self.rated(winner, loser)?;
        let changed: Vec<GameMatch> = std::iter::once(key)
            .chain(outcome.touched())
            .filter_map(|k| bracket.find(k).cloned())
            .collect();
        self.store.commit_result(&tournament, &changed, &ratings)?;

        if tournament.state == TournamentState::Completed {
            log::info!(
                "Tournament {} completed; champion {:?}",
                tournament.id,
                tournament.champion
            );
        }

        bracket
            .get(match_id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    /// New ratings of both sides after `winner` beat `loser`.
    fn rated(
        &self,
        winner: Participant,
        loser: Participant,
    ) -> TournamentResult<[(Participant, i32); 2]> {
        let winner_rating = self.rating(winner)?;
        let loser_rating = self.rating(loser)?;
        let (new_winner, new_loser) = apply_result(winner_rating, loser_rating, self.config.k_factor);
        log::debug!(
            "Rating change: {:?} {} -> {}, {:?} {} -> {}",
            winner,
            winner_rating,
            new_winner,
            loser,
            loser_rating,
            new_loser
        );
        Ok([(winner, new_winner), (loser, new_loser)])
    }
}
