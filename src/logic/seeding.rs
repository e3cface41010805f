//! Seeding: rank entries and lay them out in bracket slot order.

use crate::models::{Entry, SeedingMethod, TournamentError, TournamentResult};
use rand::seq::SliceRandom;
use rand::Rng;

/// Smallest power of two that holds `count` entrants (minimum 2).
pub fn bracket_size(count: usize) -> usize {
    count.max(2).next_power_of_two()
}

/// Number of elimination rounds for `count` entrants: `ceil(log2(count))`.
pub fn round_count(count: usize) -> u32 {
    bracket_size(count).trailing_zeros()
}

/// Mirrored seed order for a bracket of `size` slots (a power of two).
///
/// Starting from `[1, 2]`, every doubling step replaces each seed `s` with
/// `s, 2 * len + 1 - s`. For 8 slots this yields `1 8 4 5 2 7 3 6`, so adjacent
/// pairs are 1v8, 4v5, 2v7 and 3v6.
pub fn standard_order(size: usize) -> Vec<usize> {
    let mut order = vec![1, 2];
    if size < 2 {
        order.truncate(size);
        return order;
    }
    while order.len() < size {
        let mirror = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, mirror - s]).collect();
    }
    order
}

/// Rank entries: qualifier points (descending) when a threshold is configured,
/// otherwise manual seed (unseeded last), then registration time.
fn rank_entries(entries: &[Entry], qualifier_threshold: Option<i32>) -> Vec<Entry> {
    let mut ranked: Vec<Entry> = entries.to_vec();
    match qualifier_threshold {
        Some(threshold) => {
            ranked.retain(|e| e.qualifier_points >= threshold);
            ranked.sort_by(|a, b| {
                b.qualifier_points
                    .cmp(&a.qualifier_points)
                    .then(a.registered_at.cmp(&b.registered_at))
            });
        }
        None => {
            ranked.sort_by_key(|e| (e.seed.is_none(), e.seed, e.registered_at));
        }
    }
    ranked
}

/// Place entries into bracket slots.
///
/// Returns a vector of `bracket_size(n)` slots; adjacent pairs form round-1
/// matches and `None` marks an unfilled seed (a bye).
pub fn seed_entries<R: Rng + ?Sized>(
    entries: &[Entry],
    method: SeedingMethod,
    qualifier_threshold: Option<i32>,
    rng: &mut R,
) -> TournamentResult<Vec<Option<Entry>>> {
    let mut ranked = rank_entries(entries, qualifier_threshold);
    if ranked.len() < 2 {
        return Err(TournamentError::InsufficientEntrants {
            found: ranked.len(),
        });
    }

    let size = bracket_size(ranked.len());
    let slots = match method {
        SeedingMethod::Standard => standard_order(size)
            .into_iter()
            .map(|seed| ranked.get(seed - 1).cloned())
            .collect(),
        SeedingMethod::Sequential => sequential(ranked, size),
        SeedingMethod::Random => {
            ranked.shuffle(rng);
            sequential(ranked, size)
        }
    };
    Ok(slots)
}

fn sequential(ranked: Vec<Entry>, size: usize) -> Vec<Option<Entry>> {
    let mut slots: Vec<Option<Entry>> = ranked.into_iter().map(Some).collect();
    slots.resize(size, None);
    slots
}
