//! Elo rating adjustment after a decided match.

/// Default K-factor.
pub const K_FACTOR: f64 = 32.0;

/// Default starting rating for participants without one.
pub const DEFAULT_RATING: i32 = 1500;

/// Expected score of the winner against the loser.
pub fn expected_score(winner_rating: i32, loser_rating: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((loser_rating - winner_rating) as f64 / 400.0))
}

/// Rating points the winner gains (and the loser loses): `round(k * (1 - expected))`.
pub fn rating_delta(winner_rating: i32, loser_rating: i32, k_factor: f64) -> i32 {
    (k_factor * (1.0 - expected_score(winner_rating, loser_rating))).round() as i32
}

/// New `(winner, loser)` ratings.
pub fn apply_result(winner_rating: i32, loser_rating: i32, k_factor: f64) -> (i32, i32) {
    let delta = rating_delta(winner_rating, loser_rating, k_factor);
    (winner_rating + delta, loser_rating - delta)
}
