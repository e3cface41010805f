//! Bracket engine: seeding, bracket construction, bye resolution, advancement, ratings.

mod advance;
mod bracket;
mod byes;
mod rating;
mod seeding;
mod standings;

pub use advance::{
    advance, check_winner, lower_winner_destination, upper_loser_destination,
    upper_winner_destination, Advancement, Placement,
};
pub use bracket::{build_bracket, lower_round_matches, Bracket};
pub use byes::resolve_byes;
pub use rating::{apply_result, expected_score, rating_delta, DEFAULT_RATING, K_FACTOR};
pub use seeding::{bracket_size, round_count, seed_entries, standard_order};
pub use standings::{standings, Standing};
