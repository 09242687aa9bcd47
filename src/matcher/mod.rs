//! Fuzzy answer scoring (spec §4.1). Pure and deterministic: no I/O,
//! no shared state, safe to call from inside an engine step while holding
//! a room lock.

mod normalize;
mod score;
mod similarity;

pub use normalize::normalize;
pub use score::{
    artist_is_correct, classify, elimination_threshold, is_elimination_round, title_is_correct,
};
pub use similarity::similarity;
