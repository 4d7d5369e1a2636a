//! Projection module
//!
//! Read models derived from the accounts document on demand.

mod scoreboard;

pub use scoreboard::{ScoreboardEntry, ScoreboardView, DEFAULT_TOP};
