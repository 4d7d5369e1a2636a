//! Rewards module
//!
//! Probabilistic purchase and roulette rules.

pub mod random;
pub mod rules;

pub use random::{Draw, RandomSource, RngSource, ScriptedRandom};
pub use rules::{
    BalanceInstruction, Item, RewardEngine, RewardOutcome, JACKPOT_BONUS, ROULETTE_SYMBOLS,
    SPIN_COST,
};
