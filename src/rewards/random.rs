//! Randomness source
//!
//! Every draw the reward rules and the code minter make goes through
//! `RandomSource`, so tests can force specific branches.

use rand::Rng;
use std::collections::VecDeque;

pub trait RandomSource {
    /// Fair coin: `true` with probability 1/2
    fn coin_flip(&mut self) -> bool;

    /// Uniform index in `0..upper`; `upper` must be non-zero
    fn pick(&mut self, upper: usize) -> usize;
}

/// Adapter from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn coin_flip(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }

    fn pick(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..upper)
    }
}

/// One pre-recorded draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Coin(bool),
    Pick(usize),
}

/// Replays a fixed script of draws. When the script is exhausted, or the
/// next queued draw is of the other kind, coin flips come up `false` and
/// picks return 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<Draw>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = Draw>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Every coin flip wins
    pub fn winning() -> Self {
        Self::new(std::iter::repeat(Draw::Coin(true)).take(64))
    }

    /// Every coin flip loses
    pub fn losing() -> Self {
        Self::default()
    }

    pub fn push(&mut self, draw: Draw) {
        self.draws.push_back(draw);
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    // A draw of the other kind stays queued; the caller gets the fallback.
    fn next_coin(&mut self) -> Option<bool> {
        match self.draws.front() {
            Some(Draw::Coin(value)) => {
                let value = *value;
                self.draws.pop_front();
                Some(value)
            }
            _ => None,
        }
    }

    fn next_pick(&mut self) -> Option<usize> {
        match self.draws.front() {
            Some(Draw::Pick(value)) => {
                let value = *value;
                self.draws.pop_front();
                Some(value)
            }
            _ => None,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn coin_flip(&mut self) -> bool {
        self.next_coin().unwrap_or(false)
    }

    fn pick(&mut self, upper: usize) -> usize {
        self.next_pick().unwrap_or(0) % upper.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_rng_source_pick_in_range() {
        let mut source = RngSource(StdRng::seed_from_u64(42));
        for _ in 0..1_000 {
            assert!(source.pick(6) < 6);
        }
    }

    #[test]
    fn test_rng_source_coin_is_roughly_fair() {
        let mut source = RngSource(StdRng::seed_from_u64(7));
        let heads = (0..10_000).filter(|_| source.coin_flip()).count();
        assert!((4_700..=5_300).contains(&heads), "heads = {heads}");
    }

    #[test]
    fn test_scripted_replays_in_order() {
        let mut source = ScriptedRandom::new([Draw::Pick(2), Draw::Coin(true), Draw::Pick(9)]);
        assert_eq!(source.pick(5), 2);
        assert!(source.coin_flip());
        assert_eq!(source.pick(5), 4);
        assert_eq!(source.remaining(), 0);

        // Exhausted script falls back to losing draws
        assert!(!source.coin_flip());
        assert_eq!(source.pick(5), 0);
    }

    #[test]
    fn test_winning_and_losing() {
        let mut winning = ScriptedRandom::winning();
        assert_eq!(winning.pick(3), 0);
        assert!(winning.coin_flip());
        assert!(!ScriptedRandom::losing().coin_flip());
    }

    #[test]
    fn test_mismatched_kind_stays_queued() {
        let mut source = ScriptedRandom::new([Draw::Coin(true)]);
        assert_eq!(source.pick(4), 0);
        assert_eq!(source.remaining(), 1);
        assert!(source.coin_flip());
    }
}
