//! Injected randomness
//!
//! Every stochastic operation takes a `&mut impl Dice`. Any `rand::Rng` is a
//! `Dice`, so production code passes a seeded [`ChaCha8Rng`]; tests and replays
//! can pass a [`ScriptedDice`] to force particular draws.
//!
//! Degenerate ranges (`min >= max`) never consume a draw, for either
//! implementation, so scripted sequences line up with seeded ones.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of random draws
pub trait Dice {
    /// Uniform integer in `[min, max]`
    fn roll(&mut self, min: u32, max: u32) -> u32;

    /// Uniform float in `[0, 1)`
    fn chance(&mut self) -> f64;

    /// Probability check: draws once and succeeds when the draw is below `probability`
    fn succeeds(&mut self, probability: f64) -> bool {
        self.chance() < probability
    }

    /// Uniform index in `0..len` (0 for empty or single-element collections)
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.roll(0, (len - 1) as u32) as usize
    }

    /// `amount` distinct indices from `0..len`, without replacement
    fn sample_distinct(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        let mut pool: Vec<usize> = (0..len).collect();
        // Partial Fisher-Yates
        for i in 0..amount {
            let j = i + self.pick(len - i);
            pool.swap(i, j);
        }
        pool.truncate(amount);
        pool
    }
}

impl<R: Rng> Dice for R {
    fn roll(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.gen_range(min..=max)
    }

    fn chance(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Deterministic dice for a session seed
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Which end of a range an exhausted [`ScriptedDice`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollBias {
    Min,
    Max,
}

/// Dice that replay queued values, then fall back to a fixed bias
///
/// Queued rolls are clamped into the requested range.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    chances: VecDeque<f64>,
    bias: RollBias,
    fallback_chance: f64,
}

impl ScriptedDice {
    pub fn new(bias: RollBias, fallback_chance: f64) -> Self {
        ScriptedDice {
            rolls: VecDeque::new(),
            chances: VecDeque::new(),
            bias,
            fallback_chance: fallback_chance.clamp(0.0, 0.999_999),
        }
    }

    /// Every roll is the range maximum and every probability check fails
    pub fn maxed() -> Self {
        Self::new(RollBias::Max, 0.999_999)
    }

    /// Every roll is the range minimum and every probability check succeeds
    pub fn minimal() -> Self {
        Self::new(RollBias::Min, 0.0)
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = f64>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Number of queued draws not yet consumed
    pub fn remaining(&self) -> usize {
        self.rolls.len() + self.chances.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        match self.rolls.pop_front() {
            Some(value) => value.clamp(min, max),
            None => match self.bias {
                RollBias::Min => min,
                RollBias::Max => max,
            },
        }
    }

    fn chance(&mut self) -> f64 {
        self.chances.pop_front().unwrap_or(self.fallback_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_repeatable() {
        let mut a = seeded(7);
        let mut b = seeded(7);
        let left: Vec<u32> = (0..32).map(|_| a.roll(5, 15)).collect();
        let right: Vec<u32> = (0..32).map(|_| b.roll(5, 15)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|v| (5..=15).contains(v)));
    }

    #[test]
    fn test_scripted_queue_then_bias() {
        let mut dice = ScriptedDice::maxed().with_rolls([7, 99]).with_chances([0.1]);
        assert_eq!(dice.roll(5, 15), 7);
        // Clamped into range
        assert_eq!(dice.roll(5, 15), 15);
        assert_eq!(dice.roll(5, 15), 15);
        assert!(dice.succeeds(0.5));
        assert!(!dice.succeeds(0.5));
    }

    #[test]
    fn test_degenerate_range_consumes_nothing() {
        let mut dice = ScriptedDice::minimal().with_rolls([4]);
        assert_eq!(dice.roll(0, 0), 0);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll(1, 9), 4);
    }

    #[test]
    fn test_sample_distinct() {
        let mut rng = seeded(42);
        for amount in 0..=6 {
            let mut picked = rng.sample_distinct(5, amount);
            assert_eq!(picked.len(), amount.min(5));
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), amount.min(5));
            assert!(picked.iter().all(|i| *i < 5));
        }
    }
}
