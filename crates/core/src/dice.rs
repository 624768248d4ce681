//! Injected random source for every probabilistic decision in the simulation.
//! Production code rolls a seeded ChaCha stream; tests substitute loaded dice.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

pub trait Dice {
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = u64::from(hi.abs_diff(lo)) + 1;
        let offset = self.next_u64() % span;
        lo + i32::try_from(offset).unwrap_or(0)
    }

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// True with probability `p`; values outside `[0, 1]` saturate.
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.unit() < p
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.next_u64() % len as u64) as usize)
    }
}

/// Seeded production source. Counts draws so a restored game can resume the same stream.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: ChaCha8Rng,
    draws: u64,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), draws: 0 }
    }

    /// Rebuilds the stream for `seed` and skips the first `draws` values.
    pub fn resume(seed: u64, draws: u64) -> Self {
        let mut dice = Self::new(seed);
        for _ in 0..draws {
            dice.next_u64();
        }
        dice
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Dice for SeededDice {
    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }
}

/// Dice that always land on the top face and answer every chance the same way.
#[derive(Clone, Copy, Debug)]
pub struct LoadedDice {
    pub chance_result: bool,
}

impl LoadedDice {
    pub const fn always_max() -> Self {
        Self { chance_result: true }
    }

    pub const fn never() -> Self {
        Self { chance_result: false }
    }
}

impl Dice for LoadedDice {
    fn next_u64(&mut self) -> u64 {
        u64::MAX
    }

    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        hi.max(lo)
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chance_result
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        len.checked_sub(1)
    }
}
