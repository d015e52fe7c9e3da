//! Random number generation for spell resolution
//!
//! Failure rolls, random teleport landings and summon placement all draw
//! from one seeded ChaCha stream, so a scripted run replays identically.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded RNG handed to effects through the effect context
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed drawn from the OS, for live games
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in `0..n`, 0 when `n` is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform integer in `lo..=hi` (bounds may be given in either order)
    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform float in `[0, 1)`
    pub fn unit_f32(&mut self) -> f32 {
        self.rng.gen_range(0.0f32..1.0)
    }

    /// True with probability `chance`; at or below 0 never, at or above 1 always
    pub fn roll_chance(&mut self, chance: f32) -> bool {
        if chance <= 0.0 {
            false
        } else if chance >= 1.0 {
            true
        } else {
            self.unit_f32() < chance
        }
    }

    /// True with probability `1/n`
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }
}
