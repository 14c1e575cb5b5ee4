//! Randomness seam for board generation and session transitions.
//!
//! Everything random in the simulation goes through [`Entropy`]. Production
//! uses [`SeededEntropy`] (a [`StdRng`], seeded from config or the OS);
//! tests pin outcomes with [`FixedEntropy`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform random draws.
pub trait Entropy: Send {
    /// Uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform integer in `[low, high]`. Returns `low` when `high < low`.
    fn pick(&mut self, low: u32, high: u32) -> u32;
}

/// [`StdRng`]-backed entropy.
#[derive(Debug, Clone)]
pub struct SeededEntropy {
    rng: StdRng,
}

impl SeededEntropy {
    /// Deterministic stream for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from operating-system randomness.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is present, OS-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os, Self::from_seed)
    }
}

impl Entropy for SeededEntropy {
    fn roll(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn pick(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// Entropy that returns the same roll forever.
///
/// `pick` maps the roll onto the requested range, so a roll of `0.0`
/// always yields `low`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedEntropy {
    roll: f64,
}

impl FixedEntropy {
    /// Pin every roll to `roll`, clamped into `[0, 1)`.
    pub fn new(roll: f64) -> Self {
        Self {
            roll: roll.clamp(0.0, 1.0 - f64::EPSILON),
        }
    }
}

impl Entropy for FixedEntropy {
    fn roll(&mut self) -> f64 {
        self.roll
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn pick(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = f64::from(high - low) + 1.0;
        let offset = (span * self.roll).floor() as u32;
        low.saturating_add(offset).min(high)
    }
}
