//! Injectable randomness
//!
//! Expression variability (mouth jitter, emphasis, head gestures, blink
//! timing) draws from a `RandomSource` so tests and replays can pin every
//! outcome.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform sample in `[low, high)`
    fn range(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }

    /// Uniform duration in `[low, high)`, rounded to whole microseconds
    fn duration(&mut self, low: Duration, high: Duration) -> Duration {
        let micros = self.range(low.as_micros() as f64, high.as_micros() as f64);
        Duration::from_micros(micros.round() as u64)
    }
}

/// Seedable pseudo-random source backed by `StdRng`
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed sequence of samples, then repeats `fallback`
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: VecDeque<f64>,
    fallback: f64,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: fallback.clamp(0.0, 0.999_999),
        }
    }

    /// Always yields the same sample
    pub fn constant(value: f64) -> Self {
        Self::new(std::iter::empty(), value)
    }

    /// Queue more samples
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
    }

    /// Samples not yet consumed
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(self.fallback)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}
