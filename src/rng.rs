use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum RngSource {
    Scripted(VecDeque<f64>),
    Seeded(StdRng),
}

/// Source of every random decision in the game: spawn picks, wild levels,
/// capture and flee rolls.
///
/// Tests script the outcomes in consumption order; play uses a seeded or
/// entropy-backed generator. Each draw is a uniform value in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct GameRng {
    source: RngSource,
}

impl GameRng {
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted(outcomes.into()),
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_unit(&mut self, reason: &str) -> f64 {
        let outcome = match &mut self.source {
            RngSource::Scripted(outcomes) => match outcomes.pop_front() {
                Some(value) => value.clamp(0.0, 1.0 - f64::EPSILON),
                None => panic!(
                    "GameRng exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                    reason
                ),
            },
            RngSource::Seeded(rng) => rng.random::<f64>(),
        };

        tracing::trace!("[RNG] Consumed {} for: {}", outcome, reason);
        outcome
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize, reason: &str) -> usize {
        let draw = self.next_unit(reason);
        ((draw * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Uniform integer in `min..=max`.
    pub fn next_in_range(&mut self, min: u8, max: u8, reason: &str) -> u8 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let span = (high - low) as usize + 1;
        low + self.next_index(span, reason) as u8
    }

    /// True with probability `chance`.
    pub fn roll(&mut self, chance: f64, reason: &str) -> bool {
        self.next_unit(reason) < chance
    }
}
