//! Uniform random selection for exploration and tie-breaking

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

/// Uniform picker over candidate sets.
///
/// Used for exploratory moves and to break ties between equally valued
/// actions. Always taking the first maximum would bias the policy towards
/// the environment's action enumeration order.
#[derive(Debug, Clone)]
pub struct TieBreaker {
    rng: StdRng,
    seed: Option<u64>,
}

impl TieBreaker {
    /// Entropy-seeded picker.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            seed: None,
        }
    }

    /// Deterministic picker for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Pick one candidate uniformly at random.
    ///
    /// Returns `None` only when `candidates` is empty.
    pub fn pick_one<'a, T>(&mut self, candidates: &'a [T]) -> Option<&'a T> {
        candidates.choose(&mut self.rng)
    }

    /// Draw u ∈ [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

impl Default for TieBreaker {
    fn default() -> Self {
        Self::new()
    }
}
