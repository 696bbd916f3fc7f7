//! Seedable randomness seam for question sampling and victim selection.
//!
//! Production sessions draw from OS entropy; tests construct the wrapper
//! with a fixed seed and assert exact shuffles and picks.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random source owned by a game session.
///
/// Every non-deterministic decision the core makes (shuffling a round's
/// candidate pool, picking elimination victims) goes through this wrapper,
/// so a seeded instance replays a game exactly.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: StdRng,
}

impl GameRng {
    /// Construct from OS entropy, the production wiring.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Construct from a fixed seed; same seed, same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Pick a uniform index below `len`; `None` when `len` is zero.
    pub fn pick(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.inner.random_range(0..len))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
