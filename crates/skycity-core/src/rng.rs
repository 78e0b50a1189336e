//! Seedable randomness, one stream per subsystem

use crate::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random stream. Each randomized subsystem (lanterns,
/// particles, trails) owns its own instance so runs reproduce from one seed.
#[derive(Clone, Debug)]
pub struct SceneRng {
    inner: ChaCha8Rng,
}

impl SceneRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream derived from a base seed.
    pub fn derive(seed: u64, stream: u64) -> Self {
        Self::new(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Returns a float in [min, max]. Collapsed or inverted ranges yield `min`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// Returns a float in [-extent, extent]
    pub fn symmetric(&mut self, extent: f32) -> f32 {
        self.range(-extent.abs(), extent.abs())
    }

    /// Integer in the inclusive range [min, max].
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.inner.gen_range(0..items.len()))
    }

    /// Returns a random unit direction vector (uniformly on sphere surface)
    pub fn unit_direction(&mut self) -> Vec3 {
        // Marsaglia method
        loop {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
    }
}
