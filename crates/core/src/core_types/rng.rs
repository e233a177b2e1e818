//! Per-patch pseudorandom stream for ignition draws
//!
//! Every patch owns exactly one stream. The stream is advanced once for each
//! candidate ignition, so a patch's fire history depends only on its own seed
//! and forcing, never on how many other patches run alongside it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws in [0, 1)
pub trait IgnitionRng {
    fn next_uniform(&mut self) -> f64;
}

/// Seeded stream owned by one patch
#[derive(Debug, Clone)]
pub struct PatchRng(StdRng);

impl PatchRng {
    /// Derive an independent stream for `patch_id` from a run-wide seed
    pub fn for_patch(seed: u64, patch_id: u32) -> Self {
        let mixed = seed ^ u64::from(patch_id).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        PatchRng(StdRng::seed_from_u64(mixed))
    }
}

impl IgnitionRng for PatchRng {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

impl<R: IgnitionRng + ?Sized> IgnitionRng for &mut R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}
