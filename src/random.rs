//! Seeded random number generator construction.
//!
//! Every stochastic operation in this crate takes `&mut R where R: Rng`,
//! so callers can inject any source. [`create_rng`] is the conventional
//! reproducible choice.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic RNG from a seed.
///
/// Two generators created with the same seed produce identical streams.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates an RNG seeded from `seed`, or from OS entropy when `None`.
pub fn rng_from_option(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => create_rng(s),
        None => create_rng(rand::random()),
    }
}
