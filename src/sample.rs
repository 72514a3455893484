//! Random ordering and sampling.
//!
//! Every random decision in the crate (card shuffles, quiz question draws,
//! distractor draws, option order) goes through a [`StudyRng`], so a fixed
//! seed reproduces a whole session.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type StudyRng = ChaCha8Rng;

/// Seeded when `seed` is given, otherwise from OS entropy.
pub fn study_rng(seed: Option<u64>) -> StudyRng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Fisher–Yates: for i from the last index down to 1, swap i with a uniform
/// index in [0, i].
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Draws `count` items without replacement (all of them if `count` exceeds
/// the length). Every subset of that size is equally likely and so is every
/// order within it.
pub fn sample<T: Clone, R: Rng + ?Sized>(items: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let mut pool = items.to_vec();
    let count = count.min(pool.len());
    // partial Fisher–Yates from the front
    for i in 0..count {
        let j = rng.gen_range(i..pool.len());
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}
