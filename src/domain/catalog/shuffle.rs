//! Deterministic and ad hoc shuffles.
//!
//! The seeded shuffle must produce the same order for the same seed on every
//! run and platform: every participant's queue is derived from it, and a new
//! session id has to yield a new but reproducible set of orders. Mixing only
//! needs to be good enough for a handful of cards; this is not a CSPRNG.

use rand::seq::SliceRandom;

/// Multiplier of the linear congruential generator.
const LCG_MULTIPLIER: u32 = 1_103_515_245;

/// Increment of the linear congruential generator.
const LCG_INCREMENT: u32 = 12_345;

/// Keeps generator state within 31 bits (modulus 2^31).
const LCG_MASK: u32 = 0x7fff_ffff;

/// Polynomial rolling hash of a seed string (`hash * 31 + unit`), wrapped
/// to a signed 32-bit integer. Iterates UTF-16 code units.
pub fn seed_hash(seed: &str) -> i32 {
    seed.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Seed for one participant's queue, derived from the session seed.
pub fn participant_seed(session_seed: &str, participant_id: impl std::fmt::Display) -> String {
    format!("{}_{}", session_seed, participant_id)
}

/// Linear congruential generator seeded from [`seed_hash`].
#[derive(Debug, Clone)]
struct Lcg {
    state: u32,
}

impl Lcg {
    fn from_seed(seed: &str) -> Self {
        Self {
            state: seed_hash(seed) as u32,
        }
    }

    fn next_state(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & LCG_MASK;
        self.state
    }

    /// Returns an index in `0..bound`. `bound` must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize {
        self.next_state() as usize % bound
    }
}

/// Returns a seeded permutation of `items` (Fisher-Yates driven by an LCG).
///
/// Same seed and same input order always give the same output.
pub fn shuffle_seeded<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut shuffled = items.to_vec();
    let mut rng = Lcg::from_seed(seed);

    for i in (1..shuffled.len()).rev() {
        let j = rng.next_index(i + 1);
        shuffled.swap(i, j);
    }

    shuffled
}

/// Returns a permutation of `items` from the thread-local random source.
///
/// For mixes where reproducibility does not matter.
pub fn shuffle_random<T: Clone>(items: &[T]) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(&mut rand::thread_rng());
    shuffled
}
