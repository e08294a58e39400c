//! Tie-break strategies for equally loaded candidates.
//!
//! Eligible candidates are ranked by cumulative hours with a stable sort, so
//! whatever order the tie-breaker leaves them in decides between candidates
//! with equal hours. The production default shuffles with a seeded PCG
//! stream, which spreads load while staying reproducible for a known seed.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64Mcg;

/// Orders candidates before they are ranked by hours.
///
/// `candidates` holds roster positions in roster order.
pub trait TieBreaker {
    /// Rearranges candidates in place.
    fn arrange(&mut self, candidates: &mut [usize]);

    /// The seed that reproduces this strategy's decisions, if any.
    fn seed(&self) -> Option<u64> {
        None
    }
}

/// Shuffles candidates with a PCG stream derived from a `u64` seed.
///
/// # Example
///
/// ```
/// use shift_allocator::allocation::{SeededShuffle, TieBreaker};
///
/// let mut first = SeededShuffle::new(42);
/// let mut second = SeededShuffle::new(42);
///
/// let mut a: Vec<usize> = (0..10).collect();
/// let mut b: Vec<usize> = (0..10).collect();
/// first.arrange(&mut a);
/// second.arrange(&mut b);
///
/// assert_eq!(a, b);
/// assert_eq!(first.seed(), Some(42));
/// ```
#[derive(Debug, Clone)]
pub struct SeededShuffle {
    seed: u64,
    rng: Pcg64Mcg,
}

impl SeededShuffle {
    /// A shuffle reproducible from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// A shuffle with a freshly drawn seed.
    ///
    /// The drawn seed is reported through [`TieBreaker::seed`] so the run
    /// can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl TieBreaker for SeededShuffle {
    fn arrange(&mut self, candidates: &mut [usize]) {
        candidates.shuffle(&mut self.rng);
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

/// Leaves candidates in roster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterOrder;

impl TieBreaker for RosterOrder {
    fn arrange(&mut self, _candidates: &mut [usize]) {}
}

impl<T: TieBreaker + ?Sized> TieBreaker for &mut T {
    fn arrange(&mut self, candidates: &mut [usize]) {
        (**self).arrange(candidates);
    }

    fn seed(&self) -> Option<u64> {
        (**self).seed()
    }
}

impl<T: TieBreaker + ?Sized> TieBreaker for Box<T> {
    fn arrange(&mut self, candidates: &mut [usize]) {
        (**self).arrange(candidates);
    }

    fn seed(&self) -> Option<u64> {
        (**self).seed()
    }
}
