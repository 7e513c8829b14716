//! Region claiming for parallel post-pause iteration.
//!
//! Several workers walk the same failed-region list. Each region is handed to
//! exactly one of them by an atomic claim, and workers start at spread-out
//! offsets so they rarely contend on the same entries.

use crate::sync::{AtomicBool, Ordering};

/// Hands out each region index to at most one worker.
#[derive(Debug)]
pub struct RegionClaimer {
    n_workers: usize,
    claims: Box<[AtomicBool]>,
}

impl RegionClaimer {
    /// Create a claimer for `n_workers` workers over `max_regions` indices.
    ///
    /// # Panics
    ///
    /// Panics if `n_workers` is zero.
    #[must_use]
    pub fn new(n_workers: usize, max_regions: u32) -> Self {
        assert!(n_workers > 0, "RegionClaimer needs at least one worker");
        Self {
            n_workers,
            claims: (0..max_regions).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Number of workers sharing this claimer.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Where `worker_id` should start in a list of `len` entries.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `worker_id` is not below `n_workers()`.
    #[must_use]
    pub fn offset_for_worker(&self, worker_id: usize, len: usize) -> usize {
        debug_assert!(
            worker_id < self.n_workers,
            "worker {worker_id} out of range for {} workers",
            self.n_workers
        );
        len * worker_id / self.n_workers
    }

    /// Try to take `index` for the calling worker.
    ///
    /// Returns `true` for exactly one caller per index until [`Self::reset`].
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the claimer's range.
    #[inline]
    pub fn claim_region(&self, index: u32) -> bool {
        self.claims[index as usize]
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Whether `index` has been claimed.
    #[must_use]
    pub fn is_claimed(&self, index: u32) -> bool {
        self.claims[index as usize].load(Ordering::Relaxed)
    }

    /// Release every claim. Must not race with `claim_region`.
    pub fn reset(&self) {
        for claim in &*self.claims {
            claim.store(false, Ordering::Relaxed);
        }
    }
}
