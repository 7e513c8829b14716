//! Presence bitmap over the heap's region index space.
//!
//! One bit per region. Setting a bit is the "claim" that elects a single
//! winner per region during a pause; clearing happens only between pauses.

use crate::sync::{AtomicU64, Ordering};

const BITS_PER_WORD: usize = u64::BITS as usize;

/// A concurrent bitmap with one bit per region index.
///
/// # Example
///
/// ```
/// use evac_failure::RegionBitmap;
///
/// let bitmap = RegionBitmap::new(128);
/// assert!(bitmap.par_set_bit(5));
/// assert!(!bitmap.par_set_bit(5));
/// assert!(bitmap.at(5));
/// ```
#[derive(Debug)]
pub struct RegionBitmap {
    words: Box<[AtomicU64]>,
    capacity: usize,
}

impl RegionBitmap {
    /// Create a cleared bitmap able to hold `capacity` region indices.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: Self::alloc_words(capacity),
            capacity,
        }
    }

    fn alloc_words(capacity: usize) -> Box<[AtomicU64]> {
        (0..capacity.div_ceil(BITS_PER_WORD))
            .map(|_| AtomicU64::new(0))
            .collect()
    }

    /// Number of region indices this bitmap covers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.capacity,
            "region index {index} out of bitmap range {}",
            self.capacity
        );
        (index / BITS_PER_WORD, 1u64 << (index % BITS_PER_WORD))
    }

    /// Atomically set the bit for `index`.
    ///
    /// Returns `true` only for the call that moved the bit from 0 to 1.
    /// Relaxed ordering is enough: readers observe the bitmap after the
    /// pause's join barrier.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the bitmap.
    #[inline]
    pub fn par_set_bit(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        let prev = self.words[word].fetch_or(mask, Ordering::Relaxed);
        prev & mask == 0
    }

    /// Check whether the bit for `index` is set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the bitmap.
    #[must_use]
    #[inline]
    pub fn at(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word].load(Ordering::Relaxed) & mask != 0
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    /// Clear every bit. Must not race with `par_set_bit`.
    pub fn clear(&self) {
        for word in &*self.words {
            word.store(0, Ordering::Relaxed);
        }
    }

    /// Resize to `capacity` and clear. Allocates, so never call it inside a pause.
    pub fn resize(&mut self, capacity: usize) {
        if capacity.div_ceil(BITS_PER_WORD) == self.words.len() {
            self.clear();
        } else {
            self.words = Self::alloc_words(capacity);
        }
        self.capacity = capacity;
    }
}
