//! Pre-sized, lock-free append log of region indices.
//!
//! Writers reserve a slot with a single `fetch_add` on the cursor and then
//! own that slot exclusively. Capacity never grows while writers are active.

use crossbeam::utils::CachePadded;

use crate::sync::{AtomicU32, AtomicUsize, Ordering};

/// Dense array of `u32` values filled by bump allocation of slot indices.
///
/// # Invariants
///
/// - `len() <= capacity()` as long as callers append at most `capacity()` values
///   between clears (the tracker guarantees this with its presence bitmap).
/// - Slots `[0, len())` hold values once all appenders have finished.
#[derive(Debug)]
pub struct AppendLog {
    slots: Box<[AtomicU32]>,
    cursor: CachePadded<AtomicUsize>,
}

impl AppendLog {
    /// Create an empty log with room for `capacity` values.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Self::alloc_slots(capacity),
            cursor: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    fn alloc_slots(capacity: usize) -> Box<[AtomicU32]> {
        (0..capacity).map(|_| AtomicU32::new(0)).collect()
    }

    /// Maximum number of values the log can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reserve the next slot, store `value` into it and return its index.
    ///
    /// # Panics
    ///
    /// Panics if the log is already full.
    #[inline]
    pub fn append(&self, value: u32) -> usize {
        let offset = self.cursor.fetch_add(1, Ordering::Relaxed);
        debug_assert!(
            offset < self.slots.len(),
            "append log overflow: slot {offset} of {}",
            self.slots.len()
        );
        self.slots[offset].store(value, Ordering::Relaxed);
        offset
    }

    /// Number of reserved slots.
    ///
    /// Only a snapshot while appenders are running; stable afterwards.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Whether no slot has been reserved.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value stored at `index`, if that slot has been reserved.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        if index < self.len() {
            Some(self.slots[index].load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Iterate over the appended values in slot order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        let len = self.len().min(self.slots.len());
        self.slots[..len].iter().map(|slot| slot.load(Ordering::Relaxed))
    }

    /// Reset the cursor to zero. Must not race with `append`.
    pub fn clear(&self) {
        self.cursor.store(0, Ordering::Relaxed);
    }

    /// Resize to `capacity` and clear. Allocates, so never call it inside a pause.
    pub fn resize(&mut self, capacity: usize) {
        if capacity != self.slots.len() {
            self.slots = Self::alloc_slots(capacity);
        }
        self.clear();
    }
}
