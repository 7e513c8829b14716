//! Heap-side collaborators of the tracker.
//!
//! The tracker never reaches into global heap state. It is handed a
//! [`RegionTable`] handle at construction (a reference or an `Arc`) and
//! resolves region objects through it.

use std::sync::Arc;

use crate::sync::{AtomicBool, AtomicUsize, Ordering};

/// A heap region that can be told it failed evacuation.
pub trait HeapRegion: Sync {
    /// Called exactly once per pause, from the worker that won the claim.
    fn note_evacuation_failure(&self);
}

/// Resolves dense region indices to region objects.
pub trait RegionTable: Sync {
    /// The region object type.
    type Region: HeapRegion;

    /// Region object for `index`. `index` is always below [`Self::max_regions`].
    fn region_at(&self, index: u32) -> &Self::Region;

    /// Size of the region index space.
    fn max_regions(&self) -> u32;
}

impl<T: RegionTable + ?Sized> RegionTable for &T {
    type Region = T::Region;

    #[inline]
    fn region_at(&self, index: u32) -> &Self::Region {
        (**self).region_at(index)
    }

    fn max_regions(&self) -> u32 {
        (**self).max_regions()
    }
}

impl<T: RegionTable + Send + ?Sized> RegionTable for Arc<T> {
    type Region = T::Region;

    #[inline]
    fn region_at(&self, index: u32) -> &Self::Region {
        (**self).region_at(index)
    }

    fn max_regions(&self) -> u32 {
        (**self).max_regions()
    }
}

/// Per-region state kept by [`RegionHeap`].
#[derive(Debug)]
pub struct Region {
    index: u32,
    evacuation_failed: AtomicBool,
    failure_notes: AtomicUsize,
}

impl Region {
    /// Create a region with the given index.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self {
            index,
            evacuation_failed: AtomicBool::new(false),
            failure_notes: AtomicUsize::new(0),
        }
    }

    /// Index of this region in the heap.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Whether the region has been told it failed evacuation.
    #[must_use]
    pub fn has_evacuation_failed(&self) -> bool {
        self.evacuation_failed.load(Ordering::Relaxed)
    }

    /// Number of failure notifications received since the last clear.
    #[must_use]
    pub fn failure_notes(&self) -> usize {
        self.failure_notes.load(Ordering::Relaxed)
    }

    /// Forget the failure once the region has been recovered.
    pub fn clear_evacuation_failure(&self) {
        self.evacuation_failed.store(false, Ordering::Relaxed);
        self.failure_notes.store(0, Ordering::Relaxed);
    }
}

impl HeapRegion for Region {
    fn note_evacuation_failure(&self) {
        self.evacuation_failed.store(true, Ordering::Relaxed);
        self.failure_notes.fetch_add(1, Ordering::Relaxed);
    }
}

/// A fixed set of regions indexed `0..len`.
///
/// # Example
///
/// ```
/// use evac_failure::{RegionHeap, RegionTable};
///
/// let heap = RegionHeap::new(4);
/// assert_eq!(heap.max_regions(), 4);
/// assert_eq!(heap.region_at(2).index(), 2);
/// ```
#[derive(Debug)]
pub struct RegionHeap {
    regions: Box<[Region]>,
}

impl RegionHeap {
    /// Create a heap of `max_regions` regions.
    #[must_use]
    pub fn new(max_regions: u32) -> Self {
        Self {
            regions: (0..max_regions).map(Region::new).collect(),
        }
    }

    /// Iterate over every region.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Indices of regions currently flagged as failed, in index order.
    #[must_use]
    pub fn failed_regions(&self) -> Vec<u32> {
        self.regions
            .iter()
            .filter(|r| r.has_evacuation_failed())
            .map(Region::index)
            .collect()
    }

    /// Clear the failure flag on every region.
    pub fn clear_evacuation_failures(&self) {
        for region in &*self.regions {
            region.clear_evacuation_failure();
        }
    }
}

impl RegionTable for RegionHeap {
    type Region = Region;

    #[inline]
    fn region_at(&self, index: u32) -> &Region {
        &self.regions[index as usize]
    }

    #[allow(clippy::cast_possible_truncation)]
    fn max_regions(&self) -> u32 {
        self.regions.len() as u32
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::{HeapRegion, RegionHeap, RegionTable};
    use std::sync::Arc;

    #[test]
    fn test_region_heap_indices() {
        let heap = RegionHeap::new(8);
        assert_eq!(heap.max_regions(), 8);
        for (i, region) in heap.iter().enumerate() {
            assert_eq!(region.index() as usize, i);
            assert!(!region.has_evacuation_failed());
        }
    }

    #[test]
    fn test_handles_resolve_same_regions() {
        let heap = Arc::new(RegionHeap::new(3));
        let by_ref = &*heap;
        assert_eq!(by_ref.max_regions(), 3);
        assert_eq!(RegionTable::max_regions(&heap), 3);

        heap.region_at(2).note_evacuation_failure();
        assert!(by_ref.region_at(2).has_evacuation_failed());
    }

    #[test]
    fn test_region_note_and_clear() {
        let heap = RegionHeap::new(4);
        heap.region_at(1).note_evacuation_failure();
        heap.region_at(3).note_evacuation_failure();

        assert_eq!(heap.failed_regions(), vec![1, 3]);
        assert_eq!(heap.region_at(1).failure_notes(), 1);

        heap.clear_evacuation_failures();
        assert!(heap.failed_regions().is_empty());
        assert_eq!(heap.region_at(3).failure_notes(), 0);
    }
}
