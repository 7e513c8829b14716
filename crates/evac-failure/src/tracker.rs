//! Evacuation-failure region tracker.
//!
//! Worker threads call [`EvacFailureRegions::record`] concurrently whenever
//! they fail to copy an object out of a region. The presence bitmap elects a
//! single winner per region; the winner appends the region to a dense log and
//! notifies the region object. After the pause joins, the log is read back
//! as the list of regions that must be retained and fixed up.
//!
//! # Phases
//!
//! ```text
//! Idle --pre_collection--> Recording --post_collection--> Sealed --reset--> Idle
//! ```
//!
//! The move from `Recording` to `Sealed` must happen after every worker has
//! joined; that join is what makes the relaxed writes visible to readers.
//! Debug builds assert against out-of-phase calls.

use std::time::Instant;

use crate::append_log::AppendLog;
use crate::bitmap::RegionBitmap;
use crate::claimer::RegionClaimer;
use crate::metrics::{global_metrics, EvacFailureMetrics};
use crate::region::{HeapRegion, RegionTable};
use crate::tracing::{log_reset, PhaseSpan};

/// Lifecycle state of the tracker within a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Freshly constructed or reset. Reads see an empty list.
    Idle,
    /// Workers may call `record`.
    Recording,
    /// Workers have joined. Reads are stable.
    Sealed,
}

/// Records, exactly once per region, that evacuation failed in it.
///
/// # Example
///
/// ```
/// use evac_failure::{EvacFailureRegions, RegionHeap, RegionTable};
///
/// let heap = RegionHeap::new(4);
/// let mut tracker = EvacFailureRegions::new(&heap);
///
/// tracker.pre_collection(heap.max_regions());
/// assert!(tracker.record(2));
/// assert!(!tracker.record(2));
/// assert!(tracker.record(0));
/// let metrics = tracker.post_collection();
///
/// assert_eq!(metrics.regions_failed, 2);
/// assert_eq!(tracker.iter().collect::<Vec<_>>(), vec![2, 0]);
/// assert!(heap.region_at(2).has_evacuation_failed());
/// ```
#[derive(Debug)]
pub struct EvacFailureRegions<H: RegionTable> {
    heap: H,
    regions_failed: RegionBitmap,
    failed_log: AppendLog,
    phase: Phase,
    pause_id: u64,
    started: Option<Instant>,
    span: PhaseSpan,
}

impl<H: RegionTable> EvacFailureRegions<H> {
    /// Create a tracker sized to `heap.max_regions()`.
    #[must_use]
    pub fn new(heap: H) -> Self {
        let max_regions = heap.max_regions() as usize;
        Self {
            heap,
            regions_failed: RegionBitmap::new(max_regions),
            failed_log: AppendLog::new(max_regions),
            phase: Phase::Idle,
            pause_id: 0,
            started: None,
            span: PhaseSpan::none(),
        }
    }

    /// The heap this tracker notifies.
    #[must_use]
    pub const fn heap(&self) -> &H {
        &self.heap
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Size of the region index space the tracker accepts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn max_regions(&self) -> u32 {
        self.regions_failed.capacity() as u32
    }

    /// Prepare for a new pause and enter the recording phase.
    ///
    /// Clears any previous results and grows storage to `max_regions` when the
    /// heap has grown. This is the only place the tracker allocates.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if called while already recording, or if
    /// `max_regions` exceeds the regions the heap can resolve.
    pub fn pre_collection(&mut self, max_regions: u32) {
        debug_assert_ne!(
            self.phase,
            Phase::Recording,
            "pre_collection called during a recording phase"
        );
        debug_assert!(
            max_regions <= self.heap.max_regions(),
            "tracker sized to {max_regions} regions but the heap resolves only {}",
            self.heap.max_regions()
        );
        if max_regions > self.max_regions() {
            self.regions_failed.resize(max_regions as usize);
            self.failed_log.resize(max_regions as usize);
        } else {
            self.regions_failed.clear();
            self.failed_log.clear();
        }
        self.pause_id = global_metrics().next_pause_id();
        self.started = Some(Instant::now());
        self.span = PhaseSpan::recording(self.pause_id, self.max_regions());
        self.phase = Phase::Recording;
    }

    /// Record that evacuation failed in region `region_idx`.
    ///
    /// Returns `true` if this call was the first to record the region in the
    /// current pause, in which case the region has been appended to the
    /// failed list and notified. Returns `false` if another call already did.
    ///
    /// # Panics
    ///
    /// Panics if `region_idx` is not below [`Self::max_regions`]. Debug builds
    /// also panic outside the recording phase.
    #[inline]
    pub fn record(&self, region_idx: u32) -> bool {
        debug_assert_eq!(
            self.phase,
            Phase::Recording,
            "record called outside a recording phase"
        );
        let success = self.regions_failed.par_set_bit(region_idx as usize);
        if success {
            let slot = self.failed_log.append(region_idx);
            self.span.region_recorded(region_idx, slot);
            self.heap.region_at(region_idx).note_evacuation_failure();
        }
        success
    }

    /// Seal the recording phase once all workers have joined.
    ///
    /// Returns a summary of the pause and folds it into the global metrics.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the tracker is not recording.
    pub fn post_collection(&mut self) -> EvacFailureMetrics {
        debug_assert_eq!(
            self.phase,
            Phase::Recording,
            "post_collection called outside a recording phase"
        );
        self.phase = Phase::Sealed;

        let metrics = EvacFailureMetrics {
            pause_id: self.pause_id,
            regions_failed: self.failed_log.len(),
            max_regions: self.max_regions(),
            recording_duration: self.started.take().map(|t| t.elapsed()).unwrap_or_default(),
        };
        self.span.sealed(&metrics);
        global_metrics().record_pause(&metrics);
        metrics
    }

    /// Forget every recorded region and return to the idle phase.
    pub fn reset(&mut self) {
        log_reset(self.failed_log.len());
        self.regions_failed.clear();
        self.failed_log.clear();
        self.started = None;
        self.span = PhaseSpan::none();
        self.phase = Phase::Idle;
    }

    #[inline]
    fn debug_assert_readable(&self) {
        debug_assert_ne!(
            self.phase,
            Phase::Recording,
            "failed regions read while workers may still be recording"
        );
    }

    /// Whether any region failed evacuation.
    #[must_use]
    pub fn has_failed_regions(&self) -> bool {
        self.count() > 0
    }

    /// Number of regions that failed evacuation.
    #[must_use]
    pub fn count(&self) -> usize {
        self.debug_assert_readable();
        self.failed_log.len()
    }

    /// Whether region `region_idx` failed evacuation.
    ///
    /// # Panics
    ///
    /// Panics if `region_idx` is not below [`Self::max_regions`].
    #[must_use]
    pub fn contains(&self, region_idx: u32) -> bool {
        self.debug_assert_readable();
        self.regions_failed.at(region_idx as usize)
    }

    /// Failed region indices in the order they were first recorded.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.debug_assert_readable();
        self.failed_log.iter()
    }

    /// Failed region indices collected into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Visit failed regions from one of several parallel workers.
    ///
    /// Every worker walks the whole list starting at its own offset and calls
    /// `f` for each region it manages to claim. Across all workers sharing
    /// `claimer`, each failed region is visited exactly once.
    ///
    /// # Panics
    ///
    /// Panics if a failed region index is outside the claimer's range.
    pub fn par_iterate<F>(&self, claimer: &RegionClaimer, worker_id: usize, mut f: F)
    where
        F: FnMut(&H::Region),
    {
        self.debug_assert_readable();
        let len = self.failed_log.len();
        if len == 0 {
            return;
        }
        let start = claimer.offset_for_worker(worker_id, len);
        for i in (start..len).chain(0..start) {
            let Some(region_idx) = self.failed_log.get(i) else {
                continue;
            };
            if claimer.claim_region(region_idx) {
                f(self.heap.region_at(region_idx));
            }
        }
    }
}
