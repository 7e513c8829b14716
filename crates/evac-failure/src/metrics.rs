//! Evacuation-failure statistics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Summary of one recording phase, produced when the tracker is sealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvacFailureMetrics {
    /// Identifier of the pause this summary belongs to.
    pub pause_id: u64,
    /// Number of distinct regions that failed evacuation.
    pub regions_failed: usize,
    /// Size of the region index space during the pause.
    pub max_regions: u32,
    /// Time between `pre_collection` and `post_collection`.
    pub recording_duration: Duration,
}

impl EvacFailureMetrics {
    /// Whether any region failed during this pause.
    #[must_use]
    pub const fn evacuation_failed(&self) -> bool {
        self.regions_failed > 0
    }
}

/// Process-level cumulative evacuation-failure statistics.
///
/// # Example
///
/// ```
/// use evac_failure::global_metrics;
///
/// let metrics = global_metrics();
/// println!("Pauses with failures: {}", metrics.pauses_with_failures());
/// ```
#[derive(Debug)]
pub struct GlobalEvacFailureMetrics {
    pauses: AtomicU64,
    pauses_with_failures: AtomicU64,
    regions_failed: AtomicUsize,
}

impl Default for GlobalEvacFailureMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalEvacFailureMetrics {
    /// Create a new `GlobalEvacFailureMetrics` with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pauses: AtomicU64::new(0),
            pauses_with_failures: AtomicU64::new(0),
            regions_failed: AtomicUsize::new(0),
        }
    }

    /// Returns the number of sealed recording phases.
    #[inline]
    #[must_use]
    pub fn total_pauses(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }

    /// Returns the number of pauses in which at least one region failed.
    #[inline]
    #[must_use]
    pub fn pauses_with_failures(&self) -> u64 {
        self.pauses_with_failures.load(Ordering::Relaxed)
    }

    /// Returns the total number of failed regions across all pauses.
    #[inline]
    #[must_use]
    pub fn total_regions_failed(&self) -> usize {
        self.regions_failed.load(Ordering::Relaxed)
    }

    /// Allocate the next pause identifier.
    pub(crate) fn next_pause_id(&self) -> u64 {
        self.pauses.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_pause(&self, metrics: &EvacFailureMetrics) {
        if metrics.evacuation_failed() {
            self.pauses_with_failures.fetch_add(1, Ordering::Relaxed);
            self.regions_failed
                .fetch_add(metrics.regions_failed, Ordering::Relaxed);
        }
    }
}

static GLOBAL_METRICS: GlobalEvacFailureMetrics = GlobalEvacFailureMetrics::new();

/// Get the process-wide cumulative evacuation-failure metrics.
#[must_use]
pub fn global_metrics() -> &'static GlobalEvacFailureMetrics {
    &GLOBAL_METRICS
}

#[cfg(test)]
mod tests {
    use super::{EvacFailureMetrics, GlobalEvacFailureMetrics};
    use std::time::Duration;

    #[test]
    fn test_record_pause_without_failures() {
        let global = GlobalEvacFailureMetrics::new();
        let id = global.next_pause_id();
        global.record_pause(&EvacFailureMetrics {
            pause_id: id,
            max_regions: 8,
            ..EvacFailureMetrics::default()
        });

        assert_eq!(id, 1);
        assert_eq!(global.total_pauses(), 1);
        assert_eq!(global.pauses_with_failures(), 0);
        assert_eq!(global.total_regions_failed(), 0);
    }

    #[test]
    fn test_record_pause_with_failures() {
        let global = GlobalEvacFailureMetrics::new();
        for failed in [3, 0, 2] {
            let pause_id = global.next_pause_id();
            global.record_pause(&EvacFailureMetrics {
                pause_id,
                regions_failed: failed,
                max_regions: 16,
                recording_duration: Duration::from_micros(10),
            });
        }

        assert_eq!(global.total_pauses(), 3);
        assert_eq!(global.pauses_with_failures(), 2);
        assert_eq!(global.total_regions_failed(), 5);
    }
}
