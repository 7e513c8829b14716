//! Tracing support for evacuation-failure tracking.
//!
//! When the `tracing` feature is enabled, each recording phase gets a
//! `evac_failure_recording` span and winning claims emit trace events under
//! it. Without the feature every helper here compiles to nothing.

#[cfg(feature = "tracing")]
pub mod internal {
    use tracing::{span, Level, Span};

    use crate::metrics::EvacFailureMetrics;

    /// Span covering one recording phase.
    ///
    /// Holds a plain [`Span`] rather than an entered guard so workers on any
    /// thread can attach events to it.
    #[derive(Debug, Clone)]
    pub struct PhaseSpan(Span);

    impl PhaseSpan {
        /// A span that records nothing.
        pub fn none() -> Self {
            Self(Span::none())
        }

        /// Open the span for a new recording phase.
        pub fn recording(pause_id: u64, max_regions: u32) -> Self {
            Self(span!(
                Level::DEBUG,
                "evac_failure_recording",
                pause_id = pause_id,
                max_regions = max_regions
            ))
        }

        /// A worker won the claim for `region` and stored it at `slot`.
        #[inline]
        pub fn region_recorded(&self, region: u32, slot: usize) {
            tracing::trace!(parent: &self.0, region, slot, "region_recorded");
        }

        /// The recording phase was sealed.
        pub fn sealed(&self, metrics: &EvacFailureMetrics) {
            tracing::debug!(
                parent: &self.0,
                pause_id = metrics.pause_id,
                regions_failed = metrics.regions_failed,
                max_regions = metrics.max_regions,
                recording_us = u64::try_from(metrics.recording_duration.as_micros()).unwrap_or(u64::MAX),
                "recording_sealed"
            );
        }
    }

    /// Log a tracker reset.
    pub fn log_reset(regions_cleared: usize) {
        tracing::debug!(regions_cleared, "evac_failure_reset");
    }
}

#[cfg(not(feature = "tracing"))]
pub mod internal {
    use crate::metrics::EvacFailureMetrics;

    /// Stub span when tracing is disabled.
    #[derive(Debug, Clone, Copy)]
    pub struct PhaseSpan;

    impl PhaseSpan {
        /// Stub function when tracing is disabled.
        pub const fn none() -> Self {
            Self
        }

        /// Stub function when tracing is disabled.
        pub const fn recording(_pause_id: u64, _max_regions: u32) -> Self {
            Self
        }

        /// Stub function when tracing is disabled.
        #[inline]
        pub const fn region_recorded(&self, _region: u32, _slot: usize) {}

        /// Stub function when tracing is disabled.
        pub const fn sealed(&self, _metrics: &EvacFailureMetrics) {}
    }

    /// Stub function when tracing is disabled.
    pub const fn log_reset(_regions_cleared: usize) {}
}

pub use internal::{log_reset, PhaseSpan};
