//! Lock-free tracking of regions that failed evacuation.
//!
//! `evac-failure` is the piece of a region-based, parallel, copying garbage
//! collector that remembers which regions could not be fully evacuated during
//! a pause. Many worker threads may discover failures in the same region at
//! once; the tracker records each region **exactly once**, builds a dense,
//! duplicate-free list of failed regions, and notifies the region object, all
//! without locks or allocation on the recording path.
//!
//! # Components
//!
//! - [`RegionBitmap`]: one bit per region, atomically claimed with `fetch_or`
//! - [`AppendLog`]: pre-sized array filled by atomic bump allocation of slots
//! - [`EvacFailureRegions`]: the facade workers call `record` on
//! - [`RegionClaimer`]: hands failed regions to parallel post-pause workers
//!
//! # Quick Start
//!
//! ```
//! use evac_failure::{EvacFailureRegions, RegionHeap, RegionTable};
//!
//! let heap = RegionHeap::new(64);
//! let mut tracker = EvacFailureRegions::new(&heap);
//!
//! tracker.pre_collection(heap.max_regions());
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             tracker.record(7);
//!         });
//!     }
//! });
//! tracker.post_collection();
//!
//! assert_eq!(tracker.to_vec(), vec![7]);
//! assert_eq!(heap.region_at(7).failure_notes(), 1);
//! ```
//!
//! # Thread Safety
//!
//! `record` may be called from any number of threads at once. Reads
//! (`count`, `iter`, `contains`, `par_iterate`) are only meaningful after the
//! caller has joined every recording worker and called `post_collection`.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod append_log;
mod bitmap;
mod claimer;
mod config;
mod metrics;
mod region;
mod sync;
mod tracing;
mod tracker;

pub use append_log::AppendLog;
pub use bitmap::RegionBitmap;
pub use claimer::RegionClaimer;
pub use config::{EvacFailureConfig, DEFAULT_MAX_REGIONS, DEFAULT_WORKERS};
pub use metrics::{global_metrics, EvacFailureMetrics, GlobalEvacFailureMetrics};
pub use region::{HeapRegion, Region, RegionHeap, RegionTable};
pub use tracker::{EvacFailureRegions, Phase};
