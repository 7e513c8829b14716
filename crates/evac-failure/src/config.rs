//! Worker configuration for consuming the failed-region set.

use crate::claimer::RegionClaimer;

/// Region index space used when the heap does not say otherwise.
pub const DEFAULT_MAX_REGIONS: u32 = 2048;
/// Worker count when the host parallelism is unknown.
pub const DEFAULT_WORKERS: usize = 4;

/// Sizing for the [`RegionClaimer`] that splits the failed regions of an
/// [`EvacFailureRegions`](crate::EvacFailureRegions) tracker across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvacFailureConfig {
    /// Size of the region index space the claimer covers.
    pub max_regions: u32,
    /// Number of workers that iterate the failed regions after the pause.
    pub workers: usize,
}

impl Default for EvacFailureConfig {
    fn default() -> Self {
        Self {
            max_regions: DEFAULT_MAX_REGIONS,
            workers: std::thread::available_parallelism().map_or(DEFAULT_WORKERS, usize::from),
        }
    }
}

impl EvacFailureConfig {
    /// Build a claimer for `workers` workers over `max_regions` indices.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero.
    #[must_use]
    pub fn claimer(&self) -> RegionClaimer {
        RegionClaimer::new(self.workers, self.max_regions)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::{EvacFailureConfig, DEFAULT_MAX_REGIONS};

    #[test]
    fn test_default_config() {
        let config = EvacFailureConfig::default();
        assert_eq!(config.max_regions, DEFAULT_MAX_REGIONS);
        assert!(config.workers > 0);
    }

    #[test]
    fn test_config_claimer() {
        let config = EvacFailureConfig {
            max_regions: 16,
            workers: 3,
        };
        let claimer = config.claimer();
        assert_eq!(claimer.n_workers(), 3);
        assert!(claimer.claim_region(15));
    }
}
