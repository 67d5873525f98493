//! Space calculation: turns layout parameters into a space budget and allocates it.
//!
//! - `budget`: page area → space units, text/topic estimates, optimal topic count
//! - `allocator`: the four-phase greedy selection
//! - `suggestions`: low-level add/expand/reduce hints for an existing selection
//!
//! Everything here is a pure function of its arguments. The service only carries
//! the thresholds it was built with, so one instance can be shared across threads.

pub mod allocator;
pub mod budget;
pub mod suggestions;

use tracing::warn;

use crate::config::{EngineConfig, UtilizationThresholds};

pub use budget::{font_density, page_dimensions};

/// Utilization reported for a non-empty selection on a zero budget.
pub const OVERFLOW_SENTINEL: f64 = 10.0;

/// Leaf service: budgets, estimates and the core allocation algorithm.
#[derive(Debug, Clone)]
pub struct SpaceCalculationService {
    thresholds: UtilizationThresholds,
    max_suggestions: usize,
}

impl SpaceCalculationService {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            max_suggestions: config.max_suggestions,
        }
    }

    pub fn thresholds(&self) -> &UtilizationThresholds {
        &self.thresholds
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }
}

impl Default for SpaceCalculationService {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

/// Space units as a signed impact, saturating at `i64::MAX`.
pub fn signed_units(units: u64) -> i64 {
    i64::try_from(units).unwrap_or(i64::MAX)
}

/// `used / available`, guarded for an empty budget.
///
/// A zero budget with content is a permanent overflow and reports
/// `OVERFLOW_SENTINEL`; a zero budget with nothing selected reports 0.
pub fn utilization_ratio(used: u64, available: u64) -> f64 {
    if available == 0 {
        if used == 0 {
            return 0.0;
        }
        warn!(used, "available space is zero; treating selection as overflowing");
        return OVERFLOW_SENTINEL;
    }
    used as f64 / available as f64
}
