use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::UtilizationState;

/// Utilization ratios that separate underfilled, balanced and overflowing selections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationThresholds {
    /// Below this the page has too much empty space.
    pub underfill: f64,
    /// Between `underfill` and this, existing topics should be expanded.
    pub expand: f64,
    /// Above this the selection overflows.
    pub overflow: f64,
}

impl Default for UtilizationThresholds {
    fn default() -> Self {
        Self {
            underfill: 0.70,
            expand: 0.85,
            overflow: 0.95,
        }
    }
}

impl UtilizationThresholds {
    pub fn classify(&self, utilization: f64) -> UtilizationState {
        if utilization > self.overflow {
            UtilizationState::Overflowing
        } else if utilization < self.underfill {
            UtilizationState::Underfilled
        } else {
            UtilizationState::Balanced
        }
    }
}

/// Engine configuration loaded from environment variables.
/// Every variable is optional; missing ones take the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub thresholds: UtilizationThresholds,
    /// Upper bound on suggestions returned by any generator.
    pub max_suggestions: usize,
    pub rust_log: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: UtilizationThresholds::default(),
            max_suggestions: 5,
            rust_log: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Self::default();
        let config = EngineConfig {
            thresholds: UtilizationThresholds {
                underfill: optional_env("UNDERFILL_THRESHOLD", defaults.thresholds.underfill)?,
                expand: optional_env("EXPAND_THRESHOLD", defaults.thresholds.expand)?,
                overflow: optional_env("OVERFLOW_THRESHOLD", defaults.thresholds.overflow)?,
            },
            max_suggestions: optional_env("MAX_SUGGESTIONS", defaults.max_suggestions)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let t = &self.thresholds;
        if !(t.underfill > 0.0 && t.underfill <= t.expand && t.expand <= t.overflow) {
            return Err(EngineError::InvalidConfig(format!(
                "thresholds must satisfy 0 < underfill <= expand <= overflow, got {} / {} / {}",
                t.underfill, t.expand, t.overflow
            )));
        }
        if self.max_suggestions == 0 {
            return Err(EngineError::InvalidConfig(
                "MAX_SUGGESTIONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
