use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::space::SpaceCalculationService;
use crate::utilization::ContentUtilizationService;

/// Shared engine state: the configuration plus both services, built once.
///
/// Cloning is cheap; the services sit behind `Arc` and are immutable, so a
/// single engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct SpaceEngine {
    pub config: EngineConfig,
    pub space: Arc<SpaceCalculationService>,
    pub utilization: Arc<ContentUtilizationService>,
}

impl SpaceEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let space = Arc::new(SpaceCalculationService::new(&config));
        let utilization = Arc::new(ContentUtilizationService::new(Arc::clone(&space)));
        info!(
            underfill = config.thresholds.underfill,
            expand = config.thresholds.expand,
            overflow = config.thresholds.overflow,
            max_suggestions = config.max_suggestions,
            "space engine initialized"
        );

        Ok(Self {
            config,
            space,
            utilization,
        })
    }

    /// Loads `EngineConfig` from the environment (and `.env`) and builds the engine.
    pub fn from_env() -> Result<Self, EngineError> {
        Self::new(EngineConfig::from_env()?)
    }
}
