//! Space-constrained content selection.
//!
//! Given candidate topics and the physical layout of an output document, the
//! engine estimates how much text fits, selects topics and subtopics by
//! priority, and reports how well the selection uses the page.
//!
//! - [`space::SpaceCalculationService`]: budgets, estimates, allocation
//! - [`utilization::ContentUtilizationService`]: analysis, expansion and reduction
//! - [`similarity`]: edit-distance title similarity
//! - [`state::SpaceEngine`]: both services wired from one [`config::EngineConfig`]

pub mod config;
pub mod errors;
pub mod models;
pub mod similarity;
pub mod space;
pub mod state;
pub mod telemetry;
pub mod utilization;

pub use config::{EngineConfig, UtilizationThresholds};
pub use errors::EngineError;
pub use space::SpaceCalculationService;
pub use state::SpaceEngine;
pub use utilization::ContentUtilizationService;
