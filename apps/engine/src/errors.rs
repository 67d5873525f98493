use thiserror::Error;

/// Engine-level error type.
///
/// Only the edges are fallible: building constraints, validating a reference
/// analysis, and loading configuration. Allocation and analysis never fail.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid space constraints: {0}")]
    InvalidConstraints(String),

    #[error("Invalid reference analysis: {0}")]
    InvalidReference(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl EngineError {
    /// Stable machine-readable code for the calling layer's error surface.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidConstraints(_) => "INVALID_CONSTRAINTS",
            EngineError::InvalidReference(_) => "INVALID_REFERENCE",
            EngineError::InvalidConfig(_) | EngineError::Config(_) => "CONFIG_ERROR",
        }
    }
}
