use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;
use crate::errors::EngineError;

/// Installs the global structured-logging subscriber.
///
/// Meant for the embedding process; the engine itself only emits events.
/// `RUST_LOG` wins when set, otherwise `engine=<config.rust_log>` is used.
pub fn init_tracing(config: &EngineConfig) -> Result<(), EngineError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| EngineError::Config(anyhow::anyhow!("tracing already initialized: {e}")))
}
