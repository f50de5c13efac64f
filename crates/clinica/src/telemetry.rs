use crate::config::{AppEnvironment, TelemetryConfig};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolves the filter: `RUST_LOG` wins, the configured level is the fallback.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
                value: config.log_level.clone(),
                source,
            })
        }
    }
}

/// Installs the global subscriber. Colors are only emitted during local development.
pub fn init(config: &TelemetryConfig, environment: AppEnvironment) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(environment != AppEnvironment::Production)
        .compact()
        .with_ansi(environment == AppEnvironment::Development)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
