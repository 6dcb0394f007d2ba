//! Subscriber setup

use crate::{LoggingConfig, SessionError};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<(), SessionError> {
    let level = Level::from_str(&config.level)
        .map_err(|e| SessionError::Logging(format!("level '{}': {}", config.level, e)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| SessionError::Logging(e.to_string()))
}
