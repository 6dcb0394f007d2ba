//! vPPG Session Runtime
//!
//! Owns the per-session buffers and drives them:
//! - `Session::ingest`: one camera frame → frame buffer + attention tracker
//! - `Session::run_window`: one 10 s window → Forecast Record → emotion state
//! - `Session::spawn`: fixed-interval window scheduler with tick dropping

mod fps;
mod logging;
mod publish;
mod session;
mod settings;
pub mod synthetic;

pub use settings::{DemoConfig, EngineConfig, LoggingConfig, SessionConfig};
pub use fps::{FpsMeter, FPS_HISTORY};
pub use logging::init_logging;
pub use publish::{ChannelPublisher, ForecastPublisher, PublishedRecord};
pub use session::{IngestOutcome, Session, SessionHandle, SessionOracles, WindowReport};

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Session runtime errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}

/// Wall clock in unix milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
