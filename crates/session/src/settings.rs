//! Engine configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `VPPG_*` environment variables (`__` separates sections, e.g.
//! `VPPG_SESSION__CAPTURE_FPS=30`).

use crate::SessionError;
use classifier::ClassifierThresholds;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use signal_pipeline::PipelineConfig;
use std::path::Path;
use tracing::info;

/// Everything a session needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub session: SessionConfig,
    pub pipeline: PipelineConfig,
    pub classifier: ClassifierThresholds,
    pub logging: LoggingConfig,
    pub demo: DemoConfig,
}

/// Session identity, capture and window gating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Empty falls back to `session_<start_ms>`
    pub user_id: String,

    /// Empty falls back to `unknown_company`
    pub company_id: String,

    /// Records go to `{topic_prefix}/{company_id}`
    pub topic_prefix: String,

    /// Nominal capture rate; sizes the buffers
    pub capture_fps: u32,

    /// Window end trails the wall clock by this much (milliseconds)
    pub window_lag_ms: i64,

    /// Classification needs strictly more than this measured rate
    pub min_fps: u32,

    /// Classification needs `fps × min_waveform_secs` waveform samples
    pub min_waveform_secs: u32,

    /// Minimum face detector confidence
    pub face_confidence: f32,

    /// Patch side length in pixels
    pub patch_dim: u32,

    /// Padding ratio of the stabilized face box
    pub face_box_delta_rate: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            company_id: String::new(),
            topic_prefix: "vppg/forecast".to_string(),
            capture_fps: 40,
            window_lag_ms: 2000,
            min_fps: 10,
            min_waveform_secs: 6,
            face_confidence: 0.5,
            patch_dim: 36,
            face_box_delta_rate: frame_buffer::DEFAULT_DELTA_RATE,
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Line-delimited JSON instead of the human format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Synthetic run used by the `vppg-engine` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Windows to process before exiting
    pub windows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Simulated pulse (Hz)
    pub pulse_hz: f64,
    /// Drive the real scheduler on the wall clock instead of simulated time
    pub realtime: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            windows: 3,
            frame_width: 160,
            frame_height: 120,
            pulse_hz: 1.2,
            realtime: false,
        }
    }
}

impl EngineConfig {
    /// Defaults, then `path` (if given), then `VPPG_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let mut builder = Config::builder().add_source(Config::try_from(&EngineConfig::default())?);
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("VPPG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runtime cannot work with
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.session.capture_fps == 0 {
            return Err(SessionError::InvalidConfig("capture_fps must be positive".into()));
        }
        if self.pipeline.window_secs == 0 {
            return Err(SessionError::InvalidConfig("window_secs must be positive".into()));
        }
        if self.pipeline.temporal_depth == 0 {
            return Err(SessionError::InvalidConfig("temporal_depth must be positive".into()));
        }
        if self.session.patch_dim == 0 {
            return Err(SessionError::InvalidConfig("patch_dim must be positive".into()));
        }
        let rate = self.session.face_box_delta_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(SessionError::InvalidConfig("face_box_delta_rate must be a non-negative number".into()));
        }
        if self.session.window_lag_ms < 0 {
            return Err(SessionError::InvalidConfig("window_lag_ms must not be negative".into()));
        }
        Ok(())
    }

    /// Frame buffer and tracker capacity: one window of frames
    pub fn buffer_capacity(&self) -> usize {
        self.pipeline.window_secs as usize * self.session.capture_fps as usize
    }
}
