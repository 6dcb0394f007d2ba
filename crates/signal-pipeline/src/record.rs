//! Forecast Record

use serde::{Deserialize, Serialize};

/// Per-window result handed to the publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    pub user_id: String,
    pub company_id: String,
    /// Window end (unix ms)
    pub timestamp_ms: i64,
    /// Bandpass-filtered vPPG waveform
    pub waveform: Vec<f64>,
    pub processed_fps: u32,
    pub liveness_score: f64,
    pub present_fraction: f64,
    pub head_shake_count: u32,
    pub attention_score: f64,
}
