//! Window processing

use crate::normalize::build_branches;
use crate::score::attention_score;
use crate::{ForecastRecord, PipelineConfig, PipelineError};
use attention_tracker::AttentionStats;
use dsp::{resample, z_score};
use frame_buffer::FrameSample;
use inference::{with_timeout, LivenessOracle, WaveformOracle};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Liveness fallback when the oracle or its input fails
const DEFAULT_LIVENESS: f64 = 0.5;

/// Per-window inputs supplied by the window task
#[derive(Debug, Clone)]
pub struct WindowContext {
    /// Window end (unix ms)
    pub window_end_ms: i64,
    /// Measured capture rate
    pub processed_fps: u32,
    /// Tracker statistics over the same window
    pub attention: AttentionStats,
    pub user_id: String,
    pub company_id: String,
}

/// Record plus the native waveform rate
#[derive(Debug, Clone)]
pub struct WindowOutput {
    pub record: ForecastRecord,
    /// Samples per second of `record.waveform`
    pub sample_rate_hz: f64,
}

/// vPPG window processor
pub struct SignalPipeline {
    config: PipelineConfig,
    waveform: Arc<dyn WaveformOracle>,
    liveness: Arc<dyn LivenessOracle>,
}

impl SignalPipeline {
    pub fn new(
        config: PipelineConfig,
        waveform: Arc<dyn WaveformOracle>,
        liveness: Arc<dyn LivenessOracle>,
    ) -> Self {
        info!(
            "Creating signal pipeline: window={}s, depth={}",
            config.window_secs, config.temporal_depth
        );
        Self {
            config,
            waveform,
            liveness,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Waveform oracle shared with the window task
    pub fn waveform_oracle(&self) -> &Arc<dyn WaveformOracle> {
        &self.waveform
    }

    /// Process one window of frames into a record
    pub async fn process_window(
        &self,
        frames: &[Arc<FrameSample>],
        context: WindowContext,
    ) -> Result<WindowOutput, PipelineError> {
        let branches = build_branches(frames, self.config.temporal_depth)?;

        let raw = with_timeout(
            self.config.oracle_timeout(),
            self.waveform
                .infer_waveform(&branches.appearance, &branches.motion),
        )
        .await?;
        if raw.is_empty() || raw.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::EmptyWaveform);
        }

        let sample_rate_hz = raw.len() as f64 / self.config.window_secs.max(1) as f64;
        let filter = self.config.bandpass.design(sample_rate_hz)?;
        let waveform = filter.filtfilt(&raw);

        let liveness_score = self.liveness_score(&waveform, sample_rate_hz).await;
        let score = attention_score(
            context.attention.present_fraction,
            context.attention.head_shake_count,
        );

        debug!(
            samples = waveform.len(),
            rate = sample_rate_hz,
            liveness = liveness_score,
            attention = score,
            "Window processed"
        );

        Ok(WindowOutput {
            record: ForecastRecord {
                user_id: context.user_id,
                company_id: context.company_id,
                timestamp_ms: context.window_end_ms,
                waveform,
                processed_fps: context.processed_fps,
                liveness_score,
                present_fraction: context.attention.present_fraction,
                head_shake_count: context.attention.head_shake_count,
                attention_score: score,
            },
            sample_rate_hz,
        })
    }

    /// Liveness in `[0, 1]`; any failure gives 0.5
    async fn liveness_score(&self, filtered: &[f64], sample_rate_hz: f64) -> f64 {
        let resampled = match resample(filtered, sample_rate_hz, self.config.liveness_rate_hz) {
            Ok(resampled) => resampled,
            Err(e) => {
                warn!("Liveness resample failed: {}", e);
                return DEFAULT_LIVENESS;
            }
        };
        let normalized = z_score(&resampled);

        match with_timeout(
            self.config.oracle_timeout(),
            self.liveness.infer_liveness(&normalized),
        )
        .await
        {
            Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
            Ok(score) => {
                warn!("Liveness oracle returned {}", score);
                DEFAULT_LIVENESS
            }
            Err(e) => {
                warn!("Liveness oracle failed: {}", e);
                metrics::counter!("vppg_oracle_failures_total", "oracle" => "liveness").increment(1);
                DEFAULT_LIVENESS
            }
        }
    }
}
