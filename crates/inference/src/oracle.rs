//! Oracle traits

use crate::{BoundingBox, FrameBatch, LandmarkEstimate, ModelVariant, OracleResult};
use async_trait::async_trait;
use image::RgbImage;

/// Face box detection on a full camera frame
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Most confident face, if any
    async fn detect_face(&self, frame: &RgbImage) -> OracleResult<Option<BoundingBox>>;
}

/// Landmark/pose estimation on a face crop
#[async_trait]
pub trait LandmarkEstimator: Send + Sync {
    async fn estimate_landmarks(&self, face_crop: &RgbImage) -> OracleResult<LandmarkEstimate>;
}

/// vPPG waveform model
#[async_trait]
pub trait WaveformOracle: Send + Sync {
    /// Prepare the model for a capture rate
    async fn load(&self, _variant: ModelVariant) -> OracleResult<()> {
        Ok(())
    }

    /// One waveform value per frame of the batches
    async fn infer_waveform(&self, appearance: &FrameBatch, motion: &FrameBatch) -> OracleResult<Vec<f64>>;
}

/// Liveness ("zombie") model over a z-scored 128 Hz waveform
#[async_trait]
pub trait LivenessOracle: Send + Sync {
    async fn infer_liveness(&self, normalized: &[f64]) -> OracleResult<f64>;
}

/// Stress level in `[0, 1]` from a filtered waveform
#[async_trait]
pub trait StressEstimator: Send + Sync {
    async fn estimate_stress(&self, waveform: &[f64], sample_rate: f64) -> OracleResult<f64>;
}
