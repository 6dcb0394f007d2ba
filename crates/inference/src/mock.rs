//! Mock oracles for development and tests

use crate::{
    BoundingBox, FaceDetector, FrameBatch, LandmarkEstimate, LandmarkEstimator, LivenessOracle,
    ModelVariant, OracleError, OracleResult, StressEstimator, WaveformOracle,
};
use async_trait::async_trait;
use attention_tracker::{FaceMesh, Landmark};
use image::RgbImage;
use ndarray::{s, Axis};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Detector returning a fixed box in the frame center
#[derive(Debug, Clone)]
pub struct MockFaceDetector {
    confidence: f32,
    face_visible: bool,
}

impl MockFaceDetector {
    pub fn new() -> Self {
        info!("Creating mock face detector");
        Self {
            confidence: 0.95,
            face_visible: true,
        }
    }

    /// Detector that never sees a face
    pub fn absent() -> Self {
        Self {
            face_visible: false,
            ..Self::new()
        }
    }

    /// Detector reporting a custom confidence
    pub fn with_confidence(confidence: f32) -> Self {
        Self {
            confidence,
            ..Self::new()
        }
    }
}

impl Default for MockFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FaceDetector for MockFaceDetector {
    async fn detect_face(&self, frame: &RgbImage) -> OracleResult<Option<BoundingBox>> {
        if !self.face_visible {
            return Ok(None);
        }
        let (w, h) = (frame.width() as f32, frame.height() as f32);
        Ok(Some(BoundingBox {
            x: w * 0.3,
            y: h * 0.2,
            width: w * 0.4,
            height: h * 0.5,
            confidence: self.confidence,
        }))
    }
}

/// Landmark estimator whose mesh always points at a fixed yaw
#[derive(Debug, Clone)]
pub struct MockLandmarkEstimator {
    yaw_degrees: f64,
}

impl MockLandmarkEstimator {
    pub fn new(yaw_degrees: f64) -> Self {
        Self { yaw_degrees }
    }

    /// 468-point mesh over the crop with the nose at `yaw_degrees` from the
    /// eye center
    pub fn mesh(&self, width: u32, height: u32) -> FaceMesh {
        let (w, h) = (width as f64, height as f64);
        let eye_y = h * 0.4;
        let reach = (w.min(h) * 0.25).max(1.0);
        let (sin, cos) = self.yaw_degrees.to_radians().sin_cos();

        let mut points = vec![Landmark::default(); 468];
        points[FaceMesh::RIGHT_EYE_OUTER] = Landmark::new(w * 0.3, eye_y, 0.0);
        points[FaceMesh::LEFT_EYE_OUTER] = Landmark::new(w * 0.7, eye_y, 0.0);
        points[FaceMesh::NOSE_TIP] = Landmark::new(w * 0.5 + reach * cos, eye_y + reach * sin, 0.0);
        FaceMesh::new(points)
    }
}

impl Default for MockLandmarkEstimator {
    /// Frontal pose
    fn default() -> Self {
        Self::new(90.0)
    }
}

#[async_trait]
impl LandmarkEstimator for MockLandmarkEstimator {
    async fn estimate_landmarks(&self, face_crop: &RgbImage) -> OracleResult<LandmarkEstimate> {
        let yaw_degrees = self
            .mesh(face_crop.width(), face_crop.height())
            .yaw()
            .map_err(|e| OracleError::InvalidInput(e.to_string()))?;
        Ok(LandmarkEstimate {
            yaw_degrees,
            face_present: true,
        })
    }
}

/// Waveform oracle returning the mean green channel of each appearance frame
#[derive(Debug, Default)]
pub struct MockWaveformOracle {
    loaded: RwLock<Option<ModelVariant>>,
}

impl MockWaveformOracle {
    pub fn new() -> Self {
        info!("Creating mock waveform oracle");
        Self::default()
    }

    /// Variant passed to the last `load`
    pub fn loaded_variant(&self) -> Option<ModelVariant> {
        *self.loaded.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WaveformOracle for MockWaveformOracle {
    async fn load(&self, variant: ModelVariant) -> OracleResult<()> {
        debug!("Mock mode: loading {}", variant.as_str());
        *self.loaded.write().unwrap_or_else(PoisonError::into_inner) = Some(variant);
        Ok(())
    }

    async fn infer_waveform(&self, appearance: &FrameBatch, motion: &FrameBatch) -> OracleResult<Vec<f64>> {
        if appearance.shape() != motion.shape() {
            return Err(OracleError::InvalidInput(format!(
                "appearance {:?} and motion {:?} differ",
                appearance.shape(),
                motion.shape()
            )));
        }
        Ok(appearance
            .slice(s![.., .., .., 1])
            .axis_iter(Axis(0))
            .map(|frame| frame.mean().map(f64::from).unwrap_or(0.0))
            .collect())
    }
}

/// Liveness oracle with a constant output
#[derive(Debug, Clone)]
pub struct ConstantLiveness(pub f64);

impl Default for ConstantLiveness {
    fn default() -> Self {
        Self(0.5)
    }
}

#[async_trait]
impl LivenessOracle for ConstantLiveness {
    async fn infer_liveness(&self, normalized: &[f64]) -> OracleResult<f64> {
        if normalized.is_empty() {
            return Err(OracleError::InvalidInput("empty waveform".into()));
        }
        Ok(self.0)
    }
}

/// Stress estimator with a constant output
#[derive(Debug, Clone)]
pub struct ConstantStress(pub f64);

impl Default for ConstantStress {
    fn default() -> Self {
        Self(0.5)
    }
}

#[async_trait]
impl StressEstimator for ConstantStress {
    async fn estimate_stress(&self, _waveform: &[f64], _sample_rate: f64) -> OracleResult<f64> {
        Ok(self.0)
    }
}

/// Oracle that fails every call
#[derive(Debug, Clone, Default)]
pub struct FailingOracle;

impl FailingOracle {
    fn error() -> OracleError {
        OracleError::Failed("mock failure".into())
    }
}

#[async_trait]
impl FaceDetector for FailingOracle {
    async fn detect_face(&self, _frame: &RgbImage) -> OracleResult<Option<BoundingBox>> {
        Err(Self::error())
    }
}

#[async_trait]
impl LandmarkEstimator for FailingOracle {
    async fn estimate_landmarks(&self, _face_crop: &RgbImage) -> OracleResult<LandmarkEstimate> {
        Err(Self::error())
    }
}

#[async_trait]
impl WaveformOracle for FailingOracle {
    async fn infer_waveform(&self, _appearance: &FrameBatch, _motion: &FrameBatch) -> OracleResult<Vec<f64>> {
        Err(Self::error())
    }
}

#[async_trait]
impl LivenessOracle for FailingOracle {
    async fn infer_liveness(&self, _normalized: &[f64]) -> OracleResult<f64> {
        Err(Self::error())
    }
}

#[async_trait]
impl StressEstimator for FailingOracle {
    async fn estimate_stress(&self, _waveform: &[f64], _sample_rate: f64) -> OracleResult<f64> {
        Err(Self::error())
    }
}
