//! Per-session ingestion, window processing and scheduling

use crate::{now_ms, EngineConfig, ForecastPublisher, FpsMeter};
use attention_tracker::{AttentionSample, AttentionStats, AttentionTracker, TrackerConfig};
use classifier::{Classifier, EmotionState};
use frame_buffer::{crop_rgb, prepare_patch, CropBox, FaceBoxStabilizer, FrameBuffer};
use image::RgbImage;
use inference::mock::{
    ConstantLiveness, ConstantStress, MockFaceDetector, MockLandmarkEstimator, MockWaveformOracle,
};
use inference::{
    with_timeout, BoundingBox, FaceDetector, LandmarkEstimator, LivenessOracle, ModelVariant,
    StressEstimator, WaveformOracle,
};
use signal_pipeline::{ForecastRecord, PipelineError, SignalPipeline, WindowContext, WindowOutput};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Stress used when the estimator fails
const DEFAULT_STRESS: f64 = 0.5;

/// The five models a session consults
#[derive(Clone)]
pub struct SessionOracles {
    pub face_detector: Arc<dyn FaceDetector>,
    pub landmarks: Arc<dyn LandmarkEstimator>,
    pub waveform: Arc<dyn WaveformOracle>,
    pub liveness: Arc<dyn LivenessOracle>,
    pub stress: Arc<dyn StressEstimator>,
}

impl SessionOracles {
    /// Deterministic stand-ins from `inference::mock`
    pub fn mock() -> Self {
        Self {
            face_detector: Arc::new(MockFaceDetector::new()),
            landmarks: Arc::new(MockLandmarkEstimator::default()),
            waveform: Arc::new(MockWaveformOracle::new()),
            liveness: Arc::new(ConstantLiveness::default()),
            stress: Arc::new(ConstantStress::default()),
        }
    }
}

/// What ingestion made of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Face found; patch appended
    Face,
    /// No usable face; absent attention sample only
    NoFace,
}

/// Result of one window
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window_start_ms: i64,
    pub window_end_ms: i64,
    pub fps: u32,
    pub attention: AttentionStats,
    /// `None` when the window yielded no record
    pub record: Option<ForecastRecord>,
    pub published: bool,
    /// `None` when classification was gated off
    pub emotion: Option<EmotionState>,
}

struct Buffers {
    frames: RwLock<FrameBuffer>,
    attention: RwLock<AttentionTracker>,
    fps: RwLock<FpsMeter>,
    face_box: Mutex<FaceBoxStabilizer>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Crop used for the patch; the centered square when the stable box is empty
fn patch_crop(stable: CropBox, width: u32, height: u32) -> CropBox {
    if stable.is_empty() {
        CropBox::max_center_square(width, height)
    } else {
        stable
    }
}

/// One monitored subject
pub struct Session {
    config: EngineConfig,
    user_id: String,
    company_id: String,
    topic: String,
    buffers: Buffers,
    face_detector: Arc<dyn FaceDetector>,
    landmarks: Arc<dyn LandmarkEstimator>,
    stress: Arc<dyn StressEstimator>,
    pipeline: SignalPipeline,
    classifier: Classifier,
    publisher: Arc<dyn ForecastPublisher>,
    emotion_tx: watch::Sender<EmotionState>,
    model_loaded: AtomicBool,
}

impl Session {
    pub fn new(config: EngineConfig, oracles: SessionOracles, publisher: Arc<dyn ForecastPublisher>) -> Self {
        Self::started_at(config, oracles, publisher, now_ms())
    }

    /// Session whose identity fallback uses `start_ms`
    pub fn started_at(
        config: EngineConfig,
        oracles: SessionOracles,
        publisher: Arc<dyn ForecastPublisher>,
        start_ms: i64,
    ) -> Self {
        let user_id = if config.session.user_id.is_empty() {
            format!("session_{}", start_ms)
        } else {
            config.session.user_id.clone()
        };
        let company_id = if config.session.company_id.is_empty() {
            "unknown_company".to_string()
        } else {
            config.session.company_id.clone()
        };
        let topic = format!("{}/{}", config.session.topic_prefix, company_id);

        let capacity = config.buffer_capacity();
        info!(
            "Starting session {} ({}): buffers hold {} frames, publishing to {}",
            user_id, company_id, capacity, topic
        );

        let buffers = Buffers {
            frames: RwLock::new(FrameBuffer::new(capacity)),
            attention: RwLock::new(AttentionTracker::new(TrackerConfig { capacity })),
            fps: RwLock::new(FpsMeter::new()),
            face_box: Mutex::new(FaceBoxStabilizer::new(config.session.face_box_delta_rate)),
        };
        let pipeline = SignalPipeline::new(config.pipeline.clone(), oracles.waveform, oracles.liveness);
        let (emotion_tx, _) = watch::channel(EmotionState::Unknown);

        Self {
            classifier: Classifier::new(config.classifier.clone()),
            config,
            user_id,
            company_id,
            topic,
            buffers,
            face_detector: oracles.face_detector,
            landmarks: oracles.landmarks,
            stress: oracles.stress,
            pipeline,
            publisher,
            emotion_tx,
            model_loaded: AtomicBool::new(false),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    /// Publish topic for this session's records
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Subscribe to emotion updates
    pub fn emotion(&self) -> watch::Receiver<EmotionState> {
        self.emotion_tx.subscribe()
    }

    /// Last dispatched emotion state
    pub fn current_emotion(&self) -> EmotionState {
        *self.emotion_tx.borrow()
    }

    pub fn frame_count(&self) -> usize {
        read(&self.buffers.frames).len()
    }

    /// Attention samples currently held
    pub fn attention_samples(&self) -> Vec<AttentionSample> {
        read(&self.buffers.attention).query(i64::MIN, i64::MAX)
    }

    fn oracle_timeout(&self) -> Duration {
        self.config.pipeline.oracle_timeout()
    }

    /// Process one camera frame
    pub async fn ingest(&self, frame: &RgbImage, at_ms: i64) -> IngestOutcome {
        write(&self.buffers.fps).log(at_ms);

        let Some(crop) = self.detect(frame).await else {
            self.append_absent(at_ms);
            return IngestOutcome::NoFace;
        };

        let face_crop = match crop_rgb(frame, crop) {
            Ok(face_crop) => face_crop,
            Err(e) => {
                debug!("Discarding face crop: {}", e);
                self.append_absent(at_ms);
                return IngestOutcome::NoFace;
            }
        };

        match with_timeout(self.oracle_timeout(), self.landmarks.estimate_landmarks(&face_crop)).await {
            Ok(estimate) if estimate.face_present && estimate.yaw_degrees.is_finite() => {
                write(&self.buffers.attention).append(AttentionSample::present(at_ms, estimate.yaw_degrees));
            }
            Ok(_) => self.append_absent(at_ms),
            Err(e) => {
                warn!("Landmark estimation failed: {}", e);
                metrics::counter!("vppg_oracle_failures_total", "oracle" => "landmarks").increment(1);
                self.append_absent(at_ms);
            }
        }

        match prepare_patch(frame, crop, self.config.session.patch_dim) {
            Ok(patch) => {
                let fill = {
                    let mut frames = write(&self.buffers.frames);
                    frames.append(patch, at_ms);
                    frames.fill_ratio()
                };
                metrics::counter!("vppg_frames_ingested_total").increment(1);
                metrics::gauge!("vppg_frame_buffer_fill").set(fill);
            }
            Err(e) => warn!("Patch preparation failed: {}", e),
        }

        IngestOutcome::Face
    }

    /// Stabilized crop around a confident face; resets the stable box when
    /// the frame has none
    async fn detect(&self, frame: &RgbImage) -> Option<CropBox> {
        let (width, height) = frame.dimensions();
        let face = self.detect_face(frame).await;

        let mut stabilizer = lock(&self.buffers.face_box);
        match face {
            Some(face) => Some(patch_crop(stabilizer.update(face, width, height), width, height)),
            None => {
                stabilizer.reset();
                None
            }
        }
    }

    /// Confident, non-empty face box
    async fn detect_face(&self, frame: &RgbImage) -> Option<CropBox> {
        let detection = with_timeout(self.oracle_timeout(), self.face_detector.detect_face(frame)).await;
        let bbox: BoundingBox = match detection {
            Ok(Some(bbox)) => bbox,
            Ok(None) => return None,
            Err(e) => {
                warn!("Face detection failed: {}", e);
                metrics::counter!("vppg_oracle_failures_total", "oracle" => "face").increment(1);
                return None;
            }
        };

        if bbox.confidence < self.config.session.face_confidence {
            debug!(confidence = bbox.confidence, "Face below confidence threshold");
            return None;
        }
        let crop = bbox.to_crop(frame.width(), frame.height());
        (!crop.is_empty()).then_some(crop)
    }

    fn append_absent(&self, at_ms: i64) {
        let mut tracker = write(&self.buffers.attention);
        let carried = tracker.newest_yaw();
        tracker.append(AttentionSample::absent(at_ms, carried));
    }

    /// Process the window ending `window_lag_ms` before `now_ms`
    pub async fn run_window(&self, now_ms: i64) -> WindowReport {
        let end_ms = now_ms - self.config.session.window_lag_ms;
        let start_ms = end_ms - self.pipeline.config().window_ms();

        let fps = read(&self.buffers.fps).fps(start_ms, end_ms);
        self.ensure_model_loaded(fps).await;

        let samples = read(&self.buffers.attention).query(start_ms, end_ms);
        let attention = AttentionStats::from_samples(&samples);
        let frames = read(&self.buffers.frames).slice_since(start_ms);

        metrics::counter!("vppg_windows_total").increment(1);
        debug!(start_ms, end_ms, fps, frames = frames.len(), "Running window");

        let mut report = WindowReport {
            window_start_ms: start_ms,
            window_end_ms: end_ms,
            fps,
            attention,
            record: None,
            published: false,
            emotion: None,
        };

        let context = WindowContext {
            window_end_ms: end_ms,
            processed_fps: fps,
            attention,
            user_id: self.user_id.clone(),
            company_id: self.company_id.clone(),
        };
        let output = match self.pipeline.process_window(&frames, context).await {
            Ok(output) => output,
            Err(PipelineError::NoFrames) => {
                debug!("No frames since {}", start_ms);
                return report;
            }
            Err(e) => {
                if matches!(e, PipelineError::Oracle(_)) {
                    metrics::counter!("vppg_oracle_failures_total", "oracle" => "waveform").increment(1);
                }
                warn!("Window ending {} produced no record: {}", end_ms, e);
                return report;
            }
        };

        match self.publisher.publish(&self.topic, &output.record).await {
            Ok(()) => report.published = true,
            Err(e) => warn!("Dropping record for window ending {}: {}", end_ms, e),
        }

        report.emotion = self.dispatch_emotion(&output, fps).await;
        info!(
            fps,
            samples = output.record.waveform.len(),
            liveness = output.record.liveness_score,
            attention = output.record.attention_score,
            emotion = ?report.emotion,
            "Window complete"
        );
        report.record = Some(output.record);
        report
    }

    /// Pick the model variant on the first window with a measured rate
    async fn ensure_model_loaded(&self, fps: u32) {
        if fps == 0 || self.model_loaded.load(Ordering::Acquire) {
            return;
        }
        let variant = ModelVariant::for_fps(fps);
        match with_timeout(self.oracle_timeout(), self.pipeline.waveform_oracle().load(variant)).await {
            Ok(()) => {
                info!("Loaded {} model for {} fps", variant.as_str(), fps);
                self.model_loaded.store(true, Ordering::Release);
            }
            Err(e) => warn!("Loading {} failed, retrying next window: {}", variant.as_str(), e),
        }
    }

    /// Classify and broadcast when rate and waveform length allow it
    async fn dispatch_emotion(&self, output: &WindowOutput, fps: u32) -> Option<EmotionState> {
        let gate = &self.config.session;
        let required = fps as usize * gate.min_waveform_secs as usize;
        let record = &output.record;
        if fps <= gate.min_fps || record.waveform.len() < required {
            debug!(
                fps,
                samples = record.waveform.len(),
                required,
                "Skipping classification"
            );
            return None;
        }

        let stress = match with_timeout(
            self.oracle_timeout(),
            self.stress.estimate_stress(&record.waveform, output.sample_rate_hz),
        )
        .await
        {
            Ok(stress) if stress.is_finite() => stress,
            Ok(stress) => {
                warn!("Stress estimator returned {}", stress);
                DEFAULT_STRESS
            }
            Err(e) => {
                warn!("Stress estimation failed: {}", e);
                metrics::counter!("vppg_oracle_failures_total", "oracle" => "stress").increment(1);
                DEFAULT_STRESS
            }
        };

        let state = self
            .classifier
            .classify(stress, record.attention_score, record.present_fraction);
        self.emotion_tx.send_replace(state);
        Some(state)
    }

    /// Run windows every `window_secs` until the handle is stopped.
    ///
    /// A tick that fires while the previous window is still running is
    /// dropped.
    pub fn spawn(self: Arc<Self>) -> SessionHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let period = Duration::from_secs(self.pipeline.config().window_secs.max(1));

        let join = tokio::spawn(async move {
            info!("Starting window scheduler every {:?}", period);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut in_flight: Option<JoinHandle<WindowReport>> = None;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if in_flight.as_ref().is_some_and(|task| !task.is_finished()) {
                            warn!("Window still running, dropping tick");
                            metrics::counter!("vppg_ticks_dropped_total").increment(1);
                            continue;
                        }
                        let session = Arc::clone(&self);
                        in_flight = Some(tokio::spawn(async move { session.run_window(now_ms()).await }));
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            if let Some(task) = in_flight {
                if let Err(e) = task.await {
                    error!("Window task failed: {}", e);
                }
            }
            info!("Window scheduler stopped");
        });

        SessionHandle { shutdown_tx, join }
    }
}

/// Running scheduler
pub struct SessionHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SessionHandle {
    /// Cancel the timer and wait for any in-flight window
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            error!("Window scheduler failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticCamera;
    use crate::{ChannelPublisher, PublishedRecord};
    use async_trait::async_trait;
    use inference::mock::FailingOracle;
    use inference::{FrameBatch, OracleResult};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    const T0: i64 = 1_700_000_000_000;

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.session.user_id = "driver-7".into();
        config.session.company_id = "acme".into();
        config
    }

    fn session_with(config: EngineConfig, oracles: SessionOracles) -> (Session, mpsc::Receiver<PublishedRecord>) {
        let (publisher, rx) = ChannelPublisher::channel(8);
        (Session::started_at(config, oracles, Arc::new(publisher), T0), rx)
    }

    async fn feed(session: &Session, fps: u32, secs: u32) {
        let camera = SyntheticCamera::new(64, 48, fps, 1.2, T0);
        for (frame, at_ms) in camera.take((fps * secs) as usize) {
            session.ingest(&frame, at_ms).await;
        }
    }

    fn frame() -> RgbImage {
        RgbImage::from_pixel(64, 48, image::Rgb([150, 110, 95]))
    }

    #[tokio::test]
    async fn test_ingest_face() {
        let (session, _rx) = session_with(config(), SessionOracles::mock());
        assert_eq!(session.ingest(&frame(), T0).await, IngestOutcome::Face);
        assert_eq!(session.frame_count(), 1);
        let samples = session.attention_samples();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].face_present);
        assert!((samples[0].yaw_degrees - 90.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ingest_without_face() {
        let oracles = SessionOracles {
            face_detector: Arc::new(MockFaceDetector::absent()),
            ..SessionOracles::mock()
        };
        let (session, _rx) = session_with(config(), oracles);
        session.ingest(&frame(), T0).await;
        assert_eq!(session.ingest(&frame(), T0 + 33).await, IngestOutcome::NoFace);
        assert_eq!(session.frame_count(), 0);
        let samples = session.attention_samples();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| !s.face_present));
    }

    #[tokio::test]
    async fn test_low_confidence_face_ignored() {
        let oracles = SessionOracles {
            face_detector: Arc::new(MockFaceDetector::with_confidence(0.3)),
            ..SessionOracles::mock()
        };
        let (session, _rx) = session_with(config(), oracles);
        assert_eq!(session.ingest(&frame(), T0).await, IngestOutcome::NoFace);
        assert_eq!(session.frame_count(), 0);
    }

    /// Detector that sees one face, then fails
    struct FlakyDetector {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FaceDetector for FlakyDetector {
        async fn detect_face(&self, frame: &RgbImage) -> OracleResult<Option<BoundingBox>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                MockFaceDetector::new().detect_face(frame).await
            } else {
                FailingOracle.detect_face(frame).await
            }
        }
    }

    #[tokio::test]
    async fn test_detector_failure_carries_yaw() {
        let oracles = SessionOracles {
            face_detector: Arc::new(FlakyDetector { calls: AtomicUsize::new(0) }),
            landmarks: Arc::new(MockLandmarkEstimator::new(72.0)),
            ..SessionOracles::mock()
        };
        let (session, _rx) = session_with(config(), oracles);
        assert_eq!(session.ingest(&frame(), T0).await, IngestOutcome::Face);
        assert_eq!(session.ingest(&frame(), T0 + 33).await, IngestOutcome::NoFace);

        let samples = session.attention_samples();
        assert_eq!(samples.len(), 2);
        assert!(!samples[1].face_present);
        assert!((samples[1].yaw_degrees - 72.0).abs() < 1e-9);
        assert_eq!(session.frame_count(), 1);
    }

    /// Detector whose box shifts a few pixels every frame; `None` on frame 4
    struct JitterDetector {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FaceDetector for JitterDetector {
        async fn detect_face(&self, _frame: &RgbImage) -> OracleResult<Option<BoundingBox>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 4 {
                return Ok(None);
            }
            let shift = [0.0, 3.0, -2.0, 4.0, 0.0, 5.0][call % 6];
            Ok(Some(BoundingBox {
                x: 20.0 + shift,
                y: 10.0 - shift,
                width: 30.0,
                height: 30.0,
                confidence: 0.9,
            }))
        }
    }

    /// Records the origin and size of every crop it sees
    #[derive(Default)]
    struct CropRecorder {
        crops: std::sync::Mutex<Vec<(u8, u8, u32, u32)>>,
    }

    #[async_trait]
    impl LandmarkEstimator for CropRecorder {
        async fn estimate_landmarks(&self, face_crop: &RgbImage) -> OracleResult<inference::LandmarkEstimate> {
            let origin = face_crop.get_pixel(0, 0);
            lock(&self.crops).push((origin[0], origin[1], face_crop.width(), face_crop.height()));
            MockLandmarkEstimator::default().estimate_landmarks(face_crop).await
        }
    }

    #[tokio::test]
    async fn test_jittering_face_keeps_stable_crop() {
        let recorder = Arc::new(CropRecorder::default());
        let oracles = SessionOracles {
            face_detector: Arc::new(JitterDetector { calls: AtomicUsize::new(0) }),
            landmarks: recorder.clone(),
            ..SessionOracles::mock()
        };
        let (session, _rx) = session_with(config(), oracles);
        // Pixel colour encodes its position
        let frame = RgbImage::from_fn(64, 48, |x, y| image::Rgb([x as u8, y as u8, 0]));

        let mut outcomes = Vec::new();
        for i in 0..6 {
            outcomes.push(session.ingest(&frame, T0 + i * 33).await);
        }
        assert_eq!(outcomes[4], IngestOutcome::NoFace);
        assert_eq!(session.frame_count(), 5);

        let crops = lock(&recorder.crops).clone();
        assert_eq!(crops.len(), 5);
        // Face at (20,10)-(50,40) padded by 3 px
        assert_eq!(crops[0], (17, 7, 36, 36));
        assert_eq!(crops[1], crops[0]);
        assert_eq!(crops[2], crops[0]);
        // Right edge at 54 leaves the stable box
        assert_eq!(crops[3], (18, 6, 36, 36));
        // After the miss the next face starts a fresh padded box
        assert_eq!(crops[4], (22, 2, 36, 36));
    }

    #[test]
    fn test_empty_stable_box_uses_center_square() {
        assert_eq!(
            patch_crop(CropBox::new(10, 10, 10, 30), 64, 48),
            CropBox::new(8, 0, 56, 48)
        );
        let stable = CropBox::new(17, 7, 53, 43);
        assert_eq!(patch_crop(stable, 64, 48), stable);
    }

    #[tokio::test]
    async fn test_landmark_failure_keeps_patch() {
        let oracles = SessionOracles {
            landmarks: Arc::new(FailingOracle),
            ..SessionOracles::mock()
        };
        let (session, _rx) = session_with(config(), oracles);
        assert_eq!(session.ingest(&frame(), T0).await, IngestOutcome::Face);
        assert_eq!(session.frame_count(), 1);
        assert!(!session.attention_samples()[0].face_present);
    }

    #[tokio::test]
    async fn test_full_window() {
        let waveform = Arc::new(MockWaveformOracle::new());
        let oracles = SessionOracles {
            waveform: waveform.clone(),
            ..SessionOracles::mock()
        };
        let (session, mut rx) = session_with(config(), oracles);
        let mut emotion = session.emotion();
        feed(&session, 30, 12).await;

        let report = session.run_window(T0 + 12_000).await;
        assert_eq!(report.window_start_ms, T0);
        assert_eq!(report.window_end_ms, T0 + 10_000);
        assert_eq!(report.fps, 30);
        assert_eq!(report.attention.present_fraction, 1.0);
        assert_eq!(report.attention.head_shake_count, 0);
        assert!(report.published);

        // 360 frames since the window start -> 350 usable
        let record = report.record.unwrap();
        assert_eq!(record.waveform.len(), 350);
        assert_eq!(record.user_id, "driver-7");
        assert_eq!(record.timestamp_ms, T0 + 10_000);

        let published = rx.recv().await.unwrap();
        assert_eq!(published.topic, "vppg/forecast/acme");
        assert_eq!(published.record.waveform.len(), 350);

        assert_eq!(report.emotion, Some(EmotionState::Calm));
        assert!(emotion.has_changed().unwrap());
        assert_eq!(*emotion.borrow_and_update(), EmotionState::Calm);
        assert_eq!(waveform.loaded_variant(), Some(ModelVariant::Fps30));
    }

    #[tokio::test]
    async fn test_low_fps_publishes_without_classifying() {
        let (session, mut rx) = session_with(config(), SessionOracles::mock());
        feed(&session, 8, 12).await;

        let report = session.run_window(T0 + 12_000).await;
        assert_eq!(report.fps, 8);
        assert!(report.record.is_some());
        assert!(rx.recv().await.is_some());
        assert_eq!(report.emotion, None);
        assert_eq!(session.current_emotion(), EmotionState::Unknown);
    }

    #[tokio::test]
    async fn test_empty_window_has_no_record() {
        let (session, mut rx) = session_with(config(), SessionOracles::mock());
        let report = session.run_window(T0 + 12_000).await;
        assert!(report.record.is_none());
        assert!(!report.published);
        assert_eq!(report.fps, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_waveform_failure_skips_window() {
        let oracles = SessionOracles {
            waveform: Arc::new(FailingOracle),
            ..SessionOracles::mock()
        };
        let (session, mut rx) = session_with(config(), oracles);
        feed(&session, 30, 12).await;
        let report = session.run_window(T0 + 12_000).await;
        assert!(report.record.is_none());
        assert!(report.emotion.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stress_failure_defaults() {
        let oracles = SessionOracles {
            stress: Arc::new(FailingOracle),
            ..SessionOracles::mock()
        };
        let (session, _rx) = session_with(config(), oracles);
        feed(&session, 30, 12).await;
        // 0.5 is moderate stress, so an attentive subject reads calm
        let report = session.run_window(T0 + 12_000).await;
        assert_eq!(report.emotion, Some(EmotionState::Calm));
    }

    #[tokio::test]
    async fn test_identity_fallbacks() {
        let (session, _rx) = session_with(EngineConfig::default(), SessionOracles::mock());
        assert_eq!(session.user_id(), format!("session_{}", T0));
        assert_eq!(session.company_id(), "unknown_company");
        assert_eq!(session.topic(), "vppg/forecast/unknown_company");
    }

    /// Waveform oracle that takes longer than a window
    struct SlowWaveform {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WaveformOracle for SlowWaveform {
        async fn infer_waveform(&self, appearance: &FrameBatch, _motion: &FrameBatch) -> OracleResult<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2_500)).await;
            Ok((0..appearance.shape()[0]).map(|i| (i as f64 * 0.4).sin()).collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_drops_overlapping_ticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let oracles = SessionOracles {
            waveform: Arc::new(SlowWaveform { calls: calls.clone() }),
            ..SessionOracles::mock()
        };
        let mut config = config();
        config.pipeline.window_secs = 1;
        config.session.window_lag_ms = 0;
        let (session, _rx) = session_with(config, oracles);

        // Stamped on the wall clock so every window finds them
        let start = now_ms();
        for i in 0..51 {
            session.ingest(&frame(), start + i).await;
        }

        let handle = Arc::new(session).spawn();
        // Ticks at 1..5 s; the first run spans 1-3.5 s, the second 4-6.5 s
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        handle.stop().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stop_without_ticks() {
        let (session, _rx) = session_with(config(), SessionOracles::mock());
        let handle = Arc::new(session).spawn();
        handle.stop().await;
    }
}
