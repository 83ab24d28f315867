// Frame orchestrator - per-frame driver for landmark detection, sampling,
// throttled classification and telemetry

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::classifier_client::Classifier;
use super::config::RecognizerConfig;
use super::geometry::LandmarkGeometry;
use super::region_sampler::RegionSampler;
use super::tensor::{NormalizedTensor, TensorNormalizer};
use super::throttle::ClassificationThrottler;
use crate::models::classification::{
    ClassificationOutcome, Prediction, Recognition, RecognizerError, RecognizerResult, Telemetry,
};
use crate::models::frame::RawFrame;
use crate::models::landmarks::HandLandmarkSet;
use crate::platform::tracker::HandTracker;

// ==============================================================================
// Listener
// ==============================================================================

/// Receives accepted classifications and telemetry updates
pub trait RecognitionListener: Send {
    /// Called exactly once per accepted classification
    fn on_letter_recognized(&mut self, label: &str, confidence: f32);

    /// Full record of an accepted classification, right after `on_letter_recognized`
    fn on_recognition(&mut self, _recognition: &Recognition) {}

    /// Called after every frame processed while running
    fn on_telemetry(&mut self, _telemetry: Telemetry) {}

    /// Called each time a frames-per-second window closes
    fn on_frame_rate(&mut self, _fps: u32) {}
}

impl<F> RecognitionListener for F
where
    F: FnMut(&str, f32) + Send,
{
    fn on_letter_recognized(&mut self, label: &str, confidence: f32) {
        self(label, confidence)
    }
}

// ==============================================================================
// Session State
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifecycle {
    Idle,
    Running,
    Stopped,
}

/// Rolling frame count over a fixed window
#[derive(Debug, Clone)]
pub struct FrameRateCounter {
    window: Duration,
    frames: u32,
    window_start: Option<Instant>,
    fps: u32,
}

impl FrameRateCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            frames: 0,
            window_start: None,
            fps: 0,
        }
    }

    /// Count one frame; returns the published rate when the window closes
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        if now.saturating_duration_since(start) >= self.window {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = Some(now);
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.frames = 0;
        self.window_start = None;
        self.fps = 0;
    }

    /// Last published rate
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frames_in_window(&self) -> u32 {
        self.frames
    }
}

/// Everything that survives from one frame to the next
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub hand_detected: bool,
    pub throttle: ClassificationThrottler,
    pub frame_rate: FrameRateCounter,
    pub request_in_flight: bool,
    pub frames_processed: u64,
}

impl SessionState {
    pub fn new(config: &RecognizerConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            hand_detected: false,
            throttle: ClassificationThrottler::new(config.throttle_interval()),
            frame_rate: FrameRateCounter::new(config.fps_window()),
            request_in_flight: false,
            frames_processed: 0,
        }
    }

    fn reset(&mut self) {
        self.session_id = Uuid::new_v4();
        self.hand_detected = false;
        self.throttle.reset();
        self.frame_rate.reset();
        self.request_in_flight = false;
        self.frames_processed = 0;
    }
}

/// Result of a classification request, delivered back to the frame loop
#[derive(Debug)]
struct CompletedRequest {
    requested_at: Instant,
    result: RecognizerResult<Prediction>,
}

// ==============================================================================
// Frame Orchestrator
// ==============================================================================

/// Drives one camera session.
///
/// Frames and classification results are handled on the caller's task, one
/// at a time, so session state needs no locking. Classification requests run
/// on spawned tokio tasks; `process_frame` must be called inside a runtime.
pub struct FrameOrchestrator<T: HandTracker, L: RecognitionListener> {
    tracker: T,
    classifier: Arc<dyn Classifier>,
    listener: L,
    geometry: LandmarkGeometry,
    sampler: RegionSampler,
    normalizer: TensorNormalizer,
    confidence_threshold: f32,
    lifecycle: SessionLifecycle,
    state: SessionState,
    last_recognition: Option<Recognition>,
    completed_tx: mpsc::UnboundedSender<CompletedRequest>,
    completed_rx: mpsc::UnboundedReceiver<CompletedRequest>,
}

impl<T: HandTracker, L: RecognitionListener> FrameOrchestrator<T, L> {
    pub fn new(
        config: &RecognizerConfig,
        tracker: T,
        classifier: Arc<dyn Classifier>,
        listener: L,
    ) -> Self {
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();

        Self {
            tracker,
            classifier,
            listener,
            geometry: LandmarkGeometry::new(config.padding_ratio),
            sampler: RegionSampler::new(config.background_color),
            normalizer: TensorNormalizer,
            confidence_threshold: config.confidence_threshold,
            lifecycle: SessionLifecycle::Idle,
            state: SessionState::new(config),
            last_recognition: None,
            completed_tx,
            completed_rx,
        }
    }

    /// Begin the session (Idle -> Running)
    pub fn start(&mut self) -> RecognizerResult<()> {
        match self.lifecycle {
            SessionLifecycle::Running => return Err(RecognizerError::AlreadyRunning),
            SessionLifecycle::Stopped => return Err(RecognizerError::NotRunning),
            SessionLifecycle::Idle => {}
        }

        if !self.tracker.is_initialized() {
            let err = RecognizerError::InitializationFailure(format!(
                "hand tracker not ready: {}",
                self.tracker.get_model_info()
            ));
            warn!(error = %err, "session start failed");
            return Err(err);
        }

        self.state.reset();
        self.lifecycle = SessionLifecycle::Running;

        info!(
            session_id = %self.state.session_id,
            tracker = %self.tracker.get_model_info(),
            "recognition session started"
        );
        Ok(())
    }

    /// End the session (Running -> Stopped). Results of requests still in
    /// flight are discarded when they arrive.
    pub fn stop(&mut self) {
        if self.lifecycle != SessionLifecycle::Running {
            return;
        }

        self.lifecycle = SessionLifecycle::Stopped;
        info!(
            session_id = %self.state.session_id,
            frames = self.state.frames_processed,
            request_in_flight = self.state.request_in_flight,
            "recognition session stopped"
        );
    }

    /// Process one delivered frame
    pub fn process_frame(&mut self, frame: &RawFrame, now: Instant) -> Telemetry {
        self.drain_completed();

        if self.lifecycle != SessionLifecycle::Running {
            return self.telemetry();
        }

        self.state.frames_processed += 1;

        let detection = match self.tracker.detect(frame) {
            Ok(detection) => detection,
            Err(e) => {
                warn!(session_id = %self.state.session_id, error = %e, "hand detection failed");
                None
            }
        };

        self.state.hand_detected = detection.is_some();
        if let Some(hand) = detection {
            self.handle_hand(frame, &hand, now);
        }

        if let Some(fps) = self.state.frame_rate.tick(now) {
            debug!(session_id = %self.state.session_id, fps, "frame rate");
            self.listener.on_frame_rate(fps);
        }

        let telemetry = self.telemetry();
        self.listener.on_telemetry(telemetry);
        telemetry
    }

    /// Drive the session from a frame channel until it closes, then wait
    /// for any outstanding request and stop.
    pub async fn run(&mut self, mut frames: mpsc::Receiver<RawFrame>) {
        loop {
            tokio::select! {
                frame = frames.recv() => match frame {
                    Some(frame) => {
                        self.process_frame(&frame, Instant::now());
                    }
                    None => break,
                },
                Some(completed) = self.completed_rx.recv() => {
                    self.apply_completion(completed);
                }
            }
        }

        self.wait_for_pending().await;
        self.stop();
    }

    /// Wait for the outstanding classification request, if any, and apply it
    pub async fn wait_for_pending(&mut self) {
        if !self.state.request_in_flight {
            return;
        }
        if let Some(completed) = self.completed_rx.recv().await {
            self.apply_completion(completed);
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            hand_detected: self.state.hand_detected,
            fps: self.state.frame_rate.fps(),
        }
    }

    pub fn lifecycle(&self) -> SessionLifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn last_recognition(&self) -> Option<&Recognition> {
        self.last_recognition.as_ref()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    fn handle_hand(&mut self, frame: &RawFrame, hand: &HandLandmarkSet, now: Instant) {
        let tensor = match self.prepare_tensor(frame, hand) {
            Ok(tensor) => tensor,
            Err(e) => {
                warn!(session_id = %self.state.session_id, error = %e, "could not sample hand region");
                return;
            }
        };

        if self.state.request_in_flight || !self.state.throttle.is_allowed(now) {
            return;
        }

        self.dispatch(tensor, now);
    }

    fn prepare_tensor(&self, frame: &RawFrame, hand: &HandLandmarkSet) -> RecognizerResult<NormalizedTensor> {
        let region = self.geometry.hand_region(hand, frame.width, frame.height)?;
        let sampled = self.sampler.sample(frame, &region)?;
        Ok(self.normalizer.normalize(&sampled))
    }

    fn dispatch(&mut self, tensor: NormalizedTensor, requested_at: Instant) {
        self.state.request_in_flight = true;
        debug!(session_id = %self.state.session_id, "requesting classification");

        let classifier = self.classifier.clone();
        let completed_tx = self.completed_tx.clone();
        tokio::spawn(async move {
            let result = classifier.classify(&tensor).await;
            // The receiver lives as long as the orchestrator
            let _ = completed_tx.send(CompletedRequest { requested_at, result });
        });
    }

    fn drain_completed(&mut self) {
        while let Ok(completed) = self.completed_rx.try_recv() {
            self.apply_completion(completed);
        }
    }

    fn apply_completion(&mut self, completed: CompletedRequest) {
        self.state.request_in_flight = false;

        if self.lifecycle != SessionLifecycle::Running {
            debug!(session_id = %self.state.session_id, "discarding result for stopped session");
            return;
        }

        let prediction = match completed.result {
            Ok(prediction) => prediction,
            Err(RecognizerError::ServiceError(message)) => {
                warn!(session_id = %self.state.session_id, %message, "classifier reported an error");
                return;
            }
            Err(e) => {
                warn!(session_id = %self.state.session_id, error = %e, "classification request failed");
                return;
            }
        };

        match ClassificationOutcome::judge(prediction, self.confidence_threshold) {
            ClassificationOutcome::Accepted(prediction) => {
                self.state.throttle.record_accepted(completed.requested_at);
                info!(
                    session_id = %self.state.session_id,
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    "letter recognized"
                );
                self.listener
                    .on_letter_recognized(&prediction.label, prediction.confidence);

                let recognition = Recognition {
                    label: prediction.label,
                    confidence: prediction.confidence,
                    recognized_at: Utc::now(),
                };
                self.listener.on_recognition(&recognition);
                self.last_recognition = Some(recognition);
            }
            ClassificationOutcome::LowConfidence(prediction) => {
                debug!(
                    session_id = %self.state.session_id,
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    "prediction below confidence threshold"
                );
            }
        }
    }
}
