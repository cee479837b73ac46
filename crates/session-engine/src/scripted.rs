//! Scripted capture backend.
//!
//! Plays a fixed list of detector outputs, optionally forever, and can be
//! told to fail at any acquisition step. Every acquisition and release is
//! counted on a shared [`ScriptProbe`] so lifecycle behavior can be
//! asserted from outside the session.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kneecue_common::config::{CameraConstraints, DetectorOptions};
use kneecue_common::error::{KneecueError, KneecueResult};
use kneecue_pose_model::landmark::{DetectorOutput, POSE_LANDMARK_COUNT};
use kneecue_signal_core::skeleton::SkeletonOverlay;

use crate::backend::{CaptureBackend, FrameSource, LandmarkDetector, SkeletonRenderer, VideoFrame};

/// Frame spacing used when a script repeats.
const REPEAT_GAP_MS: f64 = 16.0;

/// Shared counters for everything a scripted backend hands out.
#[derive(Debug, Default)]
pub struct ScriptProbe {
    detector_loads: AtomicU64,
    cameras_opened: AtomicU64,
    cameras_released: AtomicU64,
    targets_attached: AtomicU64,
    detect_calls: AtomicU64,
    frames_drawn: AtomicU64,
    clears: AtomicU64,
    last_size: Mutex<Option<(u32, u32)>>,
}

impl ScriptProbe {
    pub fn detector_loads(&self) -> u64 {
        self.detector_loads.load(Ordering::SeqCst)
    }

    pub fn cameras_opened(&self) -> u64 {
        self.cameras_opened.load(Ordering::SeqCst)
    }

    pub fn cameras_released(&self) -> u64 {
        self.cameras_released.load(Ordering::SeqCst)
    }

    /// Cameras opened and not yet released.
    pub fn cameras_open(&self) -> u64 {
        self.cameras_opened().saturating_sub(self.cameras_released())
    }

    pub fn targets_attached(&self) -> u64 {
        self.targets_attached.load(Ordering::SeqCst)
    }

    pub fn detect_calls(&self) -> u64 {
        self.detect_calls.load(Ordering::SeqCst)
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::SeqCst)
    }

    /// Size the renderer was last resized to.
    pub fn last_size(&self) -> Option<(u32, u32)> {
        self.last_size.lock().ok().and_then(|size| *size)
    }
}

/// Where a scripted start should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    ModelLoad(String),
    CameraDenied(String),
    CameraUnavailable(String),
    RenderTarget(String),
}

/// A backend that replays a script of `(timestamp_ms, output)` frames.
pub struct ScriptedBackend {
    script: Arc<Vec<(f64, DetectorOutput)>>,
    endless: bool,
    failure: Option<Failure>,
    detect_errors: Arc<HashSet<u64>>,
    landmark_count: usize,
    frame_size: (u32, u32),
    frame_delay: Option<Duration>,
    source_fails_after: Option<u64>,
    probe: Arc<ScriptProbe>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<(f64, DetectorOutput)>) -> Self {
        Self {
            script: Arc::new(script),
            endless: false,
            failure: None,
            detect_errors: Arc::new(HashSet::new()),
            landmark_count: POSE_LANDMARK_COUNT,
            frame_size: (640, 480),
            frame_delay: None,
            source_fails_after: None,
            probe: Arc::new(ScriptProbe::default()),
        }
    }

    /// Loop the script forever, shifting timestamps on each pass.
    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn fail_model_load(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(Failure::ModelLoad(message.into()));
        self
    }

    pub fn deny_camera(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(Failure::CameraDenied(message.into()));
        self
    }

    pub fn camera_unavailable(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(Failure::CameraUnavailable(message.into()));
        self
    }

    pub fn missing_render_target(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(Failure::RenderTarget(message.into()));
        self
    }

    /// Make the detector fail on the given frame indices.
    pub fn detector_errors_on(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.detect_errors = Arc::new(indices.into_iter().collect());
        self
    }

    pub fn with_landmark_count(mut self, count: usize) -> Self {
        self.landmark_count = count;
        self
    }

    /// Sleep this long before handing out each frame.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    /// Deliver `frames` frames, then fail every later read.
    pub fn fail_source_after(mut self, frames: u64) -> Self {
        self.source_fails_after = Some(frames);
        self
    }

    pub fn probe(&self) -> Arc<ScriptProbe> {
        self.probe.clone()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn load_detector(
        &mut self,
        _options: &DetectorOptions,
    ) -> KneecueResult<Box<dyn LandmarkDetector>> {
        if let Some(Failure::ModelLoad(message)) = &self.failure {
            return Err(KneecueError::model_load(message.clone()));
        }
        self.probe.detector_loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedDetector {
            script: self.script.clone(),
            errors: self.detect_errors.clone(),
            landmark_count: self.landmark_count,
            probe: self.probe.clone(),
        }))
    }

    async fn open_camera(
        &mut self,
        _constraints: &CameraConstraints,
    ) -> KneecueResult<Box<dyn FrameSource>> {
        match &self.failure {
            Some(Failure::CameraDenied(message)) => {
                return Err(KneecueError::permission_denied(message.clone()))
            }
            Some(Failure::CameraUnavailable(message)) => {
                return Err(KneecueError::camera(message.clone()))
            }
            _ => {}
        }
        self.probe.cameras_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSource {
            script: self.script.clone(),
            endless: self.endless,
            cursor: 0,
            frame_size: self.frame_size,
            delay: self.frame_delay,
            fails_after: self.source_fails_after,
            released: false,
            probe: self.probe.clone(),
        }))
    }

    fn attach_render_target(&mut self, target_id: &str) -> KneecueResult<Box<dyn SkeletonRenderer>> {
        if let Some(Failure::RenderTarget(message)) = &self.failure {
            return Err(KneecueError::render_target(format!("{target_id}: {message}")));
        }
        self.probe.targets_attached.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedRenderer {
            probe: self.probe.clone(),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedSource {
    script: Arc<Vec<(f64, DetectorOutput)>>,
    endless: bool,
    cursor: u64,
    frame_size: (u32, u32),
    delay: Option<Duration>,
    fails_after: Option<u64>,
    released: bool,
    probe: Arc<ScriptProbe>,
}

impl ScriptedSource {
    fn timestamp_at(&self, index: u64) -> Option<f64> {
        let len = self.script.len() as u64;
        if len == 0 || (!self.endless && index >= len) {
            return None;
        }
        let base = self.script[(index % len) as usize].0;
        let span = self.script[(len - 1) as usize].0 + REPEAT_GAP_MS;
        Some(base + (index / len) as f64 * span)
    }
}

#[async_trait::async_trait]
impl FrameSource for ScriptedSource {
    async fn next_frame(&mut self) -> KneecueResult<Option<VideoFrame>> {
        if self.released {
            return Err(KneecueError::camera("stream already released"));
        }
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        if self.fails_after.is_some_and(|limit| self.cursor >= limit) {
            return Err(KneecueError::camera("stream interrupted"));
        }

        let Some(timestamp_ms) = self.timestamp_at(self.cursor) else {
            return Ok(None);
        };
        let (width, height) = self.frame_size;
        let frame = VideoFrame::empty(self.cursor, timestamp_ms, width, height);
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frame_size
    }

    async fn release(&mut self) -> KneecueResult<()> {
        if !self.released {
            self.released = true;
            self.probe.cameras_released.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedDetector {
    script: Arc<Vec<(f64, DetectorOutput)>>,
    errors: Arc<HashSet<u64>>,
    landmark_count: usize,
    probe: Arc<ScriptProbe>,
}

#[async_trait::async_trait]
impl LandmarkDetector for ScriptedDetector {
    async fn detect(
        &mut self,
        frame: &VideoFrame,
        _timestamp_ms: f64,
    ) -> KneecueResult<DetectorOutput> {
        self.probe.detect_calls.fetch_add(1, Ordering::SeqCst);
        if self.errors.contains(&frame.index) {
            return Err(KneecueError::Other(anyhow::anyhow!(
                "inference failed on frame {}",
                frame.index
            )));
        }
        let len = self.script.len() as u64;
        if len == 0 {
            return Ok(DetectorOutput::empty());
        }
        Ok(self.script[(frame.index % len) as usize].1.clone())
    }

    fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedRenderer {
    probe: Arc<ScriptProbe>,
}

impl SkeletonRenderer for ScriptedRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if let Ok(mut size) = self.probe.last_size.lock() {
            *size = Some((width, height));
        }
    }

    fn draw(&mut self, overlay: &SkeletonOverlay) {
        self.probe.clears.fetch_add(1, Ordering::SeqCst);
        if !overlay.is_empty() {
            self.probe.frames_drawn.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn clear(&mut self) {
        self.probe.clears.fetch_add(1, Ordering::SeqCst);
    }
}
