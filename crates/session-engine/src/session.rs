//! Pose session management.
//!
//! A [`PoseSession`] owns everything one camera session needs: the
//! detector, the camera stream, the render target, the processor state,
//! and a cooperative stop flag. Resources are acquired in `start` and
//! released in `stop`; nothing outlives the session except the loaded
//! detector, which is kept for the next start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use kneecue_common::clock::{frame_interval, SessionClock};
use kneecue_common::config::{
    AppConfig, CameraConstraints, CueConfig, DetectorOptions, LandmarkConfig,
};
use kneecue_common::error::{KneecueError, KneecueResult};
use kneecue_pose_model::event::SessionStatus;
use kneecue_pose_model::landmark::{DetectorOutput, LandmarkMapping};
use kneecue_signal_core::adapter::FrameAdapter;
use kneecue_signal_core::pipeline::{PipelineStats, SignalPipeline};
use kneecue_signal_core::processor::PoseSignalProcessor;
use kneecue_signal_core::skeleton::{OverlayStyle, SkeletonOverlay};

use crate::backend::{CaptureBackend, FrameSource, LandmarkDetector, SkeletonRenderer, VideoFrame};
use crate::bridge::HostBridge;

/// Configuration for a pose session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Cue threshold, cooldown, and text.
    pub cue: CueConfig,

    /// Which leg to track and the confidence floor.
    pub landmarks: LandmarkConfig,

    /// Model and runtime asset locations.
    pub detector: DetectorOptions,

    /// Camera constraints passed to the backend.
    pub camera: CameraConstraints,

    /// Frame loop rate. 0 runs as fast as the source delivers.
    pub target_fps: u32,

    /// Skeleton overlay appearance.
    pub overlay: OverlayStyle,
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cue: config.cue.clone(),
            landmarks: config.landmarks.clone(),
            detector: config.detector.clone(),
            camera: config.camera.clone(),
            target_fps: config.frame_loop.target_fps,
            overlay: OverlayStyle::default(),
        }
    }

    fn pipeline(&self) -> SignalPipeline {
        SignalPipeline::new(
            FrameAdapter::from_config(&self.landmarks),
            PoseSignalProcessor::new(self.cue.clone()),
        )
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never started.
    Idle,
    /// Frame loop is live.
    Running,
    /// Stopped cleanly; can be started again.
    Stopped,
    /// The last start attempt failed; can be started again.
    Failed,
}

/// Why the frame loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopExit {
    /// The stop flag was set.
    Stopped,
    /// The frame source reported end of stream.
    EndOfStream,
    /// The frame source failed mid-session.
    SourceError,
}

/// What a finished session reports back.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub render_target: String,
    pub started_at: String,
    pub duration_secs: f64,
    pub exit: LoopExit,
    pub stats: PipelineStats,
    pub last_angle_deg: Option<f64>,
}

/// Everything the frame loop owns, handed back when it ends.
struct LoopOutcome {
    exit: LoopExit,
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
    renderer: Box<dyn SkeletonRenderer>,
    pipeline: SignalPipeline,
}

struct ActiveSession {
    render_target: String,
    clock: SessionClock,
    stop_flag: Arc<AtomicBool>,
    task: JoinHandle<LoopOutcome>,
}

/// An explicit session object replacing process-wide detector, loop, and
/// running-flag state.
pub struct PoseSession {
    config: SessionConfig,
    backend: Box<dyn CaptureBackend>,
    bridge: Arc<dyn HostBridge>,
    state: SessionState,
    detector: Option<Box<dyn LandmarkDetector>>,
    active: Option<ActiveSession>,
}

impl PoseSession {
    /// Create a session over the given backend and host bridge.
    pub fn new(
        config: SessionConfig,
        backend: Box<dyn CaptureBackend>,
        bridge: Arc<dyn HostBridge>,
    ) -> Self {
        Self {
            config,
            backend,
            bridge,
            state: SessionState::Idle,
            detector: None,
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a frame loop is attached to this session.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether a loaded detector is being kept for the next start.
    pub fn has_cached_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Stop flag of the running loop, for signal handlers and other tasks.
    pub fn stop_flag(&self) -> Option<Arc<AtomicBool>> {
        self.active.as_ref().map(|active| active.stop_flag.clone())
    }

    /// Start the session on the given render target.
    ///
    /// A second call while running is a no-op. Any acquisition failure
    /// is reported to the host as a single status message, releases what
    /// was already acquired, and leaves the session not running.
    pub async fn start(&mut self, render_target_id: &str) -> KneecueResult<()> {
        self.reap_finished().await?;

        if self.active.is_some() {
            tracing::debug!("Session already running; start ignored");
            return Ok(());
        }

        tracing::info!(
            render_target = render_target_id,
            backend = self.backend.name(),
            "Starting pose session"
        );
        self.bridge.report(&SessionStatus::Starting);

        let detector = match self.detector.take() {
            Some(detector) => {
                tracing::debug!(detector = detector.name(), "Reusing loaded detector");
                detector
            }
            None => match self.backend.load_detector(&self.config.detector).await {
                Ok(detector) => {
                    tracing::info!(
                        detector = detector.name(),
                        landmarks = detector.landmark_count(),
                        "Detector loaded"
                    );
                    detector
                }
                Err(e) => {
                    let status = SessionStatus::ModelLoadFailed(e.to_string());
                    return Err(self.fail(status, e));
                }
            },
        };

        let mapping = LandmarkMapping::for_side(self.config.landmarks.side);
        if detector.landmark_count() != self.config.landmarks.expected_landmark_count {
            tracing::warn!(
                expected = self.config.landmarks.expected_landmark_count,
                actual = detector.landmark_count(),
                "Detector landmark count differs from configuration"
            );
        }
        if let Err(e) = mapping.validate(detector.landmark_count()) {
            self.detector = Some(detector);
            let status = SessionStatus::InvalidMapping(e.to_string());
            return Err(self.fail(status, e));
        }

        let mut renderer = match self.backend.attach_render_target(render_target_id) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.detector = Some(detector);
                let status = SessionStatus::RenderTargetUnavailable(e.to_string());
                return Err(self.fail(status, e));
            }
        };

        let source = match self.backend.open_camera(&self.config.camera).await {
            Ok(source) => source,
            Err(e) => {
                renderer.clear();
                self.detector = Some(detector);
                let status = SessionStatus::CameraUnavailable(e.to_string());
                return Err(self.fail(status, e));
            }
        };

        let (width, height) = source.dimensions();
        renderer.resize(width, height);
        tracing::info!(source = source.name(), width, height, "Camera opened");

        let clock = SessionClock::start();
        let stop_flag = Arc::new(AtomicBool::new(false));

        let frame_loop = FrameLoop {
            source,
            detector,
            renderer,
            pipeline: self.config.pipeline(),
            bridge: self.bridge.clone(),
            stop_flag: stop_flag.clone(),
            interval: frame_interval(self.config.target_fps),
            overlay: self.config.overlay.clone(),
        };

        self.bridge.report(&SessionStatus::Running);
        let task = tokio::spawn(frame_loop.run());

        self.active = Some(ActiveSession {
            render_target: render_target_id.to_string(),
            clock,
            stop_flag,
            task,
        });
        self.state = SessionState::Running;

        tracing::info!("Pose session started");
        Ok(())
    }

    /// Stop the session.
    ///
    /// Sets the stop flag, lets an in-flight detector call finish, then
    /// releases the camera and clears the overlay. Returns `None` when
    /// nothing was running.
    pub async fn stop(&mut self) -> KneecueResult<Option<SessionSummary>> {
        let Some(active) = self.active.take() else {
            tracing::debug!("No running session; stop ignored");
            return Ok(None);
        };

        tracing::info!("Stopping pose session");
        active.stop_flag.store(true, Ordering::SeqCst);
        self.finish(active).await.map(Some)
    }

    /// Wait for the frame loop to end on its own (end of stream, source
    /// failure, or an external stop flag), then tear the session down.
    pub async fn wait(&mut self) -> KneecueResult<Option<SessionSummary>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        self.finish(active).await.map(Some)
    }

    /// Tear down a loop that already ended so a new start can proceed.
    async fn reap_finished(&mut self) -> KneecueResult<()> {
        let finished = self
            .active
            .as_ref()
            .is_some_and(|active| active.task.is_finished());
        if finished {
            if let Some(active) = self.active.take() {
                tracing::debug!("Reaping finished frame loop");
                self.finish(active).await?;
            }
        }
        Ok(())
    }

    async fn finish(&mut self, active: ActiveSession) -> KneecueResult<SessionSummary> {
        let ActiveSession {
            render_target,
            clock,
            task,
            ..
        } = active;

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = SessionState::Stopped;
                self.bridge.report(&SessionStatus::Stopped);
                return Err(KneecueError::session(format!("Frame loop task failed: {e}")));
            }
        };

        let LoopOutcome {
            exit,
            mut source,
            detector,
            mut renderer,
            pipeline,
        } = outcome;

        if let Err(e) = source.release().await {
            tracing::warn!(error = %e, source = source.name(), "Failed to release camera");
        }
        renderer.clear();
        self.detector = Some(detector);
        self.state = SessionState::Stopped;
        self.bridge.report(&SessionStatus::Stopped);

        let summary = SessionSummary {
            render_target,
            started_at: clock.epoch_wall().to_string(),
            duration_secs: clock.elapsed_secs(),
            exit,
            stats: pipeline.stats(),
            last_angle_deg: pipeline.state().last_angle_deg,
        };

        tracing::info!(
            ?exit,
            frames = summary.stats.frames,
            cues = summary.stats.cues_fired,
            duration_secs = summary.duration_secs,
            "Pose session stopped"
        );
        Ok(summary)
    }

    fn fail(&mut self, status: SessionStatus, error: KneecueError) -> KneecueError {
        tracing::error!(error = %error, "Session start failed");
        self.bridge.report(&status);
        self.state = SessionState::Failed;
        error
    }
}

/// The per-session frame loop. Runs on its own task; state is owned here
/// exclusively, so frames are processed strictly one at a time.
struct FrameLoop {
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
    renderer: Box<dyn SkeletonRenderer>,
    pipeline: SignalPipeline,
    bridge: Arc<dyn HostBridge>,
    stop_flag: Arc<AtomicBool>,
    interval: Option<Duration>,
    overlay: OverlayStyle,
}

impl FrameLoop {
    async fn run(mut self) -> LoopOutcome {
        let mut ticker = self.interval.map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        tracing::debug!(interval = ?self.interval, "Frame loop started");

        let exit = loop {
            if self.stopped() {
                break LoopExit::Stopped;
            }
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            let frame = match self.source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("Frame source ended");
                    break LoopExit::EndOfStream;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Frame source failed");
                    self.bridge
                        .report(&SessionStatus::CameraUnavailable(e.to_string()));
                    break LoopExit::SourceError;
                }
            };

            // Stop may have been requested while waiting for the frame.
            if self.stopped() {
                break LoopExit::Stopped;
            }

            self.process_frame(&frame).await;
        };

        tracing::debug!(?exit, "Frame loop exited");

        LoopOutcome {
            exit,
            source: self.source,
            detector: self.detector,
            renderer: self.renderer,
            pipeline: self.pipeline,
        }
    }

    fn stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    /// One detector call, one overlay draw, then the frame's events in order.
    async fn process_frame(&mut self, frame: &VideoFrame) {
        let timestamp_ms = frame.timestamp_ms;

        let output = match self.detector.detect(frame, timestamp_ms).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    frame = frame.index,
                    error = %e,
                    "Detection failed; treating frame as empty"
                );
                DetectorOutput::empty()
            }
        };

        let overlay = SkeletonOverlay::build(&output, frame.width, frame.height, &self.overlay);
        self.renderer.draw(&overlay);

        for event in self.pipeline.step(&output, timestamp_ms) {
            self.bridge.publish(&event);
        }

        tracing::trace!(frame = frame.index, timestamp_ms, "Frame processed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MemoryBridge;
    use crate::scripted::ScriptedBackend;
    use kneecue_pose_model::event::HostMessage;
    use kneecue_pose_model::landmark::{RawLandmark, POSE_LANDMARK_COUNT};

    /// Side-view pose with the left knee bent to `angle` degrees.
    fn pose(angle: f64) -> DetectorOutput {
        let mut landmarks = vec![RawLandmark::new(0.5, 0.5, 0.0, Some(0.9)); POSE_LANDMARK_COUNT];
        let direction = (90.0 - angle).to_radians();
        landmarks[23] = RawLandmark::new(
            0.5 + 0.2 * direction.cos(),
            0.7 + 0.2 * direction.sin(),
            0.0,
            Some(0.9),
        );
        landmarks[25] = RawLandmark::new(0.5, 0.7, 0.0, Some(0.9));
        landmarks[27] = RawLandmark::new(0.5, 0.9, 0.0, Some(0.9));
        DetectorOutput::single(landmarks)
    }

    fn unreliable_pose() -> DetectorOutput {
        let mut output = pose(80.0);
        output.poses[0][25].visibility = Some(0.1);
        output
    }

    fn config() -> SessionConfig {
        SessionConfig {
            target_fps: 0,
            ..SessionConfig::default()
        }
    }

    fn session(backend: ScriptedBackend) -> (PoseSession, Arc<MemoryBridge>) {
        let bridge = Arc::new(MemoryBridge::new());
        let session = PoseSession::new(config(), Box::new(backend), bridge.clone());
        (session, bridge)
    }

    fn standing_script() -> Vec<(f64, DetectorOutput)> {
        (0..10).map(|i| (i as f64 * 16.0, pose(170.0))).collect()
    }

    #[tokio::test]
    async fn test_start_twice_is_same_as_once() {
        let backend = ScriptedBackend::new(standing_script()).endless();
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        session.start("pose-container").await.unwrap();
        session.start("pose-container").await.unwrap();

        assert!(session.is_running());
        assert_eq!(probe.detector_loads(), 1);
        assert_eq!(probe.cameras_opened(), 1);
        assert_eq!(probe.targets_attached(), 1);

        session.stop().await.unwrap();
        assert_eq!(
            bridge.statuses(),
            vec!["starting".to_string(), "running".to_string(), "stopped".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stop_releases_camera() {
        let backend = ScriptedBackend::new(standing_script()).endless();
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        session.start("pose-container").await.unwrap();
        assert_eq!(probe.last_size(), Some((640, 480)));
        tokio::time::sleep(Duration::from_millis(5)).await;

        let summary = session.stop().await.unwrap().unwrap();
        assert_eq!(summary.exit, LoopExit::Stopped);
        assert_eq!(summary.render_target, "pose-container");
        assert!(summary.stats.frames > 0);

        assert_eq!(probe.cameras_open(), 0);
        assert_eq!(probe.cameras_released(), 1);
        assert!(probe.clears() > 0);
        assert!(!session.is_running());
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(bridge.statuses().last().map(String::as_str), Some("stopped"));

        // Frames stop flowing once stop returns.
        let calls = probe.detect_calls();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(probe.detect_calls(), calls);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let (mut session, bridge) = session(ScriptedBackend::new(standing_script()));
        assert!(session.stop().await.unwrap().is_none());
        assert!(bridge.is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_camera_denied_is_reported_once_and_nothing_leaks() {
        let backend = ScriptedBackend::new(standing_script()).deny_camera("user dismissed prompt");
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        let err = session.start("pose-container").await.unwrap_err();
        assert!(matches!(err, KneecueError::PermissionDenied { .. }));

        assert_eq!(
            bridge.statuses(),
            vec![
                "starting".to_string(),
                "camera unavailable: Permission denied: user dismissed prompt".to_string(),
            ]
        );
        assert!(bridge.angles().is_empty());
        assert_eq!(probe.cameras_open(), 0);
        assert_eq!(probe.detect_calls(), 0);
        assert_eq!(probe.clears(), 1);
        assert!(!session.is_running());
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_camera_unavailable_at_start() {
        let backend = ScriptedBackend::new(standing_script()).camera_unavailable("no device");
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        let err = session.start("pose-container").await.unwrap_err();
        assert!(matches!(err, KneecueError::Camera { .. }));
        assert_eq!(
            bridge.statuses(),
            vec![
                "starting".to_string(),
                "camera unavailable: Camera error: no device".to_string(),
            ]
        );
        assert_eq!(probe.cameras_opened(), 0);
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_source_failure_mid_session_ends_loop() {
        let backend = ScriptedBackend::new(standing_script()).fail_source_after(4);
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        session.start("pose-container").await.unwrap();
        let summary = session.wait().await.unwrap().unwrap();

        assert_eq!(summary.exit, LoopExit::SourceError);
        assert_eq!(summary.stats.frames, 4);
        assert_eq!(bridge.angles().len(), 4);
        assert_eq!(
            bridge.statuses(),
            vec![
                "starting".to_string(),
                "running".to_string(),
                "camera unavailable: Camera error: stream interrupted".to_string(),
                "stopped".to_string(),
            ]
        );
        assert_eq!(probe.cameras_opened(), 1);
        assert_eq!(probe.cameras_open(), 0);
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_model_load_failure_never_opens_camera() {
        let backend = ScriptedBackend::new(standing_script()).fail_model_load("asset returned 404");
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        let err = session.start("pose-container").await.unwrap_err();
        assert!(matches!(err, KneecueError::ModelLoad { .. }));
        assert_eq!(
            bridge.statuses(),
            vec![
                "starting".to_string(),
                "model load failed: Model load error: asset returned 404".to_string(),
            ]
        );
        assert_eq!(probe.cameras_opened(), 0);
        assert_eq!(probe.targets_attached(), 0);
        assert!(!session.has_cached_detector());
    }

    #[tokio::test]
    async fn test_missing_render_target_never_opens_camera() {
        let backend = ScriptedBackend::new(standing_script()).missing_render_target("no such element");
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        assert!(session.start("nowhere").await.is_err());
        assert_eq!(probe.cameras_opened(), 0);
        assert!(bridge.statuses()[1].starts_with("render target unavailable"));
        assert!(session.has_cached_detector());
    }

    #[tokio::test]
    async fn test_mapping_is_validated_against_model() {
        let backend = ScriptedBackend::new(standing_script()).with_landmark_count(25);
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        let err = session.start("pose-container").await.unwrap_err();
        assert!(matches!(err, KneecueError::Mapping { .. }));
        assert!(bridge.statuses()[1].starts_with("landmark mapping invalid"));
        assert_eq!(probe.cameras_opened(), 0);
    }

    #[tokio::test]
    async fn test_events_reach_host_in_frame_order() {
        let script = vec![
            (0.0, DetectorOutput::empty()),
            (100.0, pose(60.0)),
            (200.0, unreliable_pose()),
            (600.0, pose(60.0)),
            (1_700.0, pose(60.0)),
        ];
        let (mut session, bridge) = session(ScriptedBackend::new(script));

        session.start("pose-container").await.unwrap();
        let summary = session.wait().await.unwrap().unwrap();
        assert_eq!(summary.exit, LoopExit::EndOfStream);
        assert_eq!(summary.stats.frames, 5);
        assert_eq!(summary.stats.cues_fired, 2);

        let kinds: Vec<&str> = bridge.messages().iter().map(HostMessage::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "STATUS", "STATUS", "STATUS", "POSE_ANGLE", "CUE", "STATUS", "POSE_ANGLE",
                "POSE_ANGLE", "CUE", "STATUS",
            ]
        );
        assert_eq!(
            bridge.statuses(),
            vec![
                "starting".to_string(),
                "running".to_string(),
                "no pose detected".to_string(),
                "joints unreliable".to_string(),
                "stopped".to_string(),
            ]
        );
        assert_eq!(bridge.cues(), vec!["straighten your knees".to_string(); 2]);
    }

    #[tokio::test]
    async fn test_detector_error_counts_as_no_pose() {
        let script = vec![(0.0, pose(60.0)), (2_000.0, pose(60.0)), (4_000.0, pose(60.0))];
        let backend = ScriptedBackend::new(script).detector_errors_on([1]);
        let probe = backend.probe();
        let (mut session, bridge) = session(backend);

        session.start("pose-container").await.unwrap();
        let summary = session.wait().await.unwrap().unwrap();

        assert_eq!(probe.detect_calls(), 3);
        assert_eq!(summary.stats.detected_frames, 2);
        assert_eq!(bridge.cues().len(), 2);
        assert!(bridge.statuses().contains(&"no pose detected".to_string()));
    }

    #[tokio::test]
    async fn test_restart_reuses_loaded_detector() {
        let backend = ScriptedBackend::new(standing_script());
        let probe = backend.probe();
        let (mut session, _bridge) = session(backend);

        session.start("pose-container").await.unwrap();
        session.wait().await.unwrap();
        session.start("pose-container").await.unwrap();
        session.wait().await.unwrap();

        assert_eq!(probe.detector_loads(), 1);
        assert_eq!(probe.cameras_opened(), 2);
        assert_eq!(probe.cameras_open(), 0);
    }

    #[tokio::test]
    async fn test_external_stop_flag_ends_loop() {
        let backend = ScriptedBackend::new(standing_script())
            .endless()
            .with_frame_delay(Duration::from_millis(1));
        let probe = backend.probe();
        let (mut session, _bridge) = session(backend);

        session.start("pose-container").await.unwrap();
        let flag = session.stop_flag().unwrap();
        flag.store(true, Ordering::SeqCst);

        let summary = session.wait().await.unwrap().unwrap();
        assert_eq!(summary.exit, LoopExit::Stopped);
        assert_eq!(probe.cameras_open(), 0);
    }
}
