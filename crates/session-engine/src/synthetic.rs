//! Synthetic squat backend.
//!
//! Generates a side-view body whose knees follow a smooth squat cycle,
//! with optional detection dropout. Useful for demos and soak runs
//! without a camera or a model.

use std::f64::consts::TAU;

use kneecue_common::clock::SessionClock;
use kneecue_common::config::{CameraConstraints, DetectorOptions};
use kneecue_common::error::{KneecueError, KneecueResult};
use kneecue_pose_model::frame::Point2D;
use kneecue_pose_model::landmark::{BodyLandmark, DetectorOutput, RawLandmark, POSE_LANDMARK_COUNT};

use crate::backend::{
    CaptureBackend, FrameSource, LandmarkDetector, NullRenderer, SkeletonRenderer, VideoFrame,
};

/// Fractional part of the golden ratio; spreads dropped frames evenly.
const GOLDEN_FRACTION: f64 = 0.618_033_988_749_894_9;

const SEGMENT_LENGTH: f64 = 0.2;
const VISIBILITY: f64 = 0.95;

/// Parameters of the generated motion.
#[derive(Debug, Clone, PartialEq)]
pub struct SquatMotion {
    /// Number of squat repetitions.
    pub reps: u32,
    /// Knee angle when standing (degrees).
    pub standing_deg: f64,
    /// Knee angle at the bottom of each rep (degrees).
    pub depth_deg: f64,
    /// Duration of one rep (milliseconds).
    pub period_ms: f64,
    /// Rate of generated frames.
    pub fps: u32,
    /// Fraction of frames, in [0, 1], in which no body is detected.
    pub dropout: f64,
}

impl Default for SquatMotion {
    fn default() -> Self {
        Self {
            reps: 5,
            standing_deg: 175.0,
            depth_deg: 70.0,
            period_ms: 2_000.0,
            fps: 30,
            dropout: 0.0,
        }
    }
}

impl SquatMotion {
    /// Reject parameters that cannot produce a meaningful motion.
    pub fn validate(&self) -> KneecueResult<()> {
        if !(0.0..=180.0).contains(&self.depth_deg) || !(0.0..=180.0).contains(&self.standing_deg) {
            return Err(KneecueError::config("knee angles must be within 0..=180 degrees"));
        }
        if !(self.period_ms.is_finite() && self.period_ms > 0.0) {
            return Err(KneecueError::config("rep period must be positive"));
        }
        if self.fps == 0 {
            return Err(KneecueError::config("synthetic fps must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return Err(KneecueError::config("dropout must be within 0..=1"));
        }
        Ok(())
    }

    pub fn frame_period_ms(&self) -> f64 {
        1_000.0 / self.fps.max(1) as f64
    }

    /// Total frames needed to cover every rep.
    pub fn frame_count(&self) -> u64 {
        (self.reps as f64 * self.period_ms / self.frame_period_ms()).ceil() as u64
    }

    /// Knee angle at time `t_ms`: standing at the start of each rep,
    /// deepest halfway through.
    pub fn knee_angle_at(&self, t_ms: f64) -> f64 {
        let phase = (t_ms.rem_euclid(self.period_ms)) / self.period_ms;
        let bend = (1.0 - (TAU * phase).cos()) / 2.0;
        self.standing_deg - (self.standing_deg - self.depth_deg) * bend
    }

    /// Whether frame `index` is one the detector "misses": the fractional
    /// part of `(index + 1) * 0.618..` falls below the dropout rate.
    pub fn is_dropped(&self, index: u64) -> bool {
        if self.dropout <= 0.0 {
            return false;
        }
        ((index + 1) as f64 * GOLDEN_FRACTION).fract() < self.dropout
    }

    /// Full 33-landmark pose at time `t_ms`.
    pub fn pose_at(&self, t_ms: f64) -> Vec<RawLandmark> {
        let angle = self.knee_angle_at(t_ms);
        let mut pose = vec![RawLandmark::new(0.5, 0.5, 0.0, Some(VISIBILITY)); POSE_LANDMARK_COUNT];

        let legs = [
            (0.45, BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
            (0.47, BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
        ];

        let mut hip_center = Point2D::new(0.0, 0.0);
        for (x, hip_id, knee_id, ankle_id) in legs {
            let (hip, knee, ankle) = leg_points(x, angle);
            set(&mut pose, hip_id, hip);
            set(&mut pose, knee_id, knee);
            set(&mut pose, ankle_id, ankle);
            hip_center.x += hip.x / 2.0;
            hip_center.y += hip.y / 2.0;
        }

        // Feet stay on the floor.
        set(&mut pose, BodyLandmark::LeftHeel, Point2D::new(0.43, 0.92));
        set(&mut pose, BodyLandmark::RightHeel, Point2D::new(0.45, 0.92));
        set(&mut pose, BodyLandmark::LeftFootIndex, Point2D::new(0.52, 0.92));
        set(&mut pose, BodyLandmark::RightFootIndex, Point2D::new(0.54, 0.92));

        // Upper body rides on the hips.
        let upper = [
            (BodyLandmark::Nose, (0.02, -0.42)),
            (BodyLandmark::LeftEyeInner, (0.01, -0.44)),
            (BodyLandmark::LeftEye, (0.0, -0.44)),
            (BodyLandmark::LeftEyeOuter, (-0.01, -0.44)),
            (BodyLandmark::RightEyeInner, (0.03, -0.44)),
            (BodyLandmark::RightEye, (0.04, -0.44)),
            (BodyLandmark::RightEyeOuter, (0.05, -0.44)),
            (BodyLandmark::LeftEar, (-0.03, -0.43)),
            (BodyLandmark::RightEar, (0.06, -0.43)),
            (BodyLandmark::MouthLeft, (0.01, -0.40)),
            (BodyLandmark::MouthRight, (0.03, -0.40)),
            (BodyLandmark::LeftShoulder, (-0.02, -0.30)),
            (BodyLandmark::RightShoulder, (0.02, -0.30)),
            (BodyLandmark::LeftElbow, (0.02, -0.18)),
            (BodyLandmark::RightElbow, (0.06, -0.18)),
            (BodyLandmark::LeftWrist, (0.10, -0.14)),
            (BodyLandmark::RightWrist, (0.14, -0.14)),
            (BodyLandmark::LeftPinky, (0.12, -0.13)),
            (BodyLandmark::RightPinky, (0.16, -0.13)),
            (BodyLandmark::LeftIndex, (0.12, -0.14)),
            (BodyLandmark::RightIndex, (0.16, -0.14)),
            (BodyLandmark::LeftThumb, (0.11, -0.15)),
            (BodyLandmark::RightThumb, (0.15, -0.15)),
        ];
        for (landmark, (dx, dy)) in upper {
            set(
                &mut pose,
                landmark,
                Point2D::new(hip_center.x + dx, hip_center.y + dy),
            );
        }

        pose
    }

    /// Detector output for frame `index` at `t_ms`.
    pub fn output_at(&self, index: u64, t_ms: f64) -> DetectorOutput {
        if self.is_dropped(index) {
            DetectorOutput::empty()
        } else {
            DetectorOutput::single(self.pose_at(t_ms))
        }
    }
}

/// Side-view leg with the ankle planted: the shin stays vertical and the
/// thigh swings back as the knee bends.
fn leg_points(x: f64, knee_angle_deg: f64) -> (Point2D, Point2D, Point2D) {
    let ankle = Point2D::new(x, 0.9);
    let knee = Point2D::new(x, 0.9 - SEGMENT_LENGTH);
    let direction = (90.0 - knee_angle_deg).to_radians();
    let hip = Point2D::new(
        knee.x + SEGMENT_LENGTH * direction.cos(),
        knee.y + SEGMENT_LENGTH * direction.sin(),
    );
    (hip, knee, ankle)
}

fn set(pose: &mut [RawLandmark], landmark: BodyLandmark, point: Point2D) {
    pose[landmark.index()] = RawLandmark::new(point.x, point.y, 0.0, Some(VISIBILITY));
}

/// Backend producing [`SquatMotion`] frames.
pub struct SyntheticBackend {
    motion: SquatMotion,
    frame_size: (u32, u32),
    realtime: bool,
}

impl SyntheticBackend {
    pub fn new(motion: SquatMotion) -> Self {
        Self {
            motion,
            frame_size: (640, 480),
            realtime: false,
        }
    }

    /// Deliver frames no faster than their timestamps.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    pub fn motion(&self) -> &SquatMotion {
        &self.motion
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SyntheticBackend {
    async fn load_detector(
        &mut self,
        _options: &DetectorOptions,
    ) -> KneecueResult<Box<dyn LandmarkDetector>> {
        self.motion.validate()?;
        Ok(Box::new(SyntheticDetector {
            motion: self.motion.clone(),
        }))
    }

    async fn open_camera(
        &mut self,
        _constraints: &CameraConstraints,
    ) -> KneecueResult<Box<dyn FrameSource>> {
        Ok(Box::new(SyntheticSource {
            frame_period_ms: self.motion.frame_period_ms(),
            frame_count: self.motion.frame_count(),
            frame_size: self.frame_size,
            realtime: self.realtime,
            clock: None,
            cursor: 0,
        }))
    }

    fn attach_render_target(&mut self, target_id: &str) -> KneecueResult<Box<dyn SkeletonRenderer>> {
        Ok(Box::new(NullRenderer::new(target_id)))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticSource {
    frame_period_ms: f64,
    frame_count: u64,
    frame_size: (u32, u32),
    realtime: bool,
    clock: Option<SessionClock>,
    cursor: u64,
}

#[async_trait::async_trait]
impl FrameSource for SyntheticSource {
    async fn next_frame(&mut self) -> KneecueResult<Option<VideoFrame>> {
        if self.cursor >= self.frame_count {
            return Ok(None);
        }

        let timestamp_ms = self.cursor as f64 * self.frame_period_ms;
        if self.realtime {
            let clock = self.clock.get_or_insert_with(SessionClock::start);
            let ahead_ms = timestamp_ms - clock.elapsed_ms();
            tokio::time::sleep(SessionClock::ms_to_duration(ahead_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }

        let (width, height) = self.frame_size;
        let frame = VideoFrame::empty(self.cursor, timestamp_ms, width, height);
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frame_size
    }

    async fn release(&mut self) -> KneecueResult<()> {
        self.cursor = self.frame_count;
        Ok(())
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticDetector {
    motion: SquatMotion,
}

#[async_trait::async_trait]
impl LandmarkDetector for SyntheticDetector {
    async fn detect(
        &mut self,
        frame: &VideoFrame,
        timestamp_ms: f64,
    ) -> KneecueResult<DetectorOutput> {
        Ok(self.motion.output_at(frame.index, timestamp_ms))
    }

    fn landmark_count(&self) -> usize {
        POSE_LANDMARK_COUNT
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kneecue_signal_core::pipeline::SignalPipeline;

    #[test]
    fn test_angle_curve_endpoints() {
        let motion = SquatMotion::default();
        assert!((motion.knee_angle_at(0.0) - 175.0).abs() < 1e-9);
        assert!((motion.knee_angle_at(1_000.0) - 70.0).abs() < 1e-9);
        assert!((motion.knee_angle_at(2_000.0) - 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_generated_pose_has_requested_knee_angle() {
        let motion = SquatMotion::default();
        let mut pipeline = SignalPipeline::default();
        for t in [0.0, 250.0, 500.0, 1_000.0] {
            let events = pipeline.step(&motion.output_at(0, t), t);
            let angle = events[0].angle_deg().unwrap();
            assert!((angle - motion.knee_angle_at(t)).abs() < 1e-6, "t={t}");
        }
    }

    #[test]
    fn test_one_cue_per_rep() {
        let motion = SquatMotion {
            reps: 3,
            ..SquatMotion::default()
        };
        let mut pipeline = SignalPipeline::default();
        let period = motion.frame_period_ms();
        for i in 0..motion.frame_count() {
            let t = i as f64 * period;
            pipeline.step(&motion.output_at(i, t), t);
        }
        assert_eq!(pipeline.stats().cues_fired, 3);
        assert_eq!(pipeline.stats().frames, motion.frame_count());
    }

    #[test]
    fn test_dropout_rate_is_respected() {
        let motion = SquatMotion {
            dropout: 0.25,
            ..SquatMotion::default()
        };
        let dropped = (0..1_000).filter(|i| motion.is_dropped(*i)).count();
        assert!((200..=300).contains(&dropped), "dropped {dropped}");
        // Sequence starts at 1 * 0.618.. so the first frame is kept.
        assert!(!motion.is_dropped(0));
        assert!(motion.is_dropped(1));
        assert!(!SquatMotion::default().is_dropped(7));
    }

    #[test]
    fn test_validation() {
        assert!(SquatMotion::default().validate().is_ok());
        let bad = SquatMotion {
            fps: 0,
            ..SquatMotion::default()
        };
        assert!(bad.validate().is_err());
        let bad = SquatMotion {
            dropout: 1.5,
            ..SquatMotion::default()
        };
        assert!(bad.validate().is_err());
    }
}
