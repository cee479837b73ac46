//! Adapter and processor composed into one stateful per-session step.

use serde::{Deserialize, Serialize};

use kneecue_common::config::AppConfig;
use kneecue_pose_model::event::Event;
use kneecue_pose_model::landmark::DetectorOutput;

use crate::adapter::FrameAdapter;
use crate::processor::{PoseSignalProcessor, ProcessorState};

/// Counters accumulated over a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub frames: u64,
    pub detected_frames: u64,
    pub angle_updates: u64,
    pub unreliable_frames: u64,
    pub cues_fired: u64,
}

impl PipelineStats {
    fn record(&mut self, events: &[Event]) {
        self.frames += 1;
        for event in events {
            match event {
                Event::AngleUpdated { .. } => {
                    self.detected_frames += 1;
                    self.angle_updates += 1;
                }
                Event::JointsUnreliable => {
                    self.detected_frames += 1;
                    self.unreliable_frames += 1;
                }
                Event::CueFired { .. } => self.cues_fired += 1,
                Event::NoPoseDetected => {}
            }
        }
    }

    /// Fraction of frames in which a pose was detected.
    pub fn detection_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.detected_frames as f64 / self.frames as f64
    }
}

/// Detector output in, events out. Owns the processor state for one session.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    adapter: FrameAdapter,
    processor: PoseSignalProcessor,
    state: ProcessorState,
    stats: PipelineStats,
}

impl SignalPipeline {
    pub fn new(adapter: FrameAdapter, processor: PoseSignalProcessor) -> Self {
        Self {
            adapter,
            processor,
            state: ProcessorState::default(),
            stats: PipelineStats::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            FrameAdapter::from_config(&config.landmarks),
            PoseSignalProcessor::new(config.cue.clone()),
        )
    }

    /// Run one frame through adapter and processor.
    pub fn step(&mut self, output: &DetectorOutput, timestamp_ms: f64) -> Vec<Event> {
        let frame = self.adapter.adapt(output, timestamp_ms);
        let (events, next) = self.processor.process(&frame, self.state);
        self.state = next;
        self.stats.record(&events);
        events
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn adapter(&self) -> &FrameAdapter {
        &self.adapter
    }

    /// Forget the cooldown and counters; a new session starts clean.
    pub fn reset(&mut self) {
        self.state = ProcessorState::default();
        self.stats = PipelineStats::default();
    }
}

impl Default for SignalPipeline {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kneecue_pose_model::landmark::{RawLandmark, POSE_LANDMARK_COUNT};

    /// Pose whose left knee is bent to 90° (hip above, ankle to the side).
    fn bent_pose() -> DetectorOutput {
        let mut pose = vec![RawLandmark::new(0.5, 0.5, 0.0, Some(0.9)); POSE_LANDMARK_COUNT];
        pose[23] = RawLandmark::new(0.5, 0.3, 0.0, Some(0.9));
        pose[25] = RawLandmark::new(0.5, 0.5, 0.0, Some(0.9));
        pose[27] = RawLandmark::new(0.7, 0.5, 0.0, Some(0.9));
        DetectorOutput::single(pose)
    }

    fn squat_pose() -> DetectorOutput {
        let mut output = bent_pose();
        output.poses[0][27] = RawLandmark::new(0.7, 0.4, 0.0, Some(0.9));
        output
    }

    #[test]
    fn test_step_threads_state() {
        let mut pipeline = SignalPipeline::default();
        let first = pipeline.step(&squat_pose(), 0.0);
        assert!(first.iter().any(Event::is_cue));
        assert_eq!(pipeline.state().last_cue_fired_at_ms, Some(0.0));

        let second = pipeline.step(&squat_pose(), 500.0);
        assert!(!second.iter().any(Event::is_cue));
    }

    #[test]
    fn test_exact_right_angle_does_not_cue() {
        let mut pipeline = SignalPipeline::default();
        let events = pipeline.step(&bent_pose(), 0.0);
        assert_eq!(events.len(), 1);
        assert!((events[0].angle_deg().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_and_reset() {
        let mut pipeline = SignalPipeline::default();
        pipeline.step(&DetectorOutput::empty(), 0.0);
        pipeline.step(&squat_pose(), 16.0);

        let mut unreliable = squat_pose();
        unreliable.poses[0][25].visibility = Some(0.1);
        pipeline.step(&unreliable, 32.0);

        let stats = pipeline.stats();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.detected_frames, 2);
        assert_eq!(stats.angle_updates, 1);
        assert_eq!(stats.unreliable_frames, 1);
        assert_eq!(stats.cues_fired, 1);
        assert!((stats.detection_rate() - 2.0 / 3.0).abs() < 1e-12);

        pipeline.reset();
        assert_eq!(pipeline.stats(), PipelineStats::default());
        assert_eq!(pipeline.state(), ProcessorState::default());
    }
}
