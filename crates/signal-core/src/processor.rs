//! Pose signal processor: the cue state machine.
//!
//! # Algorithm
//!
//! For each frame, in order:
//! 1. No pose instance → `NoPoseDetected`.
//! 2. A required joint absent, or a degenerate angle → `JointsUnreliable`.
//! 3. Otherwise → `AngleUpdated` with the knee angle.
//! 4. If the angle is below the cue threshold and the cooldown since the
//!    last cue has elapsed → `CueFired`, and the cooldown restarts at this
//!    frame's timestamp.
//!
//! A frame timestamp earlier than the last cue is treated as "cooldown not
//! yet elapsed". A non-finite timestamp never fires a cue.

use kneecue_common::config::CueConfig;
use kneecue_pose_model::event::Event;
use kneecue_pose_model::frame::PoseFrame;

use crate::geometry::angle_deg;

/// The only mutable state of a session's signal processing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProcessorState {
    /// Timestamp (ms) of the last cue, if one fired this session.
    pub last_cue_fired_at_ms: Option<f64>,

    /// Most recent valid knee angle.
    pub last_angle_deg: Option<f64>,
}

/// Stateless processor; state is threaded explicitly through `process`.
#[derive(Debug, Clone)]
pub struct PoseSignalProcessor {
    config: CueConfig,
}

impl PoseSignalProcessor {
    /// Create a processor with the given cue tuning.
    pub fn new(config: CueConfig) -> Self {
        Self { config }
    }

    /// Create a processor with default tuning (90°, 1500 ms).
    pub fn with_defaults() -> Self {
        Self::new(CueConfig::default())
    }

    pub fn config(&self) -> &CueConfig {
        &self.config
    }

    /// Process one frame. Never fails; every input maps to some event.
    pub fn process(&self, frame: &PoseFrame, state: ProcessorState) -> (Vec<Event>, ProcessorState) {
        if !frame.detected {
            return (vec![Event::NoPoseDetected], state);
        }

        let Some((hip, knee, ankle)) = frame.joints.complete() else {
            tracing::trace!(missing = ?frame.joints.missing(), "Joints unreliable");
            return (vec![Event::JointsUnreliable], state);
        };

        let angle = angle_deg(hip, knee, ankle);
        if !angle.is_finite() {
            tracing::trace!("Degenerate knee geometry");
            return (vec![Event::JointsUnreliable], state);
        }

        let mut next = state;
        next.last_angle_deg = Some(angle);
        let mut events = vec![Event::angle(angle)];

        if angle < self.config.threshold_deg && self.cooldown_elapsed(&state, frame.timestamp_ms) {
            tracing::debug!(
                angle_deg = angle,
                timestamp_ms = frame.timestamp_ms,
                "Cue fired"
            );
            events.push(Event::cue(self.config.text.clone()));
            next.last_cue_fired_at_ms = Some(frame.timestamp_ms);
        }

        (events, next)
    }

    /// Whether enough time has passed since the last cue.
    fn cooldown_elapsed(&self, state: &ProcessorState, now_ms: f64) -> bool {
        if !now_ms.is_finite() {
            return false;
        }
        match state.last_cue_fired_at_ms {
            None => true,
            Some(last) if now_ms < last => {
                tracing::debug!(
                    now_ms,
                    last_cue_ms = last,
                    "Non-monotonic frame timestamp; holding cooldown"
                );
                false
            }
            Some(last) => now_ms - last >= self.config.cooldown_ms,
        }
    }
}

impl Default for PoseSignalProcessor {
    fn default() -> Self {
        Self::with_defaults()
    }
}
