//! Landmark frame adapter.
//!
//! Normalizes one raw detector result into a typed [`PoseFrame`]. Only the
//! first pose instance is considered; the hip, knee, and ankle come from
//! fixed landmark indices and must clear a confidence floor.

use kneecue_common::config::LandmarkConfig;
use kneecue_pose_model::frame::{JointSet, Point2D, PoseFrame};
use kneecue_pose_model::landmark::{DetectorOutput, LandmarkMapping, RawLandmark};

/// Converts detector output into pose frames.
#[derive(Debug, Clone)]
pub struct FrameAdapter {
    mapping: LandmarkMapping,
    min_confidence: f64,
}

impl FrameAdapter {
    /// Create an adapter for the given mapping and confidence floor.
    pub fn new(mapping: LandmarkMapping, min_confidence: f64) -> Self {
        Self {
            mapping,
            min_confidence,
        }
    }

    /// Create an adapter from the landmark section of the app config.
    pub fn from_config(config: &LandmarkConfig) -> Self {
        Self::new(LandmarkMapping::for_side(config.side), config.min_confidence)
    }

    pub fn mapping(&self) -> LandmarkMapping {
        self.mapping
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Adapt one detector result.
    ///
    /// `detected` is false only when the detector returned no pose
    /// instance. A detected pose with a missing, low-confidence, or
    /// non-finite joint keeps `detected = true` with that joint absent.
    pub fn adapt(&self, output: &DetectorOutput, timestamp_ms: f64) -> PoseFrame {
        let Some(pose) = output.primary() else {
            return PoseFrame::undetected(timestamp_ms);
        };

        let joints = JointSet::new(
            self.joint(pose, self.mapping.hip),
            self.joint(pose, self.mapping.knee),
            self.joint(pose, self.mapping.ankle),
        );

        PoseFrame::detected(timestamp_ms, joints)
    }

    fn joint(&self, pose: &[RawLandmark], index: usize) -> Option<Point2D> {
        let landmark = pose.get(index)?;
        if !landmark.is_visible(self.min_confidence) {
            return None;
        }
        let point = Point2D::new(landmark.x, landmark.y);
        point.is_finite().then_some(point)
    }
}

impl Default for FrameAdapter {
    fn default() -> Self {
        Self::from_config(&LandmarkConfig::default())
    }
}
