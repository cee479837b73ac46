//! Typed per-frame joint data.

use serde::{Deserialize, Serialize};

/// A point in normalized video coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The joints used by the knee angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Hip,
    Knee,
    Ankle,
}

impl Joint {
    pub const ALL: [Joint; 3] = [Joint::Hip, Joint::Knee, Joint::Ankle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::Hip => "hip",
            Joint::Knee => "knee",
            Joint::Ankle => "ankle",
        }
    }
}

/// Optional position for each required joint.
///
/// Built fresh per frame and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointSet {
    hip: Option<Point2D>,
    knee: Option<Point2D>,
    ankle: Option<Point2D>,
}

impl JointSet {
    pub fn new(hip: Option<Point2D>, knee: Option<Point2D>, ankle: Option<Point2D>) -> Self {
        Self { hip, knee, ankle }
    }

    /// A set with every joint absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, joint: Joint) -> Option<Point2D> {
        match joint {
            Joint::Hip => self.hip,
            Joint::Knee => self.knee,
            Joint::Ankle => self.ankle,
        }
    }

    /// All three joints, or `None` if any is absent.
    pub fn complete(&self) -> Option<(Point2D, Point2D, Point2D)> {
        Some((self.hip?, self.knee?, self.ankle?))
    }

    /// Joints the detector did not give us.
    pub fn missing(&self) -> Vec<Joint> {
        Joint::ALL
            .into_iter()
            .filter(|joint| self.get(*joint).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hip.is_none() && self.knee.is_none() && self.ankle.is_none()
    }
}

/// One adapted detector frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Monotonic milliseconds since session start.
    pub timestamp_ms: f64,

    /// Joint positions; empty when nothing was detected.
    pub joints: JointSet,

    /// False iff the detector returned zero pose instances.
    pub detected: bool,
}

impl PoseFrame {
    /// A frame in which the detector found nobody.
    pub fn undetected(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            joints: JointSet::empty(),
            detected: false,
        }
    }

    /// A frame with a detected pose and the given joints.
    pub fn detected(timestamp_ms: f64, joints: JointSet) -> Self {
        Self {
            timestamp_ms,
            joints,
            detected: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_requires_all_joints() {
        let p = Point2D::new(0.5, 0.5);
        assert!(JointSet::new(Some(p), Some(p), Some(p)).complete().is_some());
        assert!(JointSet::new(None, Some(p), Some(p)).complete().is_none());
    }

    #[test]
    fn test_missing_lists_absent_joints_in_order() {
        let p = Point2D::new(0.1, 0.2);
        let joints = JointSet::new(None, Some(p), None);
        assert_eq!(joints.missing(), vec![Joint::Hip, Joint::Ankle]);
        assert!(JointSet::empty().is_empty());
    }

    #[test]
    fn test_undetected_frame_has_no_joints() {
        let frame = PoseFrame::undetected(12.5);
        assert!(!frame.detected);
        assert!(frame.joints.is_empty());
    }

    #[test]
    fn test_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(0.3, 0.4);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-12);
    }
}
