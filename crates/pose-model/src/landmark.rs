//! Raw detector output and the pose model's landmark convention.
//!
//! The detector reports zero or more pose instances per frame, each an
//! ordered, fixed-length sequence of landmarks. Indices follow the
//! 33-point body model and are configuration, not derived at runtime.

use serde::{Deserialize, Serialize};

use kneecue_common::config::LegSide;
use kneecue_common::error::{KneecueError, KneecueResult};

/// Number of landmarks produced per pose by the body model.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Body landmark indices (33 total).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Position of this landmark in a pose instance.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Skeleton edges of the body model as pairs of landmark indices.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    // Face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    // Torso and arms
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    // Legs
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// A single landmark as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLandmark {
    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,
    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f64,
    /// Relative depth; unused by the 2D angle.
    #[serde(default)]
    pub z: f64,
    /// Per-point confidence. Absent means the detector did not report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl RawLandmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: Option<f64>) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Confidence of this point; an unreported confidence counts as 1.0.
    pub fn confidence(&self) -> f64 {
        self.visibility.unwrap_or(1.0)
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        self.confidence() >= threshold
    }
}

/// Everything the detector returned for one video frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorOutput {
    /// Detected pose instances, each an ordered landmark sequence.
    #[serde(default)]
    pub poses: Vec<Vec<RawLandmark>>,
}

impl DetectorOutput {
    /// Output with no detected body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Output with a single pose instance.
    pub fn single(landmarks: Vec<RawLandmark>) -> Self {
        Self {
            poses: vec![landmarks],
        }
    }

    /// First pose instance, if any. The system tracks one person.
    pub fn primary(&self) -> Option<&[RawLandmark]> {
        self.poses.first().map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// One line of a recorded detector stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Frame timestamp in milliseconds since stream start.
    #[serde(rename = "t")]
    pub timestamp_ms: f64,

    /// Detector output for that frame.
    #[serde(flatten)]
    pub output: DetectorOutput,
}

/// Parse a recorded detector stream from JSONL (one record per line).
/// Blank lines and `#` comment lines are skipped.
pub fn parse_detections(jsonl: &str) -> Result<Vec<DetectionRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Which landmark indices feed the hip, knee, and ankle joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkMapping {
    pub hip: usize,
    pub knee: usize,
    pub ankle: usize,
}

impl LandmarkMapping {
    /// Left leg of the 33-point body model.
    pub fn left() -> Self {
        Self {
            hip: BodyLandmark::LeftHip.index(),
            knee: BodyLandmark::LeftKnee.index(),
            ankle: BodyLandmark::LeftAnkle.index(),
        }
    }

    /// Right leg of the 33-point body model.
    pub fn right() -> Self {
        Self {
            hip: BodyLandmark::RightHip.index(),
            knee: BodyLandmark::RightKnee.index(),
            ankle: BodyLandmark::RightAnkle.index(),
        }
    }

    pub fn for_side(side: LegSide) -> Self {
        match side {
            LegSide::Left => Self::left(),
            LegSide::Right => Self::right(),
        }
    }

    /// Check the mapping against the landmark count of the loaded model.
    ///
    /// Called once at session start; a mapping that fails here would make
    /// every frame unreliable.
    pub fn validate(&self, landmark_count: usize) -> KneecueResult<()> {
        for (name, index) in [("hip", self.hip), ("knee", self.knee), ("ankle", self.ankle)] {
            if index >= landmark_count {
                return Err(KneecueError::mapping(format!(
                    "{name} index {index} is out of range for a {landmark_count}-landmark model"
                )));
            }
        }
        if self.hip == self.knee || self.knee == self.ankle || self.hip == self.ankle {
            return Err(KneecueError::mapping(format!(
                "hip/knee/ankle indices must be distinct, got {}/{}/{}",
                self.hip, self.knee, self.ankle
            )));
        }
        Ok(())
    }
}

impl Default for LandmarkMapping {
    fn default() -> Self {
        Self::left()
    }
}
