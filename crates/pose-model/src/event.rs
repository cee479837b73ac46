//! Processor events and the host message protocol.
//!
//! Events are what the signal processor derives from one frame. Host
//! messages are what crosses the boundary to the host application; the
//! mapping between the two is total and checked at compile time.

use serde::{Deserialize, Serialize};

/// Status text sent when the detector found no body.
pub const STATUS_NO_POSE: &str = "no pose detected";

/// Status text sent when a required joint is missing or unusable.
pub const STATUS_JOINTS_UNRELIABLE: &str = "joints unreliable";

/// Discriminated union of processor outputs for a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A fresh knee angle reading.
    AngleUpdated {
        /// Interior knee angle in degrees, within [0, 180].
        angle_deg: f64,
    },

    /// The detector returned no pose instance.
    NoPoseDetected,

    /// A pose was detected but hip, knee, or ankle could not be used.
    JointsUnreliable,

    /// A coaching cue passed threshold and cooldown.
    CueFired {
        /// Instruction for the user.
        text: String,
    },
}

impl Event {
    /// Create an angle event.
    pub fn angle(angle_deg: f64) -> Self {
        Self::AngleUpdated { angle_deg }
    }

    /// Create a cue event.
    pub fn cue(text: impl Into<String>) -> Self {
        Self::CueFired { text: text.into() }
    }

    /// Extract the angle if this event carries one.
    pub fn angle_deg(&self) -> Option<f64> {
        match self {
            Event::AngleUpdated { angle_deg } => Some(*angle_deg),
            _ => None,
        }
    }

    pub fn is_cue(&self) -> bool {
        matches!(self, Event::CueFired { .. })
    }
}

/// Session lifecycle states reported to the host as status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Starting,
    Running,
    Stopped,
    CameraUnavailable(String),
    ModelLoadFailed(String),
    RenderTargetUnavailable(String),
    InvalidMapping(String),
}

impl SessionStatus {
    /// Whether this status ends a session start attempt.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            SessionStatus::Starting | SessionStatus::Running | SessionStatus::Stopped
        )
    }

    pub fn text(&self) -> String {
        match self {
            SessionStatus::Starting => "starting".to_string(),
            SessionStatus::Running => "running".to_string(),
            SessionStatus::Stopped => "stopped".to_string(),
            SessionStatus::CameraUnavailable(reason) => format!("camera unavailable: {reason}"),
            SessionStatus::ModelLoadFailed(reason) => format!("model load failed: {reason}"),
            SessionStatus::RenderTargetUnavailable(reason) => {
                format!("render target unavailable: {reason}")
            }
            SessionStatus::InvalidMapping(reason) => format!("landmark mapping invalid: {reason}"),
        }
    }
}

/// Outbound message to the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    /// Human-readable state string.
    Status { text: String },

    /// Numeric knee angle in degrees.
    PoseAngle { angle: f64 },

    /// Actionable instruction.
    Cue { text: String },
}

impl HostMessage {
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status { text: text.into() }
    }

    /// Whether a transport may coalesce or drop this message under
    /// backpressure. Cues are never droppable.
    pub fn is_droppable(&self) -> bool {
        !matches!(self, HostMessage::Cue { .. })
    }

    /// Message kind as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::Status { .. } => "STATUS",
            HostMessage::PoseAngle { .. } => "POSE_ANGLE",
            HostMessage::Cue { .. } => "CUE",
        }
    }
}

impl From<&Event> for HostMessage {
    fn from(event: &Event) -> Self {
        match event {
            Event::AngleUpdated { angle_deg } => HostMessage::PoseAngle { angle: *angle_deg },
            Event::NoPoseDetected => HostMessage::status(STATUS_NO_POSE),
            Event::JointsUnreliable => HostMessage::status(STATUS_JOINTS_UNRELIABLE),
            Event::CueFired { text } => HostMessage::Cue { text: text.clone() },
        }
    }
}

impl From<&SessionStatus> for HostMessage {
    fn from(status: &SessionStatus) -> Self {
        HostMessage::status(status.text())
    }
}

/// Parse host messages from JSONL content (one JSON object per line).
pub fn parse_host_messages(jsonl: &str) -> Result<Vec<HostMessage>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}
