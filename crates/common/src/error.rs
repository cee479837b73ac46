//! Error types shared across KneeCue crates.

use std::path::PathBuf;

/// Top-level error type for KneeCue operations.
///
/// Transient detection gaps are never errors; they travel as events.
/// Everything here is either fatal to a session start or a bad input
/// handed to a tool.
#[derive(Debug, thiserror::Error)]
pub enum KneecueError {
    #[error("Camera error: {message}")]
    Camera { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Model load error: {message}")]
    ModelLoad { message: String },

    #[error("Render target error: {message}")]
    RenderTarget { message: String },

    #[error("Landmark mapping error: {message}")]
    Mapping { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Replay error: {message}")]
    Replay { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using KneecueError.
pub type KneecueResult<T> = Result<T, KneecueError>;

impl KneecueError {
    pub fn camera(msg: impl Into<String>) -> Self {
        Self::Camera {
            message: msg.into(),
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad {
            message: msg.into(),
        }
    }

    pub fn render_target(msg: impl Into<String>) -> Self {
        Self::RenderTarget {
            message: msg.into(),
        }
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    /// Whether this error comes from acquiring the camera stream.
    pub fn is_capture_failure(&self) -> bool {
        matches!(self, Self::Camera { .. } | Self::PermissionDenied { .. })
    }
}
