//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KneecueError, KneecueResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Coaching cue tuning.
    pub cue: CueConfig,

    /// Which landmarks feed the knee angle and how much we trust them.
    pub landmarks: LandmarkConfig,

    /// Options passed to the external landmark detector.
    pub detector: DetectorOptions,

    /// Camera acquisition constraints.
    pub camera: CameraConstraints,

    /// Frame loop pacing.
    pub frame_loop: FrameLoopConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Threshold and cooldown for the knee cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// A cue is considered when the knee angle drops below this (degrees).
    pub threshold_deg: f64,

    /// Minimum time between two cues (milliseconds).
    pub cooldown_ms: f64,

    /// Instruction text delivered to the host.
    pub text: String,
}

/// Leg whose hip/knee/ankle drive the angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LegSide {
    #[default]
    Left,
    Right,
}

/// Landmark selection and confidence floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Which leg to track.
    pub side: LegSide,

    /// Points with a confidence below this are treated as absent.
    pub min_confidence: f64,

    /// Landmark count the detector model is expected to produce.
    pub expected_landmark_count: usize,
}

/// Detector running mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunningMode {
    Image,
    #[default]
    Video,
}

/// Options for creating the landmark detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Location of the pose landmarker model asset.
    pub model_asset_path: String,

    /// Location of the detector runtime assets.
    pub wasm_assets_path: String,

    /// Maximum number of poses the detector reports per frame.
    pub num_poses: u32,

    /// Per-image or per-video-frame inference.
    pub running_mode: RunningMode,
}

/// Preferred camera direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    User,
    #[default]
    Environment,
}

/// Constraints used when opening the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CameraConstraints {
    /// Ideal facing mode.
    pub facing_mode: FacingMode,

    /// Whether to request an audio track as well.
    pub audio: bool,
}

/// Frame loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    /// Target iterations per second (display refresh). 0 = unpaced.
    pub target_fps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "kneecue_session=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            threshold_deg: 90.0,
            cooldown_ms: 1_500.0,
            text: "straighten your knees".to_string(),
        }
    }
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            side: LegSide::Left,
            min_confidence: 0.5,
            expected_landmark_count: 33,
        }
    }
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            model_asset_path: "https://storage.googleapis.com/mediapipe-models/pose_landmarker/pose_landmarker_lite/float16/1/pose_landmarker_lite.task".to_string(),
            wasm_assets_path: "https://cdn.jsdelivr.net/npm/@mediapipe/tasks-vision@0.10.7/wasm".to_string(),
            num_poses: 1,
            running_mode: RunningMode::Video,
        }
    }
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self { target_fps: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], any
    /// failure is reported.
    pub fn load_from(path: &Path) -> KneecueResult<Self> {
        if !path.exists() {
            return Err(KneecueError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Overwrite the stored config with defaults and return them.
    pub fn reset() -> Result<Self, std::io::Error> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Path the config is loaded from and saved to.
    pub fn path() -> PathBuf {
        config_file_path()
    }

    /// Reject values the signal core cannot work with.
    pub fn validate(&self) -> KneecueResult<()> {
        if !self.cue.threshold_deg.is_finite()
            || !(0.0..=180.0).contains(&self.cue.threshold_deg)
        {
            return Err(KneecueError::config(format!(
                "cue.threshold_deg must be within [0, 180], got {}",
                self.cue.threshold_deg
            )));
        }
        if !self.cue.cooldown_ms.is_finite() || self.cue.cooldown_ms < 0.0 {
            return Err(KneecueError::config(format!(
                "cue.cooldown_ms must be a non-negative number, got {}",
                self.cue.cooldown_ms
            )));
        }
        if self.cue.text.trim().is_empty() {
            return Err(KneecueError::config("cue.text must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.landmarks.min_confidence) {
            return Err(KneecueError::config(format!(
                "landmarks.min_confidence must be within [0, 1], got {}",
                self.landmarks.min_confidence
            )));
        }
        if self.landmarks.expected_landmark_count == 0 {
            return Err(KneecueError::config(
                "landmarks.expected_landmark_count must be positive",
            ));
        }
        if self.detector.num_poses == 0 {
            return Err(KneecueError::config("detector.num_poses must be at least 1"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("kneecue").join("config.json")
}
