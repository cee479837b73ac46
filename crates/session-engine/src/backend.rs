//! Collaborator interfaces for capture, detection, and rendering.
//!
//! The session never talks to a camera, a model runtime, or a drawing
//! surface directly. A [`CaptureBackend`] acquires each of them at start
//! and hands back trait objects the frame loop owns until stop.

use kneecue_common::config::{CameraConstraints, DetectorOptions};
use kneecue_common::error::KneecueResult;
use kneecue_pose_model::landmark::DetectorOutput;
use kneecue_signal_core::skeleton::SkeletonOverlay;

/// One captured video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Zero-based position in the stream.
    pub index: u64,

    /// Capture time in milliseconds since the stream started.
    pub timestamp_ms: f64,

    pub width: u32,
    pub height: u32,

    /// Opaque pixel payload. Sources that feed a detector by other
    /// means (recordings, generators) leave it empty.
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// A frame with no pixel payload.
    pub fn empty(index: u64, timestamp_ms: f64, width: u32, height: u32) -> Self {
        Self {
            index,
            timestamp_ms,
            width,
            height,
            data: Vec::new(),
        }
    }
}

/// A live or recorded video stream.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// Await the next frame. `Ok(None)` means the stream has ended.
    async fn next_frame(&mut self) -> KneecueResult<Option<VideoFrame>>;

    /// Native frame size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Release the underlying device. Calling it twice is harmless.
    async fn release(&mut self) -> KneecueResult<()>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Per-frame landmark inference. Internals are opaque.
#[async_trait::async_trait]
pub trait LandmarkDetector: Send {
    /// Run the model on one frame. May suspend while inference runs.
    async fn detect(
        &mut self,
        frame: &VideoFrame,
        timestamp_ms: f64,
    ) -> KneecueResult<DetectorOutput>;

    /// Number of landmarks the loaded model reports per pose.
    fn landmark_count(&self) -> usize;

    /// Detector name for logging.
    fn name(&self) -> &str;
}

/// Drawing surface for the skeleton overlay.
pub trait SkeletonRenderer: Send {
    /// Match the surface to the video size.
    fn resize(&mut self, width: u32, height: u32);

    /// Clear the surface and paint `overlay`. An empty overlay just clears.
    fn draw(&mut self, overlay: &SkeletonOverlay);

    /// Clear without painting.
    fn clear(&mut self);
}

/// Acquires the capture-side resources a session needs.
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Load the landmark model and its runtime assets.
    async fn load_detector(
        &mut self,
        options: &DetectorOptions,
    ) -> KneecueResult<Box<dyn LandmarkDetector>>;

    /// Open the camera with the given constraints.
    async fn open_camera(
        &mut self,
        constraints: &CameraConstraints,
    ) -> KneecueResult<Box<dyn FrameSource>>;

    /// Find the render target by id and prepare a renderer for it.
    fn attach_render_target(&mut self, target_id: &str) -> KneecueResult<Box<dyn SkeletonRenderer>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Renderer that keeps nothing but counters. Used when the host has no
/// drawing surface (CLI replays, headless runs).
#[derive(Debug, Default, Clone)]
pub struct NullRenderer {
    target_id: String,
    size: (u32, u32),
    frames_drawn: u64,
    clears: u64,
}

impl NullRenderer {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            ..Self::default()
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }
}

impl SkeletonRenderer for NullRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn draw(&mut self, overlay: &SkeletonOverlay) {
        self.clears += 1;
        if !overlay.is_empty() {
            self.frames_drawn += 1;
        }
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kneecue_pose_model::landmark::RawLandmark;
    use kneecue_signal_core::skeleton::OverlayStyle;

    #[test]
    fn test_null_renderer_counts() {
        let mut renderer = NullRenderer::new("pose-container");
        renderer.resize(640, 480);
        assert_eq!(renderer.size(), (640, 480));

        let style = OverlayStyle::default();
        renderer.draw(&SkeletonOverlay::build(&DetectorOutput::empty(), 640, 480, &style));
        let pose = vec![RawLandmark::new(0.5, 0.5, 0.0, None)];
        renderer.draw(&SkeletonOverlay::build(&DetectorOutput::single(pose), 640, 480, &style));

        assert_eq!(renderer.frames_drawn(), 1);
        assert_eq!(renderer.clears(), 2);
        assert_eq!(renderer.target_id(), "pose-container");
    }
}
