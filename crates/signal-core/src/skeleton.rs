//! Skeleton overlay geometry.
//!
//! The render side branch draws every detected pose as dots at each
//! landmark and line segments along the body model's connections. This
//! module only computes pixel-space geometry; a renderer paints it.
//! The overlay never feeds back into the angle or cue path.

use serde::{Deserialize, Serialize};

use kneecue_pose_model::frame::Point2D;
use kneecue_pose_model::landmark::{DetectorOutput, RawLandmark, POSE_CONNECTIONS};

/// Visual parameters for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Landmark dot radius in pixels.
    pub dot_radius: f64,
    /// CSS-style dot fill color.
    pub dot_color: String,
    /// Connection line width in pixels.
    pub line_width: f64,
    /// CSS-style connection stroke color.
    pub line_color: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            dot_radius: 3.0,
            dot_color: "rgba(102, 255, 178, 0.9)".to_string(),
            line_width: 3.0,
            line_color: "rgba(0, 255, 170, 0.8)".to_string(),
        }
    }
}

/// A line between two connected landmarks, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point2D,
    pub to: Point2D,
}

/// Everything needed to paint one frame of the overlay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkeletonOverlay {
    pub width: u32,
    pub height: u32,
    pub dots: Vec<Point2D>,
    pub segments: Vec<Segment>,
    pub style: OverlayStyle,
}

impl SkeletonOverlay {
    /// Build the overlay for all poses in `output`, scaled to a
    /// `width` × `height` render surface.
    pub fn build(output: &DetectorOutput, width: u32, height: u32, style: &OverlayStyle) -> Self {
        let to_pixels = |landmark: &RawLandmark| {
            let point = Point2D::new(landmark.x * width as f64, landmark.y * height as f64);
            point.is_finite().then_some(point)
        };

        let mut dots = Vec::new();
        let mut segments = Vec::new();

        for pose in &output.poses {
            dots.extend(pose.iter().filter_map(to_pixels));

            for (a, b) in POSE_CONNECTIONS {
                let (Some(from), Some(to)) = (
                    pose.get(a).and_then(to_pixels),
                    pose.get(b).and_then(to_pixels),
                ) else {
                    continue;
                };
                segments.push(Segment { from, to });
            }
        }

        Self {
            width,
            height,
            dots,
            segments,
            style: style.clone(),
        }
    }

    /// True when there is nothing to draw; the renderer just clears.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty() && self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kneecue_pose_model::landmark::POSE_LANDMARK_COUNT;

    fn full_pose() -> Vec<RawLandmark> {
        (0..POSE_LANDMARK_COUNT)
            .map(|i| RawLandmark::new(i as f64 / 40.0, 0.5, 0.0, Some(0.9)))
            .collect()
    }

    #[test]
    fn test_empty_output_draws_nothing() {
        let overlay = SkeletonOverlay::build(&DetectorOutput::empty(), 640, 480, &OverlayStyle::default());
        assert!(overlay.is_empty());
        assert_eq!((overlay.width, overlay.height), (640, 480));
    }

    #[test]
    fn test_full_pose_draws_every_connection() {
        let overlay =
            SkeletonOverlay::build(&DetectorOutput::single(full_pose()), 640, 480, &OverlayStyle::default());
        assert_eq!(overlay.dots.len(), POSE_LANDMARK_COUNT);
        assert_eq!(overlay.segments.len(), POSE_CONNECTIONS.len());
    }

    #[test]
    fn test_coordinates_are_scaled_to_pixels() {
        let pose = vec![RawLandmark::new(0.25, 0.5, 0.0, None)];
        let overlay = SkeletonOverlay::build(&DetectorOutput::single(pose), 800, 600, &OverlayStyle::default());
        assert_eq!(overlay.dots, vec![Point2D::new(200.0, 300.0)]);
        assert!(overlay.segments.is_empty());
    }

    #[test]
    fn test_non_finite_landmark_drops_its_segments() {
        let mut pose = full_pose();
        pose[25].y = f64::NAN;
        let overlay = SkeletonOverlay::build(&DetectorOutput::single(pose), 100, 100, &OverlayStyle::default());
        let touching_knee = POSE_CONNECTIONS
            .iter()
            .filter(|(a, b)| *a == 25 || *b == 25)
            .count();
        assert_eq!(overlay.dots.len(), POSE_LANDMARK_COUNT - 1);
        assert_eq!(overlay.segments.len(), POSE_CONNECTIONS.len() - touching_knee);
    }

    #[test]
    fn test_all_poses_are_drawn() {
        let output = DetectorOutput {
            poses: vec![full_pose(), full_pose()],
        };
        let overlay = SkeletonOverlay::build(&output, 100, 100, &OverlayStyle::default());
        assert_eq!(overlay.segments.len(), 2 * POSE_CONNECTIONS.len());
    }
}
