//! Joint angle geometry.

use kneecue_pose_model::frame::Point2D;

/// Rays shorter than this are treated as zero-length.
pub const DEGENERATE_RAY_LENGTH: f64 = 1e-9;

/// Interior angle at vertex `b` between rays `b→a` and `b→c`, in degrees.
///
/// Each ray's direction is taken with `atan2`, the absolute difference is
/// reflected above 180° so the result is always the non-reflex angle in
/// `[0, 180]`. Swapping `a` and `c` gives the same value.
///
/// Returns `NaN` when either ray has zero length (`a == b` or `c == b`)
/// or an input is non-finite; callers must treat a non-finite angle as an
/// unreliable reading.
pub fn angle_deg(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    if is_degenerate(a, b, c) {
        return f64::NAN;
    }

    let ray_a = (a.y - b.y).atan2(a.x - b.x);
    let ray_c = (c.y - b.y).atan2(c.x - b.x);

    let mut degrees = (ray_c - ray_a).to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    degrees.clamp(0.0, 180.0)
}

/// Whether the triple cannot produce a meaningful angle.
pub fn is_degenerate(a: Point2D, b: Point2D, c: Point2D) -> bool {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return true;
    }
    a.distance_to(&b) < DEGENERATE_RAY_LENGTH || c.distance_to(&b) < DEGENERATE_RAY_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_straight_leg() {
        let angle = angle_deg(p(0.5, 0.2), p(0.5, 0.5), p(0.5, 0.8));
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle_bend() {
        let angle = angle_deg(p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_reflex_difference_is_reflected() {
        // Rays at +170° and -170°: raw difference 340°, interior angle 20°.
        let b = p(0.0, 0.0);
        let a = p((170f64).to_radians().cos(), (170f64).to_radians().sin());
        let c = p((-170f64).to_radians().cos(), (-170f64).to_radians().sin());
        assert!((angle_deg(a, b, c) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_input_is_nan() {
        let b = p(0.4, 0.4);
        assert!(angle_deg(b, b, p(0.9, 0.9)).is_nan());
        assert!(angle_deg(p(0.1, 0.1), b, b).is_nan());
        assert!(angle_deg(p(f64::NAN, 0.1), b, p(0.9, 0.9)).is_nan());
    }

    fn coord() -> impl Strategy<Value = f64> {
        0.0f64..1.0
    }

    proptest! {
        #[test]
        fn prop_symmetric_under_endpoint_swap(
            ax in coord(), ay in coord(),
            bx in coord(), by in coord(),
            cx in coord(), cy in coord(),
        ) {
            let (a, b, c) = (p(ax, ay), p(bx, by), p(cx, cy));
            prop_assume!(!is_degenerate(a, b, c));
            let forward = angle_deg(a, b, c);
            let backward = angle_deg(c, b, a);
            prop_assert!((forward - backward).abs() < 1e-9);
        }

        #[test]
        fn prop_range_is_zero_to_180(
            ax in coord(), ay in coord(),
            bx in coord(), by in coord(),
            cx in coord(), cy in coord(),
        ) {
            let (a, b, c) = (p(ax, ay), p(bx, by), p(cx, cy));
            prop_assume!(!is_degenerate(a, b, c));
            let angle = angle_deg(a, b, c);
            prop_assert!(angle.is_finite());
            prop_assert!((0.0..=180.0).contains(&angle));
        }
    }
}
