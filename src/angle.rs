//! Angle helpers shared by the guided solver and the line detector.
//!
//! All angles are in degrees; a segment angle is `atan2(dy, dx)` of its
//! endpoint difference, in (-180, 180].

/// Raw angle of the segment `p1 -> p2` in degrees.
#[inline]
pub fn segment_angle_deg(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    (p2[1] - p1[1]).atan2(p2[0] - p1[0]).to_degrees()
}

/// Unsigned deviation from the nearest vertical target (+90° or -90°).
#[inline]
pub fn vertical_deviation_deg(angle_deg: f64) -> f64 {
    (angle_deg.abs() - 90.0).abs()
}

/// Unsigned deviation from the nearest horizontal target (0° or 180°).
#[inline]
pub fn horizontal_deviation_deg(angle_deg: f64) -> f64 {
    let d = angle_deg.abs();
    if d > 90.0 {
        180.0 - d
    } else {
        d
    }
}

/// Signed deviation from vertical: how far the segment leans off ±90°.
/// Positive values lean the same way for both upward and downward segments.
#[inline]
pub fn signed_vertical_deviation_deg(angle_deg: f64) -> f64 {
    if angle_deg > 0.0 {
        angle_deg - 90.0
    } else {
        angle_deg + 90.0
    }
}

/// Signed deviation from horizontal, folding the 180° branch back to zero.
#[inline]
pub fn signed_horizontal_deviation_deg(angle_deg: f64) -> f64 {
    if angle_deg.abs() > 90.0 {
        if angle_deg > 0.0 {
            angle_deg - 180.0
        } else {
            angle_deg + 180.0
        }
    } else {
        angle_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn segment_angles() {
        assert!(approx_eq(segment_angle_deg([0.0, 0.0], [1.0, 0.0]), 0.0));
        assert!(approx_eq(segment_angle_deg([0.0, 0.0], [0.0, 1.0]), 90.0));
        assert!(approx_eq(segment_angle_deg([0.0, 0.0], [-1.0, 0.0]), 180.0));
        assert!(approx_eq(segment_angle_deg([0.0, 0.0], [0.0, -1.0]), -90.0));
    }

    #[test]
    fn vertical_deviation_is_symmetric() {
        assert!(approx_eq(vertical_deviation_deg(90.0), 0.0));
        assert!(approx_eq(vertical_deviation_deg(-90.0), 0.0));
        assert!(approx_eq(vertical_deviation_deg(80.0), 10.0));
        assert!(approx_eq(vertical_deviation_deg(-100.0), 10.0));
    }

    #[test]
    fn horizontal_deviation_folds_both_branches() {
        assert!(approx_eq(horizontal_deviation_deg(0.0), 0.0));
        assert!(approx_eq(horizontal_deviation_deg(180.0), 0.0));
        assert!(approx_eq(horizontal_deviation_deg(-175.0), 5.0));
        assert!(approx_eq(horizontal_deviation_deg(12.0), 12.0));
    }

    #[test]
    fn signed_deviations() {
        assert!(approx_eq(signed_vertical_deviation_deg(80.0), -10.0));
        assert!(approx_eq(signed_vertical_deviation_deg(-80.0), 10.0));
        assert!(approx_eq(signed_horizontal_deviation_deg(170.0), -10.0));
        assert!(approx_eq(signed_horizontal_deviation_deg(-170.0), 10.0));
        assert!(approx_eq(signed_horizontal_deviation_deg(5.0), 5.0));
    }
}
