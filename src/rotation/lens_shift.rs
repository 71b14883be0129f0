//! Exponential lens-shift rotation model.
//!
//! Replicates the classic shift-lens correction pipeline: the keystone
//! amount enters through an `exp(shift)` term rather than a 3D rotation, and
//! the full transform is a fixed chain of per-step matrices. The step order
//! is load-bearing; reordering changes the output.
//!
//! In this model the yaw/pitch parameters are keystone sliders in
//! [-100, 100] (divided by 50 before exponentiation), roll is a plain
//! rotation, and shear, ortho-correction and aspect are consumed here
//! instead of the downstream pipeline stages.

use nalgebra::{Matrix3, Vector3};

use super::RotationModel;
use crate::config::EngineConfig;
use crate::types::{Frame, GeometryParams};

/// Keystone slider to exponential shift parameter.
const SHIFT_SLIDER_DIVISOR: f64 = 50.0;
/// Shear slider normalization.
const SHEAR_SLIDER_DIVISOR: f64 = 100.0;
/// Clamp for the shift-derived tilt angle (radians).
const ALPHA_LIMIT: f64 = 1.5;
/// Floor for the compensating compression factors.
const COMPRESSION_FLOOR: f64 = 0.1;

pub struct LensShiftModel {
    focal_mm: f64,
}

/// Exponential shift terms for one axis: the `exp` parameter itself and the
/// compensating compression factor.
struct ShiftTerms {
    exppa: f64,
    compression: f64,
}

impl LensShiftModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            focal_mm: config.lens_shift_focal_mm,
        }
    }

    /// `near` is the frame extent along the shifted axis, `far` the other one.
    fn shift_terms(&self, shift: f64, near: f64, far: f64, orthocorr: f64) -> ShiftTerms {
        let orthofac = 1.0 - orthocorr / 100.0;
        let exppa = shift.exp();
        let fdb = self.focal_mm / (14.4 + (near / far - 1.0) * 7.2);
        let rad = fdb * (exppa - 1.0) / (exppa + 1.0);
        let alpha = rad.atan().clamp(-ALPHA_LIMIT, ALPHA_LIMIT);
        let rt = (0.5 * alpha).sin();
        let compression = (2.0 * (orthofac - 1.0) * rt * rt + 1.0).max(COMPRESSION_FLOOR);
        ShiftTerms { exppa, compression }
    }
}

impl RotationModel for LensShiftModel {
    fn forward(&self, params: &GeometryParams, frame: Frame) -> Matrix3<f64> {
        if frame.is_empty() {
            return Matrix3::identity();
        }
        let u = frame.w();
        let v = frame.h();

        let phi = params.rotation.roll.to_radians();
        let (sini, cosi) = phi.sin_cos();
        let shift_v = params.rotation.pitch.clamp(-100.0, 100.0) / SHIFT_SLIDER_DIVISOR;
        let shift_h = params.rotation.yaw.clamp(-100.0, 100.0) / SHIFT_SLIDER_DIVISOR;
        let shear = params.shear.clamp(-100.0, 100.0) / SHEAR_SLIDER_DIVISOR;
        let orthocorr = params.ortho_correction.clamp(0.0, 100.0);
        let ascale = params.aspect.max(1e-4).sqrt();

        let vert = self.shift_terms(shift_v, v, u, orthocorr);
        let hori = self.shift_terms(shift_h, u, v, orthocorr);

        // Step 1: swap x/y, the chain operates on (y : x : 1) coordinates.
        let flip = Matrix3::new(0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let mut h = flip;

        // Step 2: rotation around the frame center.
        h = Matrix3::new(
            cosi,
            -sini,
            -0.5 * v * cosi + 0.5 * u * sini + 0.5 * v,
            sini,
            cosi,
            -0.5 * v * sini - 0.5 * u * cosi + 0.5 * u,
            0.0,
            0.0,
            1.0,
        ) * h;

        // Step 3: symmetric shear.
        h = Matrix3::new(1.0, shear, 0.0, shear, 1.0, 0.0, 0.0, 0.0, 1.0) * h;

        // Step 4: vertical lens shift.
        h = Matrix3::new(
            vert.exppa,
            0.0,
            0.0,
            0.5 * ((vert.exppa - 1.0) * u) / v,
            2.0 * vert.exppa / (vert.exppa + 1.0),
            -0.5 * ((vert.exppa - 1.0) * u) / (vert.exppa + 1.0),
            (vert.exppa - 1.0) / v,
            0.0,
            1.0,
        ) * h;

        // Step 5: horizontal compression compensating the vertical shift.
        h = Matrix3::new(
            1.0,
            0.0,
            0.0,
            0.0,
            vert.compression,
            0.5 * u * (1.0 - vert.compression),
            0.0,
            0.0,
            1.0,
        ) * h;

        // Step 6: swap x/y back.
        h = flip * h;

        // Step 7: horizontal lens shift.
        h = Matrix3::new(
            hori.exppa,
            0.0,
            0.0,
            0.5 * ((hori.exppa - 1.0) * v) / u,
            2.0 * hori.exppa / (hori.exppa + 1.0),
            -0.5 * ((hori.exppa - 1.0) * v) / (hori.exppa + 1.0),
            (hori.exppa - 1.0) / u,
            0.0,
            1.0,
        ) * h;

        // Step 8: vertical compression compensating the horizontal shift.
        h = Matrix3::new(
            1.0,
            0.0,
            0.0,
            0.0,
            hori.compression,
            0.5 * v * (1.0 - hori.compression),
            0.0,
            0.0,
            1.0,
        ) * h;

        // Step 9: anisotropic aspect scaling.
        h = Matrix3::new(ascale, 0.0, 0.0, 0.0, 1.0 / ascale, 0.0, 0.0, 0.0, 1.0) * h;

        // Step 10: shift the result so no corner lands at negative coordinates.
        let mut umin = f64::INFINITY;
        let mut vmin = f64::INFINITY;
        for y in [0.0, v - 1.0] {
            for x in [0.0, u - 1.0] {
                let po = h * Vector3::new(x, y, 1.0);
                if po[2] != 0.0 {
                    umin = umin.min(po[0] / po[2]);
                    vmin = vmin.min(po[1] / po[2]);
                }
            }
        }
        if !umin.is_finite() || !vmin.is_finite() {
            return Matrix3::identity();
        }
        Matrix3::new(1.0, 0.0, -umin, 0.0, 1.0, -vmin, 0.0, 0.0, 1.0) * h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homography::transform_point;
    use crate::types::RotationParams;

    fn build(params: GeometryParams) -> Matrix3<f64> {
        LensShiftModel::new(&EngineConfig::default()).forward(&params, Frame::new(800, 600))
    }

    #[test]
    fn corners_stay_non_negative() {
        let params = GeometryParams {
            rotation: RotationParams::new(30.0, -45.0, 4.0),
            shear: 10.0,
            ortho_correction: 20.0,
            aspect: 1.1,
            ..Default::default()
        };
        let h = build(params);
        for corner in [[0.0, 0.0], [799.0, 0.0], [0.0, 599.0], [799.0, 599.0]] {
            let p = transform_point(&h, corner).unwrap();
            assert!(p[0] >= -1e-6 && p[1] >= -1e-6, "corner went negative: {p:?}");
        }
    }

    #[test]
    fn vertical_shift_converges_verticals() {
        let params = GeometryParams {
            rotation: RotationParams::new(0.0, 40.0, 0.0),
            ..Default::default()
        };
        let h = build(params);
        let tl = transform_point(&h, [0.0, 0.0]).unwrap();
        let tr = transform_point(&h, [800.0, 0.0]).unwrap();
        let bl = transform_point(&h, [0.0, 600.0]).unwrap();
        let br = transform_point(&h, [800.0, 600.0]).unwrap();
        let top = tr[0] - tl[0];
        let bottom = br[0] - bl[0];
        assert!(
            (top - bottom).abs() > 1.0,
            "vertical keystone should change top/bottom widths: {top} vs {bottom}"
        );
    }

    #[test]
    fn pure_shear_is_not_identity() {
        let params = GeometryParams {
            shear: 25.0,
            ..Default::default()
        };
        let h = build(params);
        let p = transform_point(&h, [100.0, 100.0]).unwrap();
        assert!((p[0] - 100.0).abs() > 1.0 || (p[1] - 100.0).abs() > 1.0);
    }
}
