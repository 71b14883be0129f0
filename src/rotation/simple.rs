//! Sequential per-axis rotation model.
//!
//! Corrects one axis at a time: the frame corners are rotated in 3D around
//! the X axis (pitch), re-centered and re-scaled against a fixed reference
//! segment, then the same is repeated around the Y axis (yaw). Roll is
//! applied last as a plain 2D rotation with no correction. The homography is
//! recovered from the four corner correspondences.

use nalgebra::Matrix3;

use super::RotationModel;
use crate::config::EngineConfig;
use crate::homography::homography_from_corners;
use crate::types::{Frame, GeometryParams};

/// Diagonal of a 36×24 mm full frame: `sqrt(36² + 24²) = 12·√13`.
const FULL_FRAME_DIAGONAL_MM: f64 = 43.266615305567875;

/// Half-length of the reference segment used to restore scale after each
/// axis correction.
const REFERENCE_LEN: f64 = 100.0;

pub struct SimpleModel {
    focal_mm: f64,
}

impl SimpleModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            focal_mm: config.simple_focal_mm,
        }
    }

    /// Rotates a centered point in 3D (X, then Y, then Z axis) and projects
    /// it back onto the `z = z_fix` plane.
    fn project(&self, z_fix: f64, ud: f64, lr: f64, rot: f64, x_in: f64, y_in: f64) -> [f64; 2] {
        let (mut x, mut y, mut z) = (x_in, y_in, z_fix);

        let (s, c) = ud.sin_cos();
        (y, z) = (c * y - s * z, s * y + c * z);

        let (s, c) = lr.sin_cos();
        (x, z) = (c * x - s * z, s * x + c * z);

        let (s, c) = rot.sin_cos();
        (x, y) = (c * x - s * y, s * x + c * y);

        if z.abs() < 1e-10 {
            z = 1e-10;
        }
        let z_scale = z_fix / z;
        [x * z_scale, y * z_scale]
    }

    /// Pitch stage: rotate corners around X, remove the vertical offset the
    /// rotation introduced and re-scale so a horizontal reference segment
    /// keeps its length.
    fn transform_ud(&self, z_fix: f64, corners: &mut [[f64; 2]; 4], ud: f64) {
        for p in corners.iter_mut() {
            *p = self.project(z_fix, ud, 0.0, 0.0, p[0], p[1]);
        }
        let [scx, cy] = self.project(z_fix, ud, 0.0, 0.0, REFERENCE_LEN, 0.0);
        let scale = if scx.abs() > 1e-6 {
            REFERENCE_LEN / scx
        } else {
            1.0
        };
        for p in corners.iter_mut() {
            p[1] -= cy;
            p[0] *= scale;
            p[1] *= scale;
        }
    }

    /// Yaw stage: same as the pitch stage with the axes swapped, measured
    /// against a vertical reference segment.
    fn transform_lr(&self, z_fix: f64, corners: &mut [[f64; 2]; 4], lr: f64) {
        for p in corners.iter_mut() {
            *p = self.project(z_fix, 0.0, lr, 0.0, p[0], p[1]);
        }
        let [cx, scy] = self.project(z_fix, 0.0, lr, 0.0, 0.0, REFERENCE_LEN);
        let scale = if scy.abs() > 1e-6 {
            REFERENCE_LEN / scy
        } else {
            1.0
        };
        for p in corners.iter_mut() {
            p[0] -= cx;
            p[0] *= scale;
            p[1] *= scale;
        }
    }

    /// Roll stage: plain 2D rotation, no re-centering or re-scaling.
    fn transform_rot(&self, z_fix: f64, corners: &mut [[f64; 2]; 4], rot: f64) {
        for p in corners.iter_mut() {
            *p = self.project(z_fix, 0.0, 0.0, rot, p[0], p[1]);
        }
    }
}

impl RotationModel for SimpleModel {
    fn forward(&self, params: &GeometryParams, frame: Frame) -> Matrix3<f64> {
        if frame.is_empty() {
            return Matrix3::identity();
        }
        let rot = params.rotation.clamped();
        if rot.is_neutral() {
            return Matrix3::identity();
        }

        let z_fix = frame.diagonal() * self.focal_mm / FULL_FRAME_DIAGONAL_MM;
        let [cx, cy] = frame.center();
        let (w, h) = (frame.w(), frame.h());

        // Corners relative to the frame center: UL, UR, LL, LR.
        let mut corners = [
            [-cx, -cy],
            [w - cx, -cy],
            [-cx, h - cy],
            [w - cx, h - cy],
        ];
        self.transform_ud(z_fix, &mut corners, rot.pitch.to_radians());
        self.transform_lr(z_fix, &mut corners, rot.yaw.to_radians());
        self.transform_rot(z_fix, &mut corners, rot.roll.to_radians());

        let src = [[0.0, 0.0], [w, 0.0], [0.0, h], [w, h]];
        let dst = [
            [corners[0][0] + cx, corners[0][1] + cy],
            [corners[1][0] + cx, corners[1][1] + cy],
            [corners[2][0] + cx, corners[2][1] + cy],
            [corners[3][0] + cx, corners[3][1] + cy],
        ];
        homography_from_corners(&src, &dst).unwrap_or_else(Matrix3::identity)
    }
}
