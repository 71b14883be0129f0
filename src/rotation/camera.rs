//! Pinhole-camera rotation model: `H = K · Rz · Rx · Ry · K⁻¹`.
//!
//! The focal length is a calibration constant proportional to the larger
//! frame side, the principal point sits at the frame center. After composing
//! the rotation the homography is normalized so the frame center maps onto
//! itself, which keeps the image from drifting at larger angles.

use nalgebra::Matrix3;

use super::{rotation_x, rotation_y, rotation_z, RotationModel};
use crate::config::EngineConfig;
use crate::homography::transform_point;
use crate::types::{Frame, GeometryParams, RotationParams};

pub struct CameraModel {
    focal_factor: f64,
}

impl CameraModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            focal_factor: config.camera_focal_factor,
        }
    }

    /// Raw (un-normalized) rotation homography for the given angles.
    pub fn homography(&self, rotation: RotationParams, frame: Frame) -> Matrix3<f64> {
        if frame.is_empty() {
            return Matrix3::identity();
        }
        let rot = rotation.clamped();
        let focal = self.focal_factor * frame.w().max(frame.h());
        let [cx, cy] = frame.center();

        let k = Matrix3::new(focal, 0.0, cx, 0.0, focal, cy, 0.0, 0.0, 1.0);
        let k_inv = Matrix3::new(
            1.0 / focal,
            0.0,
            -cx / focal,
            0.0,
            1.0 / focal,
            -cy / focal,
            0.0,
            0.0,
            1.0,
        );
        let r = rotation_z(rot.roll.to_radians())
            * rotation_x(rot.pitch.to_radians())
            * rotation_y(rot.yaw.to_radians());
        k * r * k_inv
    }

    /// Translates the homography so the frame center stays fixed.
    fn recenter(h: Matrix3<f64>, frame: Frame) -> Matrix3<f64> {
        let center = frame.center();
        let Some(moved) = transform_point(&h, center) else {
            return Matrix3::identity();
        };
        let t = Matrix3::new(
            1.0,
            0.0,
            center[0] - moved[0],
            0.0,
            1.0,
            center[1] - moved[1],
            0.0,
            0.0,
            1.0,
        );
        t * h
    }
}

impl RotationModel for CameraModel {
    fn forward(&self, params: &GeometryParams, frame: Frame) -> Matrix3<f64> {
        if frame.is_empty() || params.rotation.is_neutral() {
            return Matrix3::identity();
        }
        Self::recenter(self.homography(params.rotation, frame), frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CameraModel {
        CameraModel::new(&EngineConfig::default())
    }

    #[test]
    fn center_stays_fixed() {
        let frame = Frame::new(1200, 900);
        let params = GeometryParams {
            rotation: RotationParams::new(12.0, -7.0, 3.0),
            ..Default::default()
        };
        let h = model().forward(&params, frame);
        let c = transform_point(&h, frame.center()).unwrap();
        assert!((c[0] - 600.0).abs() < 1e-6 && (c[1] - 450.0).abs() < 1e-6);
    }

    #[test]
    fn pure_roll_matches_plane_rotation() {
        let frame = Frame::new(1000, 1000);
        let h = model().homography(RotationParams::new(0.0, 0.0, 90.0), frame);
        // Roll by 90° about the center maps (600, 500) onto (500, 600).
        let p = transform_point(&h, [600.0, 500.0]).unwrap();
        assert!((p[0] - 500.0).abs() < 1e-6 && (p[1] - 600.0).abs() < 1e-6);
    }

    #[test]
    fn yaw_converges_left_or_right() {
        let frame = Frame::new(1000, 1000);
        let params = GeometryParams {
            rotation: RotationParams::new(15.0, 0.0, 0.0),
            ..Default::default()
        };
        let h = model().forward(&params, frame);
        let tl = transform_point(&h, [0.0, 0.0]).unwrap();
        let bl = transform_point(&h, [0.0, 1000.0]).unwrap();
        let tr = transform_point(&h, [1000.0, 0.0]).unwrap();
        let br = transform_point(&h, [1000.0, 1000.0]).unwrap();
        let left_height = bl[1] - tl[1];
        let right_height = br[1] - tr[1];
        assert!(
            (left_height - right_height).abs() > 1.0,
            "yaw should tilt vertical edges: left={left_height} right={right_height}"
        );
    }
}
