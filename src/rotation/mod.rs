//! Rotation models: strategies converting a parameter set into a homography.

pub mod camera;
pub mod lens_shift;
pub mod simple;

use nalgebra::Matrix3;

use crate::config::EngineConfig;
use crate::homography::{safe_invert, Direction};
use crate::types::{Frame, GeometryParams, RotationStrategy};

pub use camera::CameraModel;
pub use lens_shift::LensShiftModel;
pub use simple::SimpleModel;

/// Strategy interface shared by the rotation models.
///
/// Implementations only provide the forward (source → destination) matrix;
/// the backward matrix is always derived by safe inversion so both directions
/// stay exactly consistent.
pub trait RotationModel {
    fn forward(&self, params: &GeometryParams, frame: Frame) -> Matrix3<f64>;

    fn build(&self, params: &GeometryParams, frame: Frame, direction: Direction) -> Matrix3<f64> {
        let h = self.forward(params, frame);
        match direction {
            Direction::Forward => h,
            Direction::Backward => safe_invert(&h),
        }
    }
}

/// Builds the rotation matrix for the strategy selected in the parameter set.
pub fn build_rotation(
    params: &GeometryParams,
    frame: Frame,
    direction: Direction,
    config: &EngineConfig,
) -> Matrix3<f64> {
    match params.strategy {
        RotationStrategy::Simple => SimpleModel::new(config).build(params, frame, direction),
        RotationStrategy::Camera => CameraModel::new(config).build(params, frame, direction),
        RotationStrategy::LensShift => LensShiftModel::new(config).build(params, frame, direction),
    }
}

/// Rotation matrices about the three camera axes, shared by the pinhole
/// model and the solver objective.
pub(crate) fn rotation_x(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

pub(crate) fn rotation_y(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

pub(crate) fn rotation_z(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}
