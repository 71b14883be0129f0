use serde::{Deserialize, Serialize};

use crate::homography::Homography;

/// Image dimensions a correction is computed for. Immutable for the duration
/// of one homography computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn w(&self) -> f64 {
        self.width as f64
    }

    #[inline]
    pub fn h(&self) -> f64 {
        self.height as f64
    }

    /// Frame center in pixel coordinates.
    #[inline]
    pub fn center(&self) -> [f64; 2] {
        [self.w() * 0.5, self.h() * 0.5]
    }

    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.w() * self.w() + self.h() * self.h()).sqrt()
    }
}

/// Camera rotation angles in degrees.
///
/// Yaw swings the camera left/right (horizontal keystone), pitch tilts it
/// up/down (vertical keystone), roll twists it in the image plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationParams {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Yaw/pitch stay short of ±90° where the projection blows up.
pub const YAW_PITCH_LIMIT_DEG: f64 = 85.0;
pub const ROLL_LIMIT_DEG: f64 = 90.0;

impl RotationParams {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Returns the angles clamped into their numerically safe ranges.
    pub fn clamped(&self) -> Self {
        Self {
            yaw: self.yaw.clamp(-YAW_PITCH_LIMIT_DEG, YAW_PITCH_LIMIT_DEG),
            pitch: self.pitch.clamp(-YAW_PITCH_LIMIT_DEG, YAW_PITCH_LIMIT_DEG),
            roll: self.roll.clamp(-ROLL_LIMIT_DEG, ROLL_LIMIT_DEG),
        }
    }

    pub fn is_neutral(&self) -> bool {
        const EPS: f64 = 1e-4;
        self.yaw.abs() < EPS && self.pitch.abs() < EPS && self.roll.abs() < EPS
    }
}

/// Which rotation model turns the parameter set into a homography.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Sequential per-axis 3D projection with re-centering after each axis.
    Simple,
    /// Pinhole composition `K · Rz · Rx · Ry · K⁻¹`.
    #[default]
    Camera,
    /// Exponential lens-shift matrix chain; yaw/pitch act as shift sliders,
    /// shear/ortho-correction/aspect are consumed here.
    LensShift,
}

/// Full mutable parameter set of one editing session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    pub rotation: RotationParams,
    pub strategy: RotationStrategy,
    /// Shear slider in [-100, 100]; only the lens-shift model consumes it.
    pub shear: f64,
    /// Ortho-correction in [0, 100]; only the lens-shift model consumes it.
    pub ortho_correction: f64,
    /// Anisotropic aspect multiplier, must stay positive. 1.0 is neutral.
    pub aspect: f64,
    /// Uniform zoom slider, `zoom = 1 + scale / 50`. Non-negative.
    pub scale: f64,
    /// Post-transform translation in pixels.
    pub shift_x: f64,
    pub shift_y: f64,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            rotation: RotationParams::default(),
            strategy: RotationStrategy::default(),
            shear: 0.0,
            ortho_correction: 0.0,
            aspect: 1.0,
            scale: 0.0,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }
}

impl GeometryParams {
    /// True when every parameter sits at its neutral value, so the resulting
    /// homography is the identity.
    pub fn is_neutral(&self) -> bool {
        const EPS: f64 = 1e-4;
        self.rotation.is_neutral()
            && self.shear.abs() < EPS
            && self.ortho_correction.abs() < EPS
            && (self.aspect - 1.0).abs() < EPS
            && self.scale.abs() < EPS
            && self.shift_x.abs() < EPS
            && self.shift_y.abs() < EPS
    }
}

/// Outcome of a guided correction: the solved parameters, the forward
/// homography, the border-free zoom and the solver's final objective value
/// (diagnostics only).
#[derive(Clone, Debug, Serialize)]
pub struct CorrectionResult {
    pub params: GeometryParams,
    pub homography: Homography,
    pub zoom_factor: f64,
    pub residual: f64,
}
