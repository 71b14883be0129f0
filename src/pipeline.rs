//! Composition of the final homography from a parameter set.
//!
//! Stage order is fixed: rotation model, then aspect stretch, then uniform
//! zoom, then translation. Each stage is defined relative to the frame as
//! already transformed by the previous stages, so reordering changes the
//! result. The backward matrix is the safe inverse of the forward product,
//! which keeps the two directions exactly consistent.

use nalgebra::Matrix3;

use crate::config::EngineConfig;
use crate::homography::{safe_invert, Direction, Homography};
use crate::rotation::build_rotation;
use crate::types::{Frame, GeometryParams, RotationStrategy};

const NEUTRAL_EPS: f64 = 1e-4;

pub struct GeometryPipeline {
    config: EngineConfig,
}

impl GeometryPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the full homography for one parameter set.
    pub fn build(&self, params: &GeometryParams, frame: Frame, direction: Direction) -> Homography {
        if frame.is_empty() || params.is_neutral() {
            return Homography::identity(direction);
        }

        let mut h = build_rotation(params, frame, Direction::Forward, &self.config);
        let [cx, cy] = frame.center();

        // Aspect stretch around the center. The lens-shift chain applies its
        // own aspect step, so it is skipped here for that strategy.
        if params.strategy != RotationStrategy::LensShift
            && (params.aspect - 1.0).abs() > NEUTRAL_EPS
        {
            let ascale = params.aspect.max(1e-4).sqrt();
            h = centered_scale(ascale, 1.0 / ascale, cx, cy) * h;
        }

        // Uniform zoom around the center.
        if params.scale.abs() > NEUTRAL_EPS {
            let zoom = self.config.zoom_from_scale(params.scale);
            h = centered_scale(zoom, zoom, cx, cy) * h;
        }

        // Translation last.
        if params.shift_x.abs() > NEUTRAL_EPS || params.shift_y.abs() > NEUTRAL_EPS {
            h = Matrix3::new(
                1.0,
                0.0,
                params.shift_x,
                0.0,
                1.0,
                params.shift_y,
                0.0,
                0.0,
                1.0,
            ) * h;
        }

        match direction {
            Direction::Forward => Homography::new(h, direction),
            Direction::Backward => Homography::new(safe_invert(&h), direction),
        }
    }
}

impl Default for GeometryPipeline {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Anisotropic scale about the point (cx, cy).
fn centered_scale(sx: f64, sy: f64, cx: f64, cy: f64) -> Matrix3<f64> {
    Matrix3::new(
        sx,
        0.0,
        cx * (1.0 - sx),
        0.0,
        sy,
        cy * (1.0 - sy),
        0.0,
        0.0,
        1.0,
    )
}

/// Convenience entry point using the default configuration. `forward = false`
/// returns the backward-sampling matrix.
pub fn build_homography(params: &GeometryParams, frame: Frame, forward: bool) -> Matrix3<f64> {
    GeometryPipeline::default()
        .build(params, frame, Direction::from_forward(forward))
        .mtx
}
