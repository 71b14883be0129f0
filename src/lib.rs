#![doc = include_str!("../README.md")]

pub mod angle;
pub mod autoscale;
pub mod config;
pub mod detect;
pub mod guide;
pub mod homography;
pub mod image;
pub mod pipeline;
pub mod rotation;
pub mod solver;
pub mod types;

// --- High-level re-exports -------------------------------------------------

pub use crate::autoscale::{compute_auto_scale, AutoScaleSolver};
pub use crate::config::EngineConfig;
pub use crate::detect::{detect_guides, DetectorOptions, LineDetector};
pub use crate::guide::{Guide, GuideOrientation, GuideSet};
pub use crate::homography::{Direction, Homography};
pub use crate::pipeline::{build_homography, GeometryPipeline};
pub use crate::solver::{estimate_rotation, solve_from_guides, GuidedCorrectionSolver};
pub use crate::types::{
    CorrectionResult, Frame, GeometryParams, RotationParams, RotationStrategy,
};

use crate::homography::Direction as Dir;

/// Full guided-correction flow: solve rotation from the guides, build the
/// forward homography and compute the border-free zoom.
///
/// With no usable guides this returns neutral parameters, an identity
/// homography and zoom 1.0.
pub fn correct_from_guides(
    guides: &[Guide],
    frame: Frame,
    config: &EngineConfig,
) -> CorrectionResult {
    let solver = GuidedCorrectionSolver::new(config);
    let (rotation, residual) = solver.solve(guides, frame);
    let params = GeometryParams {
        rotation,
        strategy: RotationStrategy::Camera,
        ..Default::default()
    };
    let pipeline = GeometryPipeline::new(config.clone());
    let forward = pipeline.build(&params, frame, Dir::Forward);
    let backward = pipeline.build(&params, frame, Dir::Backward);
    let zoom_factor = AutoScaleSolver::new(config.max_zoom).compute_zoom(&backward.mtx, frame);
    CorrectionResult {
        params,
        homography: forward,
        zoom_factor,
        residual,
    }
}

/// One-click correction: detect guides in the image with the configured
/// detector, then run the full guided flow on them.
///
/// An image without usable lines yields a neutral result.
pub fn correct_from_image(
    image: &crate::image::ImageU8<'_>,
    config: &EngineConfig,
) -> CorrectionResult {
    let guides = LineDetector::from_config(config).detect(image);
    let frame = Frame::new(image.w as u32, image.h as u32);
    correct_from_guides(&guides, frame, config)
}

/// Small prelude for quick experiments.
///
/// ```
/// use upright::prelude::*;
///
/// let frame = Frame::new(1920, 1080);
/// let params = GeometryParams::default();
/// let h = build_homography(&params, frame, true);
/// assert_eq!(h, nalgebra::Matrix3::identity());
/// ```
pub mod prelude {
    pub use crate::autoscale::compute_auto_scale;
    pub use crate::detect::detect_guides;
    pub use crate::guide::Guide;
    pub use crate::image::ImageU8;
    pub use crate::pipeline::build_homography;
    pub use crate::solver::solve_from_guides;
    pub use crate::types::{Frame, GeometryParams, RotationParams, RotationStrategy};
    pub use crate::{correct_from_guides, correct_from_image, EngineConfig};
}
