//! Automatic border-free zoom.
//!
//! After a perspective warp some destination pixels may sample outside the
//! source frame, leaving undefined (black) borders. This solver computes the
//! minimal uniform zoom that pulls every sampled corner back inside.

use log::debug;
use nalgebra::Matrix3;

use crate::homography::{is_degenerate, transform_point};
use crate::types::Frame;

/// Fallback ceiling when no configuration is supplied.
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;

pub struct AutoScaleSolver {
    max_zoom: f64,
}

impl AutoScaleSolver {
    pub fn new(max_zoom: f64) -> Self {
        Self {
            max_zoom: max_zoom.max(1.0),
        }
    }

    /// Computes the zoom (≥ 1.0) eliminating out-of-bounds regions for the
    /// given backward-sampling homography.
    ///
    /// The four destination corners are projected into source space; each
    /// coordinate outside `[0, w] × [0, h]` yields the shrink factor toward
    /// the frame center that brings it back to the boundary, and the most
    /// restrictive factor wins. Degenerate or non-finite inputs short-circuit
    /// to 1.0.
    pub fn compute_zoom(&self, inv_homography: &Matrix3<f64>, frame: Frame) -> f64 {
        if frame.is_empty() || is_degenerate(inv_homography) {
            return 1.0;
        }
        let (w, h) = (frame.w(), frame.h());
        let [cx, cy] = frame.center();
        let corners = [[0.0, 0.0], [w, 0.0], [0.0, h], [w, h]];

        let mut k_min = 1.0f64;
        for corner in corners {
            let Some([x, y]) = transform_point(inv_homography, corner) else {
                return 1.0;
            };
            if x < 0.0 {
                k_min = k_min.min(cx / (cx - x));
            } else if x > w {
                k_min = k_min.min((w - cx) / (x - cx));
            }
            if y < 0.0 {
                k_min = k_min.min(cy / (cy - y));
            } else if y > h {
                k_min = k_min.min((h - cy) / (y - cy));
            }
        }
        if !k_min.is_finite() || k_min <= 0.0 {
            return 1.0;
        }
        let zoom = (1.0 / k_min).clamp(1.0, self.max_zoom);
        debug!("auto-scale: k_min={k_min:.4} zoom={zoom:.4}");
        zoom
    }
}

impl Default for AutoScaleSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ZOOM)
    }
}

/// Convenience entry point with the default zoom ceiling.
pub fn compute_auto_scale(inv_homography: &Matrix3<f64>, frame: Frame) -> f64 {
    AutoScaleSolver::default().compute_zoom(inv_homography, frame)
}
