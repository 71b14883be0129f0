//! 3×3 projective transform helpers on top of `nalgebra::Matrix3`.
//!
//! Every public entry point here degrades instead of failing: singular
//! matrices fall back to the identity and non-finite projections are reported
//! as `None` so callers can substitute a safe default.

use log::warn;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use serde::Serialize;
use thiserror::Error;

/// Determinant magnitude below which a matrix is treated as singular.
pub const DET_EPS: f64 = 1e-10;
/// Homogeneous w magnitude below which a projected point is rejected.
const W_EPS: f64 = 1e-10;

/// Raised by [`try_invert`] when the determinant is below [`DET_EPS`].
#[derive(Debug, Error)]
#[error("singular homography (|det| = {det:.3e})")]
pub struct SingularMatrix {
    pub det: f64,
}

/// Mapping direction of a homography.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Maps source pixels to destination pixels.
    Forward,
    /// Maps destination pixels back to source pixels (backward sampling).
    Backward,
}

impl Direction {
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Self::Forward
        } else {
            Self::Backward
        }
    }
}

/// A 3×3 projective transform tagged with its mapping direction.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Homography {
    pub mtx: Matrix3<f64>,
    pub direction: Direction,
}

impl Homography {
    pub fn new(mtx: Matrix3<f64>, direction: Direction) -> Self {
        Self { mtx, direction }
    }

    pub fn identity(direction: Direction) -> Self {
        Self::new(Matrix3::identity(), direction)
    }

    /// Applies the transform to a point; `None` on a vanishing or non-finite
    /// homogeneous coordinate.
    pub fn transform_point(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        transform_point(&self.mtx, p)
    }

    /// Returns the opposite-direction transform, falling back to the identity
    /// if the matrix cannot be inverted.
    pub fn inverted(&self) -> Self {
        let direction = match self.direction {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        };
        Self::new(safe_invert(&self.mtx), direction)
    }

    pub fn is_degenerate(&self) -> bool {
        is_degenerate(&self.mtx)
    }
}

/// Whether the determinant is below the singularity threshold or non-finite.
pub fn is_degenerate(m: &Matrix3<f64>) -> bool {
    let det = m.determinant();
    !det.is_finite() || det.abs() < DET_EPS
}

/// Inverts the matrix, reporting a singular input as an error.
pub fn try_invert(m: &Matrix3<f64>) -> Result<Matrix3<f64>, SingularMatrix> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < DET_EPS {
        return Err(SingularMatrix { det });
    }
    m.try_inverse().ok_or(SingularMatrix { det })
}

/// Inverts the matrix, substituting the identity for singular inputs.
pub fn safe_invert(m: &Matrix3<f64>) -> Matrix3<f64> {
    match try_invert(m) {
        Ok(inv) => inv,
        Err(e) => {
            warn!("homography inversion failed ({e}); using identity");
            Matrix3::identity()
        }
    }
}

/// Projects a 2D point through the homography with a homogeneous divide.
pub fn transform_point(m: &Matrix3<f64>, p: [f64; 2]) -> Option<[f64; 2]> {
    let v = m * Vector3::new(p[0], p[1], 1.0);
    let w = v[2];
    if !w.is_finite() || w.abs() < W_EPS {
        return None;
    }
    let x = v[0] / w;
    let y = v[1] / w;
    (x.is_finite() && y.is_finite()).then_some([x, y])
}

/// Solves the homography mapping four source corners onto four destination
/// corners (direct linear 4-point correspondence). `None` when the corner
/// configuration is degenerate.
pub fn homography_from_corners(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Option<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for i in 0..4 {
        let [x, y] = src[i];
        let [u, v] = dst[i];
        let rx = 2 * i;
        let ry = 2 * i + 1;
        a[(rx, 0)] = x;
        a[(rx, 1)] = y;
        a[(rx, 2)] = 1.0;
        a[(rx, 6)] = -x * u;
        a[(rx, 7)] = -y * u;
        b[rx] = u;
        a[(ry, 3)] = x;
        a[(ry, 4)] = y;
        a[(ry, 5)] = 1.0;
        a[(ry, 6)] = -x * v;
        a[(ry, 7)] = -y * v;
        b[ry] = v;
    }
    let p = a.lu().solve(&b)?;
    if p.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let h = Matrix3::new(p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], 1.0);
    (!is_degenerate(&h)).then_some(h)
}
