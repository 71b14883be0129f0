//! Guided correction: solves (yaw, pitch, roll) from weighted line guides.
//!
//! The objective builds the pinhole-camera homography for a trial rotation,
//! transforms every guide's endpoints and accumulates the squared angular
//! deviation from each guide's target (vertical or horizontal), weighted by
//! segment length. The problem is smooth and three-dimensional, so a bounded
//! Nelder–Mead simplex is enough; the start point is seeded with a weighted
//! mean of the raw guide deviations.

use log::debug;
use serde::Deserialize;

use crate::angle::{
    horizontal_deviation_deg, segment_angle_deg, signed_horizontal_deviation_deg,
    signed_vertical_deviation_deg, vertical_deviation_deg,
};
use crate::config::EngineConfig;
use crate::guide::{Guide, GuideOrientation};
use crate::homography::transform_point;
use crate::rotation::CameraModel;
use crate::types::{Frame, RotationParams};

/// Penalty for trial points whose homography sends a guide endpoint to
/// infinity.
const PROJECTION_PENALTY: f64 = 1e12;

/// Clamp for the seeding estimator, matching the one-click auto path.
const ESTIMATE_LIMIT_DEG: f64 = 45.0;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Search bounds in degrees.
    pub yaw_bound: f64,
    pub pitch_bound: f64,
    pub roll_bound: f64,
    /// Objective spread below which the simplex is considered converged.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Initial simplex step in degrees.
    pub initial_step_deg: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            yaw_bound: 60.0,
            pitch_bound: 60.0,
            roll_bound: 45.0,
            tolerance: 1e-6,
            max_iterations: 200,
            initial_step_deg: 2.0,
        }
    }
}

/// One guide prepared for the objective: pixel endpoints, fixed target
/// orientation and weight.
struct PreparedGuide {
    p1: [f64; 2],
    p2: [f64; 2],
    orientation: GuideOrientation,
    weight: f64,
}

pub struct GuidedCorrectionSolver {
    camera: CameraModel,
    options: SolverOptions,
}

impl GuidedCorrectionSolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            camera: CameraModel::new(config),
            options: config.solver,
        }
    }

    /// Solves rotation parameters minimizing the weighted angular deviation
    /// of the guides. Returns the parameters and the final objective value.
    ///
    /// Zero usable guides is a no-op (neutral rotation, residual 0), and a
    /// single guide still returns the best-effort improvement even though the
    /// problem is under-determined.
    pub fn solve(&self, guides: &[Guide], frame: Frame) -> (RotationParams, f64) {
        if frame.is_empty() {
            return (RotationParams::default(), 0.0);
        }
        let prepared = prepare_guides(guides, frame);
        if prepared.is_empty() {
            return (RotationParams::default(), 0.0);
        }

        let objective =
            |x: &[f64; 3]| self.objective(&prepared, frame, RotationParams::new(x[0], x[1], x[2]));

        let lo = [
            -self.options.yaw_bound,
            -self.options.pitch_bound,
            -self.options.roll_bound,
        ];
        let hi = [
            self.options.yaw_bound,
            self.options.pitch_bound,
            self.options.roll_bound,
        ];

        // Seed with the plain weighted-mean estimate when it already beats
        // the neutral start. The start point is the better of the two and
        // the simplex returns its best evaluated vertex, so the result
        // never scores worse than the uncorrected input.
        let neutral = [0.0; 3];
        let estimate = estimate_from_prepared(&prepared);
        let seed_candidate = [
            estimate.yaw.clamp(lo[0], hi[0]),
            estimate.pitch.clamp(lo[1], hi[1]),
            estimate.roll.clamp(lo[2], hi[2]),
        ];
        let x0 = if objective(&seed_candidate) < objective(&neutral) {
            seed_candidate
        } else {
            neutral
        };

        let (best, residual) = nelder_mead(
            &objective,
            x0,
            self.options.initial_step_deg,
            lo,
            hi,
            self.options.tolerance,
            self.options.max_iterations,
        );
        debug!(
            "guided solve: guides={} yaw={:.3} pitch={:.3} roll={:.3} residual={:.6}",
            prepared.len(),
            best[0],
            best[1],
            best[2],
            residual
        );
        (RotationParams::new(best[0], best[1], best[2]), residual)
    }

    fn objective(&self, guides: &[PreparedGuide], frame: Frame, rotation: RotationParams) -> f64 {
        let h = self.camera.homography(rotation, frame);
        let mut total = 0.0;
        for g in guides {
            let (Some(q1), Some(q2)) = (transform_point(&h, g.p1), transform_point(&h, g.p2))
            else {
                total += PROJECTION_PENALTY * g.weight;
                continue;
            };
            let angle = segment_angle_deg(q1, q2);
            let deviation = match g.orientation {
                GuideOrientation::Vertical => vertical_deviation_deg(angle),
                GuideOrientation::Horizontal => horizontal_deviation_deg(angle),
            };
            total += deviation * deviation * g.weight;
        }
        total
    }
}

fn prepare_guides(guides: &[Guide], frame: Frame) -> Vec<PreparedGuide> {
    guides
        .iter()
        .filter(|g| !g.is_degenerate())
        .map(|g| {
            let (p1, p2) = g.to_pixels(frame);
            let dx = p2[0] - p1[0];
            let dy = p2[1] - p1[1];
            PreparedGuide {
                p1,
                p2,
                orientation: g.orientation(),
                weight: (dx * dx + dy * dy).sqrt(),
            }
        })
        .filter(|g| g.weight > 1e-9)
        .collect()
}

/// Weighted-mean rotation estimate: vertical guides vote for pitch,
/// horizontal guides for roll. This is the one-click auto estimate and the
/// solver seed.
pub fn estimate_rotation(guides: &[Guide], frame: Frame) -> RotationParams {
    if frame.is_empty() {
        return RotationParams::default();
    }
    estimate_from_prepared(&prepare_guides(guides, frame))
}

fn estimate_from_prepared(guides: &[PreparedGuide]) -> RotationParams {
    let mut pitch_sum = 0.0;
    let mut pitch_weight = 0.0;
    let mut roll_sum = 0.0;
    let mut roll_weight = 0.0;
    for g in guides {
        let angle = segment_angle_deg(g.p1, g.p2);
        match g.orientation {
            GuideOrientation::Vertical => {
                pitch_sum += signed_vertical_deviation_deg(angle) * g.weight;
                pitch_weight += g.weight;
            }
            GuideOrientation::Horizontal => {
                roll_sum += signed_horizontal_deviation_deg(angle) * g.weight;
                roll_weight += g.weight;
            }
        }
    }
    let pitch = if pitch_weight > 0.0 {
        (pitch_sum / pitch_weight).clamp(-ESTIMATE_LIMIT_DEG, ESTIMATE_LIMIT_DEG)
    } else {
        0.0
    };
    let roll = if roll_weight > 0.0 {
        (roll_sum / roll_weight).clamp(-ESTIMATE_LIMIT_DEG, ESTIMATE_LIMIT_DEG)
    } else {
        0.0
    };
    RotationParams::new(0.0, pitch, roll)
}

/// Convenience entry point with the default configuration.
pub fn solve_from_guides(guides: &[Guide], frame: Frame) -> (RotationParams, f64) {
    GuidedCorrectionSolver::new(&EngineConfig::default()).solve(guides, frame)
}

/// Bounded Nelder–Mead over three parameters. Candidates are projected onto
/// the box, and the best evaluated vertex is returned even when the iteration
/// budget runs out before convergence.
fn nelder_mead<F>(
    f: &F,
    x0: [f64; 3],
    step: f64,
    lo: [f64; 3],
    hi: [f64; 3],
    tolerance: f64,
    max_iterations: usize,
) -> ([f64; 3], f64)
where
    F: Fn(&[f64; 3]) -> f64,
{
    const ALPHA: f64 = 1.0; // reflection
    const GAMMA: f64 = 2.0; // expansion
    const RHO: f64 = 0.5; // contraction
    const SIGMA: f64 = 0.5; // shrink

    let clamp = |x: [f64; 3]| {
        [
            x[0].clamp(lo[0], hi[0]),
            x[1].clamp(lo[1], hi[1]),
            x[2].clamp(lo[2], hi[2]),
        ]
    };

    // Initial simplex: start point plus one step along each axis.
    let mut simplex: Vec<([f64; 3], f64)> = Vec::with_capacity(4);
    simplex.push((clamp(x0), f(&clamp(x0))));
    for axis in 0..3 {
        let mut x = x0;
        // Step inward if the start sits on the upper bound.
        x[axis] = if x[axis] + step <= hi[axis] {
            x[axis] + step
        } else {
            x[axis] - step
        };
        let x = clamp(x);
        simplex.push((x, f(&x)));
    }

    for _ in 0..max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let spread = simplex[3].1 - simplex[0].1;
        if spread.abs() < tolerance {
            break;
        }

        // Centroid of the three best vertices.
        let mut centroid = [0.0; 3];
        for (x, _) in &simplex[..3] {
            for i in 0..3 {
                centroid[i] += x[i] / 3.0;
            }
        }
        let worst = simplex[3];

        let reflect = clamp([
            centroid[0] + ALPHA * (centroid[0] - worst.0[0]),
            centroid[1] + ALPHA * (centroid[1] - worst.0[1]),
            centroid[2] + ALPHA * (centroid[2] - worst.0[2]),
        ]);
        let f_reflect = f(&reflect);

        if f_reflect < simplex[0].1 {
            let expand = clamp([
                centroid[0] + GAMMA * (reflect[0] - centroid[0]),
                centroid[1] + GAMMA * (reflect[1] - centroid[1]),
                centroid[2] + GAMMA * (reflect[2] - centroid[2]),
            ]);
            let f_expand = f(&expand);
            simplex[3] = if f_expand < f_reflect {
                (expand, f_expand)
            } else {
                (reflect, f_reflect)
            };
            continue;
        }
        if f_reflect < simplex[2].1 {
            simplex[3] = (reflect, f_reflect);
            continue;
        }

        let contract = clamp([
            centroid[0] + RHO * (worst.0[0] - centroid[0]),
            centroid[1] + RHO * (worst.0[1] - centroid[1]),
            centroid[2] + RHO * (worst.0[2] - centroid[2]),
        ]);
        let f_contract = f(&contract);
        if f_contract < worst.1 {
            simplex[3] = (contract, f_contract);
            continue;
        }

        // Shrink toward the best vertex.
        let best = simplex[0].0;
        for vertex in simplex.iter_mut().skip(1) {
            let x = clamp([
                best[0] + SIGMA * (vertex.0[0] - best[0]),
                best[1] + SIGMA * (vertex.0[1] - best[1]),
                best[2] + SIGMA * (vertex.0[2] - best[2]),
            ]);
            *vertex = (x, f(&x));
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    simplex[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_guides_is_a_noop() {
        let (params, residual) = solve_from_guides(&[], Frame::new(800, 600));
        assert!(params.is_neutral());
        assert_eq!(residual, 0.0);
    }

    #[test]
    fn zero_length_guides_are_skipped() {
        let guides = [Guide::new([0.5, 0.5], [0.5, 0.5])];
        let (params, residual) = solve_from_guides(&guides, Frame::new(800, 600));
        assert!(params.is_neutral());
        assert_eq!(residual, 0.0);
    }

    #[test]
    fn exactly_vertical_guides_need_no_correction() {
        let guides = [
            Guide::new([0.3, 0.1], [0.3, 0.9]),
            Guide::new([0.7, 0.1], [0.7, 0.9]),
        ];
        let (params, residual) = solve_from_guides(&guides, Frame::new(1000, 1000));
        assert!(params.yaw.abs() < 0.5, "yaw = {}", params.yaw);
        assert!(params.pitch.abs() < 0.5, "pitch = {}", params.pitch);
        assert!(params.roll.abs() < 0.5, "roll = {}", params.roll);
        assert!(residual < 1e-3, "residual = {residual}");
    }

    #[test]
    fn estimator_reads_lean_from_vertical_guides() {
        // Guide leaning at 80° off horizontal instead of 90°.
        let frame = Frame::new(1000, 1000);
        let g = Guide::from_pixels([500.0, 900.0], [640.0, 100.0], frame);
        let est = estimate_rotation(&[g], frame);
        assert!(est.pitch.abs() > 1.0, "estimate should be non-trivial");
        assert_eq!(est.yaw, 0.0);
    }

    #[test]
    fn nelder_mead_finds_quadratic_minimum() {
        let f = |x: &[f64; 3]| {
            (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 2.0).powi(2) + 0.5 * (x[2] - 0.5).powi(2)
        };
        let (x, fx) = nelder_mead(
            &f,
            [0.0; 3],
            1.0,
            [-10.0; 3],
            [10.0; 3],
            1e-12,
            500,
        );
        assert!(fx < 1e-6, "fx = {fx}");
        assert!((x[0] - 1.0).abs() < 1e-3 && (x[1] + 2.0).abs() < 1e-3);
    }

    #[test]
    fn nelder_mead_respects_bounds() {
        // Unconstrained minimum at x = 8, outside the box.
        let f = |x: &[f64; 3]| (x[0] - 8.0).powi(2) + x[1] * x[1] + x[2] * x[2];
        let (x, _) = nelder_mead(&f, [0.0; 3], 1.0, [-2.0; 3], [2.0; 3], 1e-12, 500);
        assert!(x[0] <= 2.0 + 1e-12);
        assert!((x[0] - 2.0).abs() < 1e-3, "should sit on the bound: {x:?}");
    }
}
