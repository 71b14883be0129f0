//! Hough-style line-segment extraction from an edge map.
//!
//! Edge pixels vote in a (θ, ρ) accumulator; the strongest cells are then
//! walked along their line direction, collecting collinear edge runs with a
//! bounded gap. Pixels consumed by one segment stop voting for later cells,
//! which suppresses duplicate detections of the same edge.

use crate::image::ImageF32;

/// Perpendicular distance (pixels) within which an edge pixel supports a line.
const LINE_DIST_TOL: f64 = 1.5;
/// Candidate accumulator cells examined after sorting by votes.
const MAX_CANDIDATE_CELLS: usize = 64;

/// Extracted line segment in pixel coordinates.
#[derive(Clone, Copy, Debug)]
pub struct LineSegment {
    pub p0: [f64; 2],
    pub p1: [f64; 2],
    /// Number of edge pixels supporting the segment.
    pub support: usize,
}

impl LineSegment {
    pub fn length(&self) -> f64 {
        let dx = self.p1[0] - self.p0[0];
        let dy = self.p1[1] - self.p0[1];
        (dx * dx + dy * dy).sqrt()
    }
}

pub struct ExtractOptions {
    pub magnitude_threshold: f32,
    pub vote_threshold: usize,
    pub min_length: f64,
    pub max_gap: f64,
    pub max_segments: usize,
}

/// Runs the extraction over a gradient magnitude map.
pub fn extract_segments(mag: &ImageF32, opts: &ExtractOptions) -> Vec<LineSegment> {
    let (w, h) = (mag.w, mag.h);
    if w < 2 || h < 2 {
        return Vec::new();
    }

    let mut edges: Vec<[f64; 2]> = Vec::new();
    for y in 0..h {
        let row = mag.row(y);
        for (x, &m) in row.iter().enumerate() {
            if m >= opts.magnitude_threshold {
                edges.push([x as f64, y as f64]);
            }
        }
    }
    if edges.len() < opts.vote_threshold {
        return Vec::new();
    }

    // Vote in 1° × 1px resolution.
    let n_theta = 180usize;
    let diag = ((w * w + h * h) as f64).sqrt().ceil() as usize;
    let n_rho = 2 * diag + 1;
    let tables: Vec<(f64, f64)> = (0..n_theta)
        .map(|t| {
            let theta = (t as f64).to_radians();
            theta.sin_cos()
        })
        .collect();

    let mut acc = vec![0u32; n_theta * n_rho];
    for &[x, y] in &edges {
        for (t, &(sin_t, cos_t)) in tables.iter().enumerate() {
            let rho = x * cos_t + y * sin_t;
            let r = (rho + diag as f64).round() as usize;
            acc[t * n_rho + r] += 1;
        }
    }

    let mut cells: Vec<(u32, usize, usize)> = acc
        .iter()
        .enumerate()
        .filter(|(_, &votes)| votes as usize >= opts.vote_threshold)
        .map(|(idx, &votes)| (votes, idx / n_rho, idx % n_rho))
        .collect();
    cells.sort_by(|a, b| b.0.cmp(&a.0));
    cells.truncate(MAX_CANDIDATE_CELLS);

    let mut used = vec![false; edges.len()];
    let mut segments = Vec::new();
    for (_, t, r) in cells {
        if segments.len() >= opts.max_segments {
            break;
        }
        let (sin_t, cos_t) = tables[t];
        let rho = r as f64 - diag as f64;

        // Project supporting pixels onto the line direction.
        let mut supporters: Vec<(f64, usize)> = Vec::new();
        for (i, &[x, y]) in edges.iter().enumerate() {
            if used[i] {
                continue;
            }
            if (x * cos_t + y * sin_t - rho).abs() <= LINE_DIST_TOL {
                supporters.push((-x * sin_t + y * cos_t, i));
            }
        }
        if supporters.len() < opts.vote_threshold {
            continue;
        }
        supporters.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Split into runs at gaps and keep the sufficiently long ones.
        let mut run_start = 0usize;
        for i in 0..supporters.len() {
            let run_ends = i + 1 == supporters.len()
                || supporters[i + 1].0 - supporters[i].0 > opts.max_gap;
            if !run_ends {
                continue;
            }
            let span = supporters[i].0 - supporters[run_start].0;
            if span >= opts.min_length {
                let first = supporters[run_start].1;
                let last = supporters[i].1;
                segments.push(LineSegment {
                    p0: edges[first],
                    p1: edges[last],
                    support: i - run_start + 1,
                });
                for &(_, idx) in &supporters[run_start..=i] {
                    used[idx] = true;
                }
                if segments.len() >= opts.max_segments {
                    break;
                }
            }
            run_start = i + 1;
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_map_with_vertical_line(w: usize, h: usize, x: usize) -> ImageF32 {
        let mut mag = ImageF32::new(w, h);
        for y in 0..h {
            mag.set(x, y, 2.0);
        }
        mag
    }

    fn options() -> ExtractOptions {
        ExtractOptions {
            magnitude_threshold: 1.0,
            vote_threshold: 20,
            min_length: 30.0,
            max_gap: 5.0,
            max_segments: 8,
        }
    }

    #[test]
    fn finds_a_vertical_line() {
        let mag = edge_map_with_vertical_line(100, 100, 40);
        let segs = extract_segments(&mag, &options());
        assert!(!segs.is_empty(), "no segment found");
        let s = &segs[0];
        assert!(s.length() > 80.0, "length = {}", s.length());
        assert!((s.p0[0] - 40.0).abs() <= 2.0 && (s.p1[0] - 40.0).abs() <= 2.0);
    }

    #[test]
    fn gap_splits_segments() {
        let mut mag = ImageF32::new(100, 100);
        for y in 0..40 {
            mag.set(50, y, 2.0);
        }
        for y in 60..100 {
            mag.set(50, y, 2.0);
        }
        let segs = extract_segments(&mag, &options());
        assert!(segs.len() >= 2, "expected split runs, got {}", segs.len());
        assert!(segs.iter().all(|s| s.length() < 45.0));
    }

    #[test]
    fn short_or_sparse_input_yields_nothing() {
        let mag = ImageF32::new(50, 50);
        assert!(extract_segments(&mag, &options()).is_empty());

        let short = edge_map_with_vertical_line(100, 20, 10);
        let segs = extract_segments(&short, &options());
        assert!(segs.iter().all(|s| s.length() >= 30.0));
    }
}
