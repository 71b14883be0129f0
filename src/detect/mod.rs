//! Automatic guide detection: raster image in, candidate guides out.
//!
//! A thin adapter in front of the guided solver: Sobel edges, Hough-style
//! segment extraction, then an angle filter that keeps only segments that
//! are plausibly meant to be vertical or horizontal.

pub mod grad;
pub mod hough;

use log::debug;
use serde::Deserialize;

use crate::angle::segment_angle_deg;
use crate::config::EngineConfig;
use crate::guide::Guide;
use crate::image::ImageU8;
use crate::types::Frame;
use hough::{extract_segments, ExtractOptions, LineSegment};

/// Vertical bucket: raw angle magnitude within (60°, 120°).
const VERTICAL_BAND_DEG: (f64, f64) = (60.0, 120.0);
/// Horizontal bucket: raw angle magnitude below 30° or above 150°.
const HORIZONTAL_BAND_DEG: (f64, f64) = (30.0, 150.0);

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Sobel magnitude threshold on normalized (0..1) pixels.
    pub magnitude_threshold: f32,
    /// Minimum segment length as a fraction of `min(width, height)`.
    pub min_length_ratio: f64,
    /// Maximum collinear gap bridged within one segment (pixels).
    pub max_gap_px: f64,
    /// Minimum accumulator votes for a candidate line.
    pub vote_threshold: usize,
    /// Cap on the returned guide count, strongest first.
    pub max_guides: usize,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            magnitude_threshold: 0.25,
            min_length_ratio: 0.1,
            max_gap_px: 20.0,
            vote_threshold: 50,
            max_guides: 16,
        }
    }
}

pub struct LineDetector {
    options: DetectorOptions,
}

impl LineDetector {
    pub fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    /// Detector using the options carried by an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.detector)
    }

    /// Detects candidate guides in a grayscale image. Ambiguously angled
    /// segments are discarded; the rest are returned strongest-first (by
    /// supporting edge pixel count) in normalized coordinates.
    pub fn detect(&self, image: &ImageU8<'_>) -> Vec<Guide> {
        if image.w < 2 || image.h < 2 {
            return Vec::new();
        }
        let gray = image.to_f32();
        let mag = grad::sobel_magnitude(&gray);
        let min_length = self.options.min_length_ratio * image.w.min(image.h) as f64;
        let mut segments = extract_segments(
            &mag,
            &ExtractOptions {
                magnitude_threshold: self.options.magnitude_threshold,
                vote_threshold: self.options.vote_threshold,
                min_length,
                max_gap: self.options.max_gap_px,
                max_segments: self.options.max_guides * 4,
            },
        );
        let total = segments.len();
        segments.retain(|s| classify(s).is_some());
        segments.sort_by(|a, b| {
            b.support
                .cmp(&a.support)
                .then(b.length().total_cmp(&a.length()))
        });
        segments.truncate(self.options.max_guides);

        let frame = Frame::new(image.w as u32, image.h as u32);
        let guides: Vec<Guide> = segments
            .iter()
            .map(|s| Guide::from_pixels(s.p0, s.p1, frame))
            .collect();
        debug!(
            "line detection: {}x{} segments={} guides={}",
            image.w,
            image.h,
            total,
            guides.len()
        );
        guides
    }
}

impl Default for LineDetector {
    fn default() -> Self {
        Self::new(DetectorOptions::default())
    }
}

/// Buckets a segment by raw angle; `None` for ambiguous diagonals.
fn classify(segment: &LineSegment) -> Option<Orientation> {
    let a = segment_angle_deg(segment.p0, segment.p1).abs();
    if a > VERTICAL_BAND_DEG.0 && a < VERTICAL_BAND_DEG.1 {
        Some(Orientation::Vertical)
    } else if a < HORIZONTAL_BAND_DEG.0 || a > HORIZONTAL_BAND_DEG.1 {
        Some(Orientation::Horizontal)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    Vertical,
    Horizontal,
}

/// Convenience entry point with default options.
pub fn detect_guides(image: &ImageU8<'_>) -> Vec<Guide> {
    LineDetector::default().detect(image)
}
