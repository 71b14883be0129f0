//! Line guides: segments annotating edges that should end up perfectly
//! vertical or horizontal after correction.

use serde::{Deserialize, Serialize};

use crate::angle::{segment_angle_deg, vertical_deviation_deg};
use crate::config::EngineConfig;
use crate::types::Frame;

/// Correction target of a guide, derived from its raw angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideOrientation {
    /// Should map to ±90° after correction.
    Vertical,
    /// Should map to 0°/180° after correction.
    Horizontal,
}

/// A line segment in normalized (0..1) frame coordinates.
///
/// The orientation is not stored: it is always re-derived from the endpoint
/// angle, so moving an endpoint can flip a guide between vertical and
/// horizontal without extra bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub p1: [f64; 2],
    pub p2: [f64; 2],
}

impl Guide {
    pub fn new(p1: [f64; 2], p2: [f64; 2]) -> Self {
        Self { p1, p2 }
    }

    /// Builds a guide from pixel coordinates in the given frame.
    pub fn from_pixels(p1: [f64; 2], p2: [f64; 2], frame: Frame) -> Self {
        if frame.is_empty() {
            return Self::new([0.0, 0.0], [0.0, 0.0]);
        }
        let (w, h) = (frame.w(), frame.h());
        Self::new([p1[0] / w, p1[1] / h], [p2[0] / w, p2[1] / h])
    }

    /// Endpoints scaled back to pixel coordinates.
    pub fn to_pixels(&self, frame: Frame) -> ([f64; 2], [f64; 2]) {
        let (w, h) = (frame.w(), frame.h());
        (
            [self.p1[0] * w, self.p1[1] * h],
            [self.p2[0] * w, self.p2[1] * h],
        )
    }

    /// Segment length in normalized coordinates; doubles as the guide's
    /// weight in the solver objective.
    pub fn weight(&self) -> f64 {
        let dx = self.p2[0] - self.p1[0];
        let dy = self.p2[1] - self.p1[1];
        (dx * dx + dy * dy).sqrt()
    }

    pub fn angle_deg(&self) -> f64 {
        segment_angle_deg(self.p1, self.p2)
    }

    /// Angle magnitudes in (45°, 135°) aim for vertical, the rest for
    /// horizontal.
    pub fn orientation(&self) -> GuideOrientation {
        if vertical_deviation_deg(self.angle_deg()) < 45.0 {
            GuideOrientation::Vertical
        } else {
            GuideOrientation::Horizontal
        }
    }

    /// Zero-length guides carry no constraint and are skipped by consumers.
    pub fn is_degenerate(&self) -> bool {
        self.weight() < 1e-9
    }
}

/// Session-owned guide list with a capacity cap.
///
/// Interactive editing keeps a handful of guides; once the cap is exceeded
/// the list is cleared and restarted from the newest guide, matching the
/// reset-on-overflow behavior of the interactive tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuideSet {
    guides: Vec<Guide>,
    capacity: usize,
}

impl Default for GuideSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Default cap for interactively drawn guides.
pub const DEFAULT_GUIDE_CAPACITY: usize = 4;

impl GuideSet {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_GUIDE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            guides: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Guide set sized by the configuration's interactive cap.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_capacity(config.max_interactive_guides)
    }

    pub fn push(&mut self, guide: Guide) {
        if self.guides.len() >= self.capacity {
            self.guides.clear();
        }
        self.guides.push(guide);
    }

    pub fn clear(&mut self) {
        self.guides.clear();
    }

    pub fn as_slice(&self) -> &[Guide] {
        &self.guides
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}
