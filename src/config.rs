//! Engine configuration.
//!
//! All calibration constants live here and are passed explicitly into the
//! rotation models and the pipeline instead of hiding behind module globals.
//! The defaults reproduce the reference visual behavior; every value is an
//! empirically tuned constant, not derived from first principles.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::detect::DetectorOptions;
use crate::solver::SolverOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Effective focal length (mm, 35mm-equivalent diagonal) for the simple
    /// per-axis model.
    pub simple_focal_mm: f64,
    /// Pinhole focal length as a fraction of `max(width, height)`.
    pub camera_focal_factor: f64,
    /// Focal length (mm) feeding the exponential lens-shift chain.
    pub lens_shift_focal_mm: f64,
    /// Host slider units to degrees for yaw/pitch keystone sliders.
    pub slider_to_degrees: f64,
    /// Divisor in `zoom = 1 + scale / zoom_divisor`.
    pub zoom_divisor: f64,
    /// Divisor and gain in `aspect = 1 + slider / aspect_divisor * aspect_gain`.
    pub aspect_divisor: f64,
    pub aspect_gain: f64,
    /// Ceiling for the automatic border-free zoom.
    pub max_zoom: f64,
    /// Cap for interactively drawn guides before the set resets.
    pub max_interactive_guides: usize,
    pub solver: SolverOptions,
    pub detector: DetectorOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simple_focal_mm: 50.0,
            camera_focal_factor: 1.2,
            lens_shift_focal_mm: 28.0,
            slider_to_degrees: 0.3,
            zoom_divisor: 50.0,
            aspect_divisor: 100.0,
            aspect_gain: 0.2,
            max_zoom: 5.0,
            max_interactive_guides: crate::guide::DEFAULT_GUIDE_CAPACITY,
            solver: SolverOptions::default(),
            detector: DetectorOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Loads a configuration overlay from a JSON file; absent fields keep
    /// their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Maps a keystone slider value to degrees. Host-facing: the engine takes
    /// angles directly, this is for UIs exposing slider units.
    #[inline]
    pub fn degrees_from_slider(&self, slider: f64) -> f64 {
        slider * self.slider_to_degrees
    }

    /// Uniform zoom factor for a scale slider value.
    #[inline]
    pub fn zoom_from_scale(&self, scale: f64) -> f64 {
        1.0 + scale.max(0.0) / self.zoom_divisor
    }

    /// Aspect multiplier for an aspect slider value, floored to stay
    /// positive. Host-facing, like [`Self::degrees_from_slider`].
    #[inline]
    pub fn aspect_from_slider(&self, slider: f64) -> f64 {
        (1.0 + slider / self.aspect_divisor * self.aspect_gain).max(0.05)
    }
}
