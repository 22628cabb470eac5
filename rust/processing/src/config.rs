// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clip stage configuration.
//!
//! [`ClipConfig::default()`] matches the usual pipeline setup: output
//! precision inherited from the input, points merged within `1e-12` of the
//! bounding diagonal, progress and cancellation polled every 5% of elements.
//!
//! ```
//! use xfem_clip_processing::{ClipConfig, MergeTolerance, OutputPrecision};
//!
//! let config = ClipConfig::default()
//!     .with_precision(OutputPrecision::Single)
//!     .with_merge_tolerance(MergeTolerance::Absolute(1e-9));
//! assert_eq!(config.progress_steps, 20);
//!
//! let parsed = ClipConfig::from_json(r#"{"merge_tolerance": "exact"}"#).unwrap();
//! assert_eq!(parsed.merge_tolerance, MergeTolerance::Exact);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use xfem_clip_core::{Bounds, Precision};

/// Default merge tolerance, relative to the input bounding diagonal
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Default number of progress and cancellation polls per run
pub const DEFAULT_PROGRESS_STEPS: usize = 20;

/// Coordinate precision of the output points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPrecision {
    /// Same as the input points
    #[default]
    Inherit,
    Single,
    Double,
}

impl OutputPrecision {
    /// Concrete precision for an input stored at `input`
    pub fn resolve(self, input: Precision) -> Precision {
        match self {
            OutputPrecision::Inherit => input,
            OutputPrecision::Single => Precision::Single,
            OutputPrecision::Double => Precision::Double,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inherit" | "default" => Some(OutputPrecision::Inherit),
            "single" | "float" | "f32" => Some(OutputPrecision::Single),
            "double" | "f64" => Some(OutputPrecision::Double),
            _ => None,
        }
    }
}

/// Distance under which two output points are merged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeTolerance {
    /// Fraction of the input bounding diagonal
    Relative(f64),
    /// Absolute distance
    Absolute(f64),
    /// Merge bit-identical coordinates only
    Exact,
}

impl Default for MergeTolerance {
    fn default() -> Self {
        MergeTolerance::Relative(DEFAULT_RELATIVE_TOLERANCE)
    }
}

impl MergeTolerance {
    /// Absolute tolerance for an input spanning `bounds`
    pub fn resolve(self, bounds: &Bounds) -> f64 {
        match self {
            MergeTolerance::Relative(fraction) => fraction * bounds.diagonal(),
            MergeTolerance::Absolute(distance) => distance,
            MergeTolerance::Exact => 0.0,
        }
    }

    fn value(self) -> f64 {
        match self {
            MergeTolerance::Relative(v) | MergeTolerance::Absolute(v) => v,
            MergeTolerance::Exact => 0.0,
        }
    }

    /// Parse `exact`, `abs:<distance>`, `rel:<fraction>` or a bare fraction
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let tolerance = if value == "exact" {
            MergeTolerance::Exact
        } else if let Some(distance) = value
            .strip_prefix("abs:")
            .or_else(|| value.strip_prefix("absolute:"))
        {
            MergeTolerance::Absolute(distance.trim().parse().ok()?)
        } else {
            let fraction = value
                .strip_prefix("rel:")
                .or_else(|| value.strip_prefix("relative:"))
                .unwrap_or(&value);
            MergeTolerance::Relative(fraction.trim().parse().ok()?)
        };
        let v = tolerance.value();
        (v.is_finite() && v >= 0.0).then_some(tolerance)
    }
}

/// Clip stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Output point precision
    pub precision: OutputPrecision,
    /// Point merge tolerance
    pub merge_tolerance: MergeTolerance,
    /// Progress reports and cancellation polls per run
    pub progress_steps: usize,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            precision: OutputPrecision::default(),
            merge_tolerance: MergeTolerance::default(),
            progress_steps: DEFAULT_PROGRESS_STEPS,
        }
    }
}

impl ClipConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `XFEM_CLIP_PRECISION`, `XFEM_CLIP_MERGE_TOLERANCE` and
    /// `XFEM_CLIP_PROGRESS_STEPS`; unset or unparsable values keep their
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            precision: std::env::var("XFEM_CLIP_PRECISION")
                .ok()
                .and_then(|v| OutputPrecision::parse(&v))
                .unwrap_or(defaults.precision),
            merge_tolerance: std::env::var("XFEM_CLIP_MERGE_TOLERANCE")
                .ok()
                .and_then(|v| MergeTolerance::parse(&v))
                .unwrap_or(defaults.merge_tolerance),
            progress_steps: std::env::var("XFEM_CLIP_PROGRESS_STEPS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|&steps| steps > 0)
                .unwrap_or(defaults.progress_steps),
        }
    }

    /// Parse and validate a JSON configuration; missing fields keep their
    /// defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let tolerance = self.merge_tolerance.value();
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "merge tolerance must be finite and non-negative, got {}",
                tolerance
            )));
        }
        if self.progress_steps == 0 {
            return Err(Error::InvalidConfig(
                "progress_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the output precision
    #[must_use]
    pub fn with_precision(mut self, precision: OutputPrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the merge tolerance
    #[must_use]
    pub fn with_merge_tolerance(mut self, tolerance: MergeTolerance) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    /// Set the number of progress and cancellation polls per run
    #[must_use]
    pub fn with_progress_steps(mut self, steps: usize) -> Self {
        self.progress_steps = steps;
        self
    }
}
