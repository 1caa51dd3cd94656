// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Filter Parameters
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{GazeError, GazeResult};

/// Gap-fill parameters for the sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapParameters {
    /// Longest run of missing samples that is still interpolated.
    /// Default: 4 (≈ 67 ms at 60 Hz).
    pub max_gap_length: u32,

    /// Expected interval between two samples.
    /// Default: 1000/60 (60 Hz tracker, millisecond timestamps).
    pub sample_period: f64,
}

impl Default for GapParameters {
    fn default() -> Self {
        Self {
            max_gap_length: 4,
            sample_period: 1000.0 / 60.0,
        }
    }
}

/// Noise reduction parameters for the sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Half-width of the moving median window, in samples.
    /// Default: 1 (3-sample median). 0 disables smoothing.
    pub mid_idx: u32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self { mid_idx: 1 }
    }
}

/// Saccade detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaccadeParameters {
    /// Angular velocity cutoff in degrees per second.
    /// Default: 20.0.
    pub velocity_threshold: f64,
}

impl Default for SaccadeParameters {
    fn default() -> Self {
        Self {
            velocity_threshold: 20.0,
        }
    }
}

/// Fixation detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationParameters {
    /// Minimum fixation duration, in timestamp units.
    /// Default: 100.0 (ms).
    pub duration_threshold: f64,

    /// Maximum distance between a gaze point and the running centroid
    /// of the candidate, in gaze-point units.
    /// Default: 10.0.
    pub dispersion_threshold: f64,
}

impl Default for FixationParameters {
    fn default() -> Self {
        Self {
            duration_threshold: 100.0,
            dispersion_threshold: 10.0,
        }
    }
}

/// Complete filter configuration of one engine instance.
///
/// Every level carries `#[serde(default)]`: missing fields fall back to
/// their defaults and unknown fields are ignored, so a partial JSON
/// document is a valid configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    pub gap: GapParameters,
    pub noise: NoiseParameters,
    pub saccade: SaccadeParameters,
    pub fixation: FixationParameters,
}

impl FilterParameters {
    /// Validate configuration parameters.
    pub fn validate(&self) -> GazeResult<()> {
        if !self.gap.sample_period.is_finite() || self.gap.sample_period <= 0.0 {
            return Err(GazeError::Config(format!(
                "gap.sample_period must be finite and > 0, got {}",
                self.gap.sample_period
            )));
        }
        if !self.saccade.velocity_threshold.is_finite() || self.saccade.velocity_threshold <= 0.0
        {
            return Err(GazeError::Config(format!(
                "saccade.velocity_threshold must be finite and > 0, got {}",
                self.saccade.velocity_threshold
            )));
        }
        if !self.fixation.duration_threshold.is_finite() || self.fixation.duration_threshold < 0.0
        {
            return Err(GazeError::Config(format!(
                "fixation.duration_threshold must be finite and >= 0, got {}",
                self.fixation.duration_threshold
            )));
        }
        if !self.fixation.dispersion_threshold.is_finite()
            || self.fixation.dispersion_threshold <= 0.0
        {
            return Err(GazeError::Config(format!(
                "fixation.dispersion_threshold must be finite and > 0, got {}",
                self.fixation.dispersion_threshold
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> GazeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GazeError::Config(format!("JSON parse error: {e}")))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> GazeResult<String> {
        serde_json::to_string(self)
            .map_err(|e| GazeError::Config(format!("JSON encode error: {e}")))
    }
}
