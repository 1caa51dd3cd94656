// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Event Records
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::geometry::{Vec2, Vec3};
use crate::sample::Sample;

/// A finalized period of low-dispersion gaze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    /// Mean gaze point of all member samples.
    pub point: Vec3,
    /// Mean gaze origin of all member samples.
    pub origin: Vec3,
    /// Mean screen point; `None` unless every member sample had one.
    pub screen: Option<Vec2>,
    /// `last.timestamp - first.timestamp`.
    pub duration: f64,
    /// First member sample (trial, label and onset provenance).
    pub first: Sample,
    pub sample_count: usize,
}

impl Fixation {
    pub fn timestamp(&self) -> f64 {
        self.first.timestamp
    }

    pub fn end_timestamp(&self) -> f64 {
        self.first.timestamp + self.duration
    }

    pub fn to_row(&self) -> FixationRow {
        FixationRow {
            screen_x: self.screen.map(|s| s.x),
            screen_y: self.screen.map(|s| s.y),
            x: self.point.x,
            y: self.point.y,
            z: self.point.z,
            duration: self.duration,
            timestamp: self.first.timestamp,
            trial_id: self.first.trial_id,
            trial_onset: self.first.trial_onset,
            label: self.first.label.clone(),
            label_onset: self.first.label_onset,
        }
    }
}

/// A finalized rapid eye movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saccade {
    /// Sample preceding the upward threshold crossing.
    pub first: Sample,
    /// Last sample reached above threshold.
    pub last: Sample,
    /// Highest velocity observed during the saccade (deg/s).
    pub peak_velocity: f64,
}

impl Saccade {
    pub fn duration(&self) -> f64 {
        self.last.timestamp - self.first.timestamp
    }

    pub fn to_row(&self) -> SaccadeRow {
        SaccadeRow {
            start_screen_x: self.first.screen.map(|s| s.x),
            start_screen_y: self.first.screen.map(|s| s.y),
            start_x: self.first.point.x,
            start_y: self.first.point.y,
            start_z: self.first.point.z,
            end_screen_x: self.last.screen.map(|s| s.x),
            end_screen_y: self.last.screen.map(|s| s.y),
            end_x: self.last.point.x,
            end_y: self.last.point.y,
            end_z: self.last.point.z,
            duration: self.duration(),
            timestamp: self.first.timestamp,
            trial_id: self.first.trial_id,
            trial_onset: self.first.trial_onset,
            label: self.first.label.clone(),
            label_onset: self.first.label_onset,
        }
    }
}

/// Flat fixation record for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationRow {
    pub screen_x: Option<f64>,
    pub screen_y: Option<f64>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub duration: f64,
    pub timestamp: f64,
    pub trial_id: i64,
    pub trial_onset: f64,
    pub label: Option<String>,
    pub label_onset: f64,
}

/// Flat saccade record for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaccadeRow {
    pub start_screen_x: Option<f64>,
    pub start_screen_y: Option<f64>,
    pub start_x: f64,
    pub start_y: f64,
    pub start_z: f64,
    pub end_screen_x: Option<f64>,
    pub end_screen_y: Option<f64>,
    pub end_x: f64,
    pub end_y: f64,
    pub end_z: f64,
    pub duration: f64,
    pub timestamp: f64,
    pub trial_id: i64,
    pub trial_onset: f64,
    pub label: Option<String>,
    pub label_onset: f64,
}

/// Per-trial, per-AOI dwell statistics.
///
/// Onsets are relative to `trial_timestamp`; `first_saccade_latency` is
/// relative to `label_onset`. Fields about events that did not happen in
/// the trial are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoiResult {
    pub trial_id: i64,
    /// Onset of the trial the row belongs to.
    pub trial_timestamp: f64,
    pub dwell_time: f64,
    pub dwell_time_relative: f64,
    pub first_fixation_duration: Option<f64>,
    pub first_fixation_onset: Option<f64>,
    pub aoi_visited_before_count: Option<u32>,
    pub first_saccade_start_onset: Option<f64>,
    pub first_saccade_end_onset: Option<f64>,
    pub first_saccade_latency: Option<f64>,
    pub saccade_enter_count: u32,
    pub fixation_count_relative: f64,
    pub fixation_count: u32,
    /// Label of the AOI itself.
    pub aoi_label: Option<String>,
    /// Stream label current at the latest event touching the AOI.
    pub label: Option<String>,
    pub label_onset: f64,
}
