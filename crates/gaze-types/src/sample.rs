// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Sample Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{GazeError, GazeResult};
use crate::geometry::{Vec2, Vec3};

/// Raw gaze measurement as handed over by the host.
///
/// Trial and label onsets are not part of the input; the engine derives
/// them from the order in which trial ids and labels appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleInput {
    pub origin: Vec3,
    pub point: Vec3,
    /// Pre-computed screen point. Bypasses screen projection when set.
    pub screen: Option<Vec2>,
    pub timestamp: f64,
    /// Defaults to trial 0 when absent.
    pub trial_id: Option<i64>,
    pub label: Option<String>,
}

impl SampleInput {
    pub fn new(origin: Vec3, point: Vec3, timestamp: f64) -> Self {
        Self {
            origin,
            point,
            screen: None,
            timestamp,
            trial_id: None,
            label: None,
        }
    }

    pub fn with_screen(mut self, screen: Vec2) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn with_trial(mut self, trial_id: i64) -> Self {
        self.trial_id = Some(trial_id);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether every positional field is a finite number.
    ///
    /// Trackers report lost frames as NaN; such samples are dropped and
    /// the hole they leave is handled by gap-fill.
    pub fn is_finite(&self) -> bool {
        self.origin.is_finite()
            && self.point.is_finite()
            && self.timestamp.is_finite()
            && self.screen.map_or(true, Vec2::is_finite)
    }
}

/// A gaze sample owned by the sample window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub origin: Vec3,
    pub point: Vec3,
    pub screen: Option<Vec2>,
    pub timestamp: f64,
    pub trial_id: i64,
    pub label: Option<String>,
    /// Timestamp of the first sample of the current trial.
    pub trial_onset: f64,
    /// Timestamp at which the current label began.
    pub label_onset: f64,
    /// Synthesized by gap-fill rather than measured.
    pub interpolated: bool,
}

impl Sample {
    /// Gaze vector from origin to point.
    pub fn gaze(&self) -> Vec3 {
        self.point - self.origin
    }

    /// Synthesize a sample between `prev` and `next` at fraction `t`.
    ///
    /// Positions are interpolated linearly; the screen point only when both
    /// neighbours carry one. Trial and label provenance come from `next`.
    pub fn interpolate(prev: &Sample, next: &Sample, t: f64) -> Self {
        let screen = match (prev.screen, next.screen) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            _ => None,
        };
        Self {
            origin: prev.origin.lerp(next.origin, t),
            point: prev.point.lerp(next.point, t),
            screen,
            timestamp: prev.timestamp + (next.timestamp - prev.timestamp) * t,
            trial_id: next.trial_id,
            label: next.label.clone(),
            trial_onset: next.trial_onset,
            label_onset: next.label_onset,
            interpolated: true,
        }
    }
}

/// Column-oriented batch input, one slice per field.
///
/// Optional columns stand for stream-wide defaults (no screen point,
/// trial 0, no label).
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleColumns<'a> {
    pub origin_x: &'a [f64],
    pub origin_y: &'a [f64],
    pub origin_z: &'a [f64],
    pub point_x: &'a [f64],
    pub point_y: &'a [f64],
    pub point_z: &'a [f64],
    pub screen_x: Option<&'a [f64]>,
    pub screen_y: Option<&'a [f64]>,
    pub timestamp: &'a [f64],
    pub trial_id: Option<&'a [i64]>,
    pub label: Option<&'a [Option<String>]>,
}

impl<'a> SampleColumns<'a> {
    /// Check that all present columns have the same length and that the
    /// screen columns come as a pair. Returns the row count.
    pub fn validate(&self) -> GazeResult<usize> {
        let n = self.timestamp.len();
        let required = [
            ("origin_x", self.origin_x.len()),
            ("origin_y", self.origin_y.len()),
            ("origin_z", self.origin_z.len()),
            ("point_x", self.point_x.len()),
            ("point_y", self.point_y.len()),
            ("point_z", self.point_z.len()),
        ];
        for (name, len) in required {
            if len != n {
                return Err(GazeError::Validation(format!(
                    "column {name} has {len} rows, timestamp has {n}"
                )));
            }
        }
        match (self.screen_x, self.screen_y) {
            (Some(sx), Some(sy)) if sx.len() != n || sy.len() != n => {
                return Err(GazeError::Validation(format!(
                    "screen columns have {}/{} rows, timestamp has {n}",
                    sx.len(),
                    sy.len()
                )));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(GazeError::Validation(
                    "screen_x and screen_y must be given together".to_string(),
                ));
            }
            _ => {}
        }
        if let Some(t) = self.trial_id {
            if t.len() != n {
                return Err(GazeError::Validation(format!(
                    "column trial_id has {} rows, timestamp has {n}",
                    t.len()
                )));
            }
        }
        if let Some(l) = self.label {
            if l.len() != n {
                return Err(GazeError::Validation(format!(
                    "column label has {} rows, timestamp has {n}",
                    l.len()
                )));
            }
        }
        Ok(n)
    }

    /// Iterate rows in order. Stops at the shortest column, so call
    /// [`validate`](Self::validate) first to reject ragged input.
    pub fn rows(&self) -> impl Iterator<Item = SampleInput> + 'a {
        let cols = *self;
        let n = [
            cols.timestamp.len(),
            cols.origin_x.len(),
            cols.origin_y.len(),
            cols.origin_z.len(),
            cols.point_x.len(),
            cols.point_y.len(),
            cols.point_z.len(),
        ]
        .into_iter()
        .chain(cols.screen_x.map(<[f64]>::len))
        .chain(cols.screen_y.map(<[f64]>::len))
        .chain(cols.trial_id.map(<[i64]>::len))
        .chain(cols.label.map(<[Option<String>]>::len))
        .min()
        .unwrap_or(0);

        (0..n).map(move |i| {
            let screen = match (cols.screen_x, cols.screen_y) {
                (Some(sx), Some(sy)) => Some(Vec2::new(sx[i], sy[i])),
                _ => None,
            };
            SampleInput {
                origin: Vec3::new(cols.origin_x[i], cols.origin_y[i], cols.origin_z[i]),
                point: Vec3::new(cols.point_x[i], cols.point_y[i], cols.point_z[i]),
                screen,
                timestamp: cols.timestamp[i],
                trial_id: cols.trial_id.map(|t| t[i]),
                label: cols.label.and_then(|l| l[i].clone()),
            }
        })
    }
}
