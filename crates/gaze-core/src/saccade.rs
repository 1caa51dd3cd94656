// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Saccade Classifier (velocity threshold)
// ─────────────────────────────────────────────────────────────────────
//! Two-state velocity-threshold detector over the ready-sample stream.
//!
//! `Idle → InSaccade` when the velocity between two consecutive samples
//! reaches the threshold; `InSaccade → Idle` when it drops below, which
//! emits the completed saccade. Partial saccades are never emitted.

use gaze_types::{Saccade, SaccadeParameters, Sample};

/// Timestamp units per second (timestamps are milliseconds).
pub const TIME_UNITS_PER_SECOND: f64 = 1000.0;

/// Classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaccadeState {
    Idle,
    InSaccade,
}

/// Velocity between two samples in degrees per second.
///
/// Uses the angle between the two origin→point gaze vectors. When either
/// gaze vector is degenerate (origin equals point) the straight-line
/// displacement of the gaze point per second is used instead.
/// Returns `None` when time does not advance.
pub fn velocity(a: &Sample, b: &Sample) -> Option<f64> {
    let dt = b.timestamp - a.timestamp;
    if dt <= 0.0 {
        return None;
    }
    let dt_s = dt / TIME_UNITS_PER_SECOND;
    let displacement = a
        .gaze()
        .angle_deg(b.gaze())
        .unwrap_or_else(|| a.point.distance(b.point));
    Some(displacement / dt_s)
}

#[derive(Debug, Clone)]
struct OpenSaccade {
    first: Sample,
    last: Sample,
    peak_velocity: f64,
}

pub struct SaccadeClassifier {
    velocity_threshold: f64,
    prev: Option<Sample>,
    open: Option<OpenSaccade>,
}

impl SaccadeClassifier {
    pub fn new(params: SaccadeParameters) -> Self {
        Self {
            velocity_threshold: params.velocity_threshold,
            prev: None,
            open: None,
        }
    }

    pub fn state(&self) -> SaccadeState {
        if self.open.is_some() {
            SaccadeState::InSaccade
        } else {
            SaccadeState::Idle
        }
    }

    /// Feed the next ready sample. Returns the saccade closed by it, if any.
    ///
    /// A segment boundary discards an in-flight saccade: the velocity across
    /// a discontinuity is meaningless.
    pub fn update(&mut self, sample: &Sample, boundary: bool) -> Option<Saccade> {
        let prev = self.prev.replace(sample.clone());
        if boundary {
            if self.open.take().is_some() {
                log::debug!("saccade interrupted by discontinuity at t={}", sample.timestamp);
            }
            return None;
        }
        let prev = prev?;
        let v = velocity(&prev, sample)?;

        if v >= self.velocity_threshold {
            match &mut self.open {
                Some(open) => {
                    open.last = sample.clone();
                    open.peak_velocity = open.peak_velocity.max(v);
                }
                None => {
                    self.open = Some(OpenSaccade {
                        first: prev,
                        last: sample.clone(),
                        peak_velocity: v,
                    });
                }
            }
            return None;
        }

        let open = self.open.take()?;
        log::debug!(
            "saccade {:.1} -> {:.1} (peak {:.0} deg/s)",
            open.first.timestamp,
            open.last.timestamp,
            open.peak_velocity
        );
        Some(Saccade {
            first: open.first,
            last: open.last,
            peak_velocity: open.peak_velocity,
        })
    }

    /// Forget the velocity baseline and any in-flight saccade.
    pub fn reset(&mut self) {
        self.prev = None;
        self.open = None;
    }
}
