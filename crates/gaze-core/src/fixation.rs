// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Fixation Classifier (dispersion + duration)
// ─────────────────────────────────────────────────────────────────────
//! Dispersion-threshold detector.
//!
//! Consecutive ready samples are collected into a candidate as long as
//! each new gaze point stays within `dispersion_threshold` of the
//! candidate's running centroid. The first sample that does not closes the
//! candidate, which is emitted when it covers at least
//! `duration_threshold` and discarded otherwise; the rejected sample
//! starts the next candidate.
//!
//! Each member sample covers one `sample_period`, so a candidate of `n`
//! samples covers `n * sample_period` while its reported duration is
//! `last.timestamp - first.timestamp`.

use gaze_types::{Fixation, FixationParameters, Sample, Vec2, Vec3};

/// Classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixationState {
    /// No candidate.
    Idle,
    /// Candidate shorter than the duration threshold.
    Collecting,
    /// Candidate long enough to be emitted when it closes.
    InFixation,
}

#[derive(Debug, Clone)]
struct Candidate {
    first: Sample,
    last_timestamp: f64,
    point_sum: Vec3,
    origin_sum: Vec3,
    screen_sum: Vec2,
    screen_count: usize,
    count: usize,
}

impl Candidate {
    fn new(sample: &Sample) -> Self {
        let mut c = Self {
            first: sample.clone(),
            last_timestamp: sample.timestamp,
            point_sum: Vec3::ZERO,
            origin_sum: Vec3::ZERO,
            screen_sum: Vec2::default(),
            screen_count: 0,
            count: 0,
        };
        c.push(sample);
        c
    }

    fn push(&mut self, sample: &Sample) {
        self.last_timestamp = sample.timestamp;
        self.point_sum = self.point_sum + sample.point;
        self.origin_sum = self.origin_sum + sample.origin;
        if let Some(s) = sample.screen {
            self.screen_sum = Vec2::new(self.screen_sum.x + s.x, self.screen_sum.y + s.y);
            self.screen_count += 1;
        }
        self.count += 1;
    }

    fn centroid(&self) -> Vec3 {
        self.point_sum * (1.0 / self.count as f64)
    }

    fn duration(&self) -> f64 {
        self.last_timestamp - self.first.timestamp
    }

    /// Time covered by the member samples, one period each.
    fn coverage(&self, sample_period: f64) -> f64 {
        self.count as f64 * sample_period
    }

    fn into_fixation(self) -> Fixation {
        let n = self.count as f64;
        let screen = (self.screen_count == self.count)
            .then(|| Vec2::new(self.screen_sum.x / n, self.screen_sum.y / n));
        Fixation {
            point: self.point_sum * (1.0 / n),
            origin: self.origin_sum * (1.0 / n),
            screen,
            duration: self.last_timestamp - self.first.timestamp,
            first: self.first,
            sample_count: self.count,
        }
    }
}

pub struct FixationClassifier {
    duration_threshold: f64,
    dispersion_threshold: f64,
    sample_period: f64,
    candidate: Option<Candidate>,
}

impl FixationClassifier {
    pub fn new(params: FixationParameters, sample_period: f64) -> Self {
        Self {
            duration_threshold: params.duration_threshold,
            dispersion_threshold: params.dispersion_threshold,
            sample_period,
            candidate: None,
        }
    }

    fn long_enough(&self, candidate: &Candidate) -> bool {
        candidate.coverage(self.sample_period) >= self.duration_threshold
    }

    pub fn state(&self) -> FixationState {
        match &self.candidate {
            None => FixationState::Idle,
            Some(c) if self.long_enough(c) => FixationState::InFixation,
            Some(_) => FixationState::Collecting,
        }
    }

    /// Feed the next ready sample. Returns the fixation closed by it, if any.
    ///
    /// A segment boundary closes the running candidate unconditionally.
    pub fn update(&mut self, sample: &Sample, boundary: bool) -> Option<Fixation> {
        if !boundary {
            if let Some(c) = &mut self.candidate {
                if sample.point.distance(c.centroid()) <= self.dispersion_threshold {
                    c.push(sample);
                    return None;
                }
            }
        }
        let closed = self.candidate.replace(Candidate::new(sample))?;
        self.finish(closed)
    }

    /// Close the running candidate at end of stream.
    pub fn flush(&mut self) -> Option<Fixation> {
        let closed = self.candidate.take()?;
        self.finish(closed)
    }

    pub fn reset(&mut self) {
        self.candidate = None;
    }

    fn finish(&self, candidate: Candidate) -> Option<Fixation> {
        if !self.long_enough(&candidate) {
            log::trace!(
                "discarding fixation candidate at t={} (covers {:.1} < {})",
                candidate.first.timestamp,
                candidate.coverage(self.sample_period),
                self.duration_threshold
            );
            return None;
        }
        let fixation = candidate.into_fixation();
        log::debug!(
            "fixation at t={} for {:.1} ({} samples)",
            fixation.first.timestamp,
            fixation.duration,
            fixation.sample_count
        );
        Some(fixation)
    }
}
