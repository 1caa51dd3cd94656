// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Areas of Interest
// ─────────────────────────────────────────────────────────────────────
//! Labeled screen regions and their per-trial dwell statistics.
//!
//! Statistics are scoped to a trial. The first event of a new trial
//! finalises the previous one; [`AoiCollection::finalise`] does the same at
//! end of stream. Rows are emitted when a fixation first lands in an AOI
//! during a trial, and once per touched AOI when the trial is finalised.

use serde::{Deserialize, Serialize};

use gaze_types::{AoiResult, Fixation, GazeError, GazeResult, Saccade, Sample, Vec2};

/// Region geometry in normalized screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AoiShape {
    /// Closed polygon; the last vertex connects back to the first.
    Polygon(Vec<Vec2>),
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl AoiShape {
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => p.x >= *x && p.x <= x + width && p.y >= *y && p.y <= y + height,
            Self::Polygon(vertices) => point_in_polygon(vertices, p),
        }
    }
}

/// Crossing-number test: cast a ray towards +x and count edge crossings.
fn point_in_polygon(vertices: &[Vec2], p: Vec2) -> bool {
    let n = vertices.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A labeled area of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aoi {
    shape: AoiShape,
    label: Option<String>,
}

impl Aoi {
    /// Polygon AOI; needs at least three finite vertices.
    pub fn polygon(vertices: Vec<Vec2>, label: Option<String>) -> GazeResult<Self> {
        if vertices.len() < 3 {
            return Err(GazeError::InvalidAoi(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if !vertices.iter().all(|v| v.is_finite()) {
            return Err(GazeError::InvalidAoi(
                "polygon vertices must be finite".to_string(),
            ));
        }
        Ok(Self {
            shape: AoiShape::Polygon(vertices),
            label,
        })
    }

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    pub fn rectangle(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: Option<String>,
    ) -> GazeResult<Self> {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(GazeError::InvalidAoi(
                "rectangle bounds must be finite".to_string(),
            ));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GazeError::InvalidAoi(format!(
                "rectangle size must be positive, got {width} x {height}"
            )));
        }
        Ok(Self {
            shape: AoiShape::Rectangle {
                x,
                y,
                width,
                height,
            },
            label,
        })
    }

    pub fn shape(&self) -> &AoiShape {
        &self.shape
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.shape.contains(p)
    }
}

#[derive(Debug, Clone, Copy)]
struct FirstFixation {
    duration: f64,
    onset: f64,
}

#[derive(Debug, Clone, Copy)]
struct FirstSaccade {
    start_onset: f64,
    end_onset: f64,
    latency: f64,
}

/// Running statistics of one AOI within the current trial.
#[derive(Debug, Clone, Default)]
struct AoiStats {
    dwell_time: f64,
    fixation_count: u32,
    first_fixation: Option<FirstFixation>,
    visited_before: Option<u32>,
    first_saccade: Option<FirstSaccade>,
    saccade_enter_count: u32,
    label: Option<String>,
    label_onset: f64,
}

impl AoiStats {
    fn touched(&self) -> bool {
        self.fixation_count > 0 || self.saccade_enter_count > 0
    }

    fn note_label(&mut self, sample: &Sample) {
        self.label = sample.label.clone();
        self.label_onset = sample.label_onset;
    }
}

#[derive(Debug, Clone, Copy)]
struct TrialState {
    trial_id: i64,
    onset: f64,
    /// Latest sample timestamp or event end seen in this trial.
    end: f64,
    fixation_total: u32,
    /// AOIs entered by a fixation so far.
    visited: u32,
}

impl TrialState {
    fn row(&self, aoi: &Aoi, stats: &AoiStats) -> AoiResult {
        let duration = self.end - self.onset;
        AoiResult {
            trial_id: self.trial_id,
            trial_timestamp: self.onset,
            dwell_time: stats.dwell_time,
            dwell_time_relative: if duration > 0.0 {
                stats.dwell_time / duration
            } else {
                0.0
            },
            first_fixation_duration: stats.first_fixation.map(|f| f.duration),
            first_fixation_onset: stats.first_fixation.map(|f| f.onset),
            aoi_visited_before_count: stats.visited_before,
            first_saccade_start_onset: stats.first_saccade.map(|s| s.start_onset),
            first_saccade_end_onset: stats.first_saccade.map(|s| s.end_onset),
            first_saccade_latency: stats.first_saccade.map(|s| s.latency),
            saccade_enter_count: stats.saccade_enter_count,
            fixation_count_relative: if self.fixation_total > 0 {
                f64::from(stats.fixation_count) / f64::from(self.fixation_total)
            } else {
                0.0
            },
            fixation_count: stats.fixation_count,
            aoi_label: aoi.label.clone(),
            label: stats.label.clone(),
            label_onset: stats.label_onset,
        }
    }
}

/// The AOI set of one engine together with its running statistics.
#[derive(Debug, Clone, Default)]
pub struct AoiCollection {
    aois: Vec<Aoi>,
    stats: Vec<AoiStats>,
    trial: Option<TrialState>,
}

impl AoiCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, aoi: Aoi) {
        log::info!(
            "AOI #{} added ({})",
            self.aois.len(),
            aoi.label().unwrap_or("unlabeled")
        );
        self.aois.push(aoi);
        self.stats.push(AoiStats::default());
    }

    pub fn clear(&mut self) {
        self.aois.clear();
        self.stats.clear();
        self.trial = None;
    }

    pub fn len(&self) -> usize {
        self.aois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aois.is_empty()
    }

    pub fn aois(&self) -> &[Aoi] {
        &self.aois
    }

    /// Account a finalized fixation. Returns the rows of a trial finalised
    /// by this event followed by one row per AOI entered for the first
    /// time in the current trial.
    pub fn analyse_fixation(&mut self, fixation: &Fixation) -> Vec<AoiResult> {
        let mut out = Vec::new();
        if self.aois.is_empty() {
            return out;
        }
        let mut trial = self.enter_trial(&fixation.first, &mut out);
        trial.fixation_total += 1;
        trial.end = trial.end.max(fixation.end_timestamp());

        let mut entered = Vec::new();
        if let Some(p) = fixation.screen {
            for (i, (aoi, stats)) in self.aois.iter().zip(self.stats.iter_mut()).enumerate() {
                if !aoi.contains(p) {
                    continue;
                }
                stats.dwell_time += fixation.duration;
                stats.fixation_count += 1;
                stats.note_label(&fixation.first);
                if stats.first_fixation.is_none() {
                    stats.first_fixation = Some(FirstFixation {
                        duration: fixation.duration,
                        onset: fixation.first.timestamp - trial.onset,
                    });
                    stats.visited_before = Some(trial.visited);
                    entered.push(i);
                }
            }
        }
        trial.visited += entered.len() as u32;

        out.extend(
            entered
                .into_iter()
                .map(|i| trial.row(&self.aois[i], &self.stats[i])),
        );
        self.trial = Some(trial);
        out
    }

    /// Account a finalized saccade. A saccade enters an AOI when it ends
    /// inside and did not start inside. Returns the rows of a trial
    /// finalised by this event.
    pub fn analyse_saccade(&mut self, saccade: &Saccade) -> Vec<AoiResult> {
        let mut out = Vec::new();
        if self.aois.is_empty() {
            return out;
        }
        let mut trial = self.enter_trial(&saccade.first, &mut out);
        trial.end = trial.end.max(saccade.last.timestamp);

        if let Some(end) = saccade.last.screen {
            let start = saccade.first.screen;
            for (aoi, stats) in self.aois.iter().zip(self.stats.iter_mut()) {
                if !aoi.contains(end) || start.map_or(false, |s| aoi.contains(s)) {
                    continue;
                }
                stats.saccade_enter_count += 1;
                stats.note_label(&saccade.first);
                if stats.first_saccade.is_none() && stats.first_fixation.is_none() {
                    stats.first_saccade = Some(FirstSaccade {
                        start_onset: saccade.first.timestamp - trial.onset,
                        end_onset: saccade.last.timestamp - trial.onset,
                        latency: saccade.first.timestamp - saccade.first.label_onset,
                    });
                }
            }
        }

        self.trial = Some(trial);
        out
    }

    /// Extend the current trial to cover `sample`. Samples of any other
    /// trial are ignored; a trial is opened by its first event.
    pub fn note_sample(&mut self, sample: &Sample) {
        if let Some(trial) = self.trial.as_mut() {
            if trial.trial_id == sample.trial_id {
                trial.end = trial.end.max(sample.timestamp);
            }
        }
    }

    /// Close the current trial: one row per AOI touched in it, carrying the
    /// final trial-relative statistics. Resets all running statistics.
    pub fn finalise(&mut self) -> Vec<AoiResult> {
        let Some(trial) = self.trial.take() else {
            return Vec::new();
        };
        let rows: Vec<AoiResult> = self
            .aois
            .iter()
            .zip(&self.stats)
            .filter(|(_, s)| s.touched())
            .map(|(aoi, s)| trial.row(aoi, s))
            .collect();
        log::debug!(
            "trial {} finalised: {} fixations, {} AOI rows",
            trial.trial_id,
            trial.fixation_total,
            rows.len()
        );
        self.stats.iter_mut().for_each(|s| *s = AoiStats::default());
        rows
    }

    /// Current trial state for an event starting with `first`, finalising
    /// the previous trial into `out` when the trial id changed.
    fn enter_trial(&mut self, first: &Sample, out: &mut Vec<AoiResult>) -> TrialState {
        match self.trial {
            Some(t) if t.trial_id == first.trial_id => t,
            _ => {
                out.extend(self.finalise());
                TrialState {
                    trial_id: first.trial_id,
                    onset: first.trial_onset,
                    end: first.trial_onset,
                    fixation_total: 0,
                    visited: 0,
                }
            }
        }
    }
}
