// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Streaming Engine
// ─────────────────────────────────────────────────────────────────────
//! Single-owner handle tying window, classifiers, screen mapper and AOI
//! collection together.
//!
//! Per pushed sample:
//!   1. Derive trial and label onsets
//!   2. Sample window: gap-fill, median smoothing, release ready samples
//!   3. Screen projection for ready samples without a screen point
//!   4. Saccade classifier, then fixation classifier
//!   5. Finalized events into the AOI collection
//!   6. Window cleanup
//!
//! Dropping the engine releases all state.

use serde::Serialize;

use gaze_types::{
    AoiResult, FilterParameters, Fixation, FixationRow, GazeError, GazeResult, Saccade,
    SaccadeRow, Sample, SampleColumns, SampleInput, Vec2, Vec3,
};

use crate::aoi::{Aoi, AoiCollection};
use crate::fixation::FixationClassifier;
use crate::saccade::SaccadeClassifier;
use crate::screen::ScreenMapper;
use crate::window::{ReadySample, SampleWindow};

/// Events emitted by one push (or by `finalise`), in emission order per
/// kind.
///
/// One push may release several ready samples (after a gap-fill or a
/// segment flush), so each kind is a list; every classifier update
/// contributes at most one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepOutput {
    pub fixations: Vec<Fixation>,
    pub saccades: Vec<Saccade>,
    pub aoi_results: Vec<AoiResult>,
}

impl StepOutput {
    pub fn is_empty(&self) -> bool {
        self.fixations.is_empty() && self.saccades.is_empty() && self.aoi_results.is_empty()
    }

    fn append(&mut self, mut other: StepOutput) {
        self.fixations.append(&mut other.fixations);
        self.saccades.append(&mut other.saccades);
        self.aoi_results.append(&mut other.aoi_results);
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutput {
    pub fixations: Vec<Fixation>,
    pub saccades: Vec<Saccade>,
    /// `None` when no AOIs are configured.
    pub aoi_results: Option<Vec<AoiResult>>,
}

impl ParseOutput {
    pub fn fixation_rows(&self) -> Vec<FixationRow> {
        self.fixations.iter().map(Fixation::to_row).collect()
    }

    pub fn saccade_rows(&self) -> Vec<SaccadeRow> {
        self.saccades.iter().map(Saccade::to_row).collect()
    }
}

#[derive(Debug, Clone, Default)]
struct StreamState {
    /// Current trial id and its onset.
    trial: Option<(i64, f64)>,
    /// Current label and its onset.
    label: Option<(Option<String>, f64)>,
    active: bool,
    pushed: u64,
    dropped: u64,
}

/// Gaze analysis handle. One handle processes one ordered sample stream.
pub struct GazeEngine {
    params: FilterParameters,
    window: SampleWindow,
    saccades: SaccadeClassifier,
    fixations: FixationClassifier,
    screen: Option<ScreenMapper>,
    aois: AoiCollection,
    stream: StreamState,
}

impl Default for GazeEngine {
    fn default() -> Self {
        Self::build(FilterParameters::default())
    }
}

impl GazeEngine {
    /// Create an engine; parameters are validated once here and never
    /// change afterwards.
    pub fn new(params: FilterParameters) -> GazeResult<Self> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: FilterParameters) -> Self {
        Self {
            window: SampleWindow::new(params.gap, params.noise),
            saccades: SaccadeClassifier::new(params.saccade),
            fixations: FixationClassifier::new(params.fixation, params.gap.sample_period),
            screen: None,
            aois: AoiCollection::new(),
            stream: StreamState::default(),
            params,
        }
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    // ── Screen ──────────────────────────────────────────────────────

    /// Calibrate the screen plane. Returns whether projections are
    /// available; a degenerate calibration is kept but maps nothing.
    pub fn set_screen(&mut self, top_left: Vec3, top_right: Vec3, bottom_left: Vec3) -> bool {
        self.install_screen(ScreenMapper::new(top_left, top_right, bottom_left))
    }

    /// [`set_screen`](Self::set_screen) from nine scalars, laid out as in
    /// [`ScreenMapper::from_scalars`].
    pub fn set_screen_from_scalars(&mut self, v: [f64; 9]) -> bool {
        self.install_screen(ScreenMapper::from_scalars(v))
    }

    fn install_screen(&mut self, mapper: ScreenMapper) -> bool {
        let available = !mapper.is_degenerate();
        if available {
            let (top_left, top_right, bottom_left) = mapper.corners();
            log::info!("screen calibrated: {top_left:?} {top_right:?} {bottom_left:?}");
        }
        self.screen = Some(mapper);
        available
    }

    pub fn clear_screen(&mut self) {
        self.screen = None;
    }

    pub fn screen(&self) -> Option<&ScreenMapper> {
        self.screen.as_ref()
    }

    pub fn screen_available(&self) -> bool {
        self.screen.as_ref().is_some_and(|s| !s.is_degenerate())
    }

    // ── AOIs ────────────────────────────────────────────────────────

    /// Add a prebuilt AOI. Fails while a stream is in progress.
    pub fn add_aoi(&mut self, aoi: Aoi) -> GazeResult<()> {
        self.ensure_idle()?;
        self.aois.add(aoi);
        Ok(())
    }

    pub fn add_aoi_polygon(&mut self, vertices: Vec<Vec2>, label: Option<&str>) -> GazeResult<()> {
        self.ensure_idle()?;
        self.aois.add(Aoi::polygon(vertices, label.map(str::to_string))?);
        Ok(())
    }

    pub fn add_aoi_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: Option<&str>,
    ) -> GazeResult<()> {
        self.ensure_idle()?;
        self.aois
            .add(Aoi::rectangle(x, y, width, height, label.map(str::to_string))?);
        Ok(())
    }

    pub fn clear_aois(&mut self) -> GazeResult<()> {
        self.ensure_idle()?;
        self.aois.clear();
        log::info!("AOI set cleared");
        Ok(())
    }

    pub fn aois(&self) -> &[Aoi] {
        self.aois.aois()
    }

    fn ensure_idle(&self) -> GazeResult<()> {
        if self.stream.active {
            return Err(GazeError::StreamActive);
        }
        Ok(())
    }

    // ── Streaming ───────────────────────────────────────────────────

    /// Whether samples were pushed since the last `finalise`.
    pub fn stream_active(&self) -> bool {
        self.stream.active
    }

    /// Samples accepted / dropped as non-finite since the last `finalise`.
    pub fn sample_counts(&self) -> (u64, u64) {
        (self.stream.pushed, self.stream.dropped)
    }

    /// Feed one sample and collect every event it finalized.
    ///
    /// Samples with non-finite coordinates or timestamp are dropped; the
    /// hole they leave is treated like any other gap.
    pub fn push_sample(&mut self, input: SampleInput) -> StepOutput {
        let mut out = StepOutput::default();
        if !input.is_finite() {
            log::warn!("dropping non-finite sample at t={}", input.timestamp);
            self.stream.dropped += 1;
            return out;
        }
        self.stream.active = true;
        self.stream.pushed += 1;

        let sample = self.annotate(input);
        self.window.push(sample);
        self.drain(&mut out);
        self.window.cleanup();
        out
    }

    /// End the stream: flush pending samples and the open fixation
    /// candidate, then close the current AOI trial. The engine is ready
    /// for a new stream afterwards; an in-flight saccade is discarded.
    pub fn finalise(&mut self) -> StepOutput {
        let mut out = StepOutput::default();
        self.window.flush();
        self.drain(&mut out);
        if let Some(fixation) = self.fixations.flush() {
            self.record_fixation(fixation, &mut out);
        }
        out.aoi_results.extend(self.aois.finalise());

        self.window.reset();
        self.saccades.reset();
        self.fixations.reset();
        if self.stream.active {
            log::debug!(
                "stream finalised: {} samples, {} dropped",
                self.stream.pushed,
                self.stream.dropped
            );
        }
        self.stream = StreamState::default();
        out
    }

    /// Process a whole stream: `push_sample` per item in order, then
    /// `finalise`.
    pub fn parse<I>(&mut self, samples: I) -> ParseOutput
    where
        I: IntoIterator<Item = SampleInput>,
    {
        let mut all = StepOutput::default();
        for input in samples {
            all.append(self.push_sample(input));
        }
        all.append(self.finalise());

        ParseOutput {
            fixations: all.fixations,
            saccades: all.saccades,
            aoi_results: (!self.aois.is_empty()).then_some(all.aoi_results),
        }
    }

    /// Column-oriented [`parse`](Self::parse). Rejects ragged columns
    /// before touching any state.
    pub fn parse_columns(&mut self, columns: &SampleColumns<'_>) -> GazeResult<ParseOutput> {
        columns.validate()?;
        Ok(self.parse(columns.rows()))
    }

    fn annotate(&mut self, input: SampleInput) -> Sample {
        let ts = input.timestamp;
        let trial_id = input.trial_id.unwrap_or(0);

        let trial_onset = match self.stream.trial {
            Some((id, onset)) if id == trial_id => onset,
            _ => {
                self.stream.trial = Some((trial_id, ts));
                self.stream.label = None;
                ts
            }
        };
        let label_onset = match &self.stream.label {
            Some((label, onset)) if *label == input.label => *onset,
            _ => {
                self.stream.label = Some((input.label.clone(), ts));
                ts
            }
        };

        Sample {
            origin: input.origin,
            point: input.point,
            screen: input.screen,
            timestamp: ts,
            trial_id,
            label: input.label,
            trial_onset,
            label_onset,
            interpolated: false,
        }
    }

    fn drain(&mut self, out: &mut StepOutput) {
        while let Some(ready) = self.window.take_ready() {
            self.classify(ready, out);
        }
    }

    fn classify(&mut self, ready: ReadySample, out: &mut StepOutput) {
        let ReadySample {
            mut sample,
            boundary,
        } = ready;
        if sample.screen.is_none() {
            if let Some(mapper) = &self.screen {
                sample.screen = mapper.project(sample.origin, sample.point);
            }
        }

        if let Some(saccade) = self.saccades.update(&sample, boundary) {
            out.aoi_results.extend(self.aois.analyse_saccade(&saccade));
            out.saccades.push(saccade);
        }
        if let Some(fixation) = self.fixations.update(&sample, boundary) {
            self.record_fixation(fixation, out);
        }
        self.aois.note_sample(&sample);
    }

    fn record_fixation(&mut self, fixation: Fixation, out: &mut StepOutput) {
        out.aoi_results.extend(self.aois.analyse_fixation(&fixation));
        out.fixations.push(fixation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: f64 = 10.0;

    fn params() -> FilterParameters {
        let mut p = FilterParameters::default();
        p.gap.sample_period = PERIOD;
        p.gap.max_gap_length = 3;
        p.noise.mid_idx = 1;
        p.fixation.duration_threshold = 100.0;
        p.fixation.dispersion_threshold = 5.0;
        p.saccade.velocity_threshold = 20.0;
        p
    }

    fn engine() -> GazeEngine {
        GazeEngine::new(params()).unwrap()
    }

    /// Gaze from the tracker origin onto the plane z = 600.
    fn at(ts: f64, x: f64) -> SampleInput {
        SampleInput::new(Vec3::ZERO, Vec3::new(x, 0.0, 600.0), ts)
    }

    fn run(ts: std::ops::Range<usize>, x: f64) -> impl Iterator<Item = SampleInput> {
        ts.map(move |i| at(i as f64 * PERIOD, x))
    }

    // ── Parameters ──────────────────────────────────────────────────

    #[test]
    fn test_parameter_roundtrip() {
        let p = params();
        assert_eq!(*GazeEngine::new(p).unwrap().parameters(), p);
        assert_eq!(
            *GazeEngine::default().parameters(),
            FilterParameters::default()
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut p = params();
        p.gap.sample_period = -1.0;
        assert!(matches!(GazeEngine::new(p), Err(GazeError::Config(_))));
    }

    // ── Fixations ───────────────────────────────────────────────────

    #[test]
    fn test_min_duration_single_fixation() {
        let mut e = engine();
        let out = e.parse(run(0..20, 0.0));
        assert_eq!(out.fixations.len(), 1);
        assert!((out.fixations[0].duration - 19.0 * PERIOD).abs() < 1e-9);
        assert!(out.saccades.is_empty());
        assert!(out.aoi_results.is_none());
    }

    #[test]
    fn test_below_min_duration_no_fixation() {
        let mut e = engine();
        assert!(e.parse(run(0..8, 0.0)).fixations.is_empty());
    }

    #[test]
    fn test_min_duration_boundary() {
        // threshold 100 / period 10: ten samples are just enough
        let mut e = engine();
        assert!(e.parse(run(0..9, 0.0)).fixations.is_empty());
        let out = e.parse(run(0..10, 0.0));
        assert_eq!(out.fixations.len(), 1);
        assert!((out.fixations[0].duration - 9.0 * PERIOD).abs() < 1e-9);
        let out = e.parse(run(0..11, 0.0));
        assert_eq!(out.fixations.len(), 1);
        assert!((out.fixations[0].duration - 10.0 * PERIOD).abs() < 1e-9);
    }

    #[test]
    fn test_dispersion_split_emits_both() {
        let mut e = engine();
        let out = e.parse(run(0..15, 0.0).chain(run(15..30, 50.0)));
        assert_eq!(out.fixations.len(), 2);
        assert!((out.fixations[0].duration - 140.0).abs() < 1e-9);
        assert_eq!(out.fixations[1].first.timestamp, 150.0);
        assert!((out.fixations[1].point.x - 50.0).abs() < 1e-9);
        assert_eq!(out.saccades.len(), 1);
    }

    #[test]
    fn test_dispersion_split_discards_short_run() {
        let mut e = engine();
        let out = e.parse(run(0..5, 0.0).chain(run(5..25, 50.0)));
        assert_eq!(out.fixations.len(), 1);
        assert_eq!(out.fixations[0].first.timestamp, 50.0);
    }

    #[test]
    fn test_push_emits_on_split() {
        let mut e = engine();
        for s in run(0..15, 0.0) {
            assert!(e.push_sample(s).fixations.is_empty());
        }
        // the 50-sample becomes ready one push later (mid_idx = 1)
        assert!(e.push_sample(at(150.0, 50.0)).fixations.is_empty());
        let out = e.push_sample(at(160.0, 50.0));
        assert_eq!(out.fixations.len(), 1);
        assert_eq!(out.saccades.len(), 0);
        let out = e.push_sample(at(170.0, 50.0));
        assert_eq!(out.saccades.len(), 1);
    }

    // ── Gaps ────────────────────────────────────────────────────────

    #[test]
    fn test_gap_of_max_length_keeps_fixation_whole() {
        let mut e = engine();
        // 40, 50, 60 missing
        let out = e.parse(run(0..4, 0.0).chain(run(7..21, 0.0)));
        assert_eq!(out.fixations.len(), 1);
        assert!((out.fixations[0].duration - 200.0).abs() < 1e-9);
        assert_eq!(out.fixations[0].sample_count, 21);
    }

    #[test]
    fn test_gap_beyond_max_length_splits() {
        let mut e = engine();
        // 40, 50, 60, 70 missing
        let out = e.parse(run(0..4, 0.0).chain(run(8..21, 0.0)));
        assert_eq!(out.fixations.len(), 1);
        assert_eq!(out.fixations[0].first.timestamp, 80.0);
        assert!((out.fixations[0].duration - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_fill_releases_filled_samples() {
        let mut e = engine();
        for s in run(0..3, 0.0) {
            e.push_sample(s);
        }
        e.push_sample(at(60.0, 0.0));
        // 0..=50 ready, 60 still waiting for its successor
        assert_eq!(e.window.pending(), 1);
    }

    #[test]
    fn test_non_finite_sample_is_gap_filled() {
        let mut e = engine();
        let mut samples: Vec<SampleInput> = run(0..20, 0.0).collect();
        samples[10].point.x = f64::NAN;
        let out = e.parse(samples);
        assert_eq!(out.fixations.len(), 1);
        assert_eq!(out.fixations[0].sample_count, 20);
    }

    #[test]
    fn test_non_monotonic_time_splits_without_panic() {
        let mut e = engine();
        let out = e.parse(run(0..15, 0.0).chain(run(5..20, 0.0)));
        assert_eq!(out.fixations.len(), 2);
    }

    // ── Saccades ────────────────────────────────────────────────────

    #[test]
    fn test_single_saccade() {
        let mut e = engine();
        let out = e.parse(run(0..10, 0.0).chain(run(10..20, 100.0)));
        assert_eq!(out.saccades.len(), 1);
        let s = &out.saccades[0];
        assert_eq!(s.first.timestamp, 90.0);
        assert_eq!(s.last.timestamp, 100.0);
        assert!((s.duration() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_slow_drift_no_saccade() {
        let mut e = engine();
        let samples = (0..100).map(|i| at(i as f64 * PERIOD, i as f64 * 0.01));
        assert!(e.parse(samples).saccades.is_empty());
    }

    // ── Screen ──────────────────────────────────────────────────────

    fn calibrate(e: &mut GazeEngine) -> bool {
        // 500 × 300 screen centred on x = 0 in the plane z = 600
        e.set_screen_from_scalars([
            -250.0, 150.0, 600.0, 250.0, 150.0, 600.0, -250.0, -150.0, 600.0,
        ])
    }

    #[test]
    fn test_screen_mapping_on_fixation() {
        let mut e = engine();
        assert!(calibrate(&mut e));
        let out = e.parse(run(0..20, 0.0));
        let p = out.fixations[0].screen.unwrap();
        assert!((p.x - 0.5).abs() < 1e-9);
        assert!((p.y - 0.5).abs() < 1e-9);
        let row = &out.fixation_rows()[0];
        assert!((row.screen_x.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_screen_unavailable() {
        let mut e = engine();
        let ok = e.set_screen(
            Vec3::new(0.0, 0.0, 600.0),
            Vec3::new(1.0, 0.0, 600.0),
            Vec3::new(2.0, 0.0, 600.0),
        );
        assert!(!ok);
        assert!(!e.screen_available());
        let out = e.parse(run(0..20, 0.0).chain(run(20..40, 100.0)));
        assert!(out.fixations.iter().all(|f| f.screen.is_none()));
        assert!(out.saccade_rows().iter().all(|s| s.end_screen_x.is_none()));
    }

    #[test]
    fn test_supplied_screen_bypasses_projection() {
        let mut e = engine();
        calibrate(&mut e);
        let samples = run(0..20, 0.0).map(|s| s.with_screen(Vec2::new(0.9, 0.1)));
        let p = e.parse(samples).fixations[0].screen.unwrap();
        assert!((p.x - 0.9).abs() < 1e-9);
    }

    // ── AOIs ────────────────────────────────────────────────────────

    #[test]
    fn test_aoi_dwell_aggregation() {
        let mut e = engine();
        e.add_aoi_rect(0.0, 0.0, 0.5, 0.5, Some("A")).unwrap();
        e.add_aoi_rect(0.5, 0.5, 0.5, 0.5, Some("B")).unwrap();
        let samples = run(0..15, 0.0)
            .map(|s| s.with_screen(Vec2::new(0.1, 0.1)))
            .chain(run(15..30, 50.0).map(|s| s.with_screen(Vec2::new(0.2, 0.2))))
            .chain(run(30..45, 100.0).map(|s| s.with_screen(Vec2::new(0.3, 0.3))))
            .map(|s| s.with_trial(7));
        let out = e.parse(samples);
        assert_eq!(out.fixations.len(), 3);
        let total: f64 = out.fixations.iter().map(|f| f.duration).sum();

        let rows = out.aoi_results.unwrap();
        assert!(rows.iter().all(|r| r.aoi_label.as_deref() == Some("A")));
        // entry row + trial summary
        assert_eq!(rows.len(), 2);
        let summary = rows.last().unwrap();
        assert_eq!(summary.trial_id, 7);
        assert_eq!(summary.fixation_count, 3);
        assert!((summary.dwell_time - total).abs() < 1e-9);
        assert!((summary.fixation_count_relative - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_aoi_relative_dwell_spans_trailing_samples() {
        let mut e = engine();
        e.add_aoi_rect(0.0, 0.0, 0.5, 0.5, Some("A")).unwrap();
        // 190 ms fixation inside A, then slow drift outside that never
        // settles into a fixation
        let drift = (20..120).map(|i| {
            at(i as f64 * PERIOD, 100.0 + (i - 20) as f64 * 1.5)
                .with_screen(Vec2::new(0.9, 0.9))
        });
        let samples = run(0..20, 0.0)
            .map(|s| s.with_screen(Vec2::new(0.25, 0.25)))
            .chain(drift);
        let out = e.parse(samples);
        assert_eq!(out.fixations.len(), 1);
        assert_eq!(out.saccades.len(), 1);

        let rows = out.aoi_results.unwrap();
        let summary = rows.last().unwrap();
        assert!((summary.dwell_time - 190.0).abs() < 1e-9);
        // trial runs from 0 to the last sample at 1190
        assert!((summary.dwell_time_relative - 190.0 / 1190.0).abs() < 1e-9);
    }

    #[test]
    fn test_aoi_rows_per_trial() {
        let mut e = engine();
        e.add_aoi_rect(0.0, 0.0, 1.0, 1.0, Some("all")).unwrap();
        let samples = run(0..20, 0.0)
            .map(|s| s.with_screen(Vec2::new(0.5, 0.5)).with_trial(1))
            .chain(
                run(20..40, 0.0).map(|s| s.with_screen(Vec2::new(0.5, 0.5)).with_trial(2)),
            );
        let rows = e.parse(samples).aoi_results.unwrap();
        let trials: Vec<i64> = rows.iter().map(|r| r.trial_id).collect();
        assert_eq!(trials, vec![1, 1, 2, 2]);
        assert_eq!(rows[2].trial_timestamp, 200.0);
        assert_eq!(rows[3].first_fixation_onset, Some(0.0));
    }

    #[test]
    fn test_aoi_set_frozen_during_stream() {
        let mut e = engine();
        e.push_sample(at(0.0, 0.0));
        assert!(matches!(
            e.add_aoi_rect(0.0, 0.0, 1.0, 1.0, None),
            Err(GazeError::StreamActive)
        ));
        assert!(e.clear_aois().is_err());
        e.finalise();
        assert!(e.add_aoi_rect(0.0, 0.0, 1.0, 1.0, None).is_ok());
        assert!(e.add_aoi_polygon(vec![Vec2::new(0.0, 0.0)], None).is_err());
        assert_eq!(e.aois().len(), 1);
    }

    // ── Onsets ──────────────────────────────────────────────────────

    #[test]
    fn test_trial_and_label_onsets() {
        let mut e = engine();
        let samples = run(0..15, 0.0)
            .map(|s| s.with_trial(1))
            .chain(run(15..30, 0.0).map(|s| s.with_trial(1).with_label("cue")))
            .chain(run(30..45, 50.0).map(|s| s.with_trial(1).with_label("cue")));
        let out = e.parse(samples);
        assert_eq!(out.fixations.len(), 2);
        let rows = out.fixation_rows();
        assert_eq!(rows[0].trial_onset, 0.0);
        assert_eq!(rows[0].label, None);
        assert_eq!(rows[1].label.as_deref(), Some("cue"));
        assert_eq!(rows[1].label_onset, 150.0);
        assert_eq!(rows[1].trial_id, 1);
    }

    // ── Batch ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_columns() {
        let n = 20;
        let zeros = vec![0.0; n];
        let z = vec![600.0; n];
        let ts: Vec<f64> = (0..n).map(|i| i as f64 * PERIOD).collect();
        let cols = SampleColumns {
            origin_x: &zeros,
            origin_y: &zeros,
            origin_z: &zeros,
            point_x: &zeros,
            point_y: &zeros,
            point_z: &z,
            timestamp: &ts,
            ..Default::default()
        };
        let mut e = engine();
        assert_eq!(e.parse_columns(&cols).unwrap().fixations.len(), 1);

        let short = &ts[..5];
        let ragged = SampleColumns {
            timestamp: short,
            ..cols
        };
        assert!(matches!(
            e.parse_columns(&ragged),
            Err(GazeError::Validation(_))
        ));
        assert!(!e.stream_active());
    }

    #[test]
    fn test_parse_output_serializes() {
        let mut e = engine();
        e.add_aoi_rect(0.0, 0.0, 1.0, 1.0, Some("all")).unwrap();
        let out = e.parse(run(0..20, 0.0).map(|s| s.with_screen(Vec2::new(0.5, 0.5))));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["fixations"].as_array().unwrap().len(), 1);
        assert_eq!(json["aoi_results"][0]["aoi_label"], "all");
        assert!(json["saccades"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_finalise_resets_stream() {
        let mut e = engine();
        for s in run(0..20, 0.0) {
            e.push_sample(s);
        }
        assert_eq!(e.sample_counts(), (20, 0));
        assert_eq!(e.finalise().fixations.len(), 1);
        assert!(!e.stream_active());
        assert!(e.finalise().is_empty());
        // a new stream starting earlier in time is not a discontinuity
        assert_eq!(e.parse(run(0..20, 0.0)).fixations.len(), 1);
    }
}
