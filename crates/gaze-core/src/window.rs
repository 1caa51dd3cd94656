// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Sample Window (gap-fill + noise reduction)
// ─────────────────────────────────────────────────────────────────────
//! Ordered buffer between the host and the classifiers.
//!
//! Samples enter in arrival order. Short holes in the signal are filled
//! with linearly interpolated samples; longer holes, backwards time and
//! trial changes start a new *segment*. A sample becomes ready once
//! `mid_idx` later samples of its segment are buffered, at which point its
//! origin and point are replaced by the moving median of the raw
//! neighbourhood. Segments never share smoothing context.

use std::collections::VecDeque;

use gaze_types::{GapParameters, NoiseParameters, Sample, Vec3};

/// A smoothed sample released to the classifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadySample {
    pub sample: Sample,
    /// First sample of a segment: classifiers must not connect it to the
    /// sample before.
    pub boundary: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    sample: Sample,
    raw_origin: Vec3,
    raw_point: Vec3,
    boundary: bool,
}

impl Entry {
    fn new(sample: Sample, boundary: bool) -> Self {
        Self {
            raw_origin: sample.origin,
            raw_point: sample.point,
            sample,
            boundary,
        }
    }
}

/// Fixed-context sample buffer.
///
/// Index invariants over `entries`:
/// `consumed <= ready <= entries.len()` and `segment_start <= entries.len()`.
/// Everything before `ready` is smoothed; everything before `consumed`
/// has been handed out by [`take_ready`](Self::take_ready).
pub struct SampleWindow {
    gap: GapParameters,
    mid_idx: usize,
    entries: VecDeque<Entry>,
    ready: usize,
    consumed: usize,
    segment_start: usize,
    prev: Option<Sample>,
}

impl SampleWindow {
    pub fn new(gap: GapParameters, noise: NoiseParameters) -> Self {
        let mid_idx = noise.mid_idx as usize;
        Self {
            gap,
            mid_idx,
            entries: VecDeque::with_capacity(2 * mid_idx + gap.max_gap_length as usize + 2),
            ready: 0,
            consumed: 0,
            segment_start: 0,
            prev: None,
        }
    }

    /// Append a sample, filling short gaps before it.
    ///
    /// Returns the number of samples that became ready during this call.
    pub fn push(&mut self, sample: Sample) -> usize {
        let before = self.ready;

        let boundary = match self.prev.take() {
            None => {
                self.segment_start = self.entries.len();
                true
            }
            Some(prev) => {
                let starts_segment = self.starts_segment(&prev, &sample);
                if starts_segment {
                    self.flush_segment();
                    self.segment_start = self.entries.len();
                } else {
                    self.fill_gap(&prev, &sample);
                }
                starts_segment
            }
        };
        self.prev = Some(sample.clone());
        self.entries.push_back(Entry::new(sample, boundary));
        self.advance();

        self.ready - before
    }

    /// Force every pending sample ready, smoothing with whatever
    /// neighbourhood is available. Used at end of stream.
    pub fn flush(&mut self) -> usize {
        let before = self.ready;
        self.flush_segment();
        self.ready - before
    }

    /// Hand the next ready sample to the classifiers.
    pub fn take_ready(&mut self) -> Option<ReadySample> {
        if self.consumed >= self.ready {
            return None;
        }
        let entry = &self.entries[self.consumed];
        self.consumed += 1;
        Some(ReadySample {
            sample: entry.sample.clone(),
            boundary: entry.boundary,
        })
    }

    /// Evict consumed samples that are no longer needed as smoothing
    /// context for pending ones.
    pub fn cleanup(&mut self) -> usize {
        let evict = self.consumed.min(self.ready.saturating_sub(self.mid_idx));
        self.entries.drain(..evict);
        self.ready -= evict;
        self.consumed -= evict;
        self.segment_start = self.segment_start.saturating_sub(evict);
        evict
    }

    /// Drop all buffered state, including the gap-detection baseline.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.ready = 0;
        self.consumed = 0;
        self.segment_start = 0;
        self.prev = None;
    }

    /// Number of buffered samples (pending, ready and context).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Samples still waiting for their smoothing neighbourhood.
    pub fn pending(&self) -> usize {
        self.entries.len() - self.ready
    }

    fn starts_segment(&self, prev: &Sample, next: &Sample) -> bool {
        if next.trial_id != prev.trial_id {
            log::debug!(
                "trial change {} -> {} at t={}",
                prev.trial_id,
                next.trial_id,
                next.timestamp
            );
            return true;
        }
        let dt = next.timestamp - prev.timestamp;
        if dt <= 0.0 {
            log::warn!(
                "non-monotonic timestamp ({} after {}), starting new segment",
                next.timestamp,
                prev.timestamp
            );
            return true;
        }
        let missing = self.missing_samples(dt);
        if missing > u64::from(self.gap.max_gap_length) {
            log::debug!(
                "gap of {missing} samples before t={} exceeds {}, not interpolated",
                next.timestamp,
                self.gap.max_gap_length
            );
            return true;
        }
        false
    }

    fn missing_samples(&self, dt: f64) -> u64 {
        let steps = (dt / self.gap.sample_period).round();
        if steps <= 1.0 {
            0
        } else {
            steps as u64 - 1
        }
    }

    fn fill_gap(&mut self, prev: &Sample, next: &Sample) {
        let missing = self.missing_samples(next.timestamp - prev.timestamp);
        if missing == 0 {
            return;
        }
        log::debug!(
            "interpolating {missing} samples between t={} and t={}",
            prev.timestamp,
            next.timestamp
        );
        let steps = (missing + 1) as f64;
        for k in 1..=missing {
            let fill = Sample::interpolate(prev, next, k as f64 / steps);
            self.entries.push_back(Entry::new(fill, false));
        }
    }

    /// Promote every sample that has `mid_idx` successors in its segment.
    fn advance(&mut self) {
        let len = self.entries.len();
        while self.ready + self.mid_idx < len {
            self.smooth(self.ready, self.segment_start, len - 1);
            self.ready += 1;
        }
    }

    /// Promote everything still pending in the current segment.
    fn flush_segment(&mut self) {
        let len = self.entries.len();
        while self.ready < len {
            self.smooth(self.ready, self.segment_start, len - 1);
            self.ready += 1;
        }
    }

    /// Replace origin and point of entry `i` with the component-wise median
    /// over `[i - mid_idx, i + mid_idx]`, clipped to `[lo, hi]`.
    fn smooth(&mut self, i: usize, lo: usize, hi: usize) {
        if self.mid_idx == 0 {
            return;
        }
        let start = i.saturating_sub(self.mid_idx).max(lo);
        let end = (i + self.mid_idx).min(hi);
        let neighbourhood = self.entries.range(start..=end);

        let mut origins: Vec<Vec3> = Vec::with_capacity(end - start + 1);
        let mut points: Vec<Vec3> = Vec::with_capacity(end - start + 1);
        for e in neighbourhood {
            origins.push(e.raw_origin);
            points.push(e.raw_point);
        }

        let entry = &mut self.entries[i];
        entry.sample.origin = median_vec3(&origins);
        entry.sample.point = median_vec3(&points);
    }
}

fn median_vec3(values: &[Vec3]) -> Vec3 {
    let mut xs: Vec<f64> = values.iter().map(|v| v.x).collect();
    let mut ys: Vec<f64> = values.iter().map(|v| v.y).collect();
    let mut zs: Vec<f64> = values.iter().map(|v| v.z).collect();
    Vec3::new(median(&mut xs), median(&mut ys), median(&mut zs))
}

/// Median of a non-empty slice; mean of the two middle values for even
/// lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}
