// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Streaming eye-movement classification and area-of-interest analysis.
//!
//! Raw 3D gaze samples flow through a fixed pipeline owned by
//! [`GazeEngine`]: gap-filling and median smoothing ([`window`]), velocity
//! threshold saccade detection ([`saccade`]), dispersion threshold fixation
//! detection ([`fixation`]), optional projection onto a calibrated screen
//! ([`screen`]) and per-trial dwell statistics ([`aoi`]).
//!
//! # Invariants
//!
//! 1. **Classifiers see samples in order, exactly once**: every pushed
//!    sample (and every sample interpolated into a short gap) reaches both
//!    classifiers after smoothing, in timestamp order within a segment.
//!
//! 2. **Nothing connects across a discontinuity**: long gaps, backwards
//!    time and trial changes start a new segment. Smoothing never mixes
//!    segments, an in-flight saccade is dropped and the running fixation
//!    candidate is closed.
//!
//! 3. **Only complete events are emitted**: a saccade is emitted when the
//!    velocity falls back below threshold; a fixation when the dispersion
//!    limit is exceeded, a segment ends or the stream is finalised, and
//!    only if its samples cover the minimum duration.
//!
//! 4. **Bounded memory**: the sample window holds at most
//!    `2 * mid_idx + max_gap_length + 1` samples between pushes.

pub mod aoi;
pub mod engine;
pub mod fixation;
pub mod saccade;
pub mod screen;
pub mod window;

pub use aoi::{Aoi, AoiCollection, AoiShape};
pub use engine::{GazeEngine, ParseOutput, StepOutput};
pub use fixation::{FixationClassifier, FixationState};
pub use saccade::{SaccadeClassifier, SaccadeState, TIME_UNITS_PER_SECOND};
pub use screen::ScreenMapper;
pub use window::{ReadySample, SampleWindow};
