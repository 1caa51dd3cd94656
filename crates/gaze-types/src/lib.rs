// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, filter configuration, and error hierarchy for the
//! gaze analysis kernel.

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod sample;

pub use config::{
    FilterParameters, FixationParameters, GapParameters, NoiseParameters, SaccadeParameters,
};
pub use error::{GazeError, GazeResult};
pub use event::{AoiResult, Fixation, FixationRow, Saccade, SaccadeRow};
pub use geometry::{Vec2, Vec3};
pub use sample::{Sample, SampleColumns, SampleInput};
