// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all gaze kernel failures.
///
/// Classification itself never fails on ordinary data; errors only come
/// from configuration and AOI management.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GazeError {
    /// Invalid filter parameters.
    #[error("config error: {0}")]
    Config(String),

    /// AOI geometry rejected (too few vertices, empty rectangle, NaN).
    #[error("invalid AOI: {0}")]
    InvalidAoi(String),

    /// The AOI set was modified while a stream was in progress.
    #[error("AOI set is frozen while a stream is in progress; call finalise() first")]
    StreamActive,

    /// Malformed batch input (unequal column lengths).
    #[error("validation error: {0}")]
    Validation(String),
}

pub type GazeResult<T> = Result<T, GazeError>;
