use thiserror::Error;

/// Configuration failures raised by the urn, the predictive methods and the
/// coverage driver. Every variant is fatal for the call that produced it.
#[derive(Debug, Error)]
pub enum UrnError {
    #[error("unknown predictive method '{0}' (supported: polya_dp)")]
    UnknownMethod(String),

    #[error("unknown base '{0}' (use 'uniform' or 'normal')")]
    UnknownBase(String),

    #[error("concentration must be greater than zero, got {0}")]
    NonPositiveConcentration(f64),

    #[error("confidence level must be in (0, 1), got {0}")]
    InvalidLevel(f64),

    #[error("continuation target length {target} is shorter than the history ({have})")]
    ContinuationTooShort { target: usize, have: usize },

    #[error("n must equal the history length: n = {n}, len = {len}")]
    HistoryLengthMismatch { n: usize, len: usize },

    #[error("evaluation grid must contain at least one point")]
    EmptyGrid,

    #[error("record_every must be at least one")]
    InvalidRecordEvery,

    #[error("at least one threshold is required")]
    EmptyThresholds,

    #[error("at least one concentration value is required")]
    EmptyConcentrations,

    #[error("continuation length L must be at least one")]
    ZeroContinuation,

    #[error("sample size n must be at least one")]
    ZeroSampleSize,

    #[error("Beta reference has non-positive shape: a = {a}, b = {b}")]
    DegenerateBeta { a: f64, b: f64 },

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, UrnError>;
