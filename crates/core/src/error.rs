//! Error types for arealis

use thiserror::Error;

/// Main error type for arealis operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    Geojson(String),

    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("need at least {minimum} regions, got {actual}")]
    TooFewRegions { minimum: usize, actual: usize },

    #[error("duplicate region id: {0}")]
    DuplicateRegionId(String),

    #[error("region {index}: missing or non-numeric attribute '{field}'")]
    MissingAttribute { index: usize, field: String },

    #[error("no region carries attribute field '{0}'")]
    UnknownField(String),

    #[error("region {index}: non-finite observation value")]
    NonFiniteObservation { index: usize },

    #[error("region {index}: population at risk must be positive, got {value}")]
    NonPositivePopulation { index: usize, value: f64 },

    #[error("region {index}: event count must be non-negative, got {value}")]
    NegativeEventCount { index: usize, value: f64 },

    #[error("zero variance in observation vector; the statistic is undefined")]
    ZeroVariance,

    #[error("spatial weights have no nonzero entries (S0 = 0)")]
    EmptyWeights,

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for arealis operations
pub type Result<T> = std::result::Result<T, Error>;
