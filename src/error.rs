//! Error types for the matcher and the consistency solver.

use thiserror::Error;

/// Failures raised by a [`ConsistencySolver`](crate::core::ConsistencySolver).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver has not been configured with an invariant")]
    NotConfigured,

    #[error("solver has no matrix data; score or set matrices before solving")]
    NotScored,

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("solver failed: {0}")]
    Failed(String),
}

/// Errors returned by the landmark matcher.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
