//! Error types for Sprout Insight

use thiserror::Error;

/// Errors that can occur at the engine boundary (parsing, validation, configuration).
///
/// Scoring and classification themselves are total and never return these.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid signal: {0}")]
    InvalidSignal(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Precondition violations for a single signal
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("signal value must not be negative, got {0}")]
    NegativeValue(f64),

    #[error("signal value must be finite")]
    NonFiniteValue,

    #[error("signal target must not be empty")]
    EmptyTarget,
}
