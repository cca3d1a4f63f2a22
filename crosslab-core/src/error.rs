//! Error taxonomy for the core.
//!
//! `ValidationError` covers bad inputs (empty series, non-positive periods,
//! non-finite prices). `StateError` covers stages invoked out of order.
//! Both propagate unmodified to the caller; the core never retries.

use thiserror::Error;

/// Invalid input data or configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("input series is empty")]
    EmptySeries,

    #[error("{name} must be >= 1, got {value}")]
    InvalidPeriod { name: &'static str, value: usize },

    #[error("pip_size must be finite and > 0, got {0}")]
    InvalidPipSize(f64),

    #[error("bar {index}: field '{field}' is not a finite number")]
    NonFinitePrice { index: usize, field: &'static str },

    #[error("{series} has {actual} values, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// An operation was invoked before its prerequisite stage ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("prerequisite not computed: {stage}")]
    PrerequisiteNotComputed { stage: &'static str },
}

/// Any error the core can raise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("state error: {0}")]
    State(#[from] StateError),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Reject a period below 1.
pub(crate) fn check_period(name: &'static str, value: usize) -> Result<(), ValidationError> {
    if value < 1 {
        return Err(ValidationError::InvalidPeriod { name, value });
    }
    Ok(())
}
