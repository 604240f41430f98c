//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where they need to surface it.

use thiserror::Error;

/// Errors produced by `qn-core` constructors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid simulation time {0}: must be finite and non-negative")]
    InvalidTime(f64),

    #[error("class tag must not be empty")]
    EmptyClassTag,
}

/// Shorthand result type for `qn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
