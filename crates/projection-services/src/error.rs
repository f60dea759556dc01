/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for projection-services
//!
//! Unmapped and ambiguous spans are not errors: they degrade to identity
//! mapping or to "no excerpt" and are returned as values. Only cancellation
//! and contract breaches by the caller surface here.

use projection_text::{TextError, TextSpan};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    /// The request was cancelled before it completed; no output was produced.
    #[error("Operation was cancelled")]
    Cancelled,

    /// A span supplied by the caller does not fit the text it was resolved against.
    #[error("Span {span} is outside text of length {len}")]
    SpanOutOfBounds { span: TextSpan, len: usize },

    /// A span does not start or end on a character boundary.
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    /// A collaborator broke a guarantee the caller relies on.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpanError {
    /// Create a contract violation from any message.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ContractViolation(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SpanError::Cancelled)
    }
}

impl From<TextError> for SpanError {
    fn from(err: TextError) -> Self {
        match err {
            TextError::OutOfBounds { span, len } => SpanError::SpanOutOfBounds { span, len },
            TextError::NotCharBoundary(offset) => SpanError::NotCharBoundary(offset),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpanError>;
