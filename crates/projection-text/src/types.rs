//! Core span and position types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range `[start, start + length)` over a snapshot's text.
///
/// Offsets are byte offsets into the UTF-8 text. Two spans are only
/// meaningfully comparable when they come from the same snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextSpan {
    /// Start offset (inclusive)
    pub start: usize,
    /// Number of bytes covered
    pub length: usize,
}

impl TextSpan {
    /// Create a span from a start offset and a length
    pub fn new(start: usize, length: usize) -> Self {
        TextSpan { start, length }
    }

    /// Create a span from start and end offsets
    ///
    /// Returns None if `end < start`.
    pub fn from_bounds(start: usize, end: usize) -> Option<Self> {
        let length = end.checked_sub(start)?;
        Some(TextSpan { start, length })
    }

    /// End offset (exclusive), or None if it does not fit in `usize`
    pub fn checked_end(&self) -> Option<usize> {
        self.start.checked_add(self.length)
    }

    /// End offset (exclusive)
    ///
    /// Saturates at `usize::MAX`; such a span never fits any text, so bounds
    /// checks still reject it.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains_span(&self, other: TextSpan) -> bool {
        match other.checked_end() {
            Some(end) => other.start >= self.start && end <= self.end(),
            None => false,
        }
    }

    /// The overlapping part of two spans, if they overlap or touch.
    ///
    /// Touching spans yield an empty intersection at the shared boundary.
    pub fn intersection(&self, other: TextSpan) -> Option<TextSpan> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        TextSpan::from_bounds(start, end)
    }

    /// Re-express this span relative to `origin`.
    ///
    /// Returns None if the span starts before `origin`.
    pub fn relative_to(&self, origin: usize) -> Option<TextSpan> {
        self.start
            .checked_sub(origin)
            .map(|start| TextSpan::new(start, self.length))
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.checked_end() {
            Some(end) => write!(f, "[{}..{})", self.start, end),
            None => write!(f, "[{}..+{})", self.start, self.length),
        }
    }
}

/// A position expressed as zero-based line and character
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct LinePosition {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column (0-indexed, in characters not bytes)
    pub character: usize,
}

impl LinePosition {
    pub fn new(line: usize, character: usize) -> Self {
        LinePosition { line, character }
    }
}

/// A span expressed as line positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LinePositionSpan {
    /// Start position (inclusive)
    pub start: LinePosition,
    /// End position (exclusive)
    pub end: LinePosition,
}

impl LinePositionSpan {
    pub fn new(start: LinePosition, end: LinePosition) -> Self {
        LinePositionSpan { start, end }
    }
}

/// Errors raised when a span or edit does not fit a snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("span {span} is outside text of length {len}")]
    OutOfBounds { span: TextSpan, len: usize },

    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}
