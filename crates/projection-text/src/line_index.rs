//! Line-break table for offset/position conversion

use crate::types::{LinePosition, LinePositionSpan, TextError, TextSpan};
use serde::{Deserialize, Serialize};

/// Line table for a piece of text
///
/// Records where every line starts and where its visible extent ends, so that
/// offsets can be turned into line positions with a binary search instead of
/// rescanning the text. A `\n` or `\r\n` terminates a line; the terminator is
/// not part of the line's extent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIndex {
    /// Byte offset where each line starts; always has at least one entry
    line_starts: Vec<usize>,

    /// Byte offset where each line's extent ends (before its terminator)
    line_ends: Vec<usize>,

    /// Total length of the text in bytes
    total_length: usize,
}

impl LineIndex {
    /// Build the line table by scanning `text` once
    ///
    /// # Example
    ///
    /// ```
    /// use projection_text::LineIndex;
    ///
    /// let index = LineIndex::new("line 1\r\nline 2\nline 3");
    /// assert_eq!(index.line_count(), 3);
    /// ```
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut line_ends = Vec::new();

        for (idx, byte) in bytes.iter().enumerate() {
            if *byte == b'\n' {
                let end = if idx > 0 && bytes[idx - 1] == b'\r' {
                    idx - 1
                } else {
                    idx
                };
                line_ends.push(end);
                line_starts.push(idx + 1);
            }
        }
        line_ends.push(text.len());

        LineIndex {
            line_starts,
            line_ends,
            total_length: text.len(),
        }
    }

    /// Number of lines; text ending in a newline has an empty last line
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Index of the last line
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Line containing `offset`
    ///
    /// An offset pointing at a line terminator belongs to the line it
    /// terminates. Returns None past the end of the text.
    pub fn line_of_offset(&self, offset: usize) -> Option<usize> {
        if offset > self.total_length {
            return None;
        }
        // line_starts[0] == 0, so at least one start is <= offset
        let following = self.line_starts.partition_point(|&start| start <= offset);
        Some(following - 1)
    }

    /// Offset where `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Extent of `line`, excluding its terminator
    pub fn line_extent(&self, line: usize) -> Option<TextSpan> {
        let start = self.line_starts.get(line)?;
        let end = self.line_ends.get(line)?;
        TextSpan::from_bounds(*start, *end)
    }

    /// Extent from the start of `first` to the end of `last`, terminators of
    /// the final line excluded
    pub fn lines_extent(&self, first: usize, last: usize) -> Option<TextSpan> {
        let start = self.line_start(first)?;
        let end = self.line_extent(last)?.end();
        TextSpan::from_bounds(start, end)
    }

    /// Convert an offset to a line position
    ///
    /// The character column counts Unicode scalar values, so `text` must be
    /// the text this index was built from.
    pub fn position_of(&self, text: &str, offset: usize) -> Result<LinePosition, TextError> {
        let Some(line) = self.line_of_offset(offset) else {
            return Err(TextError::OutOfBounds {
                span: TextSpan::new(offset, 0),
                len: self.total_length,
            });
        };
        if !text.is_char_boundary(offset) {
            return Err(TextError::NotCharBoundary(offset));
        }

        let line_start = self.line_starts[line];
        let character = text[line_start..offset].chars().count();
        Ok(LinePosition { line, character })
    }

    /// Convert a span to a line position span
    pub fn line_position_span(
        &self,
        text: &str,
        span: TextSpan,
    ) -> Result<LinePositionSpan, TextError> {
        let end = match span.checked_end() {
            Some(end) if end <= self.total_length => end,
            _ => {
                return Err(TextError::OutOfBounds {
                    span,
                    len: self.total_length,
                });
            }
        };
        Ok(LinePositionSpan {
            start: self.position_of(text, span.start)?,
            end: self.position_of(text, end)?,
        })
    }
}
