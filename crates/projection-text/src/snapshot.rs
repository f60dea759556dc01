//! Immutable text snapshots and the buffer that produces them

use crate::line_index::LineIndex;
use crate::types::{LinePosition, LinePositionSpan, TextError, TextSpan};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotId(pub u64);

impl SnapshotId {
    fn next() -> Self {
        SnapshotId(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable view of a buffer's full text at one instant
///
/// Cloning is cheap; the text and line table are shared.
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    id: SnapshotId,
    version: u64,
    text: Arc<str>,
    lines: Arc<LineIndex>,
}

impl TextSnapshot {
    /// Create a standalone snapshot at version 0
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::with_version(text, 0)
    }

    fn with_version(text: impl Into<Arc<str>>, version: u64) -> Self {
        let text = text.into();
        let lines = Arc::new(LineIndex::new(&text));
        TextSnapshot {
            id: SnapshotId::next(),
            version,
            text,
            lines,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// Version of the buffer this snapshot was taken from
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// Span covering the whole text
    pub fn full_span(&self) -> TextSpan {
        TextSpan::new(0, self.text.len())
    }

    /// Check that `span` lies inside this snapshot on character boundaries
    pub fn check_span(&self, span: TextSpan) -> Result<(), TextError> {
        if !self.full_span().contains_span(span) {
            return Err(TextError::OutOfBounds {
                span,
                len: self.text.len(),
            });
        }
        for offset in [span.start, span.end()] {
            if !self.text.is_char_boundary(offset) {
                return Err(TextError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    /// Text covered by `span`
    pub fn slice(&self, span: TextSpan) -> Result<&str, TextError> {
        self.check_span(span)?;
        Ok(&self.text[span.start..span.end()])
    }

    pub fn position_of(&self, offset: usize) -> Result<LinePosition, TextError> {
        self.lines.position_of(&self.text, offset)
    }

    pub fn line_position_span(&self, span: TextSpan) -> Result<LinePositionSpan, TextError> {
        self.lines.line_position_span(&self.text, span)
    }

    /// Text of the line containing `offset`, without its terminator
    pub fn line_text_at(&self, offset: usize) -> Option<&str> {
        let line = self.lines.line_of_offset(offset)?;
        let extent = self.lines.line_extent(line)?;
        Some(&self.text[extent.start..extent.end()])
    }
}

/// A mutable text container that hands out immutable snapshots
///
/// Each edit produces a new snapshot with a higher version; snapshots taken
/// earlier keep the text they were taken with.
#[derive(Debug)]
pub struct TextBuffer {
    current: RwLock<TextSnapshot>,
}

impl TextBuffer {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        TextBuffer {
            current: RwLock::new(TextSnapshot::new(text)),
        }
    }

    /// The latest snapshot
    pub fn current(&self) -> TextSnapshot {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the text covered by `span` and return the new snapshot
    pub fn replace(&self, span: TextSpan, new_text: &str) -> Result<TextSnapshot, TextError> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.check_span(span)?;

        let old = guard.text();
        let mut text = String::with_capacity(old.len() - span.length + new_text.len());
        text.push_str(&old[..span.start]);
        text.push_str(new_text);
        text.push_str(&old[span.end()..]);

        let next = TextSnapshot::with_version(text, guard.version() + 1);
        *guard = next.clone();
        Ok(next)
    }
}
