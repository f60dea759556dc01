/*
 * entry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Reference-list rows built from mapped spans.
 */

//! Reference-list entries.
//!
//! A [`ReferenceEntry`] is what a results list shows for one location: the
//! mapped file, line and column, and the text of the line the reference
//! sits on. The line text always comes from the document's own text, not
//! from an excerpt, so generated documents preview the code the reference
//! was found in.

use projection_text::{TextSnapshot, TextSpan};

use crate::cancellation::Cancellation;
use crate::config::PreviewConfig;
use crate::document::Document;
use crate::error::{Result, SpanError};
use crate::excerpt::{ExcerptMode, ExcerptResult, try_excerpt};
use crate::span_mapping::{MappedSpanResult, map_and_get_first};

/// Columns a results list asks an entry for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryColumn {
    DocumentName,
    Line,
    Column,
    Text,
}

/// Value of one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    Text(String),
    Number(usize),
}

/// One location in a results list
#[derive(Debug, Clone)]
pub struct ReferenceEntry {
    document: Document,
    original_span: TextSpan,
    mapped: MappedSpanResult,
    line_text: String,
}

impl ReferenceEntry {
    /// Build an entry from an already-mapped span.
    ///
    /// `snapshot` must be the text `original_span` was found in.
    pub fn new(
        document: Document,
        snapshot: &TextSnapshot,
        original_span: TextSpan,
        mapped: MappedSpanResult,
        config: &PreviewConfig,
    ) -> Result<Self> {
        snapshot.check_span(original_span).map_err(SpanError::from)?;
        let line = snapshot
            .line_text_at(original_span.start)
            .ok_or(SpanError::SpanOutOfBounds {
                span: original_span,
                len: snapshot.len(),
            })?;
        let line_text = if config.trim_line_text {
            line.trim().to_string()
        } else {
            line.to_string()
        };

        Ok(Self {
            document,
            original_span,
            mapped,
            line_text,
        })
    }

    /// Capture the document's text, map `span` and build the entry.
    pub async fn create(
        document: &Document,
        span: TextSpan,
        config: &PreviewConfig,
        cancel: &Cancellation,
    ) -> Result<Self> {
        let snapshot = document.text(cancel).await?;
        let mapped = map_and_get_first(document, &snapshot, span, cancel).await?;
        Self::new(document.clone(), &snapshot, span, mapped, config)
    }

    /// One-based line for display
    pub fn display_line(&self) -> usize {
        self.mapped.line_position_span.start.line + 1
    }

    /// One-based column for display
    pub fn display_column(&self) -> usize {
        self.mapped.line_position_span.start.character + 1
    }

    /// Value for a results-list column; line and column are zero-based.
    pub fn value(&self, column: EntryColumn) -> EntryValue {
        let start = self.mapped.line_position_span.start;
        match column {
            EntryColumn::DocumentName => EntryValue::Text(self.mapped.file_path.clone()),
            EntryColumn::Line => EntryValue::Number(start.line),
            EntryColumn::Column => EntryValue::Number(start.character),
            EntryColumn::Text => EntryValue::Text(self.line_text.clone()),
        }
    }

    /// Richer preview of this entry's location, if the document offers one.
    pub async fn excerpt(
        &self,
        mode: ExcerptMode,
        cancel: &Cancellation,
    ) -> Result<Option<ExcerptResult>> {
        try_excerpt(&self.document, self.original_span, mode, cancel).await
    }
}
