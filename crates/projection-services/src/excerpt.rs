/*
 * excerpt.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Bounded text excerpts around mapped locations.
 */

//! Excerpt extraction.
//!
//! An excerpt is a short window of the authored (primary) text around the
//! location a generated span maps to, with that location re-expressed
//! relative to the window so it can be highlighted without the full buffer.
//!
//! The window depends on [`ExcerptMode`]:
//!
//! - `SingleLine`: the line containing the mapped start, without terminator
//! - `Tooltip`: that line plus up to `tooltip-context-lines` lines on each
//!   side, clamped to the first and last line of the buffer
//!
//! Spans that map to nothing, or to more than one primary range, are not
//! excerpted.

use std::sync::Arc;

use async_trait::async_trait;
use projection_text::{LineIndex, TextSpan};
use serde::{Deserialize, Serialize};

use crate::cancellation::Cancellation;
use crate::config::ExcerptConfig;
use crate::document::Document;
use crate::error::{Result, SpanError};
use crate::projection::{ProjectionProvider, resolve_projection};

/// Width of the excerpt window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExcerptMode {
    /// The located line only
    SingleLine,
    /// The located line with surrounding context
    Tooltip,
}

impl TryFrom<i32> for ExcerptMode {
    type Error = i32;

    /// Convert a host wire value; unknown values are returned unchanged.
    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ExcerptMode::SingleLine),
            1 => Ok(ExcerptMode::Tooltip),
            other => Err(other),
        }
    }
}

/// A classified region of excerpt content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedSpan {
    /// Span relative to the excerpt content
    pub span: TextSpan,
    pub classification: String,
}

/// Text around a location plus the location relative to that text
#[derive(Debug, Clone)]
pub struct ExcerptResult {
    /// The extracted window of text
    pub content: String,
    /// The located span, relative to `content`
    pub mapped_span: TextSpan,
    /// Classification of `content`; empty when none was computed
    pub classified_spans: Vec<ClassifiedSpan>,
    /// The document the excerpt was requested for
    pub document: Document,
    /// The span the excerpt was requested for, in the document's own text
    pub original_span: TextSpan,
}

impl ExcerptResult {
    /// Split `content` into the text before, inside and after `mapped_span`.
    ///
    /// The highlighted part is clipped to the content, so a location running
    /// past a single-line window highlights up to the end of the line.
    pub fn highlighted_parts(&self) -> (&str, &str, &str) {
        let len = self.content.len();
        let start = floor_char_boundary(&self.content, self.mapped_span.start.min(len));
        let end = floor_char_boundary(&self.content, self.mapped_span.end().min(len));
        (
            &self.content[..start],
            &self.content[start..end],
            &self.content[end..],
        )
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Capability that produces excerpts for a document's spans.
#[async_trait]
pub trait DocumentExcerptService: Send + Sync {
    /// Excerpt around `span`, or `None` when this service declines.
    async fn try_excerpt(
        &self,
        document: &Document,
        span: TextSpan,
        mode: ExcerptMode,
        cancel: &Cancellation,
    ) -> Result<Option<ExcerptResult>>;

    /// Like [`try_excerpt`](Self::try_excerpt) for a raw host mode value.
    ///
    /// Unrecognized values decline instead of failing.
    async fn try_excerpt_raw(
        &self,
        document: &Document,
        span: TextSpan,
        mode: i32,
        cancel: &Cancellation,
    ) -> Result<Option<ExcerptResult>> {
        match ExcerptMode::try_from(mode) {
            Ok(mode) => self.try_excerpt(document, span, mode, cancel).await,
            Err(raw) => {
                cancel.check()?;
                tracing::debug!(
                    document = document.file_path(),
                    mode = raw,
                    "Unrecognized excerpt mode"
                );
                Ok(None)
            }
        }
    }
}

/// Window of text to extract around `candidate`.
///
/// The tooltip window covers `context_lines` lines before and after the
/// candidate's line, clamped at both ends of the buffer: a candidate on the
/// first line never reaches before line 0 and one on the last line never
/// reaches past it.
pub fn content_span(
    lines: &LineIndex,
    candidate: TextSpan,
    mode: ExcerptMode,
    context_lines: usize,
) -> Option<TextSpan> {
    let line = lines.line_of_offset(candidate.start)?;
    match mode {
        ExcerptMode::SingleLine => lines.line_extent(line),
        ExcerptMode::Tooltip => {
            let first = line.saturating_sub(context_lines);
            let last = line.saturating_add(context_lines).min(lines.last_line());
            lines.lines_extent(first, last)
        }
    }
}

/// [`DocumentExcerptService`] for documents generated through a projection.
///
/// Never classifies the excerpt; `classified_spans` is always empty.
pub struct ProjectionExcerptService {
    provider: Arc<dyn ProjectionProvider>,
    config: ExcerptConfig,
}

impl ProjectionExcerptService {
    pub fn new(provider: Arc<dyn ProjectionProvider>) -> Self {
        Self::with_config(provider, ExcerptConfig::default())
    }

    pub fn with_config(provider: Arc<dyn ProjectionProvider>, config: ExcerptConfig) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl DocumentExcerptService for ProjectionExcerptService {
    async fn try_excerpt(
        &self,
        document: &Document,
        span: TextSpan,
        mode: ExcerptMode,
        cancel: &Cancellation,
    ) -> Result<Option<ExcerptResult>> {
        cancel.check()?;

        let provider = self.provider.as_ref();
        let (snapshot, relation) = resolve_projection(provider, document, cancel).await?;
        let Some(relation) = relation else {
            tracing::debug!(
                document = document.file_path(),
                "No projection for snapshot, no excerpt"
            );
            return Ok(None);
        };
        snapshot.check_span(span).map_err(SpanError::from)?;

        let candidates = relation.map_secondary_to_primary(span).await;
        cancel.check()?;

        let [candidate] = candidates.as_slice() else {
            tracing::debug!(
                document = document.file_path(),
                %span,
                candidates = candidates.len(),
                "Span does not map to exactly one range, no excerpt"
            );
            return Ok(None);
        };
        let candidate = *candidate;

        let primary = relation.primary();
        primary.check_span(candidate).map_err(|e| {
            tracing::error!(
                %candidate,
                error = %e,
                "Projection produced a span outside its primary text"
            );
            SpanError::contract(format!(
                "projection candidate {} does not fit primary text: {}",
                candidate, e
            ))
        })?;

        let window = content_span(
            primary.line_index(),
            candidate,
            mode,
            self.config.tooltip_context_lines,
        )
        .ok_or_else(|| {
            SpanError::contract(format!("no line contains candidate {}", candidate))
        })?;
        let content = primary.slice(window)?.to_string();

        // The window starts at a line start at or before the candidate
        let mapped_span = candidate.relative_to(window.start).ok_or_else(|| {
            SpanError::contract(format!("window {} starts after {}", window, candidate))
        })?;

        tracing::trace!(%span, %candidate, %window, ?mode, "Extracted excerpt");
        Ok(Some(ExcerptResult {
            content,
            mapped_span,
            classified_spans: Vec::new(),
            document: document.clone(),
            original_span: span,
        }))
    }
}

/// Excerpt around `span` using the document's excerpt capability.
///
/// Documents without one get `None`; they are excerpted by other means.
pub async fn try_excerpt(
    document: &Document,
    span: TextSpan,
    mode: ExcerptMode,
    cancel: &Cancellation,
) -> Result<Option<ExcerptResult>> {
    match document.services().excerpt() {
        Some(service) => service.try_excerpt(document, span, mode, cancel).await,
        None => {
            cancel.check()?;
            Ok(None)
        }
    }
}
