/*
 * span_mapping.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Mapping spans in generated documents back to their authored source.
 */

//! Span mapping.
//!
//! [`map_spans`] is the entry point callers use: it asks the document's
//! span-mapping capability for results and falls back to identity mapping
//! for plain documents. [`ProjectionSpanMapper`] is the capability used for
//! generated documents.
//!
//! # Selection rule
//!
//! A projection may return several candidates for one span. The first
//! candidate whose length equals the query span's length wins; shorter
//! candidates come from spans split across a projection boundary and are
//! never selected. A span with no such candidate is mapped by identity
//! instead, so a batch never loses a span.

use std::sync::Arc;

use async_trait::async_trait;
use projection_text::{LinePositionSpan, TextSnapshot, TextSpan};
use serde::{Deserialize, Serialize};

use crate::cancellation::Cancellation;
use crate::document::Document;
use crate::error::{Result, SpanError};
use crate::projection::{ProjectionProvider, resolve_projection};

/// Where a span lives in terms the user recognizes.
///
/// Holds no reference to any buffer, so it stays valid after the snapshot it
/// was computed from is gone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedSpanResult {
    /// Path of the document the location belongs to
    pub file_path: String,
    /// Zero-based line/column form of `span`
    pub line_position_span: LinePositionSpan,
    /// Character span in the mapped document
    pub span: TextSpan,
}

impl MappedSpanResult {
    pub fn new(
        file_path: impl Into<String>,
        line_position_span: LinePositionSpan,
        span: TextSpan,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line_position_span,
            span,
        }
    }
}

/// Capability that maps spans of a document to their real locations.
#[async_trait]
pub trait SpanMappingService: Send + Sync {
    /// Map every span; the result has one entry per input span, in order.
    async fn map_spans(
        &self,
        document: &Document,
        spans: &[TextSpan],
        cancel: &Cancellation,
    ) -> Result<Vec<MappedSpanResult>>;
}

/// Treat `span` as already being in real document terms.
pub fn identity_mapping(
    document: &Document,
    snapshot: &TextSnapshot,
    span: TextSpan,
) -> Result<MappedSpanResult> {
    let line_position_span = snapshot.line_position_span(span).map_err(|e| {
        let err = SpanError::from(e);
        tracing::error!(
            document = document.file_path(),
            %span,
            error = %err,
            "Span does not fit document text"
        );
        err
    })?;
    Ok(MappedSpanResult::new(
        document.file_path(),
        line_position_span,
        span,
    ))
}

/// First candidate with exactly the query span's length.
pub fn select_candidate(candidates: &[TextSpan], span: TextSpan) -> Option<TextSpan> {
    candidates
        .iter()
        .copied()
        .find(|candidate| candidate.length == span.length)
}

/// [`SpanMappingService`] for documents generated through a projection.
pub struct ProjectionSpanMapper {
    provider: Arc<dyn ProjectionProvider>,
}

impl ProjectionSpanMapper {
    pub fn new(provider: Arc<dyn ProjectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SpanMappingService for ProjectionSpanMapper {
    async fn map_spans(
        &self,
        document: &Document,
        spans: &[TextSpan],
        cancel: &Cancellation,
    ) -> Result<Vec<MappedSpanResult>> {
        cancel.check()?;
        if spans.is_empty() {
            return Ok(Vec::new());
        }

        let provider = self.provider.as_ref();
        let (snapshot, relation) = resolve_projection(provider, document, cancel).await?;
        let Some(relation) = relation else {
            tracing::debug!(
                document = document.file_path(),
                spans = spans.len(),
                "No projection for snapshot, mapping by identity"
            );
            return spans
                .iter()
                .map(|span| identity_mapping(document, &snapshot, *span))
                .collect();
        };

        let mut results = Vec::with_capacity(spans.len());
        for span in spans {
            snapshot.check_span(*span).map_err(SpanError::from)?;

            let candidates = relation.map_secondary_to_primary(*span).await;
            cancel.check()?;

            let Some(selected) = select_candidate(&candidates, *span) else {
                tracing::debug!(
                    document = document.file_path(),
                    %span,
                    candidates = candidates.len(),
                    "No candidate of equal length, mapping by identity"
                );
                results.push(identity_mapping(document, &snapshot, *span)?);
                continue;
            };

            let primary = relation.primary();
            let line_position_span = primary.line_position_span(selected).map_err(|e| {
                tracing::error!(
                    %selected,
                    error = %e,
                    "Projection produced a span outside its primary text"
                );
                SpanError::contract(format!(
                    "projection candidate {} does not fit primary text: {}",
                    selected, e
                ))
            })?;
            tracing::trace!(%span, %selected, "Mapped span to primary buffer");
            results.push(MappedSpanResult::new(
                document.file_path(),
                line_position_span,
                selected,
            ));
        }

        Ok(results)
    }
}

/// Map `spans` of `document` to their real locations.
///
/// Plain documents (no span-mapping capability) are mapped by identity
/// against their own text. The result always has one entry per input span,
/// in order; cancellation yields `Err(SpanError::Cancelled)` and no results.
pub async fn map_spans(
    document: &Document,
    spans: &[TextSpan],
    cancel: &Cancellation,
) -> Result<Vec<MappedSpanResult>> {
    let Some(service) = document.services().span_mapping() else {
        let snapshot = document.text(cancel).await?;
        return spans
            .iter()
            .map(|span| identity_mapping(document, &snapshot, *span))
            .collect();
    };

    let results = service.map_spans(document, spans, cancel).await?;
    cancel.check()?;

    if results.len() != spans.len() {
        tracing::error!(
            document = document.file_path(),
            expected = spans.len(),
            actual = results.len(),
            "Span mapping service dropped or added results"
        );
        return Err(SpanError::contract(format!(
            "span mapping returned {} results for {} spans",
            results.len(),
            spans.len()
        )));
    }
    Ok(results)
}

/// Map a single span and return its location.
///
/// `snapshot` is the caller's captured text of `document`; it is used for
/// identity mapping when the document has no span-mapping capability or the
/// capability returns nothing.
pub async fn map_and_get_first(
    document: &Document,
    snapshot: &TextSnapshot,
    span: TextSpan,
    cancel: &Cancellation,
) -> Result<MappedSpanResult> {
    if let Some(service) = document.services().span_mapping() {
        let results = service.map_spans(document, &[span], cancel).await?;
        cancel.check()?;
        if let Some(first) = results.into_iter().next() {
            return Ok(first);
        }
    }

    identity_mapping(document, snapshot, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentId, DocumentServices, SnapshotTextLoader};
    use crate::projection::{ProjectionRegistry, ProjectionRelation};
    use projection_text::{LinePosition, ProjectionSnapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Relation returning fixed candidates regardless of the query.
    struct FixedRelation {
        primary: TextSnapshot,
        candidates: Vec<TextSpan>,
    }

    #[async_trait]
    impl ProjectionRelation for FixedRelation {
        fn primary(&self) -> &TextSnapshot {
            &self.primary
        }

        async fn map_secondary_to_primary(&self, _span: TextSpan) -> Vec<TextSpan> {
            self.candidates.clone()
        }
    }

    /// Provider that hands out one relation for any snapshot.
    struct AlwaysProvider(Arc<dyn ProjectionRelation>);

    impl ProjectionProvider for AlwaysProvider {
        fn projection_for(&self, _secondary: &TextSnapshot) -> Option<Arc<dyn ProjectionRelation>> {
            Some(self.0.clone())
        }
    }

    fn fixed_document(secondary: &str, primary: &str, candidates: Vec<TextSpan>) -> Document {
        let relation = Arc::new(FixedRelation {
            primary: TextSnapshot::new(primary),
            candidates,
        });
        let mapper = ProjectionSpanMapper::new(Arc::new(AlwaysProvider(relation)));
        Document::new(
            DocumentId(0),
            "Views/Home.cshtml",
            Arc::new(SnapshotTextLoader::new(TextSnapshot::new(secondary))),
            DocumentServices::none().with_span_mapping(Arc::new(mapper)),
        )
    }

    fn map_blocking(doc: &Document, spans: &[TextSpan]) -> Result<Vec<MappedSpanResult>> {
        pollster::block_on(map_spans(doc, spans, &Cancellation::new()))
    }

    #[test]
    fn select_first_equal_length_candidate() {
        let candidates = [
            TextSpan::new(0, 3),
            TextSpan::new(10, 5),
            TextSpan::new(20, 5),
        ];
        assert_eq!(
            select_candidate(&candidates, TextSpan::new(7, 5)),
            Some(TextSpan::new(10, 5))
        );
        assert_eq!(select_candidate(&candidates, TextSpan::new(7, 4)), None);
        assert_eq!(select_candidate(&[], TextSpan::new(7, 4)), None);
    }

    #[test]
    fn plain_document_maps_by_identity() {
        let doc = Document::from_snapshot(
            DocumentId(1),
            "src/lib.rs",
            TextSnapshot::new("0123456789abcdefghij"),
        );
        let results = map_blocking(&doc, &[TextSpan::new(5, 3)]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].span, TextSpan::new(5, 3));
        assert_eq!(results[0].file_path, "src/lib.rs");
        assert_eq!(
            results[0].line_position_span,
            LinePositionSpan::new(LinePosition::new(0, 5), LinePosition::new(0, 8))
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let doc = fixed_document("abc", "abc", vec![TextSpan::new(0, 1)]);
        assert!(map_blocking(&doc, &[]).unwrap().is_empty());

        let plain = Document::from_snapshot(DocumentId(1), "a.txt", TextSnapshot::new("abc"));
        assert!(map_blocking(&plain, &[]).unwrap().is_empty());
    }

    #[test]
    fn selects_second_candidate_of_three() {
        let primary = "x".repeat(40);
        let doc = fixed_document(
            "0123456789",
            &primary,
            vec![
                TextSpan::new(0, 3),
                TextSpan::new(10, 5),
                TextSpan::new(20, 5),
            ],
        );
        let results = map_blocking(&doc, &[TextSpan::new(2, 5)]).unwrap();

        assert_eq!(results[0].span, TextSpan::new(10, 5));
        assert_eq!(results[0].file_path, "Views/Home.cshtml");
        let start = results[0].line_position_span.start;
        assert_eq!(start, LinePosition::new(0, 10));
    }

    #[test]
    fn length_mismatch_falls_back_to_identity() {
        let primary = "p".repeat(120);
        let doc = fixed_document("abcdefgh", &primary, vec![TextSpan::new(100, 3)]);
        let results = map_blocking(&doc, &[TextSpan::new(0, 4)]).unwrap();

        assert_eq!(results[0].span, TextSpan::new(0, 4));
        assert_eq!(
            results[0].line_position_span,
            LinePositionSpan::new(LinePosition::new(0, 0), LinePosition::new(0, 4))
        );
    }

    #[test]
    fn count_and_order_are_preserved() {
        // "@a" and "@b" are projected; the middle literal is not
        let primary = TextSnapshot::new("@a\n@b");
        let projection = Arc::new(
            ProjectionSnapshot::builder(primary)
                .primary(TextSpan::new(1, 1))
                .unwrap()
                .literal(" + ")
                .primary(TextSpan::new(4, 1))
                .unwrap()
                .build(),
        );
        let registry = Arc::new(ProjectionRegistry::new());
        registry.register(projection.clone());
        let mapper = ProjectionSpanMapper::new(registry);

        let doc = Document::new(
            DocumentId(2),
            "page.cshtml",
            Arc::new(SnapshotTextLoader::new(projection.secondary().clone())),
            DocumentServices::none().with_span_mapping(Arc::new(mapper)),
        );

        // secondary text: "a + b"
        let spans = [
            TextSpan::new(4, 1),
            TextSpan::new(1, 3),
            TextSpan::new(0, 1),
        ];
        let results = map_blocking(&doc, &spans).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].span, TextSpan::new(4, 1));
        assert_eq!(results[0].line_position_span.start, LinePosition::new(1, 1));
        // " + " has no primary counterpart
        assert_eq!(results[1].span, TextSpan::new(1, 3));
        assert_eq!(results[2].span, TextSpan::new(1, 1));
        assert_eq!(results[2].line_position_span.start, LinePosition::new(0, 1));
    }

    #[test]
    fn snapshot_without_projection_maps_by_identity() {
        let registry = Arc::new(ProjectionRegistry::new());
        let mapper = ProjectionSpanMapper::new(registry);
        let text = TextSnapshot::new("line one\nline two");
        let doc = Document::new(
            DocumentId(3),
            "unregistered.cshtml",
            Arc::new(SnapshotTextLoader::new(text)),
            DocumentServices::none().with_span_mapping(Arc::new(mapper)),
        );
        let results = map_blocking(&doc, &[TextSpan::new(9, 4)]).unwrap();

        assert_eq!(results[0].span, TextSpan::new(9, 4));
        assert_eq!(results[0].line_position_span.start, LinePosition::new(1, 0));
    }

    #[test]
    fn span_outside_document_is_an_error() {
        let doc = fixed_document("abc", "abc", vec![TextSpan::new(0, 1)]);
        let err = map_blocking(&doc, &[TextSpan::new(2, 5)]).unwrap_err();
        assert_eq!(
            err,
            SpanError::SpanOutOfBounds {
                span: TextSpan::new(2, 5),
                len: 3,
            }
        );
    }

    #[test]
    fn overflowing_span_is_out_of_bounds() {
        let overflowing = TextSpan::new(usize::MAX, 2);
        let expected = SpanError::SpanOutOfBounds {
            span: overflowing,
            len: 3,
        };

        // Identity path
        let plain = Document::from_snapshot(DocumentId(1), "a.txt", TextSnapshot::new("abc"));
        assert_eq!(map_blocking(&plain, &[overflowing]), Err(expected.clone()));

        // Projected path
        let doc = fixed_document("abc", "abc", vec![TextSpan::new(0, 1)]);
        assert_eq!(map_blocking(&doc, &[overflowing]), Err(expected));
    }

    #[test]
    fn candidate_outside_primary_is_a_contract_violation() {
        let doc = fixed_document("abcdef", "ab", vec![TextSpan::new(10, 2)]);
        let err = map_blocking(&doc, &[TextSpan::new(0, 2)]).unwrap_err();
        assert!(matches!(err, SpanError::ContractViolation(_)));
    }

    #[test]
    fn cancelled_before_start() {
        let doc = fixed_document("abc", "abc", vec![TextSpan::new(0, 1)]);
        let cancel = Cancellation::new();
        cancel.cancel();
        let err = pollster::block_on(map_spans(&doc, &[TextSpan::new(0, 1)], &cancel)).unwrap_err();
        assert_eq!(err, SpanError::Cancelled);
    }

    /// Relation that cancels the request during its second query.
    struct CancellingRelation {
        primary: TextSnapshot,
        cancel: Cancellation,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProjectionRelation for CancellingRelation {
        fn primary(&self) -> &TextSnapshot {
            &self.primary
        }

        async fn map_secondary_to_primary(&self, span: TextSpan) -> Vec<TextSpan> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
                self.cancel.cancel();
            }
            vec![span]
        }
    }

    #[test]
    fn cancelled_mid_batch_returns_no_partial_results() {
        let cancel = Cancellation::new();
        let relation = Arc::new(CancellingRelation {
            primary: TextSnapshot::new("abcdef"),
            cancel: cancel.clone(),
            calls: AtomicUsize::new(0),
        });
        let mapper = ProjectionSpanMapper::new(Arc::new(AlwaysProvider(relation.clone())));
        let doc = Document::new(
            DocumentId(4),
            "a.cshtml",
            Arc::new(SnapshotTextLoader::new(TextSnapshot::new("abcdef"))),
            DocumentServices::none().with_span_mapping(Arc::new(mapper)),
        );

        let spans = [
            TextSpan::new(0, 1),
            TextSpan::new(1, 1),
            TextSpan::new(2, 1),
        ];
        let result = pollster::block_on(map_spans(&doc, &spans, &cancel));

        assert_eq!(result, Err(SpanError::Cancelled));
        assert_eq!(relation.calls.load(Ordering::SeqCst), 2);
    }

    /// Service that loses every span.
    struct DroppingService;

    #[async_trait]
    impl SpanMappingService for DroppingService {
        async fn map_spans(
            &self,
            _document: &Document,
            _spans: &[TextSpan],
            _cancel: &Cancellation,
        ) -> Result<Vec<MappedSpanResult>> {
            Ok(Vec::new())
        }
    }

    fn dropping_document() -> Document {
        Document::new(
            DocumentId(5),
            "dropping.cshtml",
            Arc::new(SnapshotTextLoader::new(TextSnapshot::new("hello\nworld"))),
            DocumentServices::none().with_span_mapping(Arc::new(DroppingService)),
        )
    }

    #[test]
    fn result_count_mismatch_is_a_contract_violation() {
        let doc = dropping_document();
        let err = map_blocking(&doc, &[TextSpan::new(0, 5)]).unwrap_err();
        assert!(matches!(err, SpanError::ContractViolation(_)));
    }

    #[test]
    fn map_and_get_first_falls_back_when_service_returns_nothing() {
        let doc = dropping_document();
        let cancel = Cancellation::new();
        let snapshot = pollster::block_on(doc.text(&cancel)).unwrap();
        let span = TextSpan::new(6, 5);

        let result = pollster::block_on(map_and_get_first(&doc, &snapshot, span, &cancel));

        let result = result.unwrap();
        assert_eq!(result.span, span);
        assert_eq!(result.line_position_span.start, LinePosition::new(1, 0));
    }

    #[test]
    fn map_and_get_first_uses_service_result() {
        let doc = fixed_document("abcdef", "..abcdef", vec![TextSpan::new(2, 3)]);
        let cancel = Cancellation::new();
        let snapshot = pollster::block_on(doc.text(&cancel)).unwrap();
        let span = TextSpan::new(0, 3);

        let result = pollster::block_on(map_and_get_first(&doc, &snapshot, span, &cancel));

        assert_eq!(result.unwrap().span, TextSpan::new(2, 3));
    }

    #[test]
    fn mapped_result_serializes() {
        let result = MappedSpanResult::new(
            "a.cshtml",
            LinePositionSpan::new(LinePosition::new(0, 1), LinePosition::new(0, 2)),
            TextSpan::new(1, 1),
        );
        let json = serde_json::to_string(&result).unwrap();
        let back: MappedSpanResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
