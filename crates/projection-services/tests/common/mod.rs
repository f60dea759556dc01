//! Shared fixtures for projection-services integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use projection_services::{
    Document, DocumentId, ProjectionRegistry, ServicesConfig, SnapshotTextLoader,
    projected_services,
};
use projection_text::{PieceSource, ProjectionSnapshot, TextSnapshot, TextSpan};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Route service logs to the test harness; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "projection_services=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Ten-line component file; the last line has no trailing newline.
pub const COUNTER_RAZOR: &str = "@page \"/counter\"
<h1>Counter</h1>
<p>Current count: @currentCount</p>
<button @onclick=\"IncrementCount\">Click me</button>
@code {
    private int currentCount = 0;
    private void IncrementCount()
    {
        currentCount++;
    }";

/// Span of the `nth` (0-based) occurrence of `needle` in `text`.
pub fn find(text: &str, needle: &str, nth: usize) -> TextSpan {
    let start = text
        .match_indices(needle)
        .nth(nth)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| panic!("{:?} occurrence {} not found", needle, nth));
    TextSpan::new(start, needle.len())
}

/// Secondary span that was copied from `primary_span`.
pub fn secondary_span_for(projection: &ProjectionSnapshot, primary_span: TextSpan) -> TextSpan {
    projection
        .pieces()
        .iter()
        .find_map(|piece| match piece.source {
            PieceSource::Primary(source) if source.contains_span(primary_span) => {
                let start = piece.secondary.start + (primary_span.start - source.start);
                Some(TextSpan::new(start, primary_span.length))
            }
            _ => None,
        })
        .expect("primary span is not projected")
}

/// Generated code for [`COUNTER_RAZOR`].
pub fn counter_projection() -> Arc<ProjectionSnapshot> {
    let primary = TextSnapshot::new(COUNTER_RAZOR);
    let code_start = find(COUNTER_RAZOR, "    private int", 0).start;
    let code = TextSpan::new(code_start, COUNTER_RAZOR.len() - code_start);

    Arc::new(
        ProjectionSnapshot::builder(primary)
            .literal("class Counter {\n  void Render() {\n    Route(")
            .primary(find(COUNTER_RAZOR, "\"/counter\"", 0))
            .unwrap()
            .literal(");\n    Write(")
            .primary(find(COUNTER_RAZOR, "currentCount", 0))
            .unwrap()
            .literal(");\n    OnClick(")
            .primary(find(COUNTER_RAZOR, "IncrementCount", 0))
            .unwrap()
            .literal(");\n  }\n")
            .primary(code)
            .unwrap()
            .literal("\n}\n")
            .build(),
    )
}

/// A generated document over `projection`, registered with a fresh registry.
pub fn projected_document(
    projection: &Arc<ProjectionSnapshot>,
    config: &ServicesConfig,
) -> Document {
    let registry = Arc::new(ProjectionRegistry::new());
    registry.register(projection.clone());

    Document::new(
        DocumentId(1),
        "Pages/Counter.razor",
        Arc::new(SnapshotTextLoader::new(projection.secondary().clone())),
        projected_services(registry, config),
    )
}
