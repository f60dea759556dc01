/*
 * projection-services
 * Copyright (c) 2025 Posit, PBC
 *
 * Span mapping and excerpt services for generated documents.
 */

//! Span mapping and excerpt services for generated documents.
//!
//! A generated (secondary) document is produced from an authored (primary)
//! one, for example a template compiled into intermediate code. This crate
//! answers two questions about spans in such documents:
//!
//! - where does this span live in the authored file? ([`map_spans`])
//! - what text surrounds it there? ([`try_excerpt`])
//!
//! Plain documents are mapped by identity and get no excerpt.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 Presentation (ReferenceEntry)              │
//! └────────────────────────────────────────────────────────────┘
//!              │                               │
//!              ▼                               ▼
//! ┌─────────────────────────┐     ┌────────────────────────────┐
//! │      span_mapping       │     │          excerpt           │
//! │  (equal-length rule,    │     │  (exactly one candidate,   │
//! │   identity fallback)    │     │   line window, re-anchor)  │
//! └─────────────────────────┘     └────────────────────────────┘
//!              │                               │
//!              └───────────────┬───────────────┘
//!                              ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │     projection (ProjectionProvider → ProjectionRelation)   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use projection_services::*;
//!
//! let registry = Arc::new(ProjectionRegistry::new());
//! registry.register(projection.clone());
//!
//! let doc = Document::new(
//!     DocumentId(0),
//!     "Views/Index.cshtml",
//!     Arc::new(SnapshotTextLoader::new(projection.secondary().clone())),
//!     projected_services(registry, &ServicesConfig::default()),
//! );
//!
//! let cancel = Cancellation::new();
//! let locations = map_spans(&doc, &spans, &cancel).await?;
//! let tooltip = try_excerpt(&doc, spans[0], ExcerptMode::Tooltip, &cancel).await?;
//! ```

pub mod cancellation;
pub mod config;
pub mod document;
pub mod entry;
pub mod error;
pub mod excerpt;
pub mod projection;
pub mod span_mapping;

// Re-export main types and functions for convenience
pub use cancellation::Cancellation;
pub use config::{ExcerptConfig, PreviewConfig, ServicesConfig};
pub use document::{
    BufferTextLoader, Document, DocumentId, DocumentServices, SnapshotTextLoader, TextLoader,
};
pub use entry::{EntryColumn, EntryValue, ReferenceEntry};
pub use error::{Result, SpanError};
pub use excerpt::{
    ClassifiedSpan, DocumentExcerptService, ExcerptMode, ExcerptResult, ProjectionExcerptService,
    content_span, try_excerpt,
};
pub use projection::{
    ProjectionProvider, ProjectionRegistry, ProjectionRelation, projected_services,
    resolve_projection,
};
pub use span_mapping::{
    MappedSpanResult, ProjectionSpanMapper, SpanMappingService, identity_mapping, map_and_get_first,
    map_spans, select_candidate,
};
