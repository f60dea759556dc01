/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Documents, their text loaders and their optional capabilities.
 */

//! Document abstraction for span services.
//!
//! A [`Document`] is an identity, a file path, a way to load its current text
//! snapshot, and the set of capabilities ([`DocumentServices`]) registered
//! for it. Plain documents carry no capabilities; generated documents carry
//! a span-mapping and/or excerpt service.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use projection_text::{TextBuffer, TextSnapshot};

use crate::cancellation::Cancellation;
use crate::error::Result;
use crate::excerpt::DocumentExcerptService;
use crate::span_mapping::SpanMappingService;

/// A unique identifier for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub usize);

/// Source of a document's text.
///
/// Every call returns one immutable snapshot; callers keep using that
/// snapshot for the rest of their computation.
#[async_trait]
pub trait TextLoader: Send + Sync {
    async fn load(&self, cancel: &Cancellation) -> Result<TextSnapshot>;
}

/// Loader that always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotTextLoader {
    snapshot: TextSnapshot,
}

impl SnapshotTextLoader {
    pub fn new(snapshot: TextSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl TextLoader for SnapshotTextLoader {
    async fn load(&self, cancel: &Cancellation) -> Result<TextSnapshot> {
        cancel.check()?;
        Ok(self.snapshot.clone())
    }
}

/// Loader that returns whatever snapshot a live buffer currently holds.
#[derive(Debug, Clone)]
pub struct BufferTextLoader {
    buffer: Arc<TextBuffer>,
}

impl BufferTextLoader {
    pub fn new(buffer: Arc<TextBuffer>) -> Self {
        Self { buffer }
    }
}

#[async_trait]
impl TextLoader for BufferTextLoader {
    async fn load(&self, cancel: &Cancellation) -> Result<TextSnapshot> {
        cancel.check()?;
        Ok(self.buffer.current())
    }
}

/// The capabilities registered for a document.
///
/// Each capability is looked up by name; an absent capability means the
/// document is a plain document for that purpose.
#[derive(Clone, Default)]
pub struct DocumentServices {
    span_mapping: Option<Arc<dyn SpanMappingService>>,
    excerpt: Option<Arc<dyn DocumentExcerptService>>,
}

impl DocumentServices {
    /// No capabilities (a plain document).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_span_mapping(mut self, service: Arc<dyn SpanMappingService>) -> Self {
        self.span_mapping = Some(service);
        self
    }

    pub fn with_excerpt(mut self, service: Arc<dyn DocumentExcerptService>) -> Self {
        self.excerpt = Some(service);
        self
    }

    pub fn span_mapping(&self) -> Option<&Arc<dyn SpanMappingService>> {
        self.span_mapping.as_ref()
    }

    pub fn excerpt(&self) -> Option<&Arc<dyn DocumentExcerptService>> {
        self.excerpt.as_ref()
    }
}

impl fmt::Debug for DocumentServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentServices")
            .field("span_mapping", &self.span_mapping.is_some())
            .field("excerpt", &self.excerpt.is_some())
            .finish()
    }
}

struct DocumentInner {
    id: DocumentId,
    file_path: String,
    loader: Arc<dyn TextLoader>,
    services: DocumentServices,
}

/// A document known to the span services.
///
/// Cloning is cheap; clones share identity, loader and capabilities.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Document {
    /// Create a document whose text comes from `loader`.
    pub fn new(
        id: DocumentId,
        file_path: impl Into<String>,
        loader: Arc<dyn TextLoader>,
        services: DocumentServices,
    ) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                id,
                file_path: file_path.into(),
                loader,
                services,
            }),
        }
    }

    /// Create a plain document over a fixed snapshot.
    pub fn from_snapshot(
        id: DocumentId,
        file_path: impl Into<String>,
        snapshot: TextSnapshot,
    ) -> Self {
        Self::new(
            id,
            file_path,
            Arc::new(SnapshotTextLoader::new(snapshot)),
            DocumentServices::none(),
        )
    }

    pub fn id(&self) -> DocumentId {
        self.inner.id
    }

    /// The path presented to users for this document.
    ///
    /// For a generated document this is the path of the authored file it was
    /// generated from.
    pub fn file_path(&self) -> &str {
        &self.inner.file_path
    }

    pub fn services(&self) -> &DocumentServices {
        &self.inner.services
    }

    /// Capture the document's current text snapshot.
    pub async fn text(&self, cancel: &Cancellation) -> Result<TextSnapshot> {
        let snapshot = self.inner.loader.load(cancel).await?;
        cancel.check()?;
        Ok(snapshot)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("file_path", &self.inner.file_path)
            .field("services", &self.inner.services)
            .finish()
    }
}
