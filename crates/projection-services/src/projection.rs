/*
 * projection.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Projection capability seams shared by the span mapper and the excerpt
 * extractor.
 */

//! Projection capability seams.
//!
//! - [`ProjectionRelation`] - maps secondary ranges to candidate primary ranges
//! - [`ProjectionProvider`] - finds the relation for a captured snapshot
//! - [`ProjectionRegistry`] - in-memory provider keyed by snapshot identity
//!
//! Both services resolve projections through [`resolve_projection`], so they
//! always agree on which relation (and therefore which candidates) a
//! snapshot has.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use projection_text::{ProjectionSnapshot, SnapshotId, TextSnapshot, TextSpan};

use crate::cancellation::Cancellation;
use crate::config::ServicesConfig;
use crate::document::{Document, DocumentServices};
use crate::error::Result;
use crate::excerpt::ProjectionExcerptService;
use crate::span_mapping::ProjectionSpanMapper;

/// A queryable correspondence from secondary ranges to primary ranges.
#[async_trait]
pub trait ProjectionRelation: Send + Sync {
    /// The primary snapshot candidates are expressed against.
    fn primary(&self) -> &TextSnapshot;

    /// Candidate primary ranges for `span`, in a meaningful order.
    ///
    /// The result may be empty. A candidate shorter than `span` means the
    /// span was split across a projection boundary.
    async fn map_secondary_to_primary(&self, span: TextSpan) -> Vec<TextSpan>;
}

#[async_trait]
impl ProjectionRelation for ProjectionSnapshot {
    fn primary(&self) -> &TextSnapshot {
        ProjectionSnapshot::primary(self)
    }

    async fn map_secondary_to_primary(&self, span: TextSpan) -> Vec<TextSpan> {
        self.map_to_primary(span)
    }
}

/// Lookup of the projection that produced a secondary snapshot.
pub trait ProjectionProvider: Send + Sync {
    /// The relation for exactly this snapshot, if it is a projection.
    fn projection_for(&self, secondary: &TextSnapshot) -> Option<Arc<dyn ProjectionRelation>>;
}

/// In-memory [`ProjectionProvider`] keyed by secondary snapshot identity.
///
/// Lookups never match a projection registered for a different version of
/// the same buffer.
///
/// The registry never evicts on its own: a projection stays registered until
/// the caller removes it. Whoever regenerates a secondary buffer owns the
/// old generation's entry and drops it with [`remove`](Self::remove), or
/// swaps generations in one step with [`replace`](Self::replace). Several
/// generations may stay registered while requests against them are in
/// flight.
#[derive(Default)]
pub struct ProjectionRegistry {
    projections: RwLock<HashMap<SnapshotId, Arc<ProjectionSnapshot>>>,
}

impl ProjectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a projection under its secondary snapshot.
    pub fn register(&self, projection: Arc<ProjectionSnapshot>) {
        let id = projection.secondary().id();
        let mut projections = match self.projections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        projections.insert(id, projection);
    }

    /// Forget the projection registered for `secondary`.
    pub fn remove(&self, secondary: SnapshotId) -> Option<Arc<ProjectionSnapshot>> {
        let mut projections = match self.projections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        projections.remove(&secondary)
    }

    /// Register `projection` and forget the one registered for `superseded`.
    ///
    /// Both happen under one lock, so no lookup sees neither generation.
    pub fn replace(
        &self,
        superseded: SnapshotId,
        projection: Arc<ProjectionSnapshot>,
    ) -> Option<Arc<ProjectionSnapshot>> {
        let id = projection.secondary().id();
        let mut projections = match self.projections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        projections.insert(id, projection);
        if superseded == id {
            return None;
        }
        let removed = projections.remove(&superseded);
        tracing::trace!(
            superseded = superseded.0,
            current = id.0,
            evicted = removed.is_some(),
            "Replaced projection"
        );
        removed
    }

    pub fn len(&self) -> usize {
        match self.projections.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectionProvider for ProjectionRegistry {
    fn projection_for(&self, secondary: &TextSnapshot) -> Option<Arc<dyn ProjectionRelation>> {
        let projections = match self.projections.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        projections
            .get(&secondary.id())
            .cloned()
            .map(|projection| projection as Arc<dyn ProjectionRelation>)
    }
}

/// Capture the document's snapshot and find its projection.
///
/// Returns the captured secondary snapshot together with the relation, or
/// `None` when the snapshot is not a projection.
pub async fn resolve_projection(
    provider: &dyn ProjectionProvider,
    document: &Document,
    cancel: &Cancellation,
) -> Result<(TextSnapshot, Option<Arc<dyn ProjectionRelation>>)> {
    let snapshot = document.text(cancel).await?;
    let relation = provider.projection_for(&snapshot);
    Ok((snapshot, relation))
}

/// Span-mapping and excerpt capabilities bound to one provider.
pub fn projected_services(
    provider: Arc<dyn ProjectionProvider>,
    config: &ServicesConfig,
) -> DocumentServices {
    DocumentServices::none()
        .with_span_mapping(Arc::new(ProjectionSpanMapper::new(provider.clone())))
        .with_excerpt(Arc::new(ProjectionExcerptService::with_config(
            provider,
            config.excerpt.clone(),
        )))
}
