//! Text primitives for cross-buffer span mapping
//!
//! This crate provides the immutable text model that span mapping and
//! excerpting run over: spans, line tables, versioned snapshots, and
//! projections that describe how a generated (secondary) buffer was stitched
//! together from an authored (primary) one.
//!
//! # Overview
//!
//! The core types are:
//! - [`TextSpan`]: A half-open byte range over one snapshot
//! - [`LineIndex`]: Line-break table for offset/position conversion
//! - [`TextSnapshot`]: Immutable text at one version, cheap to clone
//! - [`ProjectionSnapshot`]: Secondary text plus its mapping to the primary
//!
//! # Example
//!
//! ```rust
//! use projection_text::*;
//!
//! let primary = TextSnapshot::new("<p>@title</p>");
//! let projection = ProjectionSnapshot::builder(primary)
//!     .literal("render(")
//!     .primary(TextSpan::new(4, 5))
//!     .unwrap()
//!     .literal(");")
//!     .build();
//!
//! assert_eq!(projection.secondary().text(), "render(title);");
//! assert_eq!(
//!     projection.map_to_primary(TextSpan::new(7, 5)),
//!     vec![TextSpan::new(4, 5)]
//! );
//! ```

pub mod line_index;
pub mod projection;
pub mod snapshot;
pub mod types;

pub use line_index::LineIndex;
pub use projection::{PieceSource, ProjectionBuilder, ProjectionPiece, ProjectionSnapshot};
pub use snapshot::{SnapshotId, TextBuffer, TextSnapshot};
pub use types::{LinePosition, LinePositionSpan, TextError, TextSpan};
