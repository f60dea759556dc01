//! Buffer projections: generated text stitched from literal and primary pieces

use crate::snapshot::TextSnapshot;
use crate::types::{TextError, TextSpan};
use serde::{Deserialize, Serialize};

/// Where a piece of the secondary text comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceSource {
    /// Text that exists only in the secondary buffer
    Literal,
    /// Text copied verbatim from this span of the primary buffer
    Primary(TextSpan),
}

/// A piece of the secondary text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPiece {
    /// Range this piece occupies in the secondary text
    pub secondary: TextSpan,
    pub source: PieceSource,
}

/// A secondary snapshot generated from a primary snapshot
///
/// The secondary text is the concatenation of its pieces. Pieces backed by
/// the primary buffer map back to it one-to-one; literal pieces have no
/// counterpart there.
#[derive(Debug, Clone)]
pub struct ProjectionSnapshot {
    primary: TextSnapshot,
    secondary: TextSnapshot,
    pieces: Vec<ProjectionPiece>,
}

impl ProjectionSnapshot {
    /// Start building a projection over `primary`
    pub fn builder(primary: TextSnapshot) -> ProjectionBuilder {
        ProjectionBuilder {
            primary,
            text: String::new(),
            pieces: Vec::new(),
        }
    }

    pub fn primary(&self) -> &TextSnapshot {
        &self.primary
    }

    pub fn secondary(&self) -> &TextSnapshot {
        &self.secondary
    }

    pub fn pieces(&self) -> &[ProjectionPiece] {
        &self.pieces
    }

    /// Map a secondary span to every primary span it touches, in piece order
    ///
    /// A span crossing a piece boundary yields one shorter candidate per
    /// primary piece it overlaps; parts over literal pieces yield nothing.
    /// An empty span yields a candidate for each primary piece whose range
    /// contains or borders it.
    pub fn map_to_primary(&self, span: TextSpan) -> Vec<TextSpan> {
        self.pieces
            .iter()
            .filter_map(|piece| {
                let PieceSource::Primary(primary) = piece.source else {
                    return None;
                };
                let overlap = piece.secondary.intersection(span)?;
                if overlap.is_empty() && !span.is_empty() {
                    return None;
                }
                let start = primary.start + (overlap.start - piece.secondary.start);
                Some(TextSpan::new(start, overlap.length))
            })
            .collect()
    }
}

/// Builder for [`ProjectionSnapshot`]
///
/// Pieces are appended in order; their secondary offsets are the running
/// length of the text built so far.
#[derive(Debug)]
pub struct ProjectionBuilder {
    primary: TextSnapshot,
    text: String,
    pieces: Vec<ProjectionPiece>,
}

impl ProjectionBuilder {
    /// Append generated text with no primary counterpart
    pub fn literal(mut self, text: &str) -> Self {
        let secondary = TextSpan::new(self.text.len(), text.len());
        self.text.push_str(text);
        self.pieces.push(ProjectionPiece {
            secondary,
            source: PieceSource::Literal,
        });
        self
    }

    /// Append the primary text covered by `span`
    pub fn primary(mut self, span: TextSpan) -> Result<Self, TextError> {
        let copied = self.primary.slice(span)?;
        let secondary = TextSpan::new(self.text.len(), copied.len());
        self.text.push_str(copied);
        self.pieces.push(ProjectionPiece {
            secondary,
            source: PieceSource::Primary(span),
        });
        Ok(self)
    }

    pub fn build(self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            primary: self.primary,
            secondary: TextSnapshot::new(self.text),
            pieces: self.pieces,
        }
    }
}
