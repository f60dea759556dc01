/*
 * cancellation.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Cancellation tokens for span requests.
 */

//! Cooperative cancellation for span requests.
//!
//! Services call [`Cancellation::check`] after every suspension point, so a
//! cancelled request stops at the next await and reports
//! [`SpanError::Cancelled`] instead of a partial result.
//!
//! Native builds share a `tokio_util` token; wasm32 builds fall back to a
//! shared flag.

#[cfg(target_arch = "wasm32")]
use std::sync::Arc;
#[cfg(target_arch = "wasm32")]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, SpanError};

#[cfg(not(target_arch = "wasm32"))]
type Flag = tokio_util::sync::CancellationToken;

#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
struct Flag(Arc<AtomicBool>);

#[cfg(target_arch = "wasm32")]
impl Flag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Cancellation shared by every clone of one request's token.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    flag: Flag,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    /// Cancel this request and every clone of its token.
    pub fn cancel(&self) {
        self.flag.cancel();
    }

    /// `Err(SpanError::Cancelled)` once the request was cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(SpanError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio_util::sync::CancellationToken> for Cancellation {
    fn from(token: tokio_util::sync::CancellationToken) -> Self {
        Self { flag: token }
    }
}
