// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable errors reported by layer allocation and rendering.
//!
//! Contract violations (stale handles, attaching an element to its own
//! descendant, re-entrant layout) are not errors: they panic.

use thiserror::Error;

/// Failures reported by a [`LayerBackend`](crate::layer::LayerBackend).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// The platform could not provide a surface for the screen.
    #[error("screen surface unavailable at {width}x{height}")]
    ScreenUnavailable {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// An offscreen surface could not be allocated.
    #[error("offscreen surface allocation failed at {width}x{height}")]
    SurfaceAllocation {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// A backend-specific failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Failures that abort a frame.
///
/// When a frame fails, any pending changes stay queued and the next
/// [`Document::render`](crate::document::Document::render) call retries them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A layer could not be allocated while painting or composing.
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// The relayout loop kept producing new changes.
    #[error("layout did not converge after {passes} relayout passes")]
    LayoutDidNotConverge {
        /// Number of passes run before giving up.
        passes: u32,
    },
}

/// Result type for document rendering.
pub type RenderResult<T> = Result<T, RenderError>;
