// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layers, layer trees, and the backend traits they are drawn through.
//!
//! Every repaint boundary owns a [`LayerTree`]: an ordered list of
//! [`Layer`]s painted by the boundary's elements, interleaved with the trees
//! of nested boundaries. Composition walks the trees from the document root
//! and draws each layer's snapshot onto the screen.

mod raster;
mod recording;
mod surface;
mod tree;

pub use raster::Layer;
pub use recording::{
    DrawKind, DrawOp, RecordedImage, RecordingBackend, RecordingCanvas, RecordingSurface,
    ResolvedDraw, resolve_draws,
};
pub use surface::{Canvas, Image, LayerBackend, RasterImage, Surface};
pub use tree::{LayerTree, LayerTreeNode};
pub(crate) use tree::LayerPool;
