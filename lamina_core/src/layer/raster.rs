// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surfaces wrapped with snapshot caching.

use core::fmt;

use kurbo::{Point, Size};

use super::surface::{Canvas, Image, LayerBackend, Surface};
use crate::color::Color;
use crate::error::LayerError;

/// A drawable surface plus a lazily captured snapshot of its content.
///
/// Drawing through [`canvas`](Self::canvas) does not invalidate the snapshot
/// on its own; painters call [`set_changed`](Self::set_changed) (the document
/// does so whenever it hands a layer out for painting).
pub struct Layer {
    surface: Box<dyn Surface>,
    is_changed: bool,
    snapshot: Option<Image>,
    snapshot_generation: u64,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("size", &self.size())
            .field("is_changed", &self.is_changed)
            .field("snapshot_generation", &self.snapshot_generation)
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// Wraps a surface. The new layer counts as changed.
    #[must_use]
    pub fn new(surface: Box<dyn Surface>) -> Self {
        Self {
            surface,
            is_changed: true,
            snapshot: None,
            snapshot_generation: 0,
        }
    }

    /// Creates a layer presenting to the screen.
    pub fn make_screen_layer(backend: &mut dyn LayerBackend, size: Size) -> Result<Self, LayerError> {
        backend.make_screen_surface(size).map(Self::new)
    }

    /// Creates an offscreen layer.
    pub fn make_offscreen_layer(backend: &mut dyn LayerBackend, size: Size) -> Result<Self, LayerError> {
        backend.make_offscreen_surface(size).map(Self::new)
    }

    /// Returns the layer dimensions.
    #[must_use]
    pub fn size(&self) -> Size {
        self.surface.size()
    }

    /// Returns the canvas drawing into this layer.
    pub fn canvas(&mut self) -> &mut dyn Canvas {
        self.surface.canvas()
    }

    /// Clears the content and marks the layer changed.
    pub fn clear(&mut self, color: Color) {
        self.surface.canvas().clear(color);
        self.set_changed();
    }

    /// Drops any saved canvas state, then [clears](Self::clear).
    pub fn reset(&mut self, color: Color) {
        self.surface.canvas().restore_to_count(1);
        self.clear(color);
    }

    /// Marks the content as changed so the next snapshot is recaptured.
    pub fn set_changed(&mut self) {
        self.is_changed = true;
    }

    /// Returns whether the content changed since the last snapshot.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.is_changed
    }

    /// Returns a snapshot of the content, capturing a new one only if the
    /// layer changed since the previous call.
    pub fn snapshot(&mut self) -> Image {
        if !self.is_changed
            && let Some(image) = &self.snapshot
        {
            return image.clone();
        }
        let image = self.surface.make_snapshot();
        self.snapshot = Some(image.clone());
        self.snapshot_generation += 1;
        self.is_changed = false;
        image
    }

    /// Returns how many snapshots have been captured so far.
    #[must_use]
    pub fn snapshot_generation(&self) -> u64 {
        self.snapshot_generation
    }

    /// Draws the snapshot of `other` onto this layer.
    pub fn paint_layer(&mut self, other: &mut Self, position: Point, opacity: f32) {
        let image = other.snapshot();
        self.surface.canvas().draw_image(&image, position, opacity);
    }

    /// Submits pending drawing work.
    pub fn flush(&mut self) {
        self.surface.flush();
    }
}
