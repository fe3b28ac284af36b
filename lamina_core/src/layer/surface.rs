// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits implemented by a rendering backend.
//!
//! The core never rasterizes anything itself. A [`LayerBackend`] hands out
//! [`Surface`]s, each surface exposes a [`Canvas`] to draw on, and a surface
//! snapshot is an opaque [`Image`] that another canvas can draw.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use kurbo::{Affine, BezPath, Point, Rect, Shape, Size, Vec2};

use crate::clip::ClipPath;
use crate::color::Color;
use crate::error::LayerError;

/// Pixel content captured from a [`Surface`].
pub trait RasterImage: Any + fmt::Debug {
    /// Returns the image dimensions.
    fn size(&self) -> Size;
}

/// A shared handle to a snapshot.
pub type Image = Rc<dyn RasterImage>;

/// A stateful 2D drawing target.
///
/// The state stack starts with one entry; [`save`](Self::save) pushes the
/// current transform and clip and [`restore`](Self::restore) pops them.
pub trait Canvas {
    /// Pushes the current transform and clip.
    fn save(&mut self);

    /// Pops the most recently saved transform and clip.
    fn restore(&mut self);

    /// Returns the depth of the state stack, starting at 1.
    fn save_count(&self) -> usize;

    /// Restores until the state stack has `count` entries.
    fn restore_to_count(&mut self, count: usize) {
        while self.save_count() > count.max(1) {
            self.restore();
        }
    }

    /// Pre-multiplies the current transform by a translation.
    fn translate(&mut self, offset: Vec2);

    /// Pre-multiplies the current transform by `affine`.
    fn transform(&mut self, affine: Affine);

    /// Intersects the current clip with `path`, in current coordinates.
    fn clip_path(&mut self, path: &BezPath);

    /// Replaces every pixel with `color`, ignoring transform and clip.
    fn clear(&mut self, color: Color);

    /// Fills `path` with a solid color.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Draws `image` with its top-left corner at `position`.
    fn draw_image(&mut self, image: &Image, position: Point, opacity: f32);

    /// Intersects the current clip with every member path of `clip`.
    fn clip(&mut self, clip: &ClipPath) {
        for path in clip.paths() {
            self.clip_path(path);
        }
    }

    /// Fills a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_path(&rect.to_path(0.1), color);
    }
}

/// A drawable buffer: the screen or an offscreen layer.
pub trait Surface {
    /// Returns the surface dimensions.
    fn size(&self) -> Size;

    /// Returns the canvas drawing into this surface.
    fn canvas(&mut self) -> &mut dyn Canvas;

    /// Captures the current content.
    fn make_snapshot(&mut self) -> Image;

    /// Submits pending drawing work.
    fn flush(&mut self) {}
}

/// Allocates surfaces for a document.
pub trait LayerBackend {
    /// Returns a surface that presents to the screen at `size`.
    fn make_screen_surface(&mut self, size: Size) -> Result<Box<dyn Surface>, LayerError>;

    /// Allocates an offscreen surface of `size`.
    fn make_offscreen_surface(&mut self, size: Size) -> Result<Box<dyn Surface>, LayerError>;
}
