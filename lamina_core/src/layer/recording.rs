// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless backend that records drawing commands.
//!
//! [`RecordingBackend`] allocates surfaces that keep a list of [`DrawOp`]s
//! instead of pixels. Clones share state, so a host can hand one clone to a
//! [`Document`](crate::document::Document) and inspect allocations,
//! snapshots, and the composed screen through another.

use core::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, BezPath, Point, Shape, Size, Vec2};

use super::surface::{Canvas, Image, LayerBackend, RasterImage, Surface};
use crate::color::Color;
use crate::error::LayerError;

/// A recorded canvas command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::translate`].
    Translate(Vec2),
    /// [`Canvas::transform`].
    Transform(Affine),
    /// [`Canvas::clip_path`].
    ClipPath(BezPath),
    /// [`Canvas::clear`]; drops every earlier command of the surface.
    Clear(Color),
    /// [`Canvas::fill_path`].
    FillPath {
        /// Filled path, in current coordinates.
        path: BezPath,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::draw_image`].
    DrawImage {
        /// Serial of the drawn [`RecordedImage`].
        image: u64,
        /// Top-left corner, in current coordinates.
        position: Point,
        /// Opacity the image was drawn with.
        opacity: f32,
    },
}

/// A snapshot of a recording surface.
#[derive(Clone, Debug)]
pub struct RecordedImage {
    serial: u64,
    size: Size,
    ops: Vec<DrawOp>,
}

impl RecordedImage {
    /// Returns the backend-wide serial number of this snapshot.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Returns the commands the surface held when the snapshot was taken.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

impl RasterImage for RecordedImage {
    fn size(&self) -> Size {
        self.size
    }
}

/// A canvas appending to a shared command list.
#[derive(Debug)]
pub struct RecordingCanvas {
    ops: Rc<RefCell<Vec<DrawOp>>>,
    save_count: usize,
}

impl RecordingCanvas {
    fn new(ops: Rc<RefCell<Vec<DrawOp>>>) -> Self {
        Self { ops, save_count: 1 }
    }

    fn push(&self, op: DrawOp) {
        self.ops.borrow_mut().push(op);
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.save_count += 1;
        self.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        if self.save_count > 1 {
            self.save_count -= 1;
            self.push(DrawOp::Restore);
        }
    }

    fn save_count(&self) -> usize {
        self.save_count
    }

    fn translate(&mut self, offset: Vec2) {
        self.push(DrawOp::Translate(offset));
    }

    fn transform(&mut self, affine: Affine) {
        self.push(DrawOp::Transform(affine));
    }

    fn clip_path(&mut self, path: &BezPath) {
        self.push(DrawOp::ClipPath(path.clone()));
    }

    fn clear(&mut self, color: Color) {
        let mut ops = self.ops.borrow_mut();
        ops.clear();
        // Saved state survives a clear; replay it so the list stays balanced.
        ops.extend((1..self.save_count).map(|_| DrawOp::Save));
        ops.push(DrawOp::Clear(color));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.push(DrawOp::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn draw_image(&mut self, image: &Image, position: Point, opacity: f32) {
        let any: &dyn core::any::Any = &**image;
        let serial = any
            .downcast_ref::<RecordedImage>()
            .map_or(u64::MAX, RecordedImage::serial);
        self.push(DrawOp::DrawImage {
            image: serial,
            position,
            opacity,
        });
    }
}

#[derive(Debug, Default)]
struct Shared {
    screens_created: usize,
    layers_allocated: usize,
    snapshots: usize,
    next_serial: u64,
    allocation_limit: Option<usize>,
    screen_ops: Option<Rc<RefCell<Vec<DrawOp>>>>,
    images: Vec<RecordedImage>,
}

/// A surface produced by [`RecordingBackend`].
#[derive(Debug)]
pub struct RecordingSurface {
    size: Size,
    canvas: RecordingCanvas,
    shared: Rc<RefCell<Shared>>,
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn make_snapshot(&mut self) -> Image {
        let mut shared = self.shared.borrow_mut();
        shared.snapshots += 1;
        shared.next_serial += 1;
        let image = RecordedImage {
            serial: shared.next_serial,
            size: self.size,
            ops: self.canvas.ops.borrow().clone(),
        };
        shared.images.push(image.clone());
        Rc::new(image)
    }
}

/// A [`LayerBackend`] that records instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    shared: Rc<RefCell<Shared>>,
}

impl RecordingBackend {
    /// Creates a backend with no allocation limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes offscreen allocations fail once `limit` layers exist.
    pub fn set_allocation_limit(&self, limit: Option<usize>) {
        self.shared.borrow_mut().allocation_limit = limit;
    }

    /// Returns how many screen surfaces were created.
    #[must_use]
    pub fn screens_created(&self) -> usize {
        self.shared.borrow().screens_created
    }

    /// Returns how many offscreen surfaces were allocated.
    #[must_use]
    pub fn layers_allocated(&self) -> usize {
        self.shared.borrow().layers_allocated
    }

    /// Returns how many snapshots were captured.
    #[must_use]
    pub fn snapshots(&self) -> usize {
        self.shared.borrow().snapshots
    }

    /// Returns the commands currently held by the latest screen surface.
    #[must_use]
    pub fn screen_ops(&self) -> Vec<DrawOp> {
        self.shared
            .borrow()
            .screen_ops
            .as_ref()
            .map(|ops| ops.borrow().clone())
            .unwrap_or_default()
    }

    /// Returns a captured snapshot by serial.
    #[must_use]
    pub fn image(&self, serial: u64) -> Option<RecordedImage> {
        self.shared
            .borrow()
            .images
            .iter()
            .find(|image| image.serial == serial)
            .cloned()
    }

    /// Returns the screen's draws with transforms and clips resolved into
    /// screen space.
    #[must_use]
    pub fn resolved_screen_draws(&self) -> Vec<ResolvedDraw> {
        resolve_draws(&self.screen_ops())
    }

    fn surface(&self, size: Size) -> Box<dyn Surface> {
        let ops = Rc::new(RefCell::new(Vec::new()));
        Box::new(RecordingSurface {
            size,
            canvas: RecordingCanvas::new(ops),
            shared: self.shared.clone(),
        })
    }
}

impl LayerBackend for RecordingBackend {
    fn make_screen_surface(&mut self, size: Size) -> Result<Box<dyn Surface>, LayerError> {
        let ops = Rc::new(RefCell::new(Vec::new()));
        {
            let mut shared = self.shared.borrow_mut();
            shared.screens_created += 1;
            shared.screen_ops = Some(ops.clone());
        }
        Ok(Box::new(RecordingSurface {
            size,
            canvas: RecordingCanvas::new(ops),
            shared: self.shared.clone(),
        }))
    }

    fn make_offscreen_surface(&mut self, size: Size) -> Result<Box<dyn Surface>, LayerError> {
        {
            let mut shared = self.shared.borrow_mut();
            if shared
                .allocation_limit
                .is_some_and(|limit| shared.layers_allocated >= limit)
            {
                return Err(LayerError::SurfaceAllocation {
                    width: size.width,
                    height: size.height,
                });
            }
            shared.layers_allocated += 1;
        }
        Ok(self.surface(size))
    }
}

/// What a [`ResolvedDraw`] drew.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawKind {
    /// A snapshot was drawn.
    Image {
        /// Serial of the snapshot.
        serial: u64,
        /// Opacity the snapshot was drawn with.
        opacity: f32,
    },
    /// A path was filled.
    Fill {
        /// Fill color.
        color: Color,
    },
}

/// A draw command with the canvas state it ran under.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedDraw {
    /// What was drawn.
    pub kind: DrawKind,
    /// Canvas transform at the time of the draw.
    pub transform: Affine,
    /// Image origin or path bounds origin, in surface coordinates.
    pub origin: Point,
    /// Active clip paths, in surface coordinates.
    pub clips: Vec<BezPath>,
}

impl ResolvedDraw {
    /// Returns whether `point`, in surface coordinates, passes every active
    /// clip.
    #[must_use]
    pub fn clip_contains(&self, point: Point) -> bool {
        self.clips.iter().all(|clip| clip.contains(point))
    }
}

/// Replays `ops` and returns each draw with its resolved canvas state.
#[must_use]
pub fn resolve_draws(ops: &[DrawOp]) -> Vec<ResolvedDraw> {
    let mut stack: Vec<(Affine, Vec<BezPath>)> = Vec::new();
    let mut transform = Affine::IDENTITY;
    let mut clips: Vec<BezPath> = Vec::new();
    let mut draws = Vec::new();
    for op in ops {
        match op {
            DrawOp::Save => stack.push((transform, clips.clone())),
            DrawOp::Restore => {
                if let Some((t, c)) = stack.pop() {
                    transform = t;
                    clips = c;
                }
            }
            DrawOp::Translate(offset) => transform = transform * Affine::translate(*offset),
            DrawOp::Transform(affine) => transform = transform * *affine,
            DrawOp::ClipPath(path) => {
                let mut path = path.clone();
                path.apply_affine(transform);
                clips.push(path);
            }
            DrawOp::Clear(_) => draws.clear(),
            DrawOp::FillPath { path, color } => draws.push(ResolvedDraw {
                kind: DrawKind::Fill { color: *color },
                transform,
                origin: transform * path.bounding_box().origin(),
                clips: clips.clone(),
            }),
            DrawOp::DrawImage {
                image,
                position,
                opacity,
            } => draws.push(ResolvedDraw {
                kind: DrawKind::Image {
                    serial: *image,
                    opacity: *opacity,
                },
                transform,
                origin: transform * *position,
                clips: clips.clone(),
            }),
        }
    }
    draws
}
