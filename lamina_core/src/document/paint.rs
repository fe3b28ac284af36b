// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting of element subtrees into the layer trees of their repaint
//! boundaries.
//!
//! Painting walks the tree depth-first with an explicit cursor
//! ([`PaintCx`]). Each repaint boundary opens a scope: the layers its tree
//! held after the previous paint become a pool, and layers requested while
//! painting the boundary's subtree are taken from that pool by size before
//! anything new is allocated. Layers left in the pool when the scope closes
//! are dropped.
//!
//! Clips accumulate in window coordinates while painting inside one
//! boundary. Entering a nested boundary stores the accumulated clip on the
//! nested layer tree, in the boundary's local coordinates, and painting
//! below it starts unclipped again; composition applies the stored clip.

use kurbo::{Point, Size};

use crate::clip::ClipPath;
use crate::color::Color;
use crate::element::{ElementId, ElementTree};
use crate::error::LayerError;
use crate::layer::{Canvas, Layer, LayerBackend, LayerPool, LayerTree, LayerTreeNode};
use crate::trace::{FrameSummaryBuilder, LayerEventKind};

/// Painting state of the repaint boundary currently being painted.
#[derive(Debug)]
pub(crate) struct BoundaryScope {
    owner: ElementId,
    pool: LayerPool,
    current_layer: Option<usize>,
}

/// Shared resources for one paint call.
pub(crate) struct PaintEnv<'a> {
    pub(crate) tree: &'a mut ElementTree,
    pub(crate) backend: &'a mut dyn LayerBackend,
    pub(crate) summary: &'a mut FrameSummaryBuilder,
}

/// The painting cursor handed to [`Element::paint`](crate::element::Element::paint).
///
/// Elements draw by asking for the current [`layer`](Self::layer) (or a fresh
/// one with [`create_layer`](Self::create_layer)) and painting through its
/// canvas, whose origin is the element's top-left corner. Children are
/// painted with [`paint_child`](Self::paint_child) or
/// [`paint_children`](Self::paint_children), in back-to-front order.
pub struct PaintCx<'a> {
    env: PaintEnv<'a>,
    scope: &'a mut BoundaryScope,
    element: ElementId,
    clip: Option<ClipPath>,
    is_changed: bool,
}

impl core::fmt::Debug for PaintCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaintCx")
            .field("element", &self.element)
            .field("boundary", &self.scope.owner)
            .field("is_changed", &self.is_changed)
            .finish_non_exhaustive()
    }
}

impl PaintCx<'_> {
    /// Returns the element being painted.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Returns the repaint boundary whose layer tree receives the layers.
    #[must_use]
    pub fn boundary(&self) -> ElementId {
        self.scope.owner
    }

    /// Read access to the whole tree.
    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &*self.env.tree
    }

    /// Returns the element's size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.env.tree.size(self.element)
    }

    /// Returns the element's position in window coordinates.
    #[must_use]
    pub fn abs_position(&self) -> Point {
        self.env.tree.abs_position(self.element)
    }

    /// Returns the element's children in order.
    #[must_use]
    pub fn children(&self) -> Vec<ElementId> {
        self.env.tree.children(self.element).collect()
    }

    /// Returns whether the element or an ancestor painted in the same call
    /// changed since the previous paint.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.is_changed
    }

    /// Paints one child.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of the element being painted.
    pub fn paint_child(&mut self, child: ElementId) -> Result<(), LayerError> {
        assert!(
            self.env.tree.parent(child) == Some(self.element),
            "{child:?} is not a child of {:?}",
            self.element
        );
        paint_element(
            &mut self.env.reborrow(),
            Some(&mut *self.scope),
            child,
            self.clip.as_ref(),
            self.is_changed,
        )
    }

    /// Paints every child in order.
    pub fn paint_children(&mut self) -> Result<(), LayerError> {
        for child in self.children() {
            self.paint_child(child)?;
        }
        Ok(())
    }

    /// Returns the layer to draw into, prepared for the element.
    ///
    /// Reuses the boundary's current layer, or creates one the size of the
    /// boundary. The layer is marked changed, clipped to the accumulated
    /// clip, and translated so the element's top-left corner is the origin.
    pub fn layer(&mut self) -> Result<&mut Layer, LayerError> {
        let index = match self.scope.current_layer {
            Some(index) => index,
            None => {
                let size = self.env.tree.size(self.scope.owner);
                self.push_layer(size)?
            }
        };
        Ok(self.prepare_layer(index))
    }

    /// Starts a new layer of `size` above everything painted so far in this
    /// boundary and returns it, prepared like [`layer`](Self::layer).
    ///
    /// A layer of the same size left over from the boundary's previous
    /// paint is reused and cleared instead of allocating.
    pub fn create_layer(&mut self, size: Size) -> Result<&mut Layer, LayerError> {
        let index = self.push_layer(size)?;
        Ok(self.prepare_layer(index))
    }

    /// Shorthand for the canvas of [`layer`](Self::layer).
    pub fn canvas(&mut self) -> Result<&mut dyn Canvas, LayerError> {
        Ok(self.layer()?.canvas())
    }

    /// Returns the element's own layer tree when it is a repaint boundary.
    ///
    /// Repaint boundaries use this to set their layer transform and opacity
    /// while painting.
    pub fn layer_tree_mut(&mut self) -> Option<&mut LayerTree> {
        self.env.tree.layer_tree_mut(self.element)
    }

    fn push_layer(&mut self, size: Size) -> Result<usize, LayerError> {
        let owner = self.scope.owner;
        let (layer, kind) = match self.scope.pool.take_by_size(size) {
            Some(mut layer) => {
                layer.reset(Color::TRANSPARENT);
                (layer, LayerEventKind::Reused)
            }
            None => {
                let layer = Layer::make_offscreen_layer(self.env.backend, size).inspect_err(|err| {
                    tracing::warn!(%owner, %err, "layer allocation failed");
                })?;
                tracing::trace!(%owner, width = size.width, height = size.height, "allocated layer");
                (Box::new(layer), LayerEventKind::Allocated)
            }
        };
        self.env.summary.layer(owner, size, kind);
        let index = boundary_tree(self.env.tree, owner).add(LayerTreeNode::Layer(layer));
        self.scope.current_layer = Some(index);
        Ok(index)
    }

    fn prepare_layer(&mut self, index: usize) -> &mut Layer {
        let owner = self.scope.owner;
        let owner_position = self.env.tree.abs_position(owner);
        let offset = self.env.tree.abs_position(self.element) - owner_position;
        let clip = self
            .clip
            .as_ref()
            .map(|clip| clip.translated(-owner_position.to_vec2()));

        let Some(layer) = boundary_tree(self.env.tree, owner).layer_mut(index) else {
            unreachable!("current layer of {owner:?} is not a layer");
        };
        layer.set_changed();
        let canvas = layer.canvas();
        canvas.restore_to_count(1);
        canvas.save();
        if let Some(clip) = &clip {
            canvas.clip(clip);
        }
        canvas.translate(offset);
        layer
    }
}

impl PaintEnv<'_> {
    fn reborrow(&mut self) -> PaintEnv<'_> {
        PaintEnv {
            tree: &mut *self.tree,
            backend: &mut *self.backend,
            summary: &mut *self.summary,
        }
    }
}

/// Paints `id` and its subtree.
///
/// `outer` is the scope of the enclosing repaint boundary; it is `None` when
/// `id` is the repaint boundary this paint call started from.
/// `inherited_clip` is the clip accumulated above `id` within the enclosing
/// boundary, in window coordinates.
pub(crate) fn paint_element(
    env: &mut PaintEnv<'_>,
    mut outer: Option<&mut BoundaryScope>,
    id: ElementId,
    inherited_clip: Option<&ClipPath>,
    inherited_changed: bool,
) -> Result<(), LayerError> {
    let position = env.tree.abs_position(id);
    let mut clip = inherited_clip.cloned();
    if let Some(own) = env.tree.clip(id) {
        let own = ClipPath::new(own.clone()).translated(position.to_vec2());
        clip = Some(match clip {
            Some(clip) => clip.intersected(&own),
            None => own,
        });
    }
    let is_changed = inherited_changed || env.tree.is_changed(id);

    if !env.tree.is_repaint_boundary(id) {
        let Some(scope) = outer else {
            panic!("{id:?} is painted outside of a repaint boundary");
        };
        return run_paint(env, scope, id, clip, is_changed);
    }

    if let Some(outer) = outer.as_deref_mut() {
        boundary_tree(env.tree, outer.owner).add(LayerTreeNode::Tree(id));
    }
    let layer_tree = boundary_tree(env.tree, id);
    if let Some(outer) = outer.as_deref() {
        layer_tree.set_parent(Some(outer.owner));
    }
    layer_tree.set_clip(clip.map(|clip| clip.translated(-position.to_vec2())));
    let mut scope = BoundaryScope {
        owner: id,
        pool: LayerPool::new(layer_tree.take_children()),
        current_layer: None,
    };

    let result = run_paint(env, &mut scope, id, None, is_changed);
    let unused = scope.pool.layer_count();
    if unused > 0 {
        tracing::trace!(%id, unused, "dropping unused layers");
    }
    if let Some(outer) = outer {
        outer.current_layer = None;
    }
    result
}

fn run_paint(
    env: &mut PaintEnv<'_>,
    scope: &mut BoundaryScope,
    id: ElementId,
    clip: Option<ClipPath>,
    is_changed: bool,
) -> Result<(), LayerError> {
    let mut behavior = env.tree.take_behavior(id);
    let result = behavior.paint(
        &mut PaintCx {
            env: env.reborrow(),
            scope,
            element: id,
            clip,
            is_changed,
        },
        is_changed,
    );
    env.tree.restore_behavior(id, behavior);
    // A failed paint is retried next frame with the flag still set.
    if result.is_ok() {
        env.tree.set_changed_flag(id, false);
    }
    result
}

/// Clip inherited by a repaint boundary from the ancestors painted within
/// the same enclosing boundary, in window coordinates.
pub(crate) fn inherited_clip(tree: &ElementTree, id: ElementId) -> Option<ClipPath> {
    let mut clip: Option<ClipPath> = None;
    for ancestor in tree.ancestors(id) {
        if tree.is_repaint_boundary(ancestor) {
            break;
        }
        if let Some(path) = tree.clip(ancestor) {
            let own = ClipPath::new(path.clone()).translated(tree.abs_position(ancestor).to_vec2());
            clip = Some(match clip {
                Some(clip) => clip.intersected(&own),
                None => own,
            });
        }
    }
    clip
}

/// Starts a paint call at the repaint boundary `id`.
pub(crate) fn paint_boundary(env: &mut PaintEnv<'_>, id: ElementId) -> Result<(), LayerError> {
    let clip = inherited_clip(env.tree, id);
    paint_element(env, None, id, clip.as_ref(), false)
}

fn boundary_tree(tree: &mut ElementTree, id: ElementId) -> &mut LayerTree {
    let Some(layer_tree) = tree.layer_tree_mut(id) else {
        unreachable!("repaint boundary {id:?} has no layer tree");
    };
    layer_tree
}
