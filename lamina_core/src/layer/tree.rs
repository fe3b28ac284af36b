// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-boundary composition trees.

use kurbo::{Affine, Size};

use super::raster::Layer;
use crate::clip::ClipPath;
use crate::element::ElementId;

/// An entry of a [`LayerTree`], in paint order.
#[derive(Debug)]
pub enum LayerTreeNode {
    /// The layer tree of a nested repaint boundary, owned by that element.
    Tree(ElementId),
    /// A layer painted by elements of this boundary.
    Layer(Box<Layer>),
}

/// The ordered layers and nested trees of one repaint boundary.
///
/// The tree is rebuilt every time its boundary is repainted. Layers keep
/// content in the boundary's local coordinates; composition places them at
/// the boundary's position and applies [`transform`](Self::transform),
/// [`clip`](Self::clip), and [`opacity`](Self::opacity).
#[derive(Debug)]
pub struct LayerTree {
    element: ElementId,
    parent: Option<ElementId>,
    children: Vec<LayerTreeNode>,
    clip: Option<ClipPath>,
    transform: Affine,
    opacity: f32,
}

impl LayerTree {
    pub(crate) fn new(element: ElementId) -> Self {
        Self {
            element,
            parent: None,
            children: Vec::new(),
            clip: None,
            transform: Affine::IDENTITY,
            opacity: 1.0,
        }
    }

    /// Returns the repaint boundary owning this tree.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Returns the repaint boundary whose tree contains this one.
    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Returns the entries in paint order.
    #[must_use]
    pub fn children(&self) -> &[LayerTreeNode] {
        &self.children
    }

    /// Returns the layers painted directly by this boundary.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.children.iter().filter_map(|node| match node {
            LayerTreeNode::Layer(layer) => Some(&**layer),
            LayerTreeNode::Tree(_) => None,
        })
    }

    /// Returns the clip inherited from elements between this boundary and the
    /// enclosing one, in this boundary's local coordinates.
    #[must_use]
    pub fn clip(&self) -> Option<&ClipPath> {
        self.clip.as_ref()
    }

    /// Returns the transform applied around the boundary's origin.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Sets the transform applied around the boundary's origin.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    /// Returns the opacity multiplied into everything below this tree.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets the opacity, clamped to `0..=1`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    pub(crate) fn set_clip(&mut self, clip: Option<ClipPath>) {
        self.clip = clip;
    }

    /// Appends an entry and returns its index.
    pub(crate) fn add(&mut self, node: LayerTreeNode) -> usize {
        self.children.push(node);
        self.children.len() - 1
    }

    pub(crate) fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        match self.children.get_mut(index)? {
            LayerTreeNode::Layer(layer) => Some(&mut **layer),
            LayerTreeNode::Tree(_) => None,
        }
    }

    pub(crate) fn take_children(&mut self) -> Vec<LayerTreeNode> {
        core::mem::take(&mut self.children)
    }

    pub(crate) fn restore_children(&mut self, children: Vec<LayerTreeNode>) {
        debug_assert!(self.children.is_empty(), "restoring over live children");
        self.children = children;
    }
}

/// Entries of a layer tree from its previous paint, available for reuse
/// while the boundary is repainted.
#[derive(Debug, Default)]
pub(crate) struct LayerPool {
    nodes: Vec<LayerTreeNode>,
}

impl LayerPool {
    pub(crate) fn new(nodes: Vec<LayerTreeNode>) -> Self {
        Self { nodes }
    }

    /// Removes and returns the first pooled layer of exactly `size`.
    pub(crate) fn take_by_size(&mut self, size: Size) -> Option<Box<Layer>> {
        let pos = self
            .nodes
            .iter()
            .position(|node| matches!(node, LayerTreeNode::Layer(layer) if layer.size() == size))?;
        match self.nodes.remove(pos) {
            LayerTreeNode::Layer(layer) => Some(layer),
            LayerTreeNode::Tree(_) => None,
        }
    }

    /// Returns how many layers are still pooled.
    pub(crate) fn layer_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, LayerTreeNode::Layer(_)))
            .count()
    }
}
