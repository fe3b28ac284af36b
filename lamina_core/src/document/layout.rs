// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout of single elements and the context handed to
//! [`Element::layout`](crate::element::Element::layout).

use kurbo::{BezPath, Point, Size};

use crate::constraints::BoxConstraints;
use crate::element::{ElementId, ElementTree};
use crate::observer::ElementObserver;

/// Access to the tree while an element lays itself out.
///
/// Passed to [`Element::layout`](crate::element::Element::layout).
/// Geometry of the element's children is written through this context; the
/// element's own size is the value its `layout` returns.
pub struct LayoutCx<'a> {
    tree: &'a mut ElementTree,
    observer: &'a mut ElementObserver<Size>,
    element: ElementId,
}

impl core::fmt::Debug for LayoutCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutCx")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

impl LayoutCx<'_> {
    /// Returns the element being laid out.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Read access to the whole tree.
    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &*self.tree
    }

    /// Returns the element's children in order.
    #[must_use]
    pub fn children(&self) -> Vec<ElementId> {
        self.tree.children(self.element).collect()
    }

    /// Returns the element's first child, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<ElementId> {
        self.tree.first_child(self.element)
    }

    /// Lays out a child with `constraints` and returns its size.
    ///
    /// A child may be laid out several times within one layout; the last
    /// result wins.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of the element being laid out.
    pub fn layout_child(&mut self, child: ElementId, constraints: BoxConstraints) -> Size {
        self.check_child(child);
        layout_element(self.tree, self.observer, child, constraints)
    }

    /// Sets a child's position relative to the element.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of the element being laid out.
    pub fn place_child(&mut self, child: ElementId, position: Point) {
        self.check_child(child);
        self.tree.set_rel_position(child, position);
    }

    /// Returns a child's size from its latest layout.
    #[must_use]
    pub fn size_of(&self, child: ElementId) -> Size {
        self.tree.size(child)
    }

    /// Sets the element's own clip, in its local coordinates.
    pub fn set_clip(&mut self, clip: Option<BezPath>) {
        self.tree.set_clip(self.element, clip);
    }

    /// Sets a child's clip, in the child's local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of the element being laid out.
    pub fn set_child_clip(&mut self, child: ElementId, clip: Option<BezPath>) {
        self.check_child(child);
        self.tree.set_clip(child, clip);
    }

    /// Schedules the element to be laid out again.
    ///
    /// The request is picked up by the next relayout pass of the current
    /// frame.
    pub fn request_layout(&mut self) {
        self.tree.change(self.element);
    }

    fn check_child(&self, child: ElementId) {
        assert!(
            self.tree.parent(child) == Some(self.element),
            "{child:?} is not a child of {:?}",
            self.element
        );
    }
}

/// Lays out `id` with `constraints` and records the outcome on the tree.
///
/// Tight constraints or a size that depends only on the constraints make the
/// element a relayout boundary.
pub(crate) fn layout_element(
    tree: &mut ElementTree,
    observer: &mut ElementObserver<Size>,
    id: ElementId,
    constraints: BoxConstraints,
) -> Size {
    observer.trigger_element(id);
    let is_boundary = constraints.is_tight() || tree.flags(id).size_depends_on_parent;
    tree.set_relayout_boundary(id, is_boundary);

    let mut behavior = tree.take_behavior(id);
    let size = behavior.layout(
        &mut LayoutCx {
            tree: &mut *tree,
            observer: &mut *observer,
            element: id,
        },
        constraints,
    );
    tree.restore_behavior(id, behavior);

    tree.set_prev_constraints(id, constraints);
    tree.set_size(id, size);
    size
}
