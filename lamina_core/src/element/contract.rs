// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The behavior every element kind implements.

use core::any::Any;

use kurbo::{Point, Size};

use crate::constraints::BoxConstraints;
use crate::document::{LayoutCx, PaintCx};
use crate::error::LayerError;

/// How many children an element accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Arity {
    /// No children; attaching one panics.
    #[default]
    Leaf,
    /// At most one child; attaching another replaces the current one.
    Single,
    /// Any number of ordered children.
    Multiple,
}

/// Properties an element declares when it is created.
///
/// Flags never change for the lifetime of the element, except that the
/// document forces its root to be a repaint boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ElementFlags {
    /// The element owns a [`LayerTree`](crate::layer::LayerTree) and is
    /// repainted independently of its ancestors.
    pub is_repaint_boundary: bool,
    /// The element's size is a function of its constraints alone, so changes
    /// inside it never affect its parent's layout.
    pub size_depends_on_parent: bool,
    /// How many children the element accepts.
    pub arity: Arity,
}

impl ElementFlags {
    /// A plain leaf element.
    pub const LEAF: Self = Self {
        is_repaint_boundary: false,
        size_depends_on_parent: false,
        arity: Arity::Leaf,
    };

    /// A plain element with at most one child.
    pub const SINGLE: Self = Self {
        arity: Arity::Single,
        ..Self::LEAF
    };

    /// A plain element with any number of children.
    pub const MULTIPLE: Self = Self {
        arity: Arity::Multiple,
        ..Self::LEAF
    };

    /// Returns the flags with the repaint boundary bit set.
    #[must_use]
    pub const fn repaint_boundary(self) -> Self {
        Self {
            is_repaint_boundary: true,
            ..self
        }
    }

    /// Returns the flags with the size-depends-on-parent bit set.
    #[must_use]
    pub const fn sized_by_parent(self) -> Self {
        Self {
            size_depends_on_parent: true,
            ..self
        }
    }
}

/// How an element takes part in pointer hit testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HitTestMode {
    /// After this element, the pointer also reaches whatever is behind it.
    PassThrough,
    /// After this element, the pointer only reaches its ancestors.
    #[default]
    PassToParent,
    /// Nothing behind this element is reached.
    Absorb,
    /// The element itself is never hit; its children still are.
    Disabled,
}

/// Behavior of an element kind.
///
/// Implementations only describe layout and painting. Structure, geometry,
/// and boundary bookkeeping live in the [`ElementTree`](super::ElementTree);
/// the contexts passed to [`layout`](Self::layout) and [`paint`](Self::paint)
/// expose the parts of it an element may touch.
///
/// Concrete element kinds are downcast through `dyn Any`, so an element's
/// own state stays reachable with
/// [`ElementTree::element`](super::ElementTree::element).
pub trait Element: Any {
    /// Flags read once, when the element is created.
    fn flags(&self) -> ElementFlags {
        ElementFlags::LEAF
    }

    /// Name shown in tree dumps and log lines.
    fn debug_name(&self) -> &str {
        short_type_name(core::any::type_name::<Self>())
    }

    /// Lays out the element and its children, returning the element's size.
    ///
    /// The default stacks every child at the origin with loosened constraints
    /// and takes the smallest admitted size that fits them all.
    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        let mut size = Size::ZERO;
        for child in cx.children() {
            let child_size = cx.layout_child(child, constraints.loosen());
            cx.place_child(child, Point::ORIGIN);
            size.width = size.width.max(child_size.width);
            size.height = size.height.max(child_size.height);
        }
        constraints.constrain(size)
    }

    /// Paints the element and its children.
    ///
    /// `is_changed` is set when the element or an ancestor within the same
    /// repaint was changed since the previous paint. The default paints
    /// nothing of its own and recurses into the children.
    fn paint(&mut self, cx: &mut PaintCx<'_>, is_changed: bool) -> Result<(), LayerError> {
        _ = is_changed;
        cx.paint_children()
    }

    /// Returns whether `point`, in the element's local coordinates, hits it.
    fn hit_test(&self, size: Size, point: Point) -> bool {
        size.to_rect().contains(point)
    }

    /// How hits on this element propagate to what is behind it.
    fn hit_test_mode(&self) -> HitTestMode {
        HitTestMode::PassToParent
    }
}

/// Strips the module path from a type name, keeping generic arguments.
fn short_type_name(name: &str) -> &str {
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// An element that takes its minimum size and paints nothing.
///
/// Used as the initial root of a document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placeholder;

impl Element for Placeholder {
    fn debug_name(&self) -> &str {
        "Placeholder"
    }

    fn hit_test_mode(&self) -> HitTestMode {
        HitTestMode::Disabled
    }
}
