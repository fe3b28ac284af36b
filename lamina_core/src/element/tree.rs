// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays element storage with allocation, topology, ownership,
//! and layout state.

use core::any::Any;
use core::fmt;

use kurbo::{BezPath, Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker};

use super::contract::{Arity, Element, ElementFlags};
use super::id::{ElementId, INVALID};
use super::traverse::{Ancestors, Children};
use crate::constraints::BoxConstraints;
use crate::dirty;
use crate::layer::LayerTree;

/// Per-element lifecycle and layout bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ElementState {
    live: bool,
    in_document: bool,
    is_changed: bool,
    is_relayout_boundary: bool,
}

/// Struct-of-arrays storage for all elements of a document.
///
/// Elements are addressed by [`ElementId`] handles. Each element occupies a
/// slot in parallel arrays; destroyed elements are recycled via a free list,
/// and generation counters make stale handles panic instead of aliasing.
///
/// # Ownership
///
/// An attached element is owned by its parent. Anything else that needs to
/// keep an element alive (the document root slot, observers, application
/// code holding a detached subtree) calls [`retain`](Self::retain) and later
/// [`release`](Self::release). An element that ends up detached with no
/// holders is destroyed together with every descendant that is not itself
/// retained; retained descendants survive as detached roots.
///
/// A freshly created element is floating: it is owned by the caller until it
/// is attached, retained, or destroyed with
/// [`destroy_element`](Self::destroy_element).
pub struct ElementTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Behavior --
    behavior: Vec<Option<Box<dyn Element>>>,
    flags: Vec<ElementFlags>,

    // -- Geometry (written during layout) --
    size: Vec<Size>,
    rel_position: Vec<Point>,
    abs_position: Vec<Point>,
    clip: Vec<Option<BezPath>>,
    prev_constraints: Vec<BoxConstraints>,

    // -- Painting --
    layer_tree: Vec<Option<LayerTree>>,

    // -- Lifecycle --
    state: Vec<ElementState>,
    holders: Vec<u32>,

    // -- Allocation --
    generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,
}

impl fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementTree")
            .field("len", &self.len)
            .field("live", &self.live_count())
            .field("free", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            behavior: Vec::new(),
            flags: Vec::new(),
            size: Vec::new(),
            rel_position: Vec::new(),
            abs_position: Vec::new(),
            clip: Vec::new(),
            prev_constraints: Vec::new(),
            layer_tree: Vec::new(),
            state: Vec::new(),
            holders: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation API --

    /// Creates a floating element and returns its handle.
    ///
    /// The element's [`flags`](Element::flags) are read once here. A repaint
    /// boundary gets an empty [`LayerTree`].
    pub fn create_element<E: Element>(&mut self, element: E) -> ElementId {
        self.insert_boxed(Box::new(element))
    }

    /// Creates a floating element from an already boxed behavior.
    pub fn insert_boxed(&mut self, element: Box<dyn Element>) -> ElementId {
        let flags = element.flags();
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.size[i] = Size::ZERO;
            self.rel_position[i] = Point::ORIGIN;
            self.abs_position[i] = Point::ORIGIN;
            self.clip[i] = None;
            self.prev_constraints[i] = BoxConstraints::default();
            self.holders[i] = 0;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.behavior.push(None);
            self.flags.push(ElementFlags::default());
            self.size.push(Size::ZERO);
            self.rel_position.push(Point::ORIGIN);
            self.abs_position.push(Point::ORIGIN);
            self.clip.push(None);
            self.prev_constraints.push(BoxConstraints::default());
            self.layer_tree.push(None);
            self.state.push(ElementState::default());
            self.holders.push(0);
            self.generation.push(0);
            idx
        };

        let id = self.id_at(idx);
        let i = idx as usize;
        self.behavior[i] = Some(element);
        self.flags[i] = flags;
        self.layer_tree[i] = flags.is_repaint_boundary.then(|| LayerTree::new(id));
        self.state[i] = ElementState {
            live: true,
            // Never-painted elements count as changed.
            is_changed: true,
            ..ElementState::default()
        };
        id
    }

    /// Destroys a floating element and its non-retained descendants.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, or if the element is attached, retained,
    /// or the root of a document.
    pub fn destroy_element(&mut self, id: ElementId) {
        self.validate(id);
        let i = id.idx as usize;
        assert!(
            self.parent[i] == INVALID,
            "cannot destroy an attached element"
        );
        assert!(self.holders[i] == 0, "cannot destroy a retained element");
        assert!(
            !self.state[i].in_document,
            "cannot destroy the document root"
        );
        self.destroy_subtree(id.idx);
    }

    /// Returns whether the given handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.state[id.idx as usize].live
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.state.iter().filter(|s| s.live).count()
    }

    // -- Ownership API --

    /// Adds a co-owner to an element, keeping it alive while detached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn retain(&mut self, id: ElementId) {
        self.validate(id);
        self.holders[id.idx as usize] += 1;
    }

    /// Drops a co-owner added by [`retain`](Self::retain).
    ///
    /// When the last holder of a detached element releases it, the element
    /// and its non-retained descendants are destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the element has no holders.
    pub fn release(&mut self, id: ElementId) {
        self.validate(id);
        let i = id.idx as usize;
        assert!(self.holders[i] > 0, "release without a matching retain");
        self.holders[i] -= 1;
        if self.holders[i] == 0 && self.parent[i] == INVALID && !self.state[i].in_document {
            self.destroy_subtree(id.idx);
        }
    }

    /// Returns the number of co-owners of an element.
    #[must_use]
    pub fn holders(&self, id: ElementId) -> u32 {
        self.validate(id);
        self.holders[id.idx as usize]
    }

    // -- Topology API --

    /// Attaches `child` as the last child of `parent`.
    ///
    /// A `child` attached elsewhere is moved. For a single-child `parent`,
    /// its current child is removed first (and destroyed unless retained).
    /// Both the old and the new parent are [changed](Self::change).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `parent` is a leaf, or if the
    /// attachment would create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.validate(parent);
        self.validate(child);
        self.check_attach(parent, child);
        self.detach_for_move(child.idx);

        let p = parent.idx;
        let c = child.idx;
        if self.flags[p as usize].arity == Arity::Single {
            let current = self.first_child[p as usize];
            if current != INVALID {
                self.remove_child(parent, self.id_at(current));
            }
        }

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;
        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.finish_attach(p, c);
    }

    /// Attaches `child` to `parent` immediately before `anchor`.
    ///
    /// # Panics
    ///
    /// Panics if any handle is stale, if `parent` does not accept multiple
    /// children, if `anchor` is not a child of `parent`, if `child` is
    /// `anchor`, or if the attachment would create a cycle.
    pub fn insert_before_child(&mut self, parent: ElementId, child: ElementId, anchor: ElementId) {
        self.validate(parent);
        self.validate(child);
        self.validate(anchor);
        self.check_attach(parent, child);
        assert!(
            self.flags[parent.idx as usize].arity == Arity::Multiple,
            "insert_before_child requires an element that accepts multiple children"
        );
        assert!(child != anchor, "cannot insert an element before itself");
        assert!(
            self.parent[anchor.idx as usize] == parent.idx,
            "anchor is not a child of parent"
        );
        self.detach_for_move(child.idx);

        let p = parent.idx;
        let c = child.idx;
        let a = anchor.idx;
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = a;
        self.prev_sibling[c as usize] = self.prev_sibling[a as usize];
        if self.prev_sibling[a as usize] != INVALID {
            self.next_sibling[self.prev_sibling[a as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[a as usize] = c;

        self.finish_attach(p, c);
    }

    /// Detaches `child` from `parent`.
    ///
    /// `parent` is [changed](Self::change) before the link is cleared. The
    /// detached subtree leaves the document, and is destroyed unless `child`
    /// is retained. Returns `false` (and does nothing) when `child` is not a
    /// child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.validate(parent);
        self.validate(child);
        let c = child.idx;
        if self.parent[c as usize] != parent.idx {
            return false;
        }
        self.mark_layout(parent.idx);
        self.unlink_from_parent(c);
        self.set_document_subtree(c, false);
        if self.holders[c as usize] == 0 {
            self.destroy_subtree(c);
        }
        true
    }

    /// Detaches an element from whatever parent it has.
    ///
    /// Returns the former parent, if any. See [`remove_child`](Self::remove_child).
    pub fn remove_from_parent(&mut self, child: ElementId) -> Option<ElementId> {
        let parent = self.parent(child)?;
        self.remove_child(parent, child);
        Some(parent)
    }

    /// Returns the parent of an element, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the first child of an element, if any.
    #[must_use]
    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.children(id).next()
    }

    /// Returns the number of direct children of an element.
    #[must_use]
    pub fn child_count(&self, id: ElementId) -> usize {
        self.children(id).count()
    }

    /// Returns an iterator over the ancestors of an element, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns whether `ancestor` is a strict ancestor of `descendant`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        self.validate(ancestor);
        self.validate(descendant);
        self.is_ancestor_idx(ancestor.idx, descendant.idx)
    }

    // -- Behavior access --

    /// Returns the behavior of an element downcast to `T`.
    ///
    /// Returns `None` if the element is of another kind or is currently
    /// being laid out or painted.
    #[must_use]
    pub fn element<T: Element>(&self, id: ElementId) -> Option<&T> {
        self.validate(id);
        let behavior: &dyn Any = self.behavior[id.idx as usize].as_deref()?;
        behavior.downcast_ref::<T>()
    }

    /// Returns the behavior of an element downcast to `T`, mutably.
    ///
    /// Does not mark the element changed; see [`update`](Self::update).
    #[must_use]
    pub fn element_mut<T: Element>(&mut self, id: ElementId) -> Option<&mut T> {
        self.validate(id);
        let behavior: &mut dyn Any = self.behavior[id.idx as usize].as_deref_mut()?;
        behavior.downcast_mut::<T>()
    }

    /// Mutates the behavior of an element and marks it changed.
    ///
    /// Returns `None` (without marking) if the element is not a `T`.
    pub fn update<T: Element, R>(&mut self, id: ElementId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let result = f(self.element_mut::<T>(id)?);
        self.change(id);
        Some(result)
    }

    /// Returns the debug name of an element.
    #[must_use]
    pub fn debug_name(&self, id: ElementId) -> &str {
        self.validate(id);
        self.behavior[id.idx as usize]
            .as_deref()
            .map_or("<busy>", |behavior| behavior.debug_name())
    }

    /// Returns an element's behavior, or `None` while it is taken out.
    pub(crate) fn behavior(&self, id: ElementId) -> Option<&dyn Element> {
        self.validate(id);
        self.behavior[id.idx as usize].as_deref()
    }

    pub(crate) fn take_behavior(&mut self, id: ElementId) -> Box<dyn Element> {
        self.validate(id);
        let Some(behavior) = self.behavior[id.idx as usize].take() else {
            panic!("element {id:?} is already being laid out or painted");
        };
        behavior
    }

    pub(crate) fn restore_behavior(&mut self, id: ElementId, behavior: Box<dyn Element>) {
        self.validate(id);
        self.behavior[id.idx as usize] = Some(behavior);
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the flags an element was created with.
    #[must_use]
    pub fn flags(&self, id: ElementId) -> ElementFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the size assigned by the element's last layout.
    #[must_use]
    pub fn size(&self, id: ElementId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the position relative to the parent, set by the parent's
    /// layout.
    #[must_use]
    pub fn rel_position(&self, id: ElementId) -> Point {
        self.validate(id);
        self.rel_position[id.idx as usize]
    }

    /// Returns the position in window coordinates.
    ///
    /// Always equals the parent's absolute position plus
    /// [`rel_position`](Self::rel_position) once the surrounding relayout has
    /// finished.
    #[must_use]
    pub fn abs_position(&self, id: ElementId) -> Point {
        self.validate(id);
        self.abs_position[id.idx as usize]
    }

    /// Returns the element's clip path in its local coordinates.
    #[must_use]
    pub fn clip(&self, id: ElementId) -> Option<&BezPath> {
        self.validate(id);
        self.clip[id.idx as usize].as_ref()
    }

    /// Returns the constraints of the element's last layout.
    #[must_use]
    pub fn prev_constraints(&self, id: ElementId) -> BoxConstraints {
        self.validate(id);
        self.prev_constraints[id.idx as usize]
    }

    /// Returns whether changes inside the element stay inside it.
    #[must_use]
    pub fn is_relayout_boundary(&self, id: ElementId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].is_relayout_boundary
    }

    /// Returns whether the element owns a layer tree.
    #[must_use]
    pub fn is_repaint_boundary(&self, id: ElementId) -> bool {
        self.flags(id).is_repaint_boundary
    }

    /// Returns whether the element changed since it was last painted.
    #[must_use]
    pub fn is_changed(&self, id: ElementId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].is_changed
    }

    /// Returns whether the element is attached under a document root.
    #[must_use]
    pub fn in_document(&self, id: ElementId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].in_document
    }

    /// Returns the layer tree of a repaint boundary.
    #[must_use]
    pub fn layer_tree(&self, id: ElementId) -> Option<&LayerTree> {
        self.validate(id);
        self.layer_tree[id.idx as usize].as_ref()
    }

    /// Returns the layer tree of a repaint boundary, mutably.
    ///
    /// Changing a layer tree's transform or opacity outside painting needs a
    /// [`change_layer`](Self::change_layer) call to be composed.
    #[must_use]
    pub fn layer_tree_mut(&mut self, id: ElementId) -> Option<&mut LayerTree> {
        self.validate(id);
        self.layer_tree[id.idx as usize].as_mut()
    }

    // -- Change notification --

    /// Notifies the document that an element's content changed.
    ///
    /// The element's closest relayout boundary is laid out again on the next
    /// frame. Does nothing for elements outside a document.
    pub fn change(&mut self, id: ElementId) {
        self.validate(id);
        self.mark_layout(id.idx);
    }

    /// Notifies the document that a repaint boundary's layer transform or
    /// opacity changed, so only composition must run again.
    pub fn change_layer(&mut self, id: ElementId) {
        self.validate(id);
        if self.state[id.idx as usize].in_document {
            self.dirty.mark(id.idx, dirty::COMPOSE);
        }
    }

    /// Returns the nearest relayout boundary at or above an element.
    ///
    /// # Panics
    ///
    /// Panics if neither the element nor any ancestor is a relayout boundary,
    /// which only happens for elements outside a document.
    #[must_use]
    pub fn closest_relayout_boundary(&self, id: ElementId) -> ElementId {
        self.validate(id);
        let mut current = id.idx;
        loop {
            if self.state[current as usize].is_relayout_boundary {
                return self.id_at(current);
            }
            current = self.parent[current as usize];
            assert!(current != INVALID, "{id:?} has no relayout boundary");
        }
    }

    /// Returns the nearest repaint boundary at or above an element.
    ///
    /// # Panics
    ///
    /// Panics if neither the element nor any ancestor is a repaint boundary.
    #[must_use]
    pub fn closest_repaint_boundary(&self, id: ElementId) -> ElementId {
        self.validate(id);
        let mut current = id.idx;
        loop {
            if self.flags[current as usize].is_repaint_boundary {
                return self.id_at(current);
            }
            current = self.parent[current as usize];
            assert!(current != INVALID, "{id:?} has no repaint boundary");
        }
    }

    // -- Crate-internal layout state --

    pub(crate) fn set_size(&mut self, id: ElementId, size: Size) {
        self.size[id.idx as usize] = size;
    }

    pub(crate) fn set_rel_position(&mut self, id: ElementId, position: Point) {
        self.rel_position[id.idx as usize] = position;
    }

    pub(crate) fn set_clip(&mut self, id: ElementId, clip: Option<BezPath>) {
        self.clip[id.idx as usize] = clip;
    }

    pub(crate) fn set_prev_constraints(&mut self, id: ElementId, constraints: BoxConstraints) {
        self.prev_constraints[id.idx as usize] = constraints;
    }

    pub(crate) fn set_relayout_boundary(&mut self, id: ElementId, value: bool) {
        self.state[id.idx as usize].is_relayout_boundary = value;
    }

    pub(crate) fn set_changed_flag(&mut self, id: ElementId, value: bool) {
        self.state[id.idx as usize].is_changed = value;
    }

    /// Recomputes absolute positions for an element and its subtree.
    pub(crate) fn update_abs_positions(&mut self, id: ElementId) {
        self.validate(id);
        let mut stack = vec![id.idx];
        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            let p = self.parent[i];
            self.abs_position[i] = if p == INVALID {
                self.rel_position[i]
            } else {
                self.abs_position[p as usize] + self.rel_position[i].to_vec2()
            };
            let mut child = self.first_child[i];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
    }

    /// Turns an element into a document root: a relayout and repaint boundary
    /// at the origin, inside the document.
    pub(crate) fn make_root(&mut self, id: ElementId, size: Size) {
        self.validate(id);
        let i = id.idx as usize;
        assert!(self.parent[i] == INVALID, "document root must be detached");
        self.flags[i].is_repaint_boundary = true;
        if self.layer_tree[i].is_none() {
            self.layer_tree[i] = Some(LayerTree::new(id));
        }
        self.state[i].is_relayout_boundary = true;
        self.rel_position[i] = Point::ORIGIN;
        self.abs_position[i] = Point::ORIGIN;
        self.size[i] = size;
        self.prev_constraints[i] = BoxConstraints::tight(size);
        self.set_document_subtree(id.idx, true);
    }

    /// Takes an element out of the document without detaching it.
    pub(crate) fn leave_document(&mut self, id: ElementId) {
        self.validate(id);
        self.set_document_subtree(id.idx, false);
    }

    /// Drains elements changed since the previous drain, in slot order.
    ///
    /// Elements that left the document in the meantime are dropped.
    pub(crate) fn drain_changed(&mut self) -> Vec<ElementId> {
        let drained: Vec<u32> = self.dirty.drain(dirty::LAYOUT).deterministic().run().collect();
        drained
            .into_iter()
            .filter(|&idx| self.state[idx as usize].live && self.state[idx as usize].in_document)
            .map(|idx| self.id_at(idx))
            .collect()
    }

    /// Drains compose-only changes, returning whether any applied to the
    /// document.
    pub(crate) fn drain_compose(&mut self) -> bool {
        let drained: Vec<u32> = self.dirty.drain(dirty::COMPOSE).deterministic().run().collect();
        drained
            .into_iter()
            .any(|idx| self.state[idx as usize].live && self.state[idx as usize].in_document)
    }

    pub(crate) fn id_at(&self, idx: u32) -> ElementId {
        ElementId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ElementId) {
        assert!(
            self.is_alive(id),
            "stale ElementId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn mark_layout(&mut self, idx: u32) {
        if self.state[idx as usize].in_document {
            self.dirty.mark(idx, dirty::LAYOUT);
        }
    }

    fn is_ancestor_idx(&self, ancestor: u32, descendant: u32) -> bool {
        let mut current = self.parent[descendant as usize];
        while current != INVALID {
            if current == ancestor {
                return true;
            }
            current = self.parent[current as usize];
        }
        false
    }

    fn check_attach(&self, parent: ElementId, child: ElementId) {
        assert!(parent != child, "cannot attach an element to itself");
        assert!(
            !self.is_ancestor_idx(child.idx, parent.idx),
            "cannot attach an element to its own descendant"
        );
        assert!(
            self.flags[parent.idx as usize].arity != Arity::Leaf,
            "cannot attach a child to leaf element {}",
            self.debug_name(parent)
        );
    }

    /// Unlinks a child that is about to be attached elsewhere, changing its
    /// old parent. The child stays alive regardless of holders.
    fn detach_for_move(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.mark_layout(p);
            self.unlink_from_parent(idx);
        }
    }

    fn finish_attach(&mut self, p: u32, c: u32) {
        let in_document = self.state[p as usize].in_document;
        self.set_document_subtree(c, in_document);
        self.mark_layout(p);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn set_document_subtree(&mut self, idx: u32, in_document: bool) {
        let mut stack = vec![idx];
        while let Some(idx) = stack.pop() {
            self.state[idx as usize].in_document = in_document;
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
    }

    /// Frees `idx` and every descendant without holders. Retained
    /// descendants are unlinked and survive as detached roots.
    fn destroy_subtree(&mut self, idx: u32) {
        let mut stack = vec![idx];
        while let Some(idx) = stack.pop() {
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                let next = self.next_sibling[child as usize];
                if self.holders[child as usize] > 0 {
                    self.unlink_from_parent(child);
                } else {
                    stack.push(child);
                }
                child = next;
            }
            self.free_slot(idx);
        }
    }

    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.behavior[i] = None;
        self.layer_tree[i] = None;
        self.clip[i] = None;
        self.state[i] = ElementState::default();
        self.holders[i] = 0;
        self.dirty.remove_key(idx);
        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }
}
