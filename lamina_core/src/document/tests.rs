// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Shape, Size};

use super::*;
use crate::color::Color;
use crate::element::{ElementFlags, HitTestMode};
use crate::layer::{DrawKind, RecordingBackend};

// ---------------------------------------------------------------------------
// Test elements
// ---------------------------------------------------------------------------

/// Leaf with a preferred size that fills its bounds.
struct Block {
    size: Size,
    color: Color,
    mode: HitTestMode,
    layouts: u32,
    paints: u32,
}

impl Block {
    fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            color: Color::BLACK,
            mode: HitTestMode::PassToParent,
            layouts: 0,
            paints: 0,
        }
    }

    fn with_mode(mut self, mode: HitTestMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Element for Block {
    fn layout(&mut self, _cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        self.layouts += 1;
        constraints.constrain(self.size)
    }

    fn paint(&mut self, cx: &mut PaintCx<'_>, _is_changed: bool) -> Result<(), LayerError> {
        self.paints += 1;
        let rect = cx.size().to_rect();
        cx.canvas()?.fill_rect(rect, self.color);
        Ok(())
    }

    fn hit_test_mode(&self) -> HitTestMode {
        self.mode
    }
}

/// Stacks children vertically with loose constraints.
#[derive(Default)]
struct Stack {
    layouts: u32,
}

impl Element for Stack {
    fn flags(&self) -> ElementFlags {
        ElementFlags::MULTIPLE
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        self.layouts += 1;
        let mut y = 0.0;
        let mut width: f64 = 0.0;
        for child in cx.children() {
            let size = cx.layout_child(child, constraints.loosen());
            cx.place_child(child, Point::new(0.0, y));
            y += size.height;
            width = width.max(size.width);
        }
        constraints.constrain(Size::new(width, y))
    }
}

/// Places every child at the origin.
struct Overlay {
    mode: HitTestMode,
}

impl Element for Overlay {
    fn flags(&self) -> ElementFlags {
        ElementFlags::MULTIPLE
    }

    fn hit_test_mode(&self) -> HitTestMode {
        self.mode
    }
}

/// Gives its child tight constraints of a fixed size.
struct Fixed {
    size: Size,
}

impl Element for Fixed {
    fn flags(&self) -> ElementFlags {
        ElementFlags::SINGLE
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        if let Some(child) = cx.first_child() {
            cx.layout_child(child, BoxConstraints::tight(self.size));
            cx.place_child(child, Point::ORIGIN);
        }
        constraints.constrain(self.size)
    }
}

/// Takes all the space it is given.
struct Fill;

impl Element for Fill {
    fn flags(&self) -> ElementFlags {
        ElementFlags::LEAF.sized_by_parent()
    }

    fn layout(&mut self, _cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        constraints.max_size()
    }
}

/// Clips its child to a rectangle in local coordinates.
struct ClipBox {
    clip: Rect,
}

impl Element for ClipBox {
    fn flags(&self) -> ElementFlags {
        ElementFlags::SINGLE
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        cx.set_clip(Some(self.clip.to_path(0.1)));
        let mut size = Size::ZERO;
        if let Some(child) = cx.first_child() {
            size = cx.layout_child(child, constraints.loosen());
            cx.place_child(child, Point::ORIGIN);
        }
        constraints.constrain(size)
    }
}

/// Repaint boundary applying a layer opacity while painting.
struct Boundary {
    opacity: f32,
}

impl Element for Boundary {
    fn flags(&self) -> ElementFlags {
        ElementFlags::SINGLE.repaint_boundary()
    }

    fn paint(&mut self, cx: &mut PaintCx<'_>, _is_changed: bool) -> Result<(), LayerError> {
        if let Some(layer_tree) = cx.layer_tree_mut() {
            layer_tree.set_opacity(self.opacity);
        }
        cx.paint_children()
    }
}

/// Lays its child out at several sizes before settling on `target`.
struct Measurer {
    target: f64,
}

impl Element for Measurer {
    fn flags(&self) -> ElementFlags {
        ElementFlags::SINGLE
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        let mut size = Size::ZERO;
        if let Some(child) = cx.first_child() {
            for side in [30.0, 80.0, self.target] {
                size = cx.layout_child(child, BoxConstraints::tight(Size::new(side, side)));
            }
            cx.place_child(child, Point::ORIGIN);
        }
        constraints.constrain(size)
    }
}

/// Requests another layout while `remaining` is positive.
#[derive(Default)]
struct Wobbly {
    remaining: u32,
}

impl Element for Wobbly {
    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        if self.remaining > 0 {
            self.remaining -= 1;
            cx.request_layout();
        }
        constraints.constrain(Size::new(10.0, 10.0))
    }
}

/// Lays out an element that is not its child.
struct Kidnapper {
    victim: ElementId,
}

impl Element for Kidnapper {
    fn layout(&mut self, cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        cx.layout_child(self.victim, constraints)
    }
}

/// Draws into a layer of its own and records the change flag of each paint.
struct Painter {
    size: Size,
    seen: Vec<bool>,
}

impl Element for Painter {
    fn layout(&mut self, _cx: &mut LayoutCx<'_>, constraints: BoxConstraints) -> Size {
        constraints.constrain(self.size)
    }

    fn paint(&mut self, cx: &mut PaintCx<'_>, is_changed: bool) -> Result<(), LayerError> {
        self.seen.push(is_changed);
        let size = cx.size();
        cx.create_layer(size)?
            .canvas()
            .fill_rect(size.to_rect(), Color::BLACK);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn document(config: DocumentConfig) -> (Document, RecordingBackend) {
    let backend = RecordingBackend::new();
    let document = Document::new(backend.clone(), Size::new(500.0, 500.0), config).unwrap();
    (document, backend)
}

fn with_children(doc: &mut Document, parent: impl Element, children: &[ElementId]) -> ElementId {
    let parent = doc.create_element(parent);
    for &child in children {
        doc.tree_mut().append_child(parent, child);
    }
    parent
}

fn overlay() -> Overlay {
    Overlay {
        mode: HitTestMode::PassToParent,
    }
}

/// Builds a 500x500 stack root with two 100x100 children.
fn stacked() -> (Document, RecordingBackend, [ElementId; 3]) {
    let (mut doc, backend) = document(DocumentConfig::default());
    let a = doc.create_element(Block::new(100.0, 100.0));
    let b = doc.create_element(Block::new(100.0, 100.0));
    let root = with_children(&mut doc, Stack::default(), &[a, b]);
    doc.set_root(root);
    assert!(doc.render().unwrap());
    (doc, backend, [root, a, b])
}

fn resize_block(doc: &mut Document, id: ElementId, side: f64) {
    doc.update_element::<Block, _>(id, |block| block.size = Size::new(side, side))
        .unwrap();
}

fn image_opacities(backend: &RecordingBackend) -> Vec<f32> {
    backend
        .resolved_screen_draws()
        .iter()
        .filter_map(|draw| match draw.kind {
            DrawKind::Image { opacity, .. } => Some(opacity),
            DrawKind::Fill { .. } => None,
        })
        .collect()
}

fn assert_abs_positions(tree: &ElementTree, id: ElementId) {
    let expected = match tree.parent(id) {
        Some(parent) => tree.abs_position(parent) + tree.rel_position(id).to_vec2(),
        None => tree.rel_position(id),
    };
    assert_eq!(tree.abs_position(id), expected, "abs position of {id}");
    for child in tree.children(id) {
        assert_abs_positions(tree, child);
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

#[test]
fn initial_render_lays_out_paints_and_composes() {
    let (doc, backend, [root, a, b]) = stacked();
    let tree = doc.tree();
    assert_eq!(tree.size(root), Size::new(500.0, 500.0));
    assert_eq!(tree.size(a), Size::new(100.0, 100.0));
    assert_eq!(tree.abs_position(b), Point::new(0.0, 100.0));

    let summary = doc.last_frame_summary();
    assert!(summary.initial);
    assert_eq!(summary.repaint_boundaries, 1);
    assert_eq!(summary.layers_allocated, 1, "both children share the root layer");
    assert!(summary.composed);

    assert_eq!(backend.screens_created(), 1);
    assert_eq!(backend.layers_allocated(), 1);
    assert_eq!(backend.resolved_screen_draws().len(), 1);
    assert!(!tree.is_changed(a), "painting clears the changed flag");
}

#[test]
fn second_render_without_changes_is_idle() {
    let (mut doc, backend, _) = stacked();
    let snapshots = backend.snapshots();

    assert!(!doc.render().unwrap());
    let summary = doc.last_frame_summary();
    assert!(!summary.initial);
    assert!(!summary.did_work());
    assert_eq!(backend.layers_allocated(), 1);
    assert_eq!(backend.snapshots(), snapshots);
}

#[test]
fn child_resize_relayouts_root_and_repaints_once() {
    let (mut doc, backend, [root, a, b]) = stacked();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _connection = doc.observe_element_size(a, move |size| sink.borrow_mut().push(*size));

    resize_block(&mut doc, a, 200.0);
    assert!(doc.render().unwrap());

    let tree = doc.tree();
    assert_eq!(tree.size(a), Size::new(200.0, 200.0));
    assert_eq!(tree.abs_position(b), Point::new(0.0, 200.0));
    assert!(tree.is_relayout_boundary(root));
    assert!(!tree.is_relayout_boundary(a));

    let summary = doc.last_frame_summary();
    assert_eq!(summary.relayout_passes, 1);
    assert_eq!(summary.relayout_boundaries, 1);
    assert_eq!(summary.repaint_boundaries, 1);
    assert_eq!(summary.layers_allocated, 0);
    assert_eq!(summary.layers_reused, 1);
    assert_eq!(backend.layers_allocated(), 1);
    assert_eq!(*seen.borrow(), vec![Size::new(200.0, 200.0)]);
}

#[test]
fn tight_or_sized_by_parent_elements_are_relayout_boundaries() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let tight = doc.create_element(Block::new(10.0, 10.0));
    let fixed = with_children(
        &mut doc,
        Fixed {
            size: Size::new(40.0, 40.0),
        },
        &[tight],
    );
    let fill = doc.create_element(Fill);
    let loose = doc.create_element(Block::new(10.0, 10.0));
    let root = with_children(&mut doc, Stack::default(), &[fixed, fill, loose]);
    doc.set_root(root);
    doc.render().unwrap();

    let tree = doc.tree();
    assert!(tree.is_relayout_boundary(tight));
    assert_eq!(tree.size(tight), Size::new(40.0, 40.0));
    assert!(tree.is_relayout_boundary(fill));
    assert!(!tree.is_relayout_boundary(fixed));
    assert!(!tree.is_relayout_boundary(loose));

    resize_block(&mut doc, tight, 20.0);
    doc.render().unwrap();
    assert_eq!(doc.tree().element::<Stack>(root).unwrap().layouts, 1);
    assert_eq!(doc.tree().element::<Block>(tight).unwrap().layouts, 2);
    assert_eq!(doc.last_frame_summary().relayout_boundaries, 1);
}

#[test]
fn nested_changes_collapse_into_the_outer_boundary() {
    let (mut doc, _backend, [root, a, b]) = stacked();
    doc.change_element(a);
    doc.change_element(b);
    doc.change_element(root);
    doc.render().unwrap();

    assert_eq!(doc.last_frame_summary().relayout_boundaries, 1);
    assert_eq!(doc.tree().element::<Stack>(root).unwrap().layouts, 2);
    assert_eq!(doc.tree().element::<Block>(a).unwrap().layouts, 2);
}

#[test]
fn add_only_parent_keeps_outermost_entries() {
    let (doc, _backend, [root, a, b]) = stacked();
    let tree = doc.tree();

    let mut set = Vec::new();
    add_only_parent(tree, &mut set, a);
    add_only_parent(tree, &mut set, b);
    add_only_parent(tree, &mut set, a);
    assert_eq!(set, vec![a, b]);

    add_only_parent(tree, &mut set, root);
    assert_eq!(set, vec![root]);

    add_only_parent(tree, &mut set, b);
    assert_eq!(set, vec![root]);
}

#[test]
fn abs_positions_follow_relayout() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let first = doc.create_element(Block::new(50.0, 50.0));
    let deep = doc.create_element(Block::new(20.0, 20.0));
    let inner = with_children(&mut doc, Stack::default(), &[first, deep]);
    let top = doc.create_element(Block::new(30.0, 30.0));
    let root = with_children(&mut doc, Stack::default(), &[top, inner]);
    doc.set_root(root);
    doc.render().unwrap();
    assert_abs_positions(doc.tree(), root);
    assert_eq!(doc.tree().abs_position(deep), Point::new(0.0, 80.0));

    resize_block(&mut doc, top, 60.0);
    doc.render().unwrap();
    assert_abs_positions(doc.tree(), root);
    assert_eq!(doc.tree().abs_position(deep), Point::new(0.0, 110.0));
}

#[test]
fn same_size_layer_is_reused_across_frames() {
    let (mut doc, backend, [root, a, _]) = stacked();
    let before: *const Layer = doc.tree().layer_tree(root).unwrap().layers().next().unwrap();

    resize_block(&mut doc, a, 150.0);
    doc.render().unwrap();

    let layer_tree = doc.tree().layer_tree(root).unwrap();
    assert_eq!(layer_tree.layers().count(), 1);
    let after: *const Layer = layer_tree.layers().next().unwrap();
    assert!(core::ptr::eq(before, after));
    assert_eq!(backend.layers_allocated(), 1);
}

#[test]
fn observer_fires_once_with_settled_size() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let child = doc.create_element(Block::new(1.0, 1.0));
    let measurer = with_children(&mut doc, Measurer { target: 40.0 }, &[child]);
    let root = with_children(&mut doc, Stack::default(), &[measurer]);
    doc.set_root(root);
    doc.render().unwrap();
    assert_eq!(doc.tree().size(child), Size::new(40.0, 40.0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let connection = doc.observe_element_size(child, move |size| sink.borrow_mut().push(*size));

    doc.update_element::<Measurer, _>(measurer, |m| m.target = 60.0);
    doc.render().unwrap();
    assert_eq!(*seen.borrow(), vec![Size::new(60.0, 60.0)]);

    // Passes through other sizes but settles where it was.
    doc.change_element(measurer);
    doc.render().unwrap();
    assert_eq!(seen.borrow().len(), 1);

    assert!(doc.disconnect_observer(connection));
    doc.update_element::<Measurer, _>(measurer, |m| m.target = 70.0);
    doc.render().unwrap();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn layout_requests_run_further_passes() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let wobbly = doc.create_element(Wobbly::default());
    let root = with_children(&mut doc, Stack::default(), &[wobbly]);
    doc.set_root(root);
    doc.render().unwrap();

    doc.update_element::<Wobbly, _>(wobbly, |w| w.remaining = 2);
    assert!(doc.render().unwrap());
    let summary = doc.last_frame_summary();
    assert_eq!(summary.relayout_passes, 3);
    assert_eq!(summary.repaint_boundaries, 1);
}

#[test]
fn relayout_loop_is_capped() {
    let (mut doc, _backend) = document(DocumentConfig::new().with_max_relayout_passes(4));
    let wobbly = doc.create_element(Wobbly::default());
    let root = with_children(&mut doc, Stack::default(), &[wobbly]);
    doc.set_root(root);
    doc.render().unwrap();

    doc.update_element::<Wobbly, _>(wobbly, |w| w.remaining = u32::MAX);
    assert_eq!(
        doc.render(),
        Err(RenderError::LayoutDidNotConverge { passes: 4 })
    );
    assert_eq!(doc.last_frame_summary().relayout_passes, 4);

    // The pending change survives the failed frame.
    doc.tree_mut().element_mut::<Wobbly>(wobbly).unwrap().remaining = 0;
    assert!(doc.render().unwrap());
    assert_eq!(doc.last_frame_summary().relayout_passes, 1);
}

#[test]
fn allocation_failure_aborts_the_frame_and_retries() {
    let (mut doc, backend) = document(DocumentConfig::default());
    let leaf = doc.create_element(Block::new(100.0, 100.0));
    let root = with_children(&mut doc, Stack::default(), &[leaf]);
    doc.set_root(root);

    backend.set_allocation_limit(Some(0));
    assert!(matches!(
        doc.render(),
        Err(RenderError::Layer(LayerError::SurfaceAllocation { .. }))
    ));

    backend.set_allocation_limit(None);
    assert!(doc.render().unwrap());
    assert!(doc.last_frame_summary().initial);
    assert_eq!(doc.tree().element::<Block>(leaf).unwrap().paints, 2);
}

#[test]
fn failed_repaint_keeps_changed_flags_for_the_retry() {
    let (mut doc, backend) = document(DocumentConfig::default());
    let block = doc.create_element(Block::new(100.0, 100.0));
    let painter = doc.create_element(Painter {
        size: Size::new(50.0, 50.0),
        seen: Vec::new(),
    });
    let root = with_children(&mut doc, Stack::default(), &[block, painter]);
    doc.set_root(root);
    doc.render().unwrap();
    assert_eq!(backend.layers_allocated(), 2);

    // The new size misses the layer pool, and no allocation is left.
    backend.set_allocation_limit(Some(2));
    doc.update_element::<Painter, _>(painter, |p| p.size = Size::new(60.0, 60.0));
    assert!(matches!(
        doc.render(),
        Err(RenderError::Layer(LayerError::SurfaceAllocation { .. }))
    ));
    assert!(doc.tree().is_changed(root));

    backend.set_allocation_limit(None);
    assert!(doc.render().unwrap());
    let summary = doc.last_frame_summary();
    assert!(!summary.initial);
    assert_eq!(summary.relayout_passes, 0);
    assert_eq!(summary.repaint_boundaries, 1);
    let seen = &doc.tree().element::<Painter>(painter).unwrap().seen;
    assert_eq!(seen.len(), 3);
    assert!(seen[1] && seen[2], "retry still paints the subtree as changed");
    assert!(!doc.tree().is_changed(root));
}

#[test]
fn destroyed_boundary_left_queued_by_partial_relayout() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let outside = doc.create_element(Block::new(100.0, 100.0));
    let inside = doc.create_element(Block::new(1.0, 1.0));
    let fixed = with_children(
        &mut doc,
        Fixed {
            size: Size::new(100.0, 100.0),
        },
        &[inside],
    );
    let boundary = with_children(&mut doc, Boundary { opacity: 1.0 }, &[fixed]);
    let root = with_children(&mut doc, Stack::default(), &[outside, boundary]);
    doc.set_root(root);
    doc.render().unwrap();

    doc.update_element::<Block, _>(inside, |b| b.color = Color::WHITE);
    assert!(doc.partial_relayout(inside));

    assert!(doc.tree_mut().remove_child(root, boundary));
    assert!(!doc.tree().is_alive(boundary));
    assert!(doc.render().unwrap());
    assert_eq!(doc.last_frame_summary().repaint_boundaries, 1);
    assert_eq!(doc.tree().layer_tree(root).unwrap().children().len(), 1);
}

// ---------------------------------------------------------------------------
// Repaint boundaries and composition
// ---------------------------------------------------------------------------

#[test]
fn change_inside_nested_boundary_repaints_only_that_boundary() {
    let (mut doc, backend) = document(DocumentConfig::default());
    let outside = doc.create_element(Block::new(100.0, 100.0));
    let inside = doc.create_element(Block::new(1.0, 1.0));
    let fixed = with_children(
        &mut doc,
        Fixed {
            size: Size::new(100.0, 100.0),
        },
        &[inside],
    );
    let boundary = with_children(&mut doc, Boundary { opacity: 1.0 }, &[fixed]);
    let root = with_children(&mut doc, Stack::default(), &[outside, boundary]);
    doc.set_root(root);
    doc.render().unwrap();
    assert_eq!(backend.layers_allocated(), 2);

    doc.update_element::<Block, _>(inside, |s| s.color = Color::WHITE);
    assert!(doc.render().unwrap());

    let summary = doc.last_frame_summary();
    assert_eq!(summary.relayout_boundaries, 1);
    assert_eq!(summary.repaint_boundaries, 1);
    assert_eq!(summary.layers_reused, 1);
    assert_eq!(doc.tree().element::<Block>(outside).unwrap().paints, 1);
    assert_eq!(doc.tree().element::<Block>(inside).unwrap().paints, 2);
    assert_eq!(backend.resolved_screen_draws().len(), 2);
}

#[test]
fn clip_above_nested_boundaries_constrains_their_output() {
    let (mut doc, backend) = document(DocumentConfig::default());
    let above = doc.create_element(Block::new(100.0, 100.0));
    let leaf = doc.create_element(Block::new(100.0, 100.0));
    let inner = with_children(&mut doc, Boundary { opacity: 1.0 }, &[leaf]);
    let outer = with_children(&mut doc, Boundary { opacity: 1.0 }, &[inner]);
    let clip = with_children(
        &mut doc,
        ClipBox {
            clip: Rect::new(0.0, 0.0, 50.0, 50.0),
        },
        &[outer],
    );
    let root = with_children(&mut doc, Stack::default(), &[above, clip]);
    doc.set_root(root);
    doc.render().unwrap();

    let tree = doc.tree();
    assert_eq!(tree.layer_tree(inner).unwrap().parent(), Some(outer));
    assert_eq!(tree.layer_tree(outer).unwrap().parent(), Some(root));
    let stored = tree.layer_tree(outer).unwrap().clip().unwrap();
    assert_eq!(stored.bounding_box(), Rect::new(0.0, 0.0, 50.0, 50.0));
    assert!(tree.layer_tree(inner).unwrap().clip().is_none());

    let draws = backend.resolved_screen_draws();
    assert_eq!(draws.len(), 2);
    let nested = &draws[1];
    assert_eq!(nested.origin, Point::new(0.0, 100.0));
    assert!(nested.clip_contains(Point::new(25.0, 125.0)));
    assert!(!nested.clip_contains(Point::new(75.0, 175.0)));
    assert!(!nested.clip_contains(Point::new(25.0, 175.0)));
    assert!(draws[0].clip_contains(Point::new(75.0, 75.0)));
}

#[test]
fn nested_opacity_multiplies_and_recomposes_alone() {
    let (mut doc, backend) = document(DocumentConfig::default());
    let leaf = doc.create_element(Block::new(100.0, 100.0));
    let inner = with_children(&mut doc, Boundary { opacity: 0.5 }, &[leaf]);
    let outer = with_children(&mut doc, Boundary { opacity: 0.5 }, &[inner]);
    let root = with_children(&mut doc, overlay(), &[outer]);
    doc.set_root(root);
    doc.render().unwrap();
    assert_eq!(image_opacities(&backend), vec![0.25]);
    let snapshots = backend.snapshots();

    doc.set_layer_opacity(outer, 1.0);
    assert!(doc.render().unwrap());
    let summary = doc.last_frame_summary();
    assert_eq!(summary.relayout_passes, 0);
    assert_eq!(summary.repaint_boundaries, 0);
    assert!(summary.composed);
    assert_eq!(image_opacities(&backend), vec![0.5]);
    assert_eq!(backend.snapshots(), snapshots, "unchanged layers keep their snapshots");
}

#[test]
fn removed_boundary_is_not_composed() {
    let (mut doc, backend) = document(DocumentConfig::default());
    let leaf = doc.create_element(Block::new(100.0, 100.0));
    let boundary = with_children(&mut doc, Boundary { opacity: 1.0 }, &[leaf]);
    let root = with_children(&mut doc, overlay(), &[boundary]);
    doc.set_root(root);
    doc.render().unwrap();
    assert_eq!(backend.resolved_screen_draws().len(), 1);

    assert!(doc.tree_mut().remove_child(root, boundary));
    assert!(doc.render().unwrap());
    assert!(!doc.tree().is_alive(boundary));
    assert!(backend.resolved_screen_draws().is_empty());
    assert!(doc.tree().layer_tree(root).unwrap().children().is_empty());
}

// ---------------------------------------------------------------------------
// Root, screen, and partial relayout
// ---------------------------------------------------------------------------

#[test]
fn set_root_releases_the_previous_root() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let placeholder = doc.root();
    let first = doc.create_element(Stack::default());
    doc.set_root(first);
    assert!(!doc.tree().is_alive(placeholder));
    doc.render().unwrap();

    doc.tree_mut().retain(first);
    let second = doc.create_element(Stack::default());
    doc.set_root(second);
    assert!(doc.tree().is_alive(first));
    assert!(!doc.tree().in_document(first));
    assert!(doc.tree().in_document(second));
    assert!(doc.tree().is_repaint_boundary(second));

    assert!(doc.render().unwrap());
    assert!(doc.last_frame_summary().initial);
    assert_eq!(doc.tree().size(second), Size::new(500.0, 500.0));
}

#[test]
fn resize_relayouts_root_on_next_frame() {
    let (mut doc, backend, [root, ..]) = stacked();
    doc.resize(Size::new(300.0, 200.0)).unwrap();
    assert_eq!(doc.screen_size(), Size::new(300.0, 200.0));
    assert_eq!(backend.screens_created(), 2);

    assert!(doc.render().unwrap());
    assert_eq!(doc.tree().size(root), Size::new(300.0, 200.0));
    let summary = doc.last_frame_summary();
    assert_eq!(summary.relayout_boundaries, 1);
    assert_eq!(summary.layers_allocated, 1, "root layer changed size");
}

#[test]
fn partial_relayout_settles_one_element_early() {
    let (mut doc, _backend, [_, a, b]) = stacked();
    assert!(!doc.partial_relayout(b));

    resize_block(&mut doc, a, 120.0);
    assert!(doc.partial_relayout(a));
    assert_eq!(doc.tree().size(a), Size::new(120.0, 120.0));
    assert_eq!(doc.tree().abs_position(b), Point::new(0.0, 120.0));

    assert!(doc.render().unwrap());
    let summary = doc.last_frame_summary();
    assert_eq!(summary.relayout_passes, 0);
    assert_eq!(summary.repaint_boundaries, 1);
}

// ---------------------------------------------------------------------------
// Hit testing
// ---------------------------------------------------------------------------

fn overlapping(front_mode: HitTestMode) -> (Document, [ElementId; 3]) {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let back = doc.create_element(Block::new(100.0, 100.0));
    let front = doc.create_element(Block::new(100.0, 100.0).with_mode(front_mode));
    let root = with_children(&mut doc, overlay(), &[back, front]);
    doc.set_root(root);
    doc.render().unwrap();
    (doc, [root, back, front])
}

#[test]
fn pass_to_parent_skips_siblings() {
    let (doc, [root, _, front]) = overlapping(HitTestMode::PassToParent);
    assert_eq!(doc.hit_test(Point::new(50.0, 50.0)), vec![front, root]);
}

#[test]
fn pass_through_reaches_elements_behind() {
    let (doc, [root, back, front]) = overlapping(HitTestMode::PassThrough);
    assert_eq!(doc.hit_test(Point::new(50.0, 50.0)), vec![front, back, root]);
}

#[test]
fn absorb_stops_propagation() {
    let (doc, [_, _, front]) = overlapping(HitTestMode::Absorb);
    assert_eq!(doc.hit_test(Point::new(50.0, 50.0)), vec![front]);
}

#[test]
fn disabled_elements_are_never_hit() {
    let (doc, [root, back, _]) = overlapping(HitTestMode::Disabled);
    assert_eq!(doc.hit_test(Point::new(50.0, 50.0)), vec![back, root]);
    assert_eq!(doc.hit_test(Point::new(250.0, 250.0)), vec![root]);
}

#[test]
fn clips_and_layer_transforms_apply_to_hits() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let clipped = doc.create_element(Block::new(100.0, 100.0));
    let clip = with_children(
        &mut doc,
        ClipBox {
            clip: Rect::new(0.0, 0.0, 50.0, 50.0),
        },
        &[clipped],
    );
    let moved = doc.create_element(Block::new(100.0, 100.0));
    let boundary = with_children(&mut doc, Boundary { opacity: 1.0 }, &[moved]);
    let root = with_children(&mut doc, Stack::default(), &[clip, boundary]);
    doc.set_root(root);
    doc.render().unwrap();

    assert!(doc.hit_test(Point::new(25.0, 25.0)).contains(&clipped));
    assert!(!doc.hit_test(Point::new(75.0, 75.0)).contains(&clipped));

    doc.set_layer_transform(boundary, Affine::translate((200.0, 0.0)));
    doc.render().unwrap();
    assert!(doc.hit_test(Point::new(250.0, 150.0)).contains(&moved));
    assert!(!doc.hit_test(Point::new(50.0, 150.0)).contains(&moved));
}

// ---------------------------------------------------------------------------
// Contract violations
// ---------------------------------------------------------------------------

#[test]
#[should_panic(expected = "is not a child of")]
fn laying_out_a_foreign_element_panics() {
    let (mut doc, _backend) = document(DocumentConfig::default());
    let victim = doc.create_element(Block::new(10.0, 10.0));
    let kidnapper = doc.create_element(Kidnapper { victim });
    let root = with_children(&mut doc, overlay(), &[kidnapper, victim]);
    doc.set_root(root);
    let _ = doc.render();
}

#[test]
#[should_panic(expected = "is not a repaint boundary")]
fn layer_transform_of_plain_element_panics() {
    let (mut doc, _backend, [_, a, _]) = stacked();
    doc.set_layer_transform(a, Affine::scale(2.0));
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

#[cfg(feature = "trace")]
#[test]
fn traced_render_reports_phases_and_layers() {
    use crate::trace::{LayerEvent, LayerEventKind, TraceSink};

    #[derive(Default)]
    struct Collect {
        phases: Vec<PhaseKind>,
        layers: Vec<LayerEventKind>,
        summaries: u32,
    }

    impl TraceSink for Collect {
        fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
            self.phases.push(e.phase);
        }

        fn on_layer(&mut self, e: &LayerEvent) {
            self.layers.push(e.kind);
        }

        fn on_frame_summary(&mut self, _: &FrameSummary) {
            self.summaries += 1;
        }
    }

    let (mut doc, _backend) = document(DocumentConfig::default());
    let leaf = doc.create_element(Block::new(10.0, 10.0));
    let root = with_children(&mut doc, Stack::default(), &[leaf]);
    doc.set_root(root);

    let mut sink = Collect::default();
    doc.render_traced(&mut Tracer::new(&mut sink)).unwrap();
    assert_eq!(
        sink.phases,
        vec![PhaseKind::Relayout, PhaseKind::Repaint, PhaseKind::Compose]
    );
    assert_eq!(sink.layers, vec![LayerEventKind::Allocated]);
    assert_eq!(sink.summaries, 1);
}
