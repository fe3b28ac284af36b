// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document: an element tree bound to a screen, rendered frame by frame.
//!
//! # Frames
//!
//! [`Document::render`] runs one frame. The first frame after
//! [`set_root`](Document::set_root) lays out and paints the whole tree.
//! Later frames only touch what changed:
//!
//! 1. **Relayout.** Every changed element escalates to its closest relayout
//!    boundary. Boundaries nested inside another scheduled boundary are
//!    dropped; the rest are laid out again with the constraints they last
//!    received. Changes made during layout are picked up by another pass,
//!    up to [`DocumentConfig::max_relayout_passes`].
//! 2. **Repaint.** Each relaid-out boundary escalates to its closest repaint
//!    boundary, deduplicated the same way, and those are painted again.
//!    Layers of the previous paint are reused when sizes match.
//! 3. **Compose.** When anything was painted, or a layer transform or
//!    opacity changed, the layer trees are drawn onto the screen.
//!
//! Size observers registered with
//! [`observe_element_size`](Document::observe_element_size) are checked once
//! relayout has settled, so they only see final sizes.

mod compose;
mod layout;
mod paint;

#[cfg(test)]
mod tests;

use core::fmt;

use kurbo::{Affine, Point, Size};

pub use layout::LayoutCx;
pub use paint::PaintCx;

use crate::config::DocumentConfig;
use crate::constraints::BoxConstraints;
use crate::element::{Element, ElementId, ElementTree, Placeholder};
use crate::error::{LayerError, RenderError, RenderResult};
use crate::layer::{Layer, LayerBackend};
use crate::observer::{ElementObserver, ObserverConnection};
#[cfg(feature = "trace-rich")]
use crate::trace::{BoundaryEvent, BoundaryKind};
use crate::trace::{FrameSummary, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};

/// An element tree rendered onto a screen layer.
///
/// The document owns the tree, the layer backend, and the screen. Mutate
/// elements through [`tree_mut`](Self::tree_mut) or
/// [`update_element`](Self::update_element), then call
/// [`render`](Self::render) once per frame.
pub struct Document {
    tree: ElementTree,
    backend: Box<dyn LayerBackend>,
    screen: Layer,
    root: ElementId,
    config: DocumentConfig,
    size_observer: ElementObserver<Size>,
    repaint_boundaries: Vec<ElementId>,
    is_initial_render: bool,
    frame_index: u64,
    last_summary: FrameSummary,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("screen", &self.screen)
            .field("config", &self.config)
            .field("elements", &self.tree.live_count())
            .field("is_initial_render", &self.is_initial_render)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Creates a document presenting to a new screen layer of `screen_size`.
    ///
    /// The root starts out as a [`Placeholder`].
    pub fn new(
        backend: impl LayerBackend + 'static,
        screen_size: Size,
        config: DocumentConfig,
    ) -> Result<Self, LayerError> {
        let mut backend: Box<dyn LayerBackend> = Box::new(backend);
        let screen = Layer::make_screen_layer(backend.as_mut(), screen_size)?;
        let mut tree = ElementTree::new();
        let root = tree.create_element(Placeholder);
        tree.retain(root);
        tree.make_root(root, screen_size);
        tracing::debug!(
            width = screen_size.width,
            height = screen_size.height,
            "document created"
        );
        Ok(Self {
            tree,
            backend,
            screen,
            root,
            config,
            size_observer: ElementObserver::new(|tree: &ElementTree, id| tree.size(id)),
            repaint_boundaries: Vec::new(),
            is_initial_render: true,
            frame_index: 0,
            last_summary: FrameSummary::default(),
        })
    }

    // -- Tree access --

    /// Read access to the element tree.
    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Write access to the element tree.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// Shorthand for [`ElementTree::create_element`].
    pub fn create_element<E: Element>(&mut self, element: E) -> ElementId {
        self.tree.create_element(element)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    // -- Root and screen --

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Makes a detached element the root and schedules an initial render.
    ///
    /// The root is forced to be a relayout and repaint boundary sized to the
    /// screen. The previous root leaves the document and is released; it is
    /// destroyed unless something else retains it.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale or attached to a parent.
    pub fn set_root(&mut self, root: ElementId) {
        let previous = self.root;
        self.tree.retain(root);
        self.tree.leave_document(previous);
        self.tree.make_root(root, self.screen.size());
        self.root = root;
        self.repaint_boundaries.clear();
        self.is_initial_render = true;
        self.tree.release(previous);
        tracing::debug!(%previous, %root, "root replaced");
    }

    /// Returns the screen layer.
    #[must_use]
    pub fn screen(&self) -> &Layer {
        &self.screen
    }

    /// Returns the screen size.
    #[must_use]
    pub fn screen_size(&self) -> Size {
        self.screen.size()
    }

    /// Replaces the screen with one of `size`.
    ///
    /// The root is laid out with the new size on the next frame.
    pub fn resize(&mut self, size: Size) -> Result<(), LayerError> {
        self.screen = Layer::make_screen_layer(self.backend.as_mut(), size)?;
        self.tree.set_prev_constraints(self.root, BoxConstraints::tight(size));
        self.tree.change(self.root);
        tracing::debug!(width = size.width, height = size.height, "screen resized");
        Ok(())
    }

    // -- Changes --

    /// Schedules an element's relayout boundary for the next frame.
    pub fn change_element(&mut self, id: ElementId) {
        self.tree.change(id);
    }

    /// Schedules a recomposition without layout or paint.
    pub fn change_layer(&mut self, id: ElementId) {
        self.tree.change_layer(id);
    }

    /// Mutates an element's behavior and schedules its relayout.
    ///
    /// Returns `None` if the element is not a `T`.
    pub fn update_element<T: Element, R>(&mut self, id: ElementId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.tree.update(id, f)
    }

    /// Sets the layer transform of a repaint boundary and schedules a
    /// recomposition.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a repaint boundary.
    pub fn set_layer_transform(&mut self, id: ElementId, transform: Affine) {
        self.boundary_layer_tree(id).set_transform(transform);
        self.tree.change_layer(id);
    }

    /// Sets the layer opacity of a repaint boundary and schedules a
    /// recomposition.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a repaint boundary.
    pub fn set_layer_opacity(&mut self, id: ElementId, opacity: f32) {
        self.boundary_layer_tree(id).set_opacity(opacity);
        self.tree.change_layer(id);
    }

    fn boundary_layer_tree(&mut self, id: ElementId) -> &mut crate::layer::LayerTree {
        let Some(layer_tree) = self.tree.layer_tree_mut(id) else {
            panic!("{id:?} is not a repaint boundary");
        };
        layer_tree
    }

    // -- Observation --

    /// Calls `handler` with an element's new size whenever a frame's layout
    /// settles on a size different from the last one delivered.
    ///
    /// The element is retained until the connection is disconnected.
    pub fn observe_element_size(
        &mut self,
        id: ElementId,
        handler: impl FnMut(&Size) + 'static,
    ) -> ObserverConnection {
        self.size_observer.observe(&mut self.tree, id, handler)
    }

    /// Removes a size handler. Returns `false` if it was already removed.
    pub fn disconnect_observer(&mut self, connection: ObserverConnection) -> bool {
        self.size_observer.disconnect(&mut self.tree, connection)
    }

    // -- Hit testing --

    /// Returns the elements a pointer at `point` reaches, topmost first.
    ///
    /// Reflects the geometry of the last rendered frame.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Vec<ElementId> {
        hit_test::hit_test(&self.tree, self.root, point)
    }

    // -- Rendering --

    /// Renders one frame. Returns whether the screen was composed.
    pub fn render(&mut self) -> RenderResult<bool> {
        self.render_traced(&mut Tracer::none())
    }

    /// Renders one frame, reporting phases and layers to `tracer`.
    ///
    /// On error, the changes that were not processed stay scheduled and the
    /// next call retries them.
    pub fn render_traced(&mut self, tracer: &mut Tracer<'_>) -> RenderResult<bool> {
        let frame_index = self.frame_index;
        self.frame_index += 1;
        let mut summary = FrameSummaryBuilder::new(frame_index, self.is_initial_render);
        let result = if self.is_initial_render {
            self.initial_render(&mut summary, tracer)
        } else {
            self.rerender(&mut summary, tracer)
        };
        summary.flush_layer_events(tracer);
        let summary = summary.finish();
        tracer.frame_summary(&summary);
        if let Err(err) = &result {
            tracing::warn!(frame_index, %err, "frame failed");
        } else if summary.did_work() {
            tracing::debug!(
                frame_index,
                relayout_passes = summary.relayout_passes,
                repaint_boundaries = summary.repaint_boundaries,
                layers_allocated = summary.layers_allocated,
                "frame rendered"
            );
        }
        self.last_summary = summary;
        result
    }

    /// Returns the summary of the last frame.
    #[must_use]
    pub fn last_frame_summary(&self) -> &FrameSummary {
        &self.last_summary
    }

    /// Brings the layout around one element up to date before the next
    /// frame.
    ///
    /// Finds the closest changed element at or above `id`, lays out its
    /// relayout boundary, and drops it from the pending changes. Returns
    /// whether anything was laid out. Painting still happens on the next
    /// frame.
    pub fn partial_relayout(&mut self, id: ElementId) -> bool {
        if self.is_initial_render {
            return false;
        }
        let changed = self.tree.drain_changed();
        let found = core::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find(|candidate| changed.contains(candidate));
        for &other in &changed {
            if Some(other) != found {
                self.tree.change(other);
            }
        }
        let Some(found) = found else {
            return false;
        };
        let boundary = self.tree.closest_relayout_boundary(found);
        self.relayout_boundary(boundary);
        self.size_observer.check_triggered_elements(&self.tree);
        true
    }

    fn initial_render(&mut self, summary: &mut FrameSummaryBuilder, tracer: &mut Tracer<'_>) -> RenderResult<bool> {
        let frame_index = summary.frame_index();
        let root = self.root;

        phase_begin(tracer, frame_index, PhaseKind::Relayout);
        let constraints = BoxConstraints::tight(self.screen.size());
        layout::layout_element(&mut self.tree, &mut self.size_observer, root, constraints);
        self.tree.update_abs_positions(root);
        summary.relayout_pass();
        self.size_observer.check_all_elements(&self.tree);
        self.run_relayout(summary, tracer)?;
        phase_end(tracer, frame_index, PhaseKind::Relayout);

        phase_begin(tracer, frame_index, PhaseKind::Repaint);
        self.repaint_boundaries.clear();
        self.paint_root(root, summary)?;
        phase_end(tracer, frame_index, PhaseKind::Repaint);

        self.tree.drain_compose();
        self.compose(summary, tracer);
        self.is_initial_render = false;
        Ok(true)
    }

    fn rerender(&mut self, summary: &mut FrameSummaryBuilder, tracer: &mut Tracer<'_>) -> RenderResult<bool> {
        let frame_index = summary.frame_index();

        phase_begin(tracer, frame_index, PhaseKind::Relayout);
        self.run_relayout(summary, tracer)?;
        phase_end(tracer, frame_index, PhaseKind::Relayout);

        let painted = self.repaint(summary, tracer)?;
        let recompose = self.tree.drain_compose();
        if !painted && !recompose {
            return Ok(false);
        }
        self.compose(summary, tracer);
        Ok(true)
    }

    /// Runs relayout passes until no changes are pending.
    ///
    /// Size observers are checked once, after the last pass, so handlers
    /// never see sizes from intermediate passes.
    fn run_relayout(&mut self, summary: &mut FrameSummaryBuilder, tracer: &mut Tracer<'_>) -> RenderResult<()> {
        let mut passes = 0;
        loop {
            let changed = self.tree.drain_changed();
            if changed.is_empty() {
                break;
            }
            if passes == self.config.max_relayout_passes {
                for &id in &changed {
                    self.tree.change(id);
                }
                tracing::error!(passes, pending = changed.len(), "relayout did not converge");
                return Err(RenderError::LayoutDidNotConverge { passes });
            }
            passes += 1;
            summary.relayout_pass();

            let mut boundaries = Vec::new();
            for id in changed {
                add_only_parent(&self.tree, &mut boundaries, self.tree.closest_relayout_boundary(id));
            }
            for boundary in boundaries {
                self.relayout_boundary(boundary);
                summary.relayout_boundary();
                #[cfg(feature = "trace-rich")]
                tracer.boundary(&BoundaryEvent {
                    frame_index: summary.frame_index(),
                    element: boundary,
                    kind: BoundaryKind::Relayout,
                });
            }
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = tracer;
        }
        self.size_observer.check_triggered_elements(&self.tree);
        Ok(())
    }

    fn relayout_boundary(&mut self, id: ElementId) {
        let constraints = self.tree.prev_constraints(id);
        layout::layout_element(&mut self.tree, &mut self.size_observer, id, constraints);
        self.tree.update_abs_positions(id);
        self.tree.set_changed_flag(id, true);
        let repaint = self.tree.closest_repaint_boundary(id);
        add_only_parent(&self.tree, &mut self.repaint_boundaries, repaint);
        tracing::trace!(%id, %repaint, "relayout boundary");
    }

    /// Paints every scheduled repaint boundary. Returns whether any was
    /// painted.
    fn repaint(&mut self, summary: &mut FrameSummaryBuilder, tracer: &mut Tracer<'_>) -> Result<bool, LayerError> {
        let tree = &self.tree;
        self.repaint_boundaries
            .retain(|&id| tree.is_alive(id) && tree.in_document(id));
        if self.repaint_boundaries.is_empty() {
            return Ok(false);
        }
        let frame_index = summary.frame_index();
        phase_begin(tracer, frame_index, PhaseKind::Repaint);
        let boundaries = core::mem::take(&mut self.repaint_boundaries);
        for (index, &boundary) in boundaries.iter().enumerate() {
            if let Err(err) = self.paint_root(boundary, summary) {
                self.repaint_boundaries.extend_from_slice(&boundaries[index..]);
                return Err(err);
            }
            #[cfg(feature = "trace-rich")]
            tracer.boundary(&BoundaryEvent {
                frame_index,
                element: boundary,
                kind: BoundaryKind::Repaint,
            });
        }
        phase_end(tracer, frame_index, PhaseKind::Repaint);
        Ok(true)
    }

    fn paint_root(&mut self, id: ElementId, summary: &mut FrameSummaryBuilder) -> Result<(), LayerError> {
        paint::paint_boundary(
            &mut paint::PaintEnv {
                tree: &mut self.tree,
                backend: self.backend.as_mut(),
                summary: &mut *summary,
            },
            id,
        )?;
        summary.repaint_boundary();
        tracing::trace!(%id, "repaint boundary");
        Ok(())
    }

    fn compose(&mut self, summary: &mut FrameSummaryBuilder, tracer: &mut Tracer<'_>) {
        let frame_index = summary.frame_index();
        phase_begin(tracer, frame_index, PhaseKind::Compose);
        compose::compose(&mut self.screen, &mut self.tree, self.root, self.config.clear_color);
        summary.composed();
        phase_end(tracer, frame_index, PhaseKind::Compose);
    }
}

/// Adds `id` to `set` unless an ancestor is already present, removing any
/// descendants of `id` already in it.
///
/// Entries whose element was destroyed since they were added are dropped.
fn add_only_parent(tree: &ElementTree, set: &mut Vec<ElementId>, id: ElementId) {
    set.retain(|&present| tree.is_alive(present));
    if set
        .iter()
        .any(|&present| present == id || tree.is_ancestor_of(present, id))
    {
        return;
    }
    set.retain(|&present| !tree.is_ancestor_of(id, present));
    set.push(id);
}

fn phase_begin(tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
    tracer.phase_begin(&PhaseBeginEvent { frame_index, phase });
}

fn phase_end(tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
    tracer.phase_end(&PhaseEndEvent { frame_index, phase });
}
