// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`Document::render_traced`](crate::document::Document::render_traced)
//! calls at each stage of a frame. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] collects per-frame counters and produces a
//! [`FrameSummary`] at the end. The document keeps the last summary whether
//! or not tracing is enabled.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`BoundaryEvent`]s and the
//!   corresponding `TraceSink` method.

use kurbo::Size;

use crate::element::ElementId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Relayout loop over changed elements' relayout boundaries.
    Relayout,
    /// Repainting of escalated repaint boundaries.
    Repaint,
    /// Drawing layer snapshots onto the screen.
    Compose,
}

/// How a layer was obtained while painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerEventKind {
    /// A new offscreen surface was allocated.
    Allocated,
    /// A layer of the same size from the previous paint was reused.
    Reused,
}

/// Which kind of boundary a [`BoundaryEvent`] reports.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// The element was laid out again with its previous constraints.
    Relayout,
    /// The element's layer tree was repainted.
    Repaint,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted whenever painting obtains a layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Repaint boundary whose tree received the layer.
    pub owner: ElementId,
    /// Layer dimensions.
    pub size: Size,
    /// Whether the layer was allocated or reused.
    pub kind: LayerEventKind,
}

/// Emitted for every processed relayout or repaint boundary.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct BoundaryEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The boundary element.
    pub element: ElementId,
    /// Which kind of boundary.
    pub kind: BoundaryKind,
}

/// Per-frame work summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Whether this was an initial render of a new root.
    pub initial: bool,
    /// Relayout passes run.
    pub relayout_passes: u32,
    /// Relayout boundaries laid out, over all passes.
    pub relayout_boundaries: u32,
    /// Repaint boundaries repainted as repaint roots.
    pub repaint_boundaries: u32,
    /// Offscreen layers allocated.
    pub layers_allocated: u32,
    /// Layers reused from a previous paint.
    pub layers_reused: u32,
    /// Whether the screen was composed.
    pub composed: bool,
}

impl FrameSummary {
    /// Returns whether the frame did any work.
    #[must_use]
    pub fn did_work(&self) -> bool {
        self.relayout_passes > 0 || self.repaint_boundaries > 0 || self.composed
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a frame phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called for every layer obtained while painting.
    fn on_layer(&mut self, e: &LayerEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called for every processed boundary (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_boundary(&mut self, e: &BoundaryEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayerEvent`].
    #[inline]
    pub fn layer(&mut self, e: &LayerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layer(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`BoundaryEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn boundary(&mut self, e: &BoundaryEvent) {
        if let Some(s) = &mut self.sink {
            s.on_boundary(e);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Counts work during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
    layer_events: Vec<LayerEvent>,
}

impl FrameSummaryBuilder {
    /// Starts a summary for the given frame.
    #[must_use]
    pub fn new(frame_index: u64, initial: bool) -> Self {
        Self {
            summary: FrameSummary {
                frame_index,
                initial,
                ..FrameSummary::default()
            },
            layer_events: Vec::new(),
        }
    }

    /// Returns the frame counter.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.summary.frame_index
    }

    /// Records one relayout pass.
    pub fn relayout_pass(&mut self) {
        self.summary.relayout_passes += 1;
    }

    /// Records one relayout boundary laid out.
    pub fn relayout_boundary(&mut self) {
        self.summary.relayout_boundaries += 1;
    }

    /// Records one repaint root painted.
    pub fn repaint_boundary(&mut self) {
        self.summary.repaint_boundaries += 1;
    }

    /// Records a layer obtained for `owner`'s tree.
    pub fn layer(&mut self, owner: ElementId, size: Size, kind: LayerEventKind) {
        match kind {
            LayerEventKind::Allocated => self.summary.layers_allocated += 1,
            LayerEventKind::Reused => self.summary.layers_reused += 1,
        }
        self.layer_events.push(LayerEvent {
            frame_index: self.summary.frame_index,
            owner,
            size,
            kind,
        });
    }

    /// Records that the screen was composed.
    pub fn composed(&mut self) {
        self.summary.composed = true;
    }

    /// Hands buffered layer events to `tracer`.
    pub fn flush_layer_events(&mut self, tracer: &mut Tracer<'_>) {
        for e in self.layer_events.drain(..) {
            tracer.layer(&e);
        }
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        self.summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
