// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use lamina_core::trace::{
    BoundaryEvent, BoundaryKind, FrameSummary, LayerEvent, LayerEventKind, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    boundaries: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("boundaries", &self.boundaries)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    ///
    /// Per-boundary lines are off; enable them with
    /// [`with_boundaries`](Self::with_boundaries).
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            boundaries: false,
        }
    }

    /// Also prints a line for every relayout and repaint boundary.
    #[must_use]
    pub fn with_boundaries(mut self) -> Self {
        self.boundaries = true;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Relayout => "relayout",
        PhaseKind::Repaint => "repaint",
        PhaseKind::Compose => "compose",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_layer(&mut self, e: &LayerEvent) {
        let kind = match e.kind {
            LayerEventKind::Allocated => "alloc",
            LayerEventKind::Reused => "reuse",
        };
        let _ = writeln!(
            self.writer,
            "[layer:{kind}] frame={} owner={} size={}x{}",
            e.frame_index, e.owner, e.size.width, e.size.height,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let initial = if s.initial { " initial" } else { "" };
        let composed = if s.composed { "yes" } else { "no" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={}{initial} passes={} relayout={} repaint={} \
             layers=+{}/~{} composed={composed}",
            s.frame_index,
            s.relayout_passes,
            s.relayout_boundaries,
            s.repaint_boundaries,
            s.layers_allocated,
            s.layers_reused,
        );
    }

    fn on_boundary(&mut self, e: &BoundaryEvent) {
        if !self.boundaries {
            return;
        }
        let kind = match e.kind {
            BoundaryKind::Relayout => "relayout",
            BoundaryKind::Repaint => "repaint",
        };
        let _ = writeln!(
            self.writer,
            "[boundary:{kind}] frame={} element={}",
            e.frame_index, e.element,
        );
    }
}
