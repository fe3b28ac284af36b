// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree, incremental layout, and layer composition for retained-mode
//! user interfaces.
//!
//! `lamina_core` keeps a tree of elements, lays it out with box constraints,
//! paints it into cached raster layers, and composes those layers onto a
//! screen. Each frame only redoes the work that changes require: relayout is
//! confined to *relayout boundaries*, repainting to *repaint boundaries*,
//! and layers of unchanged size are reused across frames.
//!
//! # Architecture
//!
//! ```text
//!   change_element / update_element
//!       │
//!       ▼
//!   ElementTree (dirty: LAYOUT, COMPOSE)
//!       │
//!       ▼
//!   Document::render()
//!       ├─► relayout: closest relayout boundaries ──► Element::layout
//!       ├─► repaint:  closest repaint boundaries  ──► Element::paint ──► LayerTree
//!       └─► compose:  LayerTree walk ──► screen Layer
//! ```
//!
//! **[`element`]**: Struct-of-arrays element arena with generational
//! handles, parent-owned topology, and the [`Element`](element::Element)
//! trait that element kinds implement.
//!
//! **[`document`]**: The frame pipeline: [`Document`](document::Document)
//! plus the [`LayoutCx`](document::LayoutCx) and
//! [`PaintCx`](document::PaintCx) contexts handed to elements.
//!
//! **[`layer`]**: Layers with cached snapshots, per-boundary layer trees,
//! the [`LayerBackend`](layer::LayerBackend) surface traits, and a headless
//! [`RecordingBackend`](layer::RecordingBackend).
//!
//! **[`observer`]**: Change notification for derived element values such
//! as sizes.
//!
//! **[`constraints`]**, **[`clip`]**, **[`color`]**: Layout and painting
//! value types.
//!
//! **[`dirty`]**: Dirty-tracking channels via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-boundary
//!   events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod clip;
pub mod color;
pub mod config;
pub mod constraints;
pub mod dirty;
pub mod document;
pub mod element;
pub mod error;
pub mod layer;
pub mod observer;
pub mod trace;

pub use kurbo;
