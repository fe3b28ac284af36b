// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and tree dumps for lamina diagnostics.
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](lamina_core::trace::TraceSink)
//!   that writes one human-readable line per frame event.
//! - [`dump::dump_elements`] and [`dump::dump_layers`]: indented text views
//!   of an element subtree and of a repaint boundary's layer tree.

pub mod dump;
pub mod pretty;
