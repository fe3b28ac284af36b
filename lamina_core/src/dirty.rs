// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The [`ElementTree`](crate::element::ElementTree) records pending work in a
//! [`DirtyTracker`](understory_dirty::DirtyTracker) keyed by element slot.
//! Both channels are local-only: marking an element never propagates to its
//! descendants, because the relayout and repaint boundary walks already
//! decide how far a change reaches.
//!
//! # Consumption
//!
//! [`Document::render`](crate::document::Document::render) drains
//! [`LAYOUT`] once per relayout pass and [`COMPOSE`] once per frame. Callers
//! mark channels through
//! [`ElementTree::change`](crate::element::ElementTree::change) and
//! [`ElementTree::change_layer`](crate::element::ElementTree::change_layer);
//! they never query dirty state directly.

use understory_dirty::Channel;

/// Element content changed: its closest relayout boundary must be laid out
/// again, and the closest repaint boundary of that one repainted.
pub const LAYOUT: Channel = Channel::new(0);

/// A repaint boundary's layer transform or opacity changed: the frame must
/// be composed again, but no layout or paint work is needed.
pub const COMPOSE: Channel = Channel::new(1);
