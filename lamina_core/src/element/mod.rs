// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element storage, identity, and the element authoring contract.
//!
//! Elements live in an [`ElementTree`] arena and are addressed by
//! generational [`ElementId`] handles. The tree owns structure, geometry,
//! and lifecycle state; each element kind supplies an [`Element`]
//! implementation for layout, painting, and hit testing.

mod contract;
mod id;
mod traverse;
mod tree;

pub use contract::{Arity, Element, ElementFlags, HitTestMode, Placeholder};
pub use id::ElementId;
pub use traverse::{Ancestors, Children};
pub use tree::ElementTree;
