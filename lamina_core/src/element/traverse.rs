// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{ElementId, INVALID};
use super::tree::ElementTree;

/// An iterator over the direct children of an element, in paint order.
///
/// Created by [`ElementTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a ElementTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a ElementTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator from an element up through its ancestors to the root.
///
/// Created by [`ElementTree::ancestors`]. The starting element is not
/// included.
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a ElementTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a ElementTree, start: u32) -> Self {
        Self {
            tree,
            current: tree.parent[start as usize],
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.parent[idx as usize];
        Some(self.tree.id_at(idx))
    }
}
