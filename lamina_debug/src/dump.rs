// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dumps of element trees and layer trees.

use std::fmt::Write;

use kurbo::Affine;
use lamina_core::element::{ElementId, ElementTree};
use lamina_core::layer::LayerTreeNode;

/// Renders the element subtree at `root`, one element per line.
///
/// Each line shows the element's debug name, id, window position, size, and
/// boundary markers (`R` for relayout, `P` for repaint).
#[must_use]
pub fn dump_elements(tree: &ElementTree, root: ElementId) -> String {
    let mut out = String::new();
    write_element(&mut out, tree, root, 0);
    out
}

fn write_element(out: &mut String, tree: &ElementTree, id: ElementId, depth: usize) {
    let position = tree.abs_position(id);
    let size = tree.size(id);
    let mut markers = String::new();
    if tree.is_relayout_boundary(id) {
        markers.push('R');
    }
    if tree.is_repaint_boundary(id) {
        markers.push('P');
    }
    if tree.clip(id).is_some() {
        markers.push('C');
    }
    let _ = write!(
        out,
        "{:indent$}{} {id} @({}, {}) {}x{}",
        "",
        tree.debug_name(id),
        position.x,
        position.y,
        size.width,
        size.height,
        indent = depth * 2,
    );
    if !markers.is_empty() {
        let _ = write!(out, " [{markers}]");
    }
    out.push('\n');
    for child in tree.children(id) {
        write_element(out, tree, child, depth + 1);
    }
}

/// Renders the layer tree owned by the repaint boundary `root`, including
/// nested trees.
///
/// Returns an empty string if `root` has no layer tree.
#[must_use]
pub fn dump_layers(tree: &ElementTree, root: ElementId) -> String {
    let mut out = String::new();
    write_layer_tree(&mut out, tree, root, 0);
    out
}

fn write_layer_tree(out: &mut String, tree: &ElementTree, owner: ElementId, depth: usize) {
    let Some(layer_tree) = tree.layer_tree(owner) else {
        return;
    };
    let _ = write!(
        out,
        "{:indent$}tree {owner} opacity={}",
        "",
        layer_tree.opacity(),
        indent = depth * 2,
    );
    if layer_tree.transform() != Affine::IDENTITY {
        let _ = write!(out, " transform={:?}", layer_tree.transform().as_coeffs());
    }
    if let Some(clip) = layer_tree.clip() {
        let bounds = clip.bounding_box();
        let _ = write!(
            out,
            " clip=({}, {}, {}, {})",
            bounds.x0, bounds.y0, bounds.x1, bounds.y1
        );
    }
    out.push('\n');
    for child in layer_tree.children() {
        match child {
            LayerTreeNode::Tree(nested) => {
                if tree.is_alive(*nested) {
                    write_layer_tree(out, tree, *nested, depth + 1);
                }
            }
            LayerTreeNode::Layer(layer) => {
                let size = layer.size();
                let _ = writeln!(
                    out,
                    "{:indent$}layer {}x{} snapshots={}",
                    "",
                    size.width,
                    size.height,
                    layer.snapshot_generation(),
                    indent = (depth + 1) * 2,
                );
            }
        }
    }
}
