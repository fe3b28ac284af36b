// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition of layer trees onto the screen.

use kurbo::Point;

use crate::color::Color;
use crate::element::{ElementId, ElementTree};
use crate::layer::{Layer, LayerTreeNode};

/// Clears `screen` and draws the layer tree rooted at `root` onto it,
/// back to front.
pub(crate) fn compose(screen: &mut Layer, tree: &mut ElementTree, root: ElementId, clear_color: Color) {
    screen.clear(clear_color);
    compose_tree(screen, tree, root, Point::ORIGIN, 1.0);
    screen.flush();
}

/// Draws the layer tree owned by `owner`.
///
/// `origin` is the window position of the enclosing tree's owner, which the
/// canvas is translated to on entry.
fn compose_tree(screen: &mut Layer, tree: &mut ElementTree, owner: ElementId, origin: Point, opacity: f32) {
    let position = tree.abs_position(owner);
    let Some(layer_tree) = tree.layer_tree_mut(owner) else {
        return;
    };
    let transform = layer_tree.transform();
    let clip = layer_tree.clip().cloned();
    let opacity = opacity * layer_tree.opacity();
    let mut children = layer_tree.take_children();

    let canvas = screen.canvas();
    canvas.save();
    canvas.translate(position - origin);
    canvas.transform(transform);
    // The clip was recorded before this tree's own transform.
    if let Some(clip) = &clip
        && transform.determinant() != 0.0
    {
        canvas.clip(&clip.transformed(transform.inverse()));
    }

    for child in &mut children {
        match child {
            LayerTreeNode::Tree(nested) => {
                if tree.is_alive(*nested) && tree.in_document(*nested) {
                    compose_tree(screen, tree, *nested, position, opacity);
                }
            }
            LayerTreeNode::Layer(layer) => screen.paint_layer(layer, Point::ORIGIN, opacity),
        }
    }

    if let Some(layer_tree) = tree.layer_tree_mut(owner) {
        layer_tree.restore_children(children);
    }
    screen.canvas().restore();
}
