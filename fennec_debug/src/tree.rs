// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented outline dumps of a node tree.

use std::fmt::Write;

use fennec_core::node::{NodeId, NodeKind, NodeTree};

/// Renders the subtree at `root` as an indented outline, one node per line.
///
/// Each line shows the kind, key, geometry, text content, bound handler and
/// pending dirty flags (`L` for layout, `P` for paint), for example:
///
/// ```text
/// column [0,0 800x600]
///   text #label [0,0 40x13] "count: 0" !L
///   rect #inc [0,13 100x20] on_click=1
/// ```
#[must_use]
pub fn outline(tree: &NodeTree, root: NodeId) -> String {
    let mut out = String::new();
    for (id, depth) in tree.depth_first(root) {
        _ = write_node(&mut out, tree, id, depth);
    }
    out
}

fn write_node(out: &mut String, tree: &NodeTree, id: NodeId, depth: usize) -> std::fmt::Result {
    let kind = match tree.kind(id) {
        NodeKind::Row => "row",
        NodeKind::Column => "column",
        NodeKind::Text => "text",
        NodeKind::Rect => "rect",
    };
    write!(out, "{:indent$}{kind}", "", indent = depth * 2)?;
    if let Some(key) = tree.key(id) {
        write!(out, " #{key}")?;
    }
    let r = tree.geometry(id);
    write!(out, " [{},{} {}x{}]", r.x0, r.y0, r.width(), r.height())?;
    if let Some(text) = tree.text(id) {
        write!(out, " {text:?}")?;
    }
    if let Some(handler) = tree.handler(id) {
        write!(out, " on_click={}", handler.0)?;
    }
    let layout = tree.is_layout_dirty(id);
    let paint = tree.is_paint_dirty(id);
    if layout || paint {
        out.push_str(" !");
        if layout {
            out.push('L');
        }
        if paint {
            out.push('P');
        }
    }
    writeln!(out)
}
