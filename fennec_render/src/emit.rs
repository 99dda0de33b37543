// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning a laid-out node tree into a command list.

use fennec_core::node::{NodeId, NodeTree};
use fennec_core::style::Overflow;
use kurbo::Point;

use crate::command::{CommandList, RenderCommand};

/// Appends the paint commands for the subtree at `root` to `list`.
///
/// The walk is depth-first, each node before its children, children in
/// declaration order. Per node:
///
/// 1. a background fill over its geometry, if it has a background;
/// 2. for text nodes with a resolved font and wrapped lines, one `DrawText`
///    per line, aligned inside the content box by `textAlign`, baselines
///    starting one ascent below the content top;
/// 3. with `overflow: clip`, a `PushClip` of its geometry bracketing the
///    children, closed by exactly one `PopClip` even for a childless node.
///
/// Emission reads geometry and cached text lines only; it never measures.
///
/// # Panics
///
/// Panics if `root` is stale.
pub fn emit(tree: &NodeTree, root: NodeId, list: &mut CommandList) {
    emit_node(tree, root, list);
}

fn emit_node(tree: &NodeTree, id: NodeId, list: &mut CommandList) {
    let rect = tree.geometry(id);
    let paint = &tree.style(id).paint;

    if let Some(color) = paint.background {
        list.push(RenderCommand::FillRect { rect, color });
    }
    emit_text(tree, id, list);

    if paint.overflow == Overflow::Clip {
        let mut scope = ClipScope::push(list, rect);
        emit_children(tree, id, scope.list());
    } else {
        emit_children(tree, id, list);
    }
}

fn emit_children(tree: &NodeTree, id: NodeId, list: &mut CommandList) {
    for child in tree.children(id) {
        emit_node(tree, child, list);
    }
}

fn emit_text(tree: &NodeTree, id: NodeId, list: &mut CommandList) {
    let (Some(font), Some(layout)) = (tree.font(id), tree.text_layout(id)) else {
        return;
    };
    let rect = tree.geometry(id);
    let style = tree.style(id);
    let padding = style.layout.padding;
    let content_x = rect.x0 + padding.x0;
    let content_width = rect.width() - padding.x0 - padding.x1;

    let mut baseline = rect.y0 + padding.y0 + layout.ascent;
    for line in &layout.lines {
        let dx = style.layout.text_align.offset(content_width, line.width);
        list.push(RenderCommand::DrawText {
            text: line.text.clone(),
            font,
            origin: Point::new(content_x + dx, baseline),
            color: style.paint.color,
            decoration: style.paint.decoration,
        });
        baseline += layout.line_height;
    }
}

/// Keeps a clip pushed for as long as it lives.
///
/// The matching `PopClip` is written on drop, so the bracket closes on every
/// exit path out of the subtree walk.
struct ClipScope<'a> {
    list: &'a mut CommandList,
}

impl<'a> ClipScope<'a> {
    fn push(list: &'a mut CommandList, rect: kurbo::Rect) -> Self {
        list.push(RenderCommand::PushClip { rect });
        Self { list }
    }

    fn list(&mut self) -> &mut CommandList {
        self.list
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.list.push(RenderCommand::PopClip);
    }
}
