// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout solver seam and the dirty-gated layout pass.

use kurbo::Size;

use crate::font::FontService;
use crate::node::{NodeId, NodeTree};

/// An external geometry solver.
///
/// Implementations read kinds and [`LayoutStyle`](crate::style::LayoutStyle)s
/// from the tree, measure text through `fonts`, and write absolute geometry
/// for every node under `root` with [`NodeTree::set_geometry`]. The root
/// fills `viewport`.
pub trait LayoutSolver {
    /// Recomputes geometry for the whole subtree at `root`.
    fn solve(&mut self, tree: &mut NodeTree, root: NodeId, viewport: Size, fonts: &mut dyn FontService);
}

/// Outcome of [`layout_if_needed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutPass {
    /// Nodes whose layout flag was cleared.
    pub relaid: usize,
    /// Text nodes whose wrapped lines were recomputed.
    pub rewrapped: usize,
}

/// Runs the solver if, and only if, the root is layout-dirty.
///
/// After solving, text line caches are refreshed against the new geometry and
/// the layout channel is drained. Returns `None` when the tree was clean or
/// rootless.
pub fn layout_if_needed(
    tree: &mut NodeTree,
    solver: &mut dyn LayoutSolver,
    viewport: Size,
    fonts: &mut dyn FontService,
) -> Option<LayoutPass> {
    if !tree.needs_layout() {
        return None;
    }
    let root = tree.root()?;
    solver.solve(tree, root, viewport, fonts);
    let rewrapped = tree.update_text_layout(root, fonts);
    let relaid = tree.drain_layout().len();
    Some(LayoutPass { relaid, rewrapped })
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::bridge::testing::RecordingHandlers;
    use crate::description::Description;
    use crate::font::MonospaceFonts;
    use crate::node::Context;

    /// Stacks children vertically, each 20px tall, full width.
    #[derive(Default)]
    struct StackSolver {
        runs: usize,
    }

    impl LayoutSolver for StackSolver {
        fn solve(&mut self, tree: &mut NodeTree, root: NodeId, viewport: Size, _: &mut dyn FontService) {
            self.runs += 1;
            tree.set_geometry(root, Rect::from_origin_size((0.0, 0.0), viewport));
            let kids: alloc::vec::Vec<_> = tree.children(root).collect();
            for (i, kid) in kids.into_iter().enumerate() {
                let y = 20.0 * i as f64;
                tree.set_geometry(kid, Rect::new(0.0, y, viewport.width, y + 20.0));
            }
        }
    }

    #[test]
    fn solves_only_when_root_is_dirty() {
        let mut fonts = MonospaceFonts::with_default_family(10.0);
        let mut handlers = RecordingHandlers::default();
        let mut tree = NodeTree::new();
        let mut solver = StackSolver::default();
        let desc = Description::column()
            .child(Description::text("one two three"))
            .child(Description::rect());
        tree.mount(&desc, &mut Context::new(&mut fonts, &mut handlers))
            .unwrap();

        let viewport = Size::new(40.0, 100.0);
        let pass = layout_if_needed(&mut tree, &mut solver, viewport, &mut fonts).unwrap();
        assert_eq!(solver.runs, 1);
        assert_eq!(pass.relaid, 3);
        assert_eq!(pass.rewrapped, 1);
        assert!(!tree.needs_layout());

        assert_eq!(layout_if_needed(&mut tree, &mut solver, viewport, &mut fonts), None);
        assert_eq!(solver.runs, 1);

        let root = tree.root().unwrap();
        tree.mark_layout_dirty(root);
        assert!(layout_if_needed(&mut tree, &mut solver, viewport, &mut fonts).is_some());
        assert_eq!(solver.runs, 2);
    }

    #[test]
    fn rootless_tree_needs_no_layout() {
        let mut fonts = MonospaceFonts::new();
        let mut tree = NodeTree::new();
        let mut solver = StackSolver::default();
        assert_eq!(
            layout_if_needed(&mut tree, &mut solver, Size::new(1.0, 1.0), &mut fonts),
            None
        );
        assert_eq!(solver.runs, 0);
    }
}
