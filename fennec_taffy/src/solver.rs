// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The taffy-backed layout solver.

use core::fmt;

use fennec_core::font::FontService;
use fennec_core::layout::LayoutSolver;
use fennec_core::node::{NodeId, NodeKind, NodeTree};
use kurbo::{Point, Rect, Vec2};
use taffy::{AvailableSpace, Dimension, Size, TaffyError, TaffyTree};

use crate::convert::{self, px};

/// Wrap width used when taffy asks for the unconstrained (max-content) size.
const UNCONSTRAINED: f64 = 999_999.0;

/// One node of the mirrored tree, in preorder.
#[derive(Clone, Copy, Debug)]
struct Mirrored {
    id: NodeId,
    node: taffy::NodeId,
    /// Position of the parent in the preorder list.
    parent: Option<usize>,
}

/// A [`LayoutSolver`] running taffy's flexbox algorithm.
///
/// The taffy tree is rebuilt from scratch on every solve; its allocations
/// are kept between solves.
pub struct TaffySolver {
    taffy: TaffyTree<NodeId>,
    mirrored: Vec<Mirrored>,
    origins: Vec<Point>,
}

impl fmt::Debug for TaffySolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaffySolver")
            .field("nodes", &self.mirrored.len())
            .finish_non_exhaustive()
    }
}

impl Default for TaffySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TaffySolver {
    /// Creates a solver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            taffy: TaffyTree::new(),
            mirrored: Vec::new(),
            origins: Vec::new(),
        }
    }

    fn try_solve(
        &mut self,
        tree: &mut NodeTree,
        root: NodeId,
        viewport: kurbo::Size,
        fonts: &mut dyn FontService,
    ) -> Result<(), TaffyError> {
        self.taffy.clear();
        self.mirrored.clear();
        let taffy_root = self.mirror(tree, root, None)?;

        let mut root_style = self.taffy.style(taffy_root)?.clone();
        root_style.size = Size {
            width: Dimension::Length(px(viewport.width)),
            height: Dimension::Length(px(viewport.height)),
        };
        self.taffy.set_style(taffy_root, root_style)?;

        let available = Size {
            width: AvailableSpace::Definite(px(viewport.width)),
            height: AvailableSpace::Definite(px(viewport.height)),
        };
        let view: &NodeTree = tree;
        self.taffy.compute_layout_with_measure(
            taffy_root,
            available,
            |known, available, _, context, _| match context {
                Some(id) => measure_text(view, &mut *fonts, *id, known, available),
                None => known.unwrap_or(Size::ZERO),
            },
        )?;

        self.origins.clear();
        for m in &self.mirrored {
            let layout = self.taffy.layout(m.node)?;
            let base = m
                .parent
                .map_or(Point::ZERO, |p| self.origins[p]);
            let origin = base
                + Vec2::new(
                    f64::from(layout.location.x),
                    f64::from(layout.location.y),
                );
            self.origins.push(origin);
            let size = kurbo::Size::new(
                f64::from(layout.size.width),
                f64::from(layout.size.height),
            );
            tree.set_geometry(m.id, Rect::from_origin_size(origin, size));
        }
        Ok(())
    }

    /// Mirrors the subtree at `id` into the taffy tree, in preorder.
    fn mirror(&mut self, tree: &NodeTree, id: NodeId, parent: Option<usize>) -> Result<taffy::NodeId, TaffyError> {
        let kind = tree.kind(id);
        let style = convert::style(kind, &tree.style(id).layout);
        let node = if kind == NodeKind::Text {
            self.taffy.new_leaf_with_context(style, id)?
        } else {
            self.taffy.new_leaf(style)?
        };
        let slot = self.mirrored.len();
        self.mirrored.push(Mirrored { id, node, parent });
        for child in tree.children(id) {
            let child = self.mirror(tree, child, Some(slot))?;
            self.taffy.add_child(node, child)?;
        }
        Ok(node)
    }
}

impl LayoutSolver for TaffySolver {
    fn solve(&mut self, tree: &mut NodeTree, root: NodeId, viewport: kurbo::Size, fonts: &mut dyn FontService) {
        if let Err(err) = self.try_solve(tree, root, viewport, fonts) {
            log::error!("layout solve failed: {err}; geometry left as is");
        }
    }
}

/// Measures a text node, wrapping to the known or available width.
///
/// Measured sizes are rounded up to whole pixels.
fn measure_text(
    tree: &NodeTree,
    fonts: &mut dyn FontService,
    id: NodeId,
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
) -> Size<f32> {
    if let Size {
        width: Some(width),
        height: Some(height),
    } = known
    {
        return Size { width, height };
    }
    let (Some(text), Some(font)) = (tree.text(id), tree.font(id)) else {
        return known.unwrap_or(Size::ZERO);
    };
    if text.is_empty() {
        return known.unwrap_or(Size::ZERO);
    }

    let max_width = match (known.width, available.width) {
        (Some(width), _) | (None, AvailableSpace::Definite(width)) => f64::from(width),
        (None, AvailableSpace::MinContent) => 0.0,
        (None, AvailableSpace::MaxContent) => UNCONSTRAINED,
    };
    let measured = fonts.measure(text, font, max_width);
    Size {
        width: known.width.unwrap_or(px(measured.width.ceil())),
        height: known.height.unwrap_or(px(measured.height.ceil())),
    }
}

#[cfg(test)]
mod tests {
    use fennec_core::bridge::{HandlerId, HandlerStore, ScriptError};
    use fennec_core::description::Description;
    use fennec_core::font::MonospaceFonts;
    use fennec_core::layout::layout_if_needed;
    use fennec_core::node::Context;

    use super::*;

    struct NoHandlers;

    impl HandlerStore for NoHandlers {
        fn invoke(&mut self, _: HandlerId) -> Result<(), ScriptError> {
            Ok(())
        }
        fn release(&mut self, _: HandlerId) {}
    }

    fn solve(desc: &Description, viewport: (f64, f64)) -> (NodeTree, Vec<NodeId>) {
        // 10px monospace: 5px per glyph, 12.5px lines.
        let mut fonts = MonospaceFonts::with_default_family(10.0);
        let mut tree = NodeTree::new();
        let root = tree
            .mount(desc, &mut Context::new(&mut fonts, &mut NoHandlers))
            .unwrap();
        let mut solver = TaffySolver::new();
        layout_if_needed(
            &mut tree,
            &mut solver,
            kurbo::Size::new(viewport.0, viewport.1),
            &mut fonts,
        )
        .unwrap();
        let order = tree.depth_first(root).map(|(id, _)| id).collect();
        (tree, order)
    }

    fn fixed(w: f64, h: f64) -> Description {
        Description::rect().prop("w", w).prop("h", h)
    }

    #[test]
    fn root_fills_viewport() {
        let (tree, nodes) = solve(&Description::column().prop("w", 10), (320.0, 240.0));
        assert_eq!(tree.geometry(nodes[0]), Rect::new(0.0, 0.0, 320.0, 240.0));
    }

    #[test]
    fn columns_stack_vertically() {
        let desc = Description::column()
            .child(fixed(50.0, 20.0))
            .child(fixed(30.0, 10.0));
        let (tree, nodes) = solve(&desc, (200.0, 100.0));
        assert_eq!(tree.geometry(nodes[1]), Rect::new(0.0, 0.0, 50.0, 20.0));
        assert_eq!(tree.geometry(nodes[2]), Rect::new(0.0, 20.0, 30.0, 30.0));
    }

    #[test]
    fn rows_use_padding_and_gap() {
        let desc = Description::row()
            .prop("padding", 10)
            .prop("gap", 5)
            .child(fixed(20.0, 10.0))
            .child(fixed(20.0, 10.0));
        let (tree, nodes) = solve(&desc, (200.0, 100.0));
        assert_eq!(tree.geometry(nodes[1]), Rect::new(10.0, 10.0, 30.0, 20.0));
        assert_eq!(tree.geometry(nodes[2]), Rect::new(35.0, 10.0, 55.0, 20.0));
    }

    #[test]
    fn geometry_is_absolute() {
        let desc = Description::column().prop("padding", 10).child(
            Description::row()
                .prop("w", 100)
                .prop("h", 50)
                .prop("padding", 5)
                .child(fixed(10.0, 10.0)),
        );
        let (tree, nodes) = solve(&desc, (200.0, 100.0));
        assert_eq!(tree.geometry(nodes[1]), Rect::new(10.0, 10.0, 110.0, 60.0));
        assert_eq!(tree.geometry(nodes[2]), Rect::new(15.0, 15.0, 25.0, 25.0));
    }

    #[test]
    fn percentages_resolve_against_parent() {
        let desc = Description::column().child(Description::rect().prop("w", "50%").prop("h", 10));
        let (tree, nodes) = solve(&desc, (200.0, 100.0));
        assert_eq!(tree.geometry(nodes[1]).width(), 100.0);
    }

    #[test]
    fn flex_grow_fills_remaining_space() {
        let desc = Description::row()
            .child(fixed(50.0, 10.0))
            .child(Description::rect().prop("flexGrow", 1).prop("h", 10));
        let (tree, nodes) = solve(&desc, (200.0, 100.0));
        assert_eq!(tree.geometry(nodes[2]), Rect::new(50.0, 0.0, 200.0, 10.0));
    }

    #[test]
    fn text_is_measured_through_the_font_service() {
        let desc = Description::column().child(Description::text("hello world"));
        let (tree, nodes) = solve(&desc, (200.0, 100.0));
        // 11 glyphs at 5px; one 12.5px line rounded up.
        assert_eq!(tree.geometry(nodes[1]), Rect::new(0.0, 0.0, 55.0, 13.0));
        assert_eq!(tree.text_layout(nodes[1]).unwrap().lines.len(), 1);
    }

    #[test]
    fn narrow_text_wraps() {
        let desc = Description::column().child(Description::text("hello world"));
        let (tree, nodes) = solve(&desc, (40.0, 100.0));
        let rect = tree.geometry(nodes[1]);
        assert!(rect.width() <= 40.0);
        assert_eq!(rect.height(), 25.0);
        assert_eq!(tree.text_layout(nodes[1]).unwrap().lines.len(), 2);
    }
}
