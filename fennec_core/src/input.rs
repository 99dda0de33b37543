// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-testing and bubbling event dispatch.
//!
//! Routing is synchronous and stateless between events. Hit-testing uses the
//! geometry of the last layout pass. Clipping is a paint-time concept only:
//! a point outside a node's box never reaches its descendants, whatever their
//! own boxes say.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::bridge::HandlerStore;
use crate::node::{NodeId, NodeTree};

/// Classification of a platform input event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Pointer button press.
    Click,
    /// Pointer motion.
    Move,
    /// Keyboard key.
    Key,
    /// Anything the platform translator did not classify.
    #[default]
    Unknown,
}

/// A platform-neutral input event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputEvent {
    /// Event classification.
    pub kind: InputKind,
    /// Pointer position in tree coordinates.
    pub position: Point,
    /// Pointer button, for clicks.
    pub button: u8,
    /// Platform keycode, for keys.
    pub keycode: u32,
}

impl InputEvent {
    /// A primary-button click at `(x, y)`.
    #[must_use]
    pub fn click(x: f64, y: f64) -> Self {
        Self {
            kind: InputKind::Click,
            position: Point::new(x, y),
            button: 1,
            keycode: 0,
        }
    }

    /// Pointer motion to `(x, y)`.
    #[must_use]
    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self {
            kind: InputKind::Move,
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    /// A key event.
    #[must_use]
    pub fn key(keycode: u32) -> Self {
        Self {
            kind: InputKind::Key,
            keycode,
            ..Self::default()
        }
    }

    /// Whether the event carries a meaningful pointer position.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, InputKind::Click | InputKind::Move)
    }
}

/// Whether `rect` contains `point`, all four edges inclusive.
fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

impl NodeTree {
    /// Returns the deepest, topmost node under `point` within `node`'s subtree.
    ///
    /// Children are scanned last to first (later siblings paint on top); the
    /// first child subtree with a hit wins. Without a child hit the node
    /// itself is returned. Returns `None` if `point` is outside `node`'s box.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    #[must_use]
    pub fn hit_test(&self, node: NodeId, point: Point) -> Option<NodeId> {
        self.validate(node);
        self.hit_test_at(node.idx, point).map(|idx| self.id_at(idx))
    }

    fn hit_test_at(&self, idx: u32, point: Point) -> Option<u32> {
        if !contains_inclusive(self.geometry[idx as usize], point) {
            return None;
        }
        self.children[idx as usize]
            .iter()
            .rev()
            .find_map(|&c| self.hit_test_at(c, point))
            .or(Some(idx))
    }

    /// Resolves the bubbling chain `[target, parent, ..., root]` for an event.
    ///
    /// Empty for non-pointer events and for points outside `root`.
    #[must_use]
    pub fn resolve_chain(&self, root: NodeId, event: &InputEvent) -> Vec<NodeId> {
        if !event.is_pointer() {
            return Vec::new();
        }
        let Some(target) = self.hit_test(root, event.position) else {
            return Vec::new();
        };
        core::iter::once(target)
            .chain(self.ancestors(target))
            .collect()
    }
}

/// Dispatches a click along a resolved chain.
///
/// The first node in the chain with a bound handler is invoked and dispatch
/// stops there, whatever the handler does. A handler error is logged and
/// swallowed; the event still counts as handled. Non-click events and chains
/// without any binding are unhandled.
///
/// Returns the node whose handler ran, if any.
pub fn dispatch(
    tree: &NodeTree,
    event: &InputEvent,
    chain: &[NodeId],
    handlers: &mut dyn HandlerStore,
) -> Option<NodeId> {
    if event.kind != InputKind::Click {
        return None;
    }
    let (node, handler) = chain
        .iter()
        .find_map(|&id| tree.handler(id).map(|h| (id, h)))?;
    if let Err(err) = handlers.invoke(handler) {
        log::warn!("click handler {handler:?} on {node:?} failed: {err}");
    }
    Some(node)
}
