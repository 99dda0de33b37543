// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and dirty state.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, NodeId, NodeKind};
use super::text::{TextContent, TextLayout};
use super::traverse::{Ancestors, Children, DepthFirst};
use crate::bridge::{CallbackHandle, HandlerId, HandlerStore};
use crate::dirty;
use crate::font::FontId;
use crate::style::Style;

/// Struct-of-arrays storage for a retained node tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Freed nodes are recycled via a free list, and
/// generation counters make handles to freed nodes stale.
///
/// Children are exclusively owned: [`free`](Self::free) destroys the whole
/// subtree and releases every callback handle in it exactly once.
#[derive(Debug)]
pub struct NodeTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Declared properties (set by build and reconcile) --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) key: Vec<Option<String>>,
    pub(crate) style: Vec<Style>,
    pub(crate) text: Vec<Option<TextContent>>,
    pub(crate) callback: Vec<Option<CallbackHandle>>,

    // -- Computed properties (written by the layout solver) --
    pub(crate) geometry: Vec<Rect>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    pub(crate) root: u32,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            kind: Vec::new(),
            key: Vec::new(),
            style: Vec::new(),
            text: Vec::new(),
            callback: Vec::new(),
            geometry: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            root: INVALID,
        }
    }

    // -- Allocation API --

    /// Allocates a detached node with default style and no content.
    pub(crate) fn alloc(&mut self, kind: NodeKind) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.kind[i] = kind;
            self.key[i] = None;
            self.style[i] = Style::default();
            self.text[i] = None;
            self.callback[i] = None;
            self.geometry[i] = Rect::ZERO;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.kind.push(kind);
            self.key.push(None);
            self.style.push(Style::default());
            self.text.push(None);
            self.callback.push(None);
            self.geometry.push(Rect::ZERO);
            self.generation.push(0);
            idx
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns whether the tree holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frees a node and its whole subtree.
    ///
    /// Descendants are destroyed leaves-first. Every bound callback handle in
    /// the subtree is released through `handlers` exactly once. If the node
    /// is attached, it is removed from its parent's children and the parent
    /// is marked layout-dirty; if it is the root, the tree becomes rootless.
    ///
    /// Returns `false` without touching anything if `id` is stale, so a second
    /// free of the same handle never releases a callback twice.
    pub fn free(&mut self, id: NodeId, handlers: &mut dyn HandlerStore) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.idx;
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.children[p as usize].retain(|&c| c != idx);
            self.dirty.remove_dependency(p, idx, dirty::LAYOUT);
            self.dirty.remove_dependency(p, idx, dirty::PAINT);
            self.mark_layout_at(p);
        }
        if self.root == idx {
            self.root = INVALID;
        }
        self.destroy_subtree(idx, handlers);
        true
    }

    /// Destroys `idx` and its descendants without touching `idx`'s parent
    /// list. Children go before their parents.
    pub(crate) fn destroy_subtree(&mut self, idx: u32, handlers: &mut dyn HandlerStore) -> usize {
        let mut order = Vec::new();
        let mut stack = Vec::from([idx]);
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend_from_slice(&self.children[i as usize]);
        }
        for &i in order.iter().rev() {
            self.destroy_slot(i, handlers);
        }
        order.len()
    }

    fn destroy_slot(&mut self, idx: u32, handlers: &mut dyn HandlerStore) {
        let i = idx as usize;
        if let Some(handle) = self.callback[i].take() {
            handle.release(handlers);
        }
        self.parent[i] = INVALID;
        self.children[i].clear();
        self.key[i] = None;
        self.text[i] = None;

        // Drops every dependency edge and pending mark for the slot.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
    }

    // -- Topology API --

    /// Returns the root node, if the tree has one.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        (self.root != INVALID).then(|| self.id_at(self.root))
    }

    /// Makes a detached node the root of the tree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has a parent.
    pub fn set_root(&mut self, id: NodeId) {
        self.validate(id);
        assert!(
            self.parent[id.idx as usize] == INVALID,
            "root must not have a parent"
        );
        self.root = id.idx;
        self.mark_layout_at(id.idx);
        self.mark_paint_at(id.idx);
    }

    /// Appends a detached node to `parent`'s children.
    pub(crate) fn append_child(&mut self, parent: u32, child: u32) {
        self.parent[child as usize] = parent;
        self.children[parent as usize].push(child);
        self.link_dirty(parent, child);
    }

    /// Sets the parent back-reference and dependency edges without touching
    /// the parent's children list.
    pub(crate) fn link_dirty(&mut self, parent: u32, child: u32) {
        // Parent depends on child: marks on the child bubble up.
        let _ = self.dirty.add_dependency(parent, child, dirty::LAYOUT);
        let _ = self.dirty.add_dependency(parent, child, dirty::PAINT);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns an iterator over the ancestors of a node, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// Returns a pre-order iterator over the subtree rooted at `id`.
    #[must_use]
    pub fn depth_first(&self, id: NodeId) -> DepthFirst<'_> {
        self.validate(id);
        DepthFirst::new(self, id.idx)
    }

    // -- Property getters --

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the sibling key of a node.
    #[must_use]
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.key[id.idx as usize].as_deref()
    }

    /// Returns the style of a node.
    #[must_use]
    pub fn style(&self, id: NodeId) -> &Style {
        self.validate(id);
        &self.style[id.idx as usize]
    }

    /// Returns the text content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.text[id.idx as usize]
            .as_ref()
            .map(|t| t.content.as_str())
    }

    /// Returns the resolved font of a text node.
    #[must_use]
    pub fn font(&self, id: NodeId) -> Option<FontId> {
        self.validate(id);
        self.text[id.idx as usize].as_ref().and_then(|t| t.font)
    }

    /// Returns the cached wrapped lines of a text node.
    ///
    /// Only present after [`update_text_layout`](Self::update_text_layout).
    #[must_use]
    pub fn text_layout(&self, id: NodeId) -> Option<&TextLayout> {
        self.validate(id);
        self.text[id.idx as usize]
            .as_ref()
            .and_then(|t| t.layout.as_ref())
    }

    /// Returns the bound click handler of a node.
    #[must_use]
    pub fn handler(&self, id: NodeId) -> Option<HandlerId> {
        self.validate(id);
        self.callback[id.idx as usize]
            .as_ref()
            .map(CallbackHandle::id)
    }

    /// Returns the absolute geometry of a node.
    ///
    /// Only meaningful after a layout pass following the last layout-dirty
    /// transition.
    #[must_use]
    pub fn geometry(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.geometry[id.idx as usize]
    }

    /// Writes the absolute geometry of a node. Called by layout solvers.
    ///
    /// Does not mark anything dirty: geometry is an output, not an input.
    pub fn set_geometry(&mut self, id: NodeId, rect: Rect) {
        self.validate(id);
        self.geometry[id.idx as usize] = rect;
    }

    // -- Dirty API --

    /// Marks a node and all its ancestors layout-dirty.
    pub fn mark_layout_dirty(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_layout_at(id.idx);
    }

    /// Marks a node and all its ancestors paint-dirty.
    pub fn mark_paint_dirty(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_paint_at(id.idx);
    }

    /// Returns whether a node is layout-dirty.
    #[must_use]
    pub fn is_layout_dirty(&self, id: NodeId) -> bool {
        self.validate(id);
        self.dirty.is_dirty(id.idx, dirty::LAYOUT)
    }

    /// Returns whether a node is paint-dirty.
    #[must_use]
    pub fn is_paint_dirty(&self, id: NodeId) -> bool {
        self.validate(id);
        self.dirty.is_dirty(id.idx, dirty::PAINT)
    }

    /// Returns whether the root is layout-dirty, i.e. a layout solve is due.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.root != INVALID && self.dirty.is_dirty(self.root, dirty::LAYOUT)
    }

    /// Clears the layout channel, returning the nodes that were dirty.
    ///
    /// Called once the layout solve has covered the whole tree.
    pub fn drain_layout(&mut self) -> Vec<NodeId> {
        self.drain(dirty::LAYOUT)
    }

    /// Clears the paint channel, returning the nodes that were dirty.
    pub fn drain_paint(&mut self) -> Vec<NodeId> {
        self.drain(dirty::PAINT)
    }

    fn drain(&mut self, channel: understory_dirty::Channel) -> Vec<NodeId> {
        let drained: Vec<u32> = self
            .dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect();
        drained
            .into_iter()
            .filter(|&idx| idx < self.len)
            .map(|idx| self.id_at(idx))
            .collect()
    }

    pub(crate) fn mark_layout_at(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::LAYOUT, &EagerPolicy);
    }

    pub(crate) fn mark_paint_at(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::PAINT, &EagerPolicy);
    }

    // -- Internal helpers --

    /// Builds a handle for a live slot.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::bridge::testing::RecordingHandlers;

    fn bound(tree: &mut NodeTree, idx: u32, id: u32) {
        tree.callback[idx as usize] = Some(CallbackHandle::bind(HandlerId(id)));
    }

    #[test]
    fn alloc_and_free() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let id = tree.id_at(tree.alloc(NodeKind::Rect));
        assert!(tree.is_alive(id));
        assert_eq!(tree.len(), 1);
        assert!(tree.free(id, &mut handlers));
        assert!(!tree.is_alive(id));
        assert!(tree.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let id1 = tree.id_at(tree.alloc(NodeKind::Rect));
        tree.free(id1, &mut handlers);
        let id2 = tree.id_at(tree.alloc(NodeKind::Text));
        // id2 reuses the same slot but has a different generation.
        assert!(!tree.is_alive(id1));
        assert!(tree.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
        assert_eq!(tree.kind(id2), NodeKind::Text);
    }

    #[test]
    fn append_and_query_children() {
        let mut tree = NodeTree::new();
        let p = tree.alloc(NodeKind::Column);
        let a = tree.alloc(NodeKind::Rect);
        let b = tree.alloc(NodeKind::Rect);
        tree.append_child(p, a);
        tree.append_child(p, b);

        let parent = tree.id_at(p);
        let kids: Vec<_> = tree.children(parent).collect();
        assert_eq!(kids, vec![tree.id_at(a), tree.id_at(b)]);
        assert_eq!(tree.parent(tree.id_at(a)), Some(parent));
        assert_eq!(tree.parent(parent), None);
    }

    #[test]
    fn free_releases_subtree_handles_once() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let root = tree.alloc(NodeKind::Column);
        let panel = tree.alloc(NodeKind::Row);
        let button = tree.alloc(NodeKind::Rect);
        tree.append_child(root, panel);
        tree.append_child(panel, button);
        bound(&mut tree, panel, 1);
        bound(&mut tree, button, 2);

        let panel_id = tree.id_at(panel);
        assert!(tree.free(panel_id, &mut handlers));
        // Leaves first.
        assert_eq!(handlers.released, vec![HandlerId(2), HandlerId(1)]);
        assert_eq!(tree.children(tree.id_at(root)).len(), 0);
        assert_eq!(tree.len(), 1);

        // A second free is a no-op.
        assert!(!tree.free(panel_id, &mut handlers));
        assert_eq!(handlers.released.len(), 2);
    }

    #[test]
    fn freeing_a_child_marks_parent_layout_dirty() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let root = tree.alloc(NodeKind::Column);
        let child = tree.alloc(NodeKind::Rect);
        tree.append_child(root, child);
        tree.set_root(tree.id_at(root));
        let _ = tree.drain_layout();
        assert!(!tree.needs_layout());

        tree.free(tree.id_at(child), &mut handlers);
        assert!(tree.needs_layout());
    }

    #[test]
    fn freeing_the_root_empties_the_tree() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let root = tree.alloc(NodeKind::Column);
        let child = tree.alloc(NodeKind::Rect);
        tree.append_child(root, child);
        tree.set_root(tree.id_at(root));

        assert!(tree.free(tree.id_at(root), &mut handlers));
        assert_eq!(tree.root(), None);
        assert!(tree.is_empty());
        assert!(!tree.needs_layout());
    }

    #[test]
    fn marks_bubble_to_ancestors_only() {
        let mut tree = NodeTree::new();
        let root = tree.alloc(NodeKind::Column);
        let left = tree.alloc(NodeKind::Row);
        let right = tree.alloc(NodeKind::Row);
        let leaf = tree.alloc(NodeKind::Text);
        tree.append_child(root, left);
        tree.append_child(root, right);
        tree.append_child(left, leaf);
        tree.set_root(tree.id_at(root));
        let _ = tree.drain_layout();
        let _ = tree.drain_paint();

        tree.mark_layout_dirty(tree.id_at(leaf));
        assert!(tree.is_layout_dirty(tree.id_at(leaf)));
        assert!(tree.is_layout_dirty(tree.id_at(left)));
        assert!(tree.is_layout_dirty(tree.id_at(root)));
        assert!(!tree.is_layout_dirty(tree.id_at(right)));
        assert!(!tree.is_paint_dirty(tree.id_at(root)));

        let drained = tree.drain_layout();
        assert_eq!(drained.len(), 3);
        assert!(!tree.needs_layout());
    }

    #[test]
    fn paint_marks_are_independent() {
        let mut tree = NodeTree::new();
        let root = tree.alloc(NodeKind::Column);
        let child = tree.alloc(NodeKind::Rect);
        tree.append_child(root, child);
        tree.set_root(tree.id_at(root));
        let _ = tree.drain_layout();
        let _ = tree.drain_paint();

        tree.mark_paint_dirty(tree.id_at(child));
        assert!(tree.is_paint_dirty(tree.id_at(root)));
        assert!(!tree.needs_layout());
        assert_eq!(tree.drain_paint().len(), 2);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn freed_handle_panics_on_kind() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let id = tree.id_at(tree.alloc(NodeKind::Rect));
        tree.free(id, &mut handlers);
        let _ = tree.kind(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn freed_handle_panics_on_set_geometry() {
        let mut tree = NodeTree::new();
        let mut handlers = RecordingHandlers::default();
        let id = tree.id_at(tree.alloc(NodeKind::Rect));
        tree.free(id, &mut handlers);
        tree.set_geometry(id, Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "root must not have a parent")]
    fn attached_node_cannot_be_root() {
        let mut tree = NodeTree::new();
        let p = tree.alloc(NodeKind::Column);
        let c = tree.alloc(NodeKind::Rect);
        tree.append_child(p, c);
        tree.set_root(tree.id_at(c));
    }
}
