// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diffing a new description against the live tree.
//!
//! Reconciliation patches the tree in place and preserves node identity for
//! every matched entry. Each level is processed in three steps:
//!
//! 1. **Match.** Keyed entries take the first unused old child with an equal
//!    key, scanning left to right. Then each *unkeyed* entry that is still
//!    unmatched takes the old child at the same index, if that child is
//!    unused and itself unkeyed. Keyed entries never fall back to position.
//! 2. **Rebuild the level.** Unused old children are freed (releasing their
//!    callbacks). Unmatched entries are built fresh, attached, and start fully
//!    dirty. Matched nodes are patched field by field. If the resulting child
//!    list differs from the old one in membership or order, the parent is
//!    marked layout-dirty.
//! 3. **Recurse** into matched children with their entries' child lists.
//!
//! Matching is order-sensitive when keyed and unkeyed entries are interleaved
//! (a keyed match can occupy the index an unkeyed entry would have reused).
//! That behavior is deliberate and pinned by the tests below.
//!
//! Callback releases are held back until the pass is done. An id is released
//! only if no node under the root binds it afterwards, so bindings that swap
//! or move between nodes stay live.
//!
//! The whole description is validated before the first mutation.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;

use super::build::{Context, resolve_font};
use super::id::{NodeId, NodeKind};
use super::store::NodeTree;
use super::text::TextContent;
use crate::bridge::{CallbackHandle, HandlerId, HandlerStore, ScriptError};
use crate::description::{BuildError, Description};
use crate::style::Style;

/// What a reconcile pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Nodes matched to an entry and patched in place.
    pub reused: u32,
    /// Nodes built fresh (including whole new subtrees).
    pub built: u32,
    /// Nodes freed (including whole removed subtrees).
    pub freed: u32,
    /// Patched nodes that raised layout-dirty.
    pub layout_changed: u32,
    /// Patched nodes that raised paint-dirty.
    pub paint_changed: u32,
}

impl NodeTree {
    /// Reconciles the subtree at `root` against a new description.
    ///
    /// `root` itself is always patched against `desc`, whatever its key.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if `desc` violates the schema. The tree is not
    /// touched in that case.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale.
    pub fn reconcile(
        &mut self,
        root: NodeId,
        desc: &Description,
        cx: &mut Context<'_>,
    ) -> Result<ReconcileStats, BuildError> {
        self.validate(root);
        desc.validate()?;
        let mut stats = ReconcileStats::default();
        let mut deferred = DeferredRelease {
            inner: &mut *cx.handlers,
            pending: Vec::new(),
        };
        {
            let mut cx = Context::new(&mut *cx.fonts, &mut deferred);
            self.patch(root.idx, desc, &mut cx, &mut stats);
            stats.reused += 1;
            self.reconcile_children(root.idx, &desc.children, &mut cx, &mut stats);
        }
        let DeferredRelease { pending, .. } = deferred;

        // Ids that moved to another node stay live.
        let live: BTreeSet<HandlerId> = self
            .depth_first(root)
            .filter_map(|(id, _)| self.handler(id))
            .collect();
        let mut released = BTreeSet::new();
        for id in pending {
            if !live.contains(&id) && released.insert(id) {
                cx.handlers.release(id);
            }
        }
        Ok(stats)
    }

    fn reconcile_children(
        &mut self,
        idx: u32,
        entries: &[Description],
        cx: &mut Context<'_>,
        stats: &mut ReconcileStats,
    ) {
        let old = core::mem::take(&mut self.children[idx as usize]);
        let (matches, used) = {
            let old_keys: Vec<Option<&str>> = old
                .iter()
                .map(|&c| self.key[c as usize].as_deref())
                .collect();
            match_children(&old_keys, entries)
        };

        let mut topology_changed = false;
        for (&c, _) in old.iter().zip(&used).filter(|(_, used)| !**used) {
            let freed = self.destroy_subtree(c, cx.handlers);
            stats.freed += u32::try_from(freed).unwrap_or(u32::MAX);
            topology_changed = true;
        }

        let mut new_children = Vec::with_capacity(entries.len());
        for (entry, matched) in entries.iter().zip(&matches) {
            let c = match *matched {
                Some(j) => {
                    let c = old[j];
                    self.patch(c, entry, cx, stats);
                    stats.reused += 1;
                    c
                }
                None => {
                    let c = self.build_node(entry, cx);
                    stats.built += self.subtree_len(c);
                    self.parent[c as usize] = idx;
                    self.link_dirty(idx, c);
                    self.mark_layout_at(c);
                    self.mark_paint_at(c);
                    topology_changed = true;
                    c
                }
            };
            new_children.push(c);
        }

        // Pure reorders change no field but still move things on screen.
        if new_children != old {
            topology_changed = true;
        }
        self.children[idx as usize] = new_children;
        if topology_changed {
            self.mark_layout_at(idx);
        }

        for (entry, matched) in entries.iter().zip(&matches) {
            if let Some(j) = *matched {
                self.reconcile_children(old[j], &entry.children, cx, stats);
            }
        }
    }

    /// Patches one node's fields, raising dirty classes for what changed.
    fn patch(&mut self, idx: u32, entry: &Description, cx: &mut Context<'_>, stats: &mut ReconcileStats) {
        let i = idx as usize;
        let kind = NodeKind::from_tag(&entry.kind);
        let style = Style::from_props(&entry.props);
        let change = self.style[i].diff(&style);
        let mut layout = change.layout;

        if self.kind[i] != kind {
            self.kind[i] = kind;
            layout = true;
        }

        if kind == NodeKind::Text {
            let content = entry.text.as_deref().unwrap_or_default();
            let font_changed = self.style[i].layout.font != style.layout.font;
            match self.text[i].as_mut() {
                Some(text) => {
                    if text.content != content {
                        text.content.clear();
                        text.content.push_str(content);
                        text.layout = None;
                        layout = true;
                    }
                    if font_changed {
                        let font = resolve_font(cx.fonts, &style.layout.font, idx);
                        if font != text.font {
                            text.font = font;
                            text.layout = None;
                            layout = true;
                        }
                    }
                }
                None => {
                    let font = resolve_font(cx.fonts, &style.layout.font, idx);
                    self.text[i] = Some(TextContent::new(content.into(), font));
                    layout = true;
                }
            }
        } else if self.text[i].take().is_some() {
            layout = true;
        }

        self.style[i] = style;
        if self.key[i] != entry.key {
            self.key[i].clone_from(&entry.key);
        }

        // Rebinding is not a visual change.
        if self.callback[i].as_ref().map(CallbackHandle::id) != entry.on_click {
            if let Some(previous) = self.callback[i].take() {
                previous.release(cx.handlers);
            }
            self.callback[i] = entry.on_click.map(CallbackHandle::bind);
        }

        if layout {
            self.mark_layout_at(idx);
            stats.layout_changed += 1;
        }
        if change.paint {
            self.mark_paint_at(idx);
            stats.paint_changed += 1;
        }
    }

    fn subtree_len(&self, idx: u32) -> u32 {
        let mut count = 0;
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.children[i as usize]);
        }
        count
    }
}

/// Holds back releases until a reconcile pass is complete.
///
/// Handlers can move between nodes within one pass (swapped or reordered
/// bindings). Only ids that no node under the reconciled root binds afterwards
/// are released, each once.
struct DeferredRelease<'a> {
    inner: &'a mut dyn HandlerStore,
    pending: Vec<HandlerId>,
}

impl HandlerStore for DeferredRelease<'_> {
    fn invoke(&mut self, id: HandlerId) -> Result<(), ScriptError> {
        self.inner.invoke(id)
    }

    fn release(&mut self, id: HandlerId) {
        self.pending.push(id);
    }
}

/// Matches new entries to old children.
///
/// Returns, per entry, the index of the matched old child, and per old child
/// whether it was used.
fn match_children(old_keys: &[Option<&str>], entries: &[Description]) -> (Vec<Option<usize>>, Vec<bool>) {
    let mut used = vec![false; old_keys.len()];
    let mut matches = vec![None; entries.len()];

    for (i, entry) in entries.iter().enumerate() {
        let Some(key) = entry.key.as_deref() else {
            continue;
        };
        if entries[..i].iter().any(|e| e.key.as_deref() == Some(key)) {
            log::warn!("duplicate sibling key {key:?}; each entry takes the first unused match");
        }
        if let Some(j) = (0..old_keys.len()).find(|&j| !used[j] && old_keys[j] == Some(key)) {
            used[j] = true;
            matches[i] = Some(j);
        }
    }

    for (i, entry) in entries.iter().enumerate() {
        if entry.key.is_none() && i < old_keys.len() && !used[i] && old_keys[i].is_none() {
            used[i] = true;
            matches[i] = Some(i);
        }
    }

    (matches, used)
}
