// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building nodes from descriptions.

use core::fmt;

use super::id::{NodeId, NodeKind};
use super::store::NodeTree;
use super::text::TextContent;
use crate::bridge::{CallbackHandle, HandlerStore};
use crate::description::{BuildError, Description};
use crate::font::{FontId, FontQuery, FontService};
use crate::style::Style;

/// Host services passed into build, reconcile, and layout.
///
/// Replaces process-wide singletons: the host constructs the services at
/// startup, owns their lifetime, and lends them to each call.
pub struct Context<'a> {
    /// Font resolution and measurement.
    pub fonts: &'a mut dyn FontService,
    /// Handler storage; receives releases for freed or rebound callbacks.
    pub handlers: &'a mut dyn HandlerStore,
}

impl<'a> Context<'a> {
    /// Bundles the host services.
    pub fn new(fonts: &'a mut dyn FontService, handlers: &'a mut dyn HandlerStore) -> Self {
        Self { fonts, handlers }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

impl NodeTree {
    /// Builds a detached subtree from a description.
    ///
    /// Every omitted style property takes its default. Every built node starts
    /// layout- and paint-dirty.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the description violates the schema; nothing
    /// is allocated in that case.
    pub fn build(&mut self, desc: &Description, cx: &mut Context<'_>) -> Result<NodeId, BuildError> {
        desc.validate()?;
        let idx = self.build_node(desc, cx);
        Ok(self.id_at(idx))
    }

    /// Builds a tree from a description and makes it the root.
    ///
    /// Any previous root is freed first, releasing its callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the description violates the schema; the
    /// existing tree is left untouched in that case.
    pub fn mount(&mut self, desc: &Description, cx: &mut Context<'_>) -> Result<NodeId, BuildError> {
        desc.validate()?;
        if let Some(old) = self.root() {
            self.free(old, cx.handlers);
        }
        let idx = self.build_node(desc, cx);
        let id = self.id_at(idx);
        self.set_root(id);
        Ok(id)
    }

    /// Builds an already validated description.
    pub(crate) fn build_node(&mut self, desc: &Description, cx: &mut Context<'_>) -> u32 {
        let kind = NodeKind::from_tag(&desc.kind);
        let idx = self.alloc(kind);
        let i = idx as usize;

        let style = Style::from_props(&desc.props);
        if kind == NodeKind::Text {
            let font = resolve_font(cx.fonts, &style.layout.font, idx);
            self.text[i] = Some(TextContent::new(
                desc.text.clone().unwrap_or_default(),
                font,
            ));
        }
        self.style[i] = style;
        self.key[i].clone_from(&desc.key);
        self.callback[i] = desc.on_click.map(CallbackHandle::bind);

        for child in &desc.children {
            let c = self.build_node(child, cx);
            self.append_child(idx, c);
        }

        self.mark_layout_at(idx);
        self.mark_paint_at(idx);
        idx
    }
}

/// Resolves a text node's font, logging when nothing matches.
pub(crate) fn resolve_font(fonts: &mut dyn FontService, query: &FontQuery, idx: u32) -> Option<FontId> {
    let font = fonts.resolve(query);
    if font.is_none() {
        log::warn!(
            "no font for family {:?} size {:?}; text node {idx} renders without text",
            query.family,
            query.size
        );
    }
    font
}
