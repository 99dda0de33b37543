// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text node content and the wrapped-line cache.

use alloc::string::String;
use alloc::vec::Vec;

use super::id::NodeId;
use super::store::NodeTree;
use crate::font::{FontId, FontService, TextLine};

/// Per-node text state. Present only on text nodes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TextContent {
    pub(crate) content: String,
    /// Weak handle; the font service owns the font.
    pub(crate) font: Option<FontId>,
    /// Cleared whenever content or font changes.
    pub(crate) layout: Option<TextLayout>,
}

impl TextContent {
    pub(crate) fn new(content: String, font: Option<FontId>) -> Self {
        Self {
            content,
            font,
            layout: None,
        }
    }
}

/// Wrapped lines of a text node, computed after a layout solve.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    /// Lines in display order, each with its measured width.
    pub lines: Vec<TextLine>,
    /// Distance between consecutive baselines.
    pub line_height: f64,
    /// Distance from the top of the content box to the first baseline.
    pub ascent: f64,
    /// Content width the lines were wrapped to.
    pub max_width: f64,
}

impl NodeTree {
    /// Refreshes the wrapped-line cache of every text node under `root`.
    ///
    /// Runs after the layout solver has written geometry. A node is re-wrapped
    /// when it has no cache or its content width (geometry width minus
    /// horizontal padding) changed. Nodes without a resolved font or without
    /// content end up with no lines.
    ///
    /// Returns the number of nodes that were re-wrapped.
    pub fn update_text_layout(&mut self, root: NodeId, fonts: &mut dyn FontService) -> usize {
        let nodes: Vec<u32> = self
            .depth_first(root)
            .map(|(id, _)| id.idx)
            .filter(|&idx| self.text[idx as usize].is_some())
            .collect();

        let mut refreshed = 0;
        for idx in nodes {
            let i = idx as usize;
            let padding = self.style[i].layout.padding;
            let max_width = self.geometry[i].width() - padding.x0 - padding.x1;
            let Some(text) = self.text[i].as_mut() else {
                continue;
            };
            let Some(font) = text.font.filter(|_| !text.content.is_empty()) else {
                text.layout = None;
                continue;
            };
            if text
                .layout
                .as_ref()
                .is_some_and(|cached| cached.max_width == max_width)
            {
                continue;
            }
            let Some(metrics) = fonts.metrics(font) else {
                log::warn!("no metrics for {font:?}; text node {idx} renders without text");
                text.layout = None;
                continue;
            };
            text.layout = Some(TextLayout {
                lines: fonts.wrap(&text.content, font, max_width),
                line_height: metrics.line_height,
                ascent: metrics.ascent,
                max_width,
            });
            refreshed += 1;
        }
        refreshed
    }
}
