// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render commands: the ordered paint primitives for one frame.

use alloc::string::String;
use alloc::vec::Vec;

use fennec_core::font::FontId;
use fennec_core::style::{Color, TextDecoration};
use kurbo::{Point, Rect};

/// A single paint primitive.
///
/// Commands are produced back to front; a later command paints over an
/// earlier one.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Fill an axis-aligned rectangle.
    FillRect {
        /// Absolute rectangle.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Draw one line of text with its baseline at `origin.y`.
    DrawText {
        /// Line content.
        text: String,
        /// Font to shape with.
        font: FontId,
        /// Left end of the baseline.
        origin: Point,
        /// Text color.
        color: Color,
        /// Decoration to draw with the glyphs.
        decoration: TextDecoration,
    },
    /// Intersect the current clip with `rect` until the matching pop.
    PushClip {
        /// Absolute clip rectangle.
        rect: Rect,
    },
    /// Restore the clip in effect before the matching push.
    PopClip,
}

/// An ordered list of render commands for a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Clears the list for reuse, keeping its allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// The commands in paint order.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Iterates the commands in paint order.
    pub fn iter(&self) -> core::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of clip scopes opened.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.iter()
            .filter(|c| matches!(c, RenderCommand::PushClip { .. }))
            .count()
    }

    /// Whether every push has a matching pop and no pop comes first.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0_usize;
        for command in self {
            match command {
                RenderCommand::PushClip { .. } => depth += 1,
                RenderCommand::PopClip => {
                    let Some(d) = depth.checked_sub(1) else {
                        return false;
                    };
                    depth = d;
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a RenderCommand;
    type IntoIter = core::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
