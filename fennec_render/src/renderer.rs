// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for drawing command lists.

use alloc::vec::Vec;

use kurbo::Size;

use crate::command::CommandList;

/// Draws command lists onto a platform surface.
///
/// The frame loop calls the three methods in order once per frame:
///
/// ```rust,ignore
/// renderer.begin_frame(viewport);
/// renderer.submit(&commands);
/// renderer.end_frame();
/// ```
///
/// GPU, terminal, and test renderers all implement this trait, so the frame
/// loop stays generic over the backend.
pub trait Renderer {
    /// Prepares a frame of the given size.
    fn begin_frame(&mut self, viewport: Size);

    /// Draws `commands` in order.
    fn submit(&mut self, commands: &CommandList);

    /// Finishes and presents the frame.
    fn end_frame(&mut self);
}

/// A [`Renderer`] that keeps a copy of every submitted list.
///
/// Useful for headless hosts and for asserting on output in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    /// Submitted lists, oldest first.
    pub frames: Vec<CommandList>,
    /// Viewport of the most recent `begin_frame`.
    pub viewport: Option<Size>,
    open: bool,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently submitted list.
    #[must_use]
    pub fn last(&self) -> Option<&CommandList> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, viewport: Size) {
        debug_assert!(!self.open, "begin_frame called twice without end_frame");
        self.open = true;
        self.viewport = Some(viewport);
    }

    fn submit(&mut self, commands: &CommandList) {
        debug_assert!(self.open, "submit outside begin_frame/end_frame");
        self.frames.push(commands.clone());
    }

    fn end_frame(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::RenderCommand;

    #[test]
    fn records_each_submitted_frame() {
        let mut renderer = RecordingRenderer::new();
        let mut list = CommandList::new();
        list.push(RenderCommand::PushClip {
            rect: Rect::new(0.0, 0.0, 4.0, 4.0),
        });
        list.push(RenderCommand::PopClip);

        for _ in 0..2 {
            renderer.begin_frame(Size::new(4.0, 4.0));
            renderer.submit(&list);
            renderer.end_frame();
        }
        assert_eq!(renderer.frames.len(), 2);
        assert_eq!(renderer.last(), Some(&list));
        assert_eq!(renderer.viewport, Some(Size::new(4.0, 4.0)));
    }
}
