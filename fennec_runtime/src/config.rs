// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame loop configuration.

use kurbo::Size;

/// Configuration for the [`FrameLoop`](crate::FrameLoop).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Size the root node is laid out to fill.
    pub viewport: Size,
}

impl RuntimeConfig {
    /// Viewport used when the host does not pick one.
    pub const DEFAULT_VIEWPORT: Size = Size::new(800.0, 600.0);

    /// Configuration with the given viewport.
    #[must_use]
    pub const fn new(viewport: Size) -> Self {
        Self { viewport }
    }

    /// Replaces the viewport.
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VIEWPORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_eight_hundred_by_six_hundred() {
        let config = RuntimeConfig::default();
        assert_eq!(config.viewport, Size::new(800.0, 600.0));
        let config = config.with_viewport(Size::new(320.0, 240.0));
        assert_eq!(config.viewport.width, 320.0);
    }
}
