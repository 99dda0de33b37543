// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity types.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`NodeTree`](super::NodeTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is freed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Slot index into the tree's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the tree's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Element category of a node.
///
/// Derived from the description's kind tag. Unknown tags become
/// [`Rect`](Self::Rect), so a typo produces a plain box rather than an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Container laying children out horizontally (`"hbox"` / `"row"`).
    Row,
    /// Container laying children out vertically (`"vbox"` / `"column"`).
    Column,
    /// Text leaf (`"text"`). Never has children.
    Text,
    /// Plain rectangle (any other tag).
    #[default]
    Rect,
}

impl NodeKind {
    /// Maps a description kind tag to a node kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "hbox" | "row" => Self::Row,
            "vbox" | "column" => Self::Column,
            "text" => Self::Text,
            _ => Self::Rect,
        }
    }

    /// Returns the canonical tag for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
            Self::Text => "text",
            Self::Rect => "rect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_aliases() {
        assert_eq!(NodeKind::from_tag("hbox"), NodeKind::Row);
        assert_eq!(NodeKind::from_tag("row"), NodeKind::Row);
        assert_eq!(NodeKind::from_tag("vbox"), NodeKind::Column);
        assert_eq!(NodeKind::from_tag("column"), NodeKind::Column);
        assert_eq!(NodeKind::from_tag("text"), NodeKind::Text);
        assert_eq!(NodeKind::from_tag("button"), NodeKind::Rect);
        assert_eq!(NodeKind::from_tag(""), NodeKind::Rect);
    }
}
