// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative tree descriptions produced by the script bridge.
//!
//! A [`Description`] is a plain value tree: it owns no node storage and
//! carries no identity beyond its optional sibling key. The bridge builds a
//! fresh one every time application state changes; the
//! [reconciler](crate::node::NodeTree::reconcile) diffs it against the live
//! tree.
//!
//! Style properties are loosely typed ([`PropValue`]). Wrong-typed or absent
//! values are never errors; [`Style::from_props`](crate::style::Style::from_props)
//! falls back to the documented default for each property. The only schema
//! violation is a text entry with children, reported by
//! [`Description::validate`].

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::bridge::HandlerId;

/// A loosely typed style property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// A number (lengths, flex factors, font size, ...).
    Number(f64),
    /// A string (enums, hex colors, percentages, font family, ...).
    Str(String),
    /// A boolean.
    Bool(bool),
    /// A list of numbers (RGBA color components).
    List(Vec<f64>),
}

impl PropValue {
    /// Returns the number, if this is a [`Number`](Self::Number).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is a [`Str`](Self::Str).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<f64>> for PropValue {
    fn from(value: Vec<f64>) -> Self {
        Self::List(value)
    }
}

/// One entry of a declarative tree description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Description {
    /// Kind tag (`"column"`, `"vbox"`, `"row"`, `"hbox"`, `"text"`, anything else
    /// is a rectangle).
    pub kind: String,
    /// Optional sibling-unique identity.
    pub key: Option<String>,
    /// Text content; only meaningful for text entries.
    pub text: Option<String>,
    /// Style property table.
    pub props: BTreeMap<String, PropValue>,
    /// Click handler capability, if bound.
    pub on_click: Option<HandlerId>,
    /// Ordered child entries.
    pub children: Vec<Self>,
}

impl Description {
    /// Creates an empty entry of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Creates a vertical container entry.
    #[must_use]
    pub fn column() -> Self {
        Self::new("column")
    }

    /// Creates a horizontal container entry.
    #[must_use]
    pub fn row() -> Self {
        Self::new("row")
    }

    /// Creates a rectangle entry.
    #[must_use]
    pub fn rect() -> Self {
        Self::new("rect")
    }

    /// Creates a text entry with the given content.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::new("text")
        }
    }

    /// Sets the sibling key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets a style property.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Binds a click handler.
    #[must_use]
    pub fn on_click(mut self, handler: HandlerId) -> Self {
        self.on_click = Some(handler);
        self
    }

    /// Appends a child entry.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child entries.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Checks the whole description for schema violations.
    ///
    /// Runs before any tree mutation so that a rejected description never
    /// leaves a half-built or half-patched tree behind.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TextWithChildren`] for the first text entry (in
    /// depth-first order) that declares children.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut path = Vec::new();
        self.validate_at(&mut path)
    }

    fn validate_at(&self, path: &mut Vec<usize>) -> Result<(), BuildError> {
        if self.kind == "text" && !self.children.is_empty() {
            return Err(BuildError::TextWithChildren {
                path: path.clone(),
                children: self.children.len(),
            });
        }
        for (i, child) in self.children.iter().enumerate() {
            path.push(i);
            child.validate_at(path)?;
            path.pop();
        }
        Ok(())
    }
}

/// A description that cannot be turned into a node tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A text entry declared children.
    TextWithChildren {
        /// Child indices from the description root to the offending entry.
        path: Vec<usize>,
        /// Number of children the entry declared.
        children: usize,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextWithChildren { path, children } => {
                write!(f, "text node at /")?;
                for (i, idx) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{idx}")?;
                }
                write!(f, " declares {children} children; text nodes are leaves")
            }
        }
    }
}

impl core::error::Error for BuildError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn builder_collects_props_and_children() {
        let desc = Description::column()
            .key("root")
            .prop("padding", 4)
            .prop("BGColor", "#ff0000")
            .child(Description::text("hi"))
            .children([Description::rect(), Description::row()]);

        assert_eq!(desc.kind, "column");
        assert_eq!(desc.key.as_deref(), Some("root"));
        assert_eq!(desc.props.get("padding"), Some(&PropValue::Number(4.0)));
        assert_eq!(desc.children.len(), 3);
        assert_eq!(desc.children[0].text.as_deref(), Some("hi"));
    }

    #[test]
    fn valid_description_passes() {
        let desc = Description::column()
            .child(Description::row().child(Description::text("a")))
            .child(Description::text("b"));
        assert_eq!(desc.validate(), Ok(()));
    }

    #[test]
    fn text_with_children_is_rejected_with_path() {
        let desc = Description::column().child(Description::row()).child(
            Description::row().child(Description::text("bad").child(Description::rect())),
        );
        let err = desc.validate().unwrap_err();
        assert_eq!(
            err,
            BuildError::TextWithChildren {
                path: vec![1, 0],
                children: 1,
            }
        );
        assert_eq!(
            err.to_string(),
            "text node at /1/0 declares 1 children; text nodes are leaves"
        );
    }

    #[test]
    fn text_root_with_children_reports_empty_path() {
        let desc = Description::text("t").child(Description::rect());
        assert_eq!(
            desc.validate().unwrap_err().to_string(),
            "text node at / declares 1 children; text nodes are leaves"
        );
    }
}
