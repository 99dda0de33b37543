// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained node tree.
//!
//! A *node* is one element of the on-screen tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that goes stale when the
//!   node is freed, so a handle that outlives its node is caught instead of
//!   silently aliasing a reused slot.
//! - Topology: a parent link and an ordered child list.
//! - **Declared state** copied from a [`Description`](crate::description::Description):
//!   kind, key, [`Style`](crate::style::Style), text content, and at most one
//!   click callback.
//! - **Computed state**: absolute geometry written by a
//!   [`LayoutSolver`](crate::layout::LayoutSolver) and, for text nodes, a
//!   cached [`TextLayout`].
//!
//! Nodes live in struct-of-arrays storage indexed by slot, with a free list
//! for slot reuse.
//!
//! # Dirty tracking
//!
//! Two channels (see [`dirty`](crate::dirty)) are tracked per node. Every
//! parent depends on its children, so marking a node also marks all of its
//! ancestors on the same channel; descendants are never marked. A dirty root
//! is therefore the single question the frame loop has to ask.
//!
//! # Reconciliation
//!
//! [`NodeTree::reconcile`] patches an existing subtree toward a new
//! description, reusing nodes matched by key or by position and building or
//! freeing the rest. Patches that touch geometry-affecting state raise the
//! layout flag; purely visual patches raise only the paint flag.

mod build;
mod id;
mod reconcile;
mod store;
mod text;
mod traverse;

pub use build::Context;
pub use id::{INVALID, NodeId, NodeKind};
pub use reconcile::ReconcileStats;
pub use store::NodeTree;
pub use text::TextLayout;
pub use traverse::{Ancestors, Children, DepthFirst};
