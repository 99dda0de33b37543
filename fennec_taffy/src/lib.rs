// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flexbox [`LayoutSolver`](fennec_core::layout::LayoutSolver) for fennec,
//! backed by [`taffy`].
//!
//! [`TaffySolver`] mirrors the subtree being solved into a `taffy` tree,
//! measures text nodes through the host's
//! [`FontService`](fennec_core::font::FontService), and writes absolute
//! geometry back into the [`NodeTree`](fennec_core::node::NodeTree).
//!
//! Row nodes lay their children out horizontally; column and plain rectangle
//! nodes lay them out vertically. Text nodes are leaves sized by their
//! wrapped content and never grow or shrink. The root always fills the
//! viewport.

mod convert;
mod solver;

pub use solver::TaffySolver;
