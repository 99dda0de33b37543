// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained node tree and incremental update machinery for declarative UIs.
//!
//! `fennec_core` keeps an on-screen tree in sync with a tree *description*
//! produced by a script layer. It is `no_std` compatible (with `alloc`) and
//! stores nodes in struct-of-arrays form behind generational handles.
//!
//! # Architecture
//!
//! ```text
//!   ScriptBridge::build_description() ──► Description
//!                                             │
//!                 ┌───────────────────────────┘
//!                 ▼
//!   NodeTree::mount() / reconcile() ──► dirty flags
//!                                             │
//!                 ┌───────────────────────────┘
//!                 ▼
//!   layout_if_needed(LayoutSolver) ──► geometry + wrapped text
//!                                             │
//!                 ┌───────────────────────────┘
//!                 ▼
//!   emit (fennec_render) ──► CommandList ──► Renderer
//!
//!   InputEvent ──► resolve_chain() ──► dispatch() ──► HandlerStore
//! ```
//!
//! **[`node`]**: the [`NodeTree`](node::NodeTree) itself, building from
//! descriptions, reconciliation, traversal, and the per-text-node line cache.
//!
//! **[`description`]**: the immutable tree descriptions a script produces,
//! and schema validation.
//!
//! **[`style`]**: typed layout and paint properties parsed from loose
//! description props, with a diff that tells layout changes from paint-only
//! changes.
//!
//! **[`dirty`]**: the `LAYOUT` and `PAINT` channels, tracked with
//! `understory_dirty`.
//!
//! **[`layout`]**: the [`LayoutSolver`](layout::LayoutSolver) seam and the
//! dirty-gated layout pass.
//!
//! **[`font`]**: the [`FontService`](font::FontService) seam, word wrapping,
//! and a monospace implementation for headless hosts and tests.
//!
//! **[`input`]**: hit-testing, bubbling chains, and click dispatch.
//!
//! **[`bridge`]**: the script-side traits and single-owner callback handles.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) and the zero-cost
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod bridge;
pub mod description;
pub mod dirty;
pub mod font;
pub mod input;
pub mod layout;
pub mod node;
pub mod style;
pub mod trace;
