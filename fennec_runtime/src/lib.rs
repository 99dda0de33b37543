// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fennec frame loop.
//!
//! [`FrameLoop`] owns a [`NodeTree`](fennec_core::node::NodeTree) and drives
//! it once per frame against a script bridge, a font service, a layout
//! solver, and a renderer supplied by the host:
//!
//! ```text
//!   on_tick(dt)
//!       │
//!       ▼
//!   bridge dirty? ──► build_description() ──► reconcile
//!       │
//!       ▼
//!   root layout-dirty? ──► LayoutSolver::solve ──► text re-wrap
//!       │
//!       ▼
//!   emit ──► Renderer::begin_frame / submit / end_frame
//!       │
//!       ▼
//!   drain paint
//! ```
//!
//! Input is routed between frames with [`FrameLoop::handle_input`]; a
//! handler that changes script state marks the bridge dirty and the next
//! frame picks the change up.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Forwards frame-loop events to the
//!   [`Tracer`](fennec_core::trace::Tracer) passed to each call.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod config;
mod frame;

pub use config::RuntimeConfig;
pub use frame::{FrameError, FrameLoop, FrameReport};
