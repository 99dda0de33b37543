// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint command lists for fennec.
//!
//! This crate sits between [`fennec_core`]'s laid-out node tree and a
//! drawing backend. It defines:
//!
//! - [`RenderCommand`]: one of four paint primitives
//! - [`CommandList`]: the ordered commands for one frame
//! - [`emit`]: the deterministic tree walk that fills a list
//! - [`Renderer`]: the backend seam that consumes a list

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod command;
mod emit;
mod renderer;

pub use command::{CommandList, RenderCommand};
pub use emit::emit;
pub use renderer::{RecordingRenderer, Renderer};
