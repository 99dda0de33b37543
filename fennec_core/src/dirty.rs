// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Fennec tracks two independent categories of pending work per node (via
//! [`understory_dirty`]). Both channels carry dependency edges from parent to
//! child, so that a node *depends on* each of its children: marking a node
//! with [`EagerPolicy`](understory_dirty::EagerPolicy) marks every ancestor up
//! to the root and leaves siblings untouched.
//!
//! # Consumption
//!
//! - [`LAYOUT`] is consumed by the layout pass. The frame loop only inspects
//!   the root ([`NodeTree::needs_layout`](crate::node::NodeTree::needs_layout));
//!   when set, the whole tree is re-solved and the channel is drained.
//! - [`PAINT`] is maintained for partial repaint. Command emission currently
//!   walks the whole tree every frame regardless of this channel; the frame
//!   loop drains it after emitting so that marks do not accumulate.

use understory_dirty::Channel;

/// Geometry-affecting change: lengths, box model, flex parameters, alignment,
/// font, text content, kind, or child order.
pub const LAYOUT: Channel = Channel::new(0);

/// Paint-only change: fill or text color, decoration, background toggle, or
/// overflow mode.
pub const PAINT: Channel = Channel::new(1);
