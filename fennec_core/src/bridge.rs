// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Script bridge traits and callback capability handles.
//!
//! The scripting layer owns handler storage. Nodes only carry a
//! [`CallbackHandle`]: a non-cloneable token for one stored handler. The tree
//! gives the token back through [`CallbackHandle::release`] exactly once,
//! either when the node is freed or when reconciliation rebinds the node to a
//! different handler.
//!
//! Ids may be reused across descriptions. During a reconcile pass an id that
//! leaves one node but is bound by another node of the new tree stays live;
//! it is released only once no node binds it anymore.

use alloc::string::String;
use core::fmt;

use crate::description::Description;

/// Identifier of a handler stored by the scripting layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u32);

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({})", self.0)
    }
}

/// An error raised by the scripting layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptError {
    message: String,
}

impl ScriptError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script error: {}", self.message)
    }
}

impl core::error::Error for ScriptError {}

/// Storage of event handlers owned by the scripting layer.
pub trait HandlerStore {
    /// Invokes the handler.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the handler.
    fn invoke(&mut self, id: HandlerId) -> Result<(), ScriptError>;

    /// Releases the handler. Called exactly once per bound id.
    fn release(&mut self, id: HandlerId);
}

/// The application side of the frame loop.
pub trait ScriptBridge: HandlerStore {
    /// Produces a fresh description of the whole UI.
    ///
    /// # Errors
    ///
    /// Returns the error raised while running the application's build
    /// function. The frame loop logs it and keeps the current tree.
    fn build_description(&mut self) -> Result<Description, ScriptError>;

    /// Whether application state changed since the last
    /// [`clear_dirty`](Self::clear_dirty).
    fn is_dirty(&self) -> bool;

    /// Acknowledges the pending state change.
    fn clear_dirty(&mut self);

    /// Called once at the start of every frame with the elapsed seconds.
    fn on_tick(&mut self, dt: f64) {
        _ = dt;
    }
}

/// Owned capability for one stored handler.
///
/// Not `Clone`: the only way to end its life is [`release`](Self::release),
/// which consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct CallbackHandle(HandlerId);

impl CallbackHandle {
    pub(crate) const fn bind(id: HandlerId) -> Self {
        Self(id)
    }

    /// Returns the handler id this handle refers to.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.0
    }

    /// Releases the handler in the store.
    pub fn release(self, store: &mut dyn HandlerStore) {
        store.release(self.0);
    }
}
