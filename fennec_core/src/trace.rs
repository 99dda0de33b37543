// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for the frame loop.
//!
//! [`TraceSink`] has one method per event, all defaulting to no-ops.
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`; with the `trace`
//! feature off its methods compile to nothing, with it on each call costs one
//! `Option` branch.
//!
//! Events carry counts and identifiers only. Sinks that want wall-clock
//! timings stamp events themselves on arrival.

use crate::layout::LayoutPass;
use crate::node::{NodeId, ReconcileStats};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Draining queued input and dispatching handlers.
    Input,
    /// Rebuilding the description and patching the tree.
    Reconcile,
    /// Solving geometry and re-wrapping text.
    Layout,
    /// Walking the tree into a command list.
    Emit,
    /// Handing the command list to the renderer.
    Submit,
}

impl PhaseKind {
    /// Short lowercase name, for sinks that print or export phases.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Reconcile => "reconcile",
            Self::Layout => "layout",
            Self::Emit => "emit",
            Self::Submit => "submit",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame starts.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Seconds since the previous frame.
    pub dt: f64,
}

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted after a successful reconcile.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// What the pass did.
    pub stats: ReconcileStats,
}

/// Emitted after the layout solver ran.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// What the pass did.
    pub pass: LayoutPass,
}

/// Emitted after the command list was built.
#[derive(Clone, Copy, Debug)]
pub struct EmitEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Total commands in the list.
    pub commands: usize,
    /// Clip scopes opened (each closed by a matching pop).
    pub clips: usize,
}

/// Emitted for every routed input event.
#[derive(Clone, Copy, Debug)]
pub struct DispatchEvent {
    /// Frame counter of the frame the input was routed before.
    pub frame_index: u64,
    /// Length of the bubbling chain, zero for a miss.
    pub chain_len: usize,
    /// Node whose handler ran, if any.
    pub handled_by: Option<NodeId>,
}

/// Emitted when a frame finishes.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Nodes whose paint flag was cleared this frame.
    pub repainted: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// Every method has a no-op default; override the ones you need.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a reconcile pass.
    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        _ = e;
    }

    /// Called after a layout pass.
    fn on_layout(&mut self, e: &LayoutEvent) {
        _ = e;
    }

    /// Called after emission.
    fn on_emit(&mut self, e: &EmitEvent) {
        _ = e;
    }

    /// Called after an input event was routed.
    fn on_dispatch(&mut self, e: &DispatchEvent) {
        _ = e;
    }

    /// Called when a frame finishes.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// Without the `trace` feature every method is empty.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Expands to a `Tracer` method that forwards one event to the sink.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident, $hook:ident, $event:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer with no sink.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward!(
        /// Emits a [`FrameBeginEvent`].
        frame_begin, on_frame_begin, FrameBeginEvent
    );
    forward!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin, on_phase_begin, PhaseBeginEvent
    );
    forward!(
        /// Emits a [`PhaseEndEvent`].
        phase_end, on_phase_end, PhaseEndEvent
    );
    forward!(
        /// Emits a [`ReconcileEvent`].
        reconcile, on_reconcile, ReconcileEvent
    );
    forward!(
        /// Emits a [`LayoutEvent`].
        layout, on_layout, LayoutEvent
    );
    forward!(
        /// Emits an [`EmitEvent`].
        emit, on_emit, EmitEvent
    );
    forward!(
        /// Emits a [`DispatchEvent`].
        dispatch, on_dispatch, DispatchEvent
    );
    forward!(
        /// Emits a [`FrameEndEvent`].
        frame_end, on_frame_end, FrameEndEvent
    );

    /// Brackets `f` with begin and end events for `phase`.
    #[inline]
    pub fn phase<R>(&mut self, frame_index: u64, phase: PhaseKind, f: impl FnOnce(&mut Self) -> R) -> R {
        self.phase_begin(&PhaseBeginEvent { frame_index, phase });
        let out = f(self);
        self.phase_end(&PhaseEndEvent { frame_index, phase });
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            dt: 0.016,
        });
        sink.on_emit(&EmitEvent {
            frame_index: 0,
            commands: 3,
            clips: 1,
        });
        sink.on_frame_end(&FrameEndEvent {
            frame_index: 0,
            repainted: 2,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_begin(&FrameBeginEvent {
            frame_index: 1,
            dt: 0.0,
        });
        let value = tracer.phase(1, PhaseKind::Layout, |_| 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn phase_names_are_distinct() {
        let names = [
            PhaseKind::Input,
            PhaseKind::Reconcile,
            PhaseKind::Layout,
            PhaseKind::Emit,
            PhaseKind::Submit,
        ]
        .map(PhaseKind::name);
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct PhaseLog {
            seen: Vec<(bool, PhaseKind)>,
        }
        impl TraceSink for PhaseLog {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.seen.push((true, e.phase));
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.seen.push((false, e.phase));
            }
        }

        let mut sink = PhaseLog::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.phase(4, PhaseKind::Emit, |t| {
            t.phase(4, PhaseKind::Submit, |_| ());
        });
        drop(tracer);
        assert_eq!(
            sink.seen,
            [
                (true, PhaseKind::Emit),
                (true, PhaseKind::Submit),
                (false, PhaseKind::Submit),
                (false, PhaseKind::Emit),
            ]
        );
    }
}
