// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Phase
//! durations are measured on arrival with a monotonic clock.

use std::io::Write;
use std::time::Instant;

use fennec_core::trace::{
    DispatchEvent, EmitEvent, FrameBeginEvent, FrameEndEvent, LayoutEvent, PhaseBeginEvent,
    PhaseEndEvent, ReconcileEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    phase_start: Option<Instant>,
    timings: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            phase_start: None,
            timings: true,
        }
    }

    /// Turns phase durations on or off. Output without them is reproducible.
    #[must_use]
    pub fn timings(mut self, enabled: bool) -> Self {
        self.timings = enabled;
        self
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = writeln!(
            self.writer,
            "[frame] #{} dt={:.1}ms",
            e.frame_index,
            e.dt * 1000.0
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
        self.phase_start = Some(Instant::now());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let started = self.phase_start.take();
        if !self.timings {
            return;
        }
        if let Some(start) = started {
            _ = writeln!(
                self.writer,
                "[phase] #{} {} {:.1}µs",
                e.frame_index,
                e.phase.name(),
                start.elapsed().as_secs_f64() * 1e6,
            );
        }
    }

    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        let s = e.stats;
        _ = writeln!(
            self.writer,
            "[reconcile] #{} reused={} built={} freed={} layout={} paint={}",
            e.frame_index, s.reused, s.built, s.freed, s.layout_changed, s.paint_changed,
        );
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        _ = writeln!(
            self.writer,
            "[layout] #{} relaid={} rewrapped={}",
            e.frame_index, e.pass.relaid, e.pass.rewrapped,
        );
    }

    fn on_emit(&mut self, e: &EmitEvent) {
        _ = writeln!(
            self.writer,
            "[emit] #{} commands={} clips={}",
            e.frame_index, e.commands, e.clips,
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        let outcome = match e.handled_by {
            Some(node) => format!("handled by {node:?}"),
            None => String::from("unhandled"),
        };
        _ = writeln!(
            self.writer,
            "[input] #{} chain={} {outcome}",
            e.frame_index, e.chain_len,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = writeln!(
            self.writer,
            "[frame:end] #{} repainted={}",
            e.frame_index, e.repainted,
        );
    }
}

#[cfg(test)]
mod tests {
    use fennec_core::node::ReconcileStats;
    use fennec_core::trace::PhaseKind;

    use super::*;

    #[test]
    fn prints_one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).timings(false);
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            dt: 0.016,
        });
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::Reconcile,
        });
        sink.on_reconcile(&ReconcileEvent {
            frame_index: 1,
            stats: ReconcileStats {
                reused: 3,
                ..ReconcileStats::default()
            },
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 1,
            phase: PhaseKind::Reconcile,
        });
        sink.on_dispatch(&DispatchEvent {
            frame_index: 1,
            chain_len: 0,
            handled_by: None,
        });

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3, "got: {output}");
        assert_eq!(lines[0], "[frame] #1 dt=16.0ms");
        assert!(lines[1].starts_with("[reconcile] #1 reused=3"), "got: {output}");
        assert_eq!(lines[2], "[input] #1 chain=0 unhandled");
    }

    #[test]
    fn phase_timings_are_printed_when_enabled() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Layout,
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Layout,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[phase] #0 layout "), "got: {output}");
    }
}
