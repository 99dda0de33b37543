// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event to a
//! `Vec<u8>` as a little-endian record: a one-byte tag, the arrival time in
//! nanoseconds since the recorder was created, then the payload. [`decode`]
//! reads the records back as an iterator of [`Record`].
//!
//! Counts wider than `u32` are saturated. Dispatch targets keep only their
//! slot index.

use std::fmt;
use std::time::Instant;

use fennec_core::layout::LayoutPass;
use fennec_core::node::ReconcileStats;
use fennec_core::trace::{
    DispatchEvent, EmitEvent, FrameBeginEvent, FrameEndEvent, LayoutEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, ReconcileEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_RECONCILE: u8 = 4;
const TAG_LAYOUT: u8 = 5;
const TAG_EMIT: u8 = 6;
const TAG_DISPATCH: u8 = 7;
const TAG_FRAME_END: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes timestamped events into a binary buffer.
pub struct RecorderSink {
    buf: Vec<u8>,
    clock: Box<dyn FnMut() -> u64>,
}

impl fmt::Debug for RecorderSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecorderSink")
            .field("bytes", &self.buf.len())
            .finish_non_exhaustive()
    }
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder stamping events with a monotonic clock.
    #[must_use]
    pub fn new() -> Self {
        let start = Instant::now();
        Self::with_clock(move || u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX))
    }

    /// Creates an empty recorder stamping events with `clock`, in
    /// nanoseconds.
    #[must_use]
    pub fn with_clock(clock: impl FnMut() -> u64 + 'static) -> Self {
        Self {
            buf: Vec::new(),
            clock: Box::new(clock),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8, frame_index: u64) {
        let now = (self.clock)();
        self.write_u8(tag);
        self.write_u64(now);
        self.write_u64(frame_index);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u32(u32::try_from(v).unwrap_or(u32::MAX));
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Input => 0,
            PhaseKind::Reconcile => 1,
            PhaseKind::Layout => 2,
            PhaseKind::Emit => 3,
            PhaseKind::Submit => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.begin(TAG_FRAME_BEGIN, e.frame_index);
        self.write_u64(e.dt.to_bits());
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.begin(TAG_PHASE_BEGIN, e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.begin(TAG_PHASE_END, e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        self.begin(TAG_RECONCILE, e.frame_index);
        let s = e.stats;
        for v in [s.reused, s.built, s.freed, s.layout_changed, s.paint_changed] {
            self.write_u32(v);
        }
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        self.begin(TAG_LAYOUT, e.frame_index);
        self.write_count(e.pass.relaid);
        self.write_count(e.pass.rewrapped);
    }

    fn on_emit(&mut self, e: &EmitEvent) {
        self.begin(TAG_EMIT, e.frame_index);
        self.write_count(e.commands);
        self.write_count(e.clips);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.begin(TAG_DISPATCH, e.frame_index);
        self.write_count(e.chain_len);
        match e.handled_by {
            Some(node) => {
                self.write_u8(1);
                self.write_u32(node.index());
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
        }
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.begin(TAG_FRAME_END, e.frame_index);
        self.write_count(e.repainted);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`ReconcileEvent`].
    Reconcile(ReconcileEvent),
    /// A [`LayoutEvent`].
    Layout(LayoutEvent),
    /// An [`EmitEvent`].
    Emit(EmitEvent),
    /// A [`DispatchEvent`], with the handling node reduced to its slot.
    Dispatch {
        /// Frame counter.
        frame_index: u64,
        /// Length of the bubbling chain.
        chain_len: usize,
        /// Slot index of the node whose handler ran.
        handled_by: Option<u32>,
    },
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
}

/// One decoded record.
#[derive(Clone, Debug)]
pub struct Record {
    /// Nanoseconds since the recorder was created.
    pub timestamp_ns: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_count(&mut self) -> Option<usize> {
        self.read_u32().and_then(|v| usize::try_from(v).ok())
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Input,
            1 => PhaseKind::Reconcile,
            2 => PhaseKind::Layout,
            3 => PhaseKind::Emit,
            _ => PhaseKind::Submit,
        })
    }

    fn read_event(&mut self, tag: u8, frame_index: u64) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_FRAME_BEGIN => RecordedEvent::FrameBegin(FrameBeginEvent {
                frame_index,
                dt: f64::from_bits(self.read_u64()?),
            }),
            TAG_PHASE_BEGIN => RecordedEvent::PhaseBegin(PhaseBeginEvent {
                frame_index,
                phase: self.read_phase()?,
            }),
            TAG_PHASE_END => RecordedEvent::PhaseEnd(PhaseEndEvent {
                frame_index,
                phase: self.read_phase()?,
            }),
            TAG_RECONCILE => RecordedEvent::Reconcile(ReconcileEvent {
                frame_index,
                stats: ReconcileStats {
                    reused: self.read_u32()?,
                    built: self.read_u32()?,
                    freed: self.read_u32()?,
                    layout_changed: self.read_u32()?,
                    paint_changed: self.read_u32()?,
                },
            }),
            TAG_LAYOUT => RecordedEvent::Layout(LayoutEvent {
                frame_index,
                pass: LayoutPass {
                    relaid: self.read_count()?,
                    rewrapped: self.read_count()?,
                },
            }),
            TAG_EMIT => RecordedEvent::Emit(EmitEvent {
                frame_index,
                commands: self.read_count()?,
                clips: self.read_count()?,
            }),
            TAG_DISPATCH => {
                let chain_len = self.read_count()?;
                let handled = self.read_u8()? != 0;
                let index = self.read_u32()?;
                RecordedEvent::Dispatch {
                    frame_index,
                    chain_len,
                    handled_by: handled.then_some(index),
                }
            }
            TAG_FRAME_END => RecordedEvent::FrameEnd(FrameEndEvent {
                frame_index,
                repainted: self.read_count()?,
            }),
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let timestamp_ns = self.read_u64()?;
        let frame_index = self.read_u64()?;
        let event = self.read_event(tag, frame_index)?;
        Some(Record {
            timestamp_ns,
            event,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
