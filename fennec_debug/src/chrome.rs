// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phases become duration slices; everything else becomes an instant event,
/// plus a `commands` counter track fed by emission.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = nanos_to_us(record.timestamp_ns);
        match record.event {
            RecordedEvent::FrameBegin(e) => {
                events.push(instant("Frame", "Frame", ts, json!({
                    "frame_index": e.frame_index,
                    "dt_ms": e.dt * 1000.0,
                })));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Phase",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": { "frame_index": e.frame_index },
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Phase",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": { "frame_index": e.frame_index },
                }));
            }
            RecordedEvent::Reconcile(e) => {
                let s = e.stats;
                events.push(instant("Reconcile", "Tree", ts, json!({
                    "frame_index": e.frame_index,
                    "reused": s.reused,
                    "built": s.built,
                    "freed": s.freed,
                    "layout_changed": s.layout_changed,
                    "paint_changed": s.paint_changed,
                })));
            }
            RecordedEvent::Layout(e) => {
                events.push(instant("Layout", "Tree", ts, json!({
                    "frame_index": e.frame_index,
                    "relaid": e.pass.relaid,
                    "rewrapped": e.pass.rewrapped,
                })));
            }
            RecordedEvent::Emit(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "commands",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": { "commands": e.commands, "clips": e.clips },
                }));
            }
            RecordedEvent::Dispatch {
                frame_index,
                chain_len,
                handled_by,
            } => {
                events.push(instant("Dispatch", "Input", ts, json!({
                    "frame_index": frame_index,
                    "chain_len": chain_len,
                    "handled_by": handled_by,
                })));
            }
            RecordedEvent::FrameEnd(e) => {
                events.push(instant("FrameEnd", "Frame", ts, json!({
                    "frame_index": e.frame_index,
                    "repainted": e.repainted,
                })));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}
