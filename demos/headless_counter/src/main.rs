// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless counter demo.
//!
//! Drives the frame loop with a counter app, a monospace font service, the
//! taffy solver, and a renderer that logs what it receives. Clicks are
//! simulated against the laid-out tree.
//!
//! ```text
//! RUST_LOG=debug cargo run -p headless_counter -- [trace.json]
//! ```
//!
//! With a path argument, the recorded frame trace is written there as Chrome
//! Trace Event JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use fennec_core::bridge::{HandlerId, HandlerStore, ScriptBridge, ScriptError};
use fennec_core::description::Description;
use fennec_core::font::MonospaceFonts;
use fennec_core::input::InputEvent;
use fennec_core::node::{NodeId, NodeTree};
use fennec_core::trace::{
    DispatchEvent, EmitEvent, FrameBeginEvent, FrameEndEvent, LayoutEvent, PhaseBeginEvent,
    PhaseEndEvent, ReconcileEvent, TraceSink, Tracer,
};
use fennec_debug::pretty::PrettyPrintSink;
use fennec_debug::recorder::RecorderSink;
use fennec_render::{CommandList, RenderCommand, Renderer};
use fennec_runtime::{FrameError, FrameLoop, RuntimeConfig};
use fennec_taffy::TaffySolver;
use kurbo::Size;

const INCREMENT: HandlerId = HandlerId(1);
const DECREMENT: HandlerId = HandlerId(2);
const RESET: HandlerId = HandlerId(3);

const FRAME_DT: f64 = 1.0 / 60.0;

// -- Application --

#[derive(Debug, Default)]
struct Counter {
    count: i64,
    dirty: bool,
    elapsed: f64,
}

impl HandlerStore for Counter {
    fn invoke(&mut self, id: HandlerId) -> Result<(), ScriptError> {
        match id {
            INCREMENT => self.count += 1,
            DECREMENT if self.count == 0 => {
                return Err(ScriptError::new("counter cannot go below zero"));
            }
            DECREMENT => self.count -= 1,
            RESET => self.count = 0,
            other => return Err(ScriptError::new(format!("no handler {other:?}"))),
        }
        self.dirty = true;
        Ok(())
    }

    fn release(&mut self, id: HandlerId) {
        log::debug!("released {id:?}");
    }
}

impl ScriptBridge for Counter {
    fn build_description(&mut self) -> Result<Description, ScriptError> {
        let button = |key: &str, label: &str, handler: HandlerId| {
            Description::rect()
                .key(key)
                .prop("w", 96)
                .prop("h", 28)
                .prop("padding", 6)
                .prop("BGColor", "#3a6ea5")
                .on_click(handler)
                .child(Description::text(label).prop("textAlign", "center"))
        };

        let mut root = Description::column()
            .prop("padding", 16)
            .prop("gap", 12)
            .prop("BGColor", "#1e1e1e")
            .child(
                Description::text(format!("Count: {}", self.count))
                    .key("label")
                    .prop("fontSize", 20)
                    .prop("color", "#f0f0f0"),
            )
            .child(
                Description::row()
                    .key("buttons")
                    .prop("gap", 8)
                    .child(button("dec", "-", DECREMENT))
                    .child(button("inc", "+", INCREMENT))
                    .child(button("reset", "reset", RESET)),
            );
        if self.count >= 5 {
            root = root.child(
                Description::text("High five!")
                    .key("milestone")
                    .prop("color", "#ffd700")
                    .prop("textDecoration", "underline"),
            );
        }
        Ok(root)
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn on_tick(&mut self, dt: f64) {
        self.elapsed += dt;
    }
}

// -- Renderer --

/// Logs a summary of every frame and each command at trace level.
#[derive(Debug, Default)]
struct LoggingRenderer {
    viewport: Size,
    frames: u64,
}

impl Renderer for LoggingRenderer {
    fn begin_frame(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    fn submit(&mut self, commands: &CommandList) {
        let texts = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawText { .. }))
            .count();
        log::info!(
            "frame {}: {}x{} viewport, {} commands ({} text, {} clips)",
            self.frames,
            self.viewport.width,
            self.viewport.height,
            commands.len(),
            texts,
            commands.clip_count(),
        );
        for command in commands {
            log::trace!("  {command:?}");
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

// -- Tracing --

/// Forwards every event to two sinks.
struct Tee<'a> {
    first: &'a mut dyn TraceSink,
    second: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.first.on_frame_begin(e);
        self.second.on_frame_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.first.on_phase_begin(e);
        self.second.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.first.on_phase_end(e);
        self.second.on_phase_end(e);
    }

    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        self.first.on_reconcile(e);
        self.second.on_reconcile(e);
    }

    fn on_layout(&mut self, e: &LayoutEvent) {
        self.first.on_layout(e);
        self.second.on_layout(e);
    }

    fn on_emit(&mut self, e: &EmitEvent) {
        self.first.on_emit(e);
        self.second.on_emit(e);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.first.on_dispatch(e);
        self.second.on_dispatch(e);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.first.on_frame_end(e);
        self.second.on_frame_end(e);
    }
}

// -- Driver --

fn find_key(tree: &NodeTree, key: &str) -> Option<NodeId> {
    let root = tree.root()?;
    tree.depth_first(root)
        .map(|(id, _)| id)
        .find(|&id| tree.key(id) == Some(key))
}

/// A click in the middle of the node with `key`.
fn click_on(tree: &NodeTree, key: &str) -> Option<InputEvent> {
    let center = tree.geometry(find_key(tree, key)?).center();
    Some(InputEvent::click(center.x, center.y))
}

type App = FrameLoop<Counter, MonospaceFonts, TaffySolver>;

fn run(app: &mut App, tracer: &mut Tracer<'_>) -> Result<(), FrameError> {
    let mut renderer = LoggingRenderer::default();
    app.frame(FRAME_DT, &mut renderer, tracer)?;

    let script = [
        "dec", "inc", "inc", "inc", "inc", "inc", "inc", "dec", "reset", "inc",
    ];
    for key in script {
        match click_on(app.tree(), key) {
            Some(click) => {
                let handled = app.handle_input(&click, tracer);
                log::info!("click on {key:?} handled by {handled:?}");
            }
            None => log::warn!("no node keyed {key:?}"),
        }
        let report = app.frame(FRAME_DT, &mut renderer, tracer)?;
        log::debug!("{report:?}");
    }

    app.resize(Size::new(480.0, 320.0));
    app.frame(FRAME_DT, &mut renderer, tracer)?;

    // A click outside every node is simply unhandled.
    app.handle_input(&InputEvent::click(-5.0, -5.0), tracer);
    app.frame(FRAME_DT, &mut renderer, tracer)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let trace_path = std::env::args().nth(1);

    let config = RuntimeConfig::default().with_viewport(Size::new(640.0, 480.0));
    let fonts = MonospaceFonts::with_default_family(14.0);
    let mut app = match App::new(config, Counter::default(), fonts, TaffySolver::new()) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut pretty = PrettyPrintSink::stderr();
    let mut recorder = RecorderSink::new();
    let result = {
        let mut tee = Tee {
            first: &mut pretty,
            second: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);
        run(&mut app, &mut tracer)
    };
    if let Err(err) = result {
        log::error!("{err}");
        return ExitCode::FAILURE;
    }

    if let Some(root) = app.tree().root() {
        println!("{}", fennec_debug::tree::outline(app.tree(), root));
    }
    log::info!(
        "final count {} after {:.2}s",
        app.bridge().count,
        app.bridge().elapsed
    );

    if let Some(path) = trace_path {
        let written = File::create(&path).and_then(|file| {
            let mut out = BufWriter::new(file);
            fennec_debug::chrome::export(recorder.as_bytes(), &mut out)?;
            out.flush()
        });
        match written {
            Ok(()) => log::info!("wrote Chrome trace to {path}"),
            Err(err) => {
                log::error!("could not write {path}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
