// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame driver.

use core::fmt;

use fennec_core::bridge::{ScriptBridge, ScriptError};
use fennec_core::description::BuildError;
use fennec_core::font::FontService;
use fennec_core::input::{InputEvent, dispatch};
use fennec_core::layout::{LayoutPass, LayoutSolver, layout_if_needed};
use fennec_core::node::{Context, NodeId, NodeTree, ReconcileStats};
use fennec_core::trace::{
    DispatchEvent, EmitEvent, FrameBeginEvent, FrameEndEvent, LayoutEvent, PhaseKind,
    ReconcileEvent, Tracer,
};
use fennec_render::{CommandList, Renderer, emit};
use kurbo::Size;

use crate::config::RuntimeConfig;

/// A fatal frame-loop error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// The application produced a description that violates the schema.
    Schema(BuildError),
    /// The application failed to produce its first description, so there is
    /// no tree to fall back to.
    InitialBuild(ScriptError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "invalid description: {err}"),
            Self::InitialBuild(err) => write!(f, "initial build failed: {err}"),
        }
    }
}

impl core::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::InitialBuild(err) => Some(err),
        }
    }
}

impl From<BuildError> for FrameError {
    fn from(err: BuildError) -> Self {
        Self::Schema(err)
    }
}

/// What one call to [`FrameLoop::frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter, starting at zero.
    pub frame_index: u64,
    /// Present if the bridge was dirty and its new description was applied.
    pub reconciled: Option<ReconcileStats>,
    /// Present if the root was layout-dirty and the solver ran.
    pub layout: Option<LayoutPass>,
    /// Commands submitted to the renderer.
    pub commands: usize,
    /// Nodes whose paint flag was cleared.
    pub repainted: usize,
}

/// Owns the node tree and runs the reconcile, layout, and emit cycle.
///
/// Dropping the loop frees the whole tree, releasing every bound handler
/// back to the bridge.
pub struct FrameLoop<B: ScriptBridge, F: FontService, L: LayoutSolver> {
    config: RuntimeConfig,
    bridge: B,
    fonts: F,
    solver: L,
    tree: NodeTree,
    commands: CommandList,
    frame_index: u64,
}

impl<B: ScriptBridge, F: FontService, L: LayoutSolver> fmt::Debug for FrameLoop<B, F, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("config", &self.config)
            .field("nodes", &self.tree.len())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl<B: ScriptBridge, F: FontService, L: LayoutSolver> FrameLoop<B, F, L> {
    /// Builds the initial tree from the bridge's first description.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InitialBuild`] if the bridge cannot produce a
    /// description and [`FrameError::Schema`] if it produces an invalid one.
    pub fn new(config: RuntimeConfig, mut bridge: B, mut fonts: F, solver: L) -> Result<Self, FrameError> {
        let desc = bridge.build_description().map_err(FrameError::InitialBuild)?;
        bridge.clear_dirty();
        let mut tree = NodeTree::new();
        tree.mount(&desc, &mut Context::new(&mut fonts, &mut bridge))?;
        log::debug!("mounted initial tree with {} nodes", tree.len());
        Ok(Self {
            config,
            bridge,
            fonts,
            solver,
            tree,
            commands: CommandList::new(),
            frame_index: 0,
        })
    }

    /// The live tree.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// The script bridge.
    #[must_use]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// The script bridge, mutably. Mark it dirty to force a rebuild.
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    /// The font service.
    #[must_use]
    pub fn fonts(&self) -> &F {
        &self.fonts
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Index the next call to [`frame`](Self::frame) will report.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The commands submitted by the last frame.
    #[must_use]
    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    /// Changes the viewport; the next frame re-solves layout.
    pub fn resize(&mut self, viewport: Size) {
        if self.config.viewport == viewport {
            return;
        }
        self.config.viewport = viewport;
        if let Some(root) = self.tree.root() {
            self.tree.mark_layout_dirty(root);
        }
    }

    /// Routes an input event through the current tree.
    ///
    /// Uses geometry from the last layout pass. Returns the node whose click
    /// handler ran, if any.
    pub fn handle_input(&mut self, event: &InputEvent, tracer: &mut Tracer<'_>) -> Option<NodeId> {
        let frame_index = self.frame_index;
        tracer.phase(frame_index, PhaseKind::Input, |tracer| {
            let chain = match self.tree.root() {
                Some(root) => self.tree.resolve_chain(root, event),
                None => alloc::vec::Vec::new(),
            };
            let handled_by = dispatch(&self.tree, event, &chain, &mut self.bridge);
            tracer.dispatch(&DispatchEvent {
                frame_index,
                chain_len: chain.len(),
                handled_by,
            });
            handled_by
        })
    }

    /// Runs one frame and submits its commands to `renderer`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Schema`] if the bridge produced a description
    /// that violates the schema. The tree is left as it was before the frame,
    /// nothing is submitted, and the frame is traced as ending with nothing
    /// repainted.
    pub fn frame(
        &mut self,
        dt: f64,
        renderer: &mut dyn Renderer,
        tracer: &mut Tracer<'_>,
    ) -> Result<FrameReport, FrameError> {
        let frame_index = self.frame_index;
        self.frame_index += 1;
        tracer.frame_begin(&FrameBeginEvent { frame_index, dt });

        self.bridge.on_tick(dt);

        let reconciled = match tracer.phase(frame_index, PhaseKind::Reconcile, |_| self.rebuild()) {
            Ok(reconciled) => reconciled,
            Err(err) => {
                // Nothing was emitted or submitted; the frame still closes.
                tracer.frame_end(&FrameEndEvent {
                    frame_index,
                    repainted: 0,
                });
                return Err(err);
            }
        };
        if let Some(stats) = reconciled {
            tracer.reconcile(&ReconcileEvent { frame_index, stats });
        }

        let layout = tracer.phase(frame_index, PhaseKind::Layout, |_| {
            layout_if_needed(
                &mut self.tree,
                &mut self.solver,
                self.config.viewport,
                &mut self.fonts,
            )
        });
        if let Some(pass) = layout {
            tracer.layout(&LayoutEvent { frame_index, pass });
        }

        tracer.phase(frame_index, PhaseKind::Emit, |_| {
            self.commands.clear();
            if let Some(root) = self.tree.root() {
                emit(&self.tree, root, &mut self.commands);
            }
        });
        tracer.emit(&EmitEvent {
            frame_index,
            commands: self.commands.len(),
            clips: self.commands.clip_count(),
        });

        tracer.phase(frame_index, PhaseKind::Submit, |_| {
            renderer.begin_frame(self.config.viewport);
            renderer.submit(&self.commands);
            renderer.end_frame();
        });

        let repainted = self.tree.drain_paint().len();
        tracer.frame_end(&FrameEndEvent {
            frame_index,
            repainted,
        });

        Ok(FrameReport {
            frame_index,
            reconciled,
            layout,
            commands: self.commands.len(),
            repainted,
        })
    }

    /// Applies a fresh description if the bridge is dirty.
    fn rebuild(&mut self) -> Result<Option<ReconcileStats>, FrameError> {
        if !self.bridge.is_dirty() {
            return Ok(None);
        }
        let built = self.bridge.build_description();
        self.bridge.clear_dirty();
        let desc = match built {
            Ok(desc) => desc,
            Err(err) => {
                log::error!("{err}; keeping the previous tree");
                return Ok(None);
            }
        };

        let mut cx = Context::new(&mut self.fonts, &mut self.bridge);
        let stats = match self.tree.root() {
            Some(root) => self.tree.reconcile(root, &desc, &mut cx)?,
            None => {
                self.tree.mount(&desc, &mut cx)?;
                ReconcileStats {
                    built: u32::try_from(self.tree.len()).unwrap_or(u32::MAX),
                    ..ReconcileStats::default()
                }
            }
        };
        log::trace!("reconciled: {stats:?}");
        Ok(Some(stats))
    }
}

impl<B: ScriptBridge, F: FontService, L: LayoutSolver> Drop for FrameLoop<B, F, L> {
    fn drop(&mut self) {
        if let Some(root) = self.tree.root() {
            self.tree.free(root, &mut self.bridge);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use fennec_core::bridge::{HandlerId, HandlerStore};
    use fennec_core::description::Description;
    use fennec_core::font::MonospaceFonts;
    use fennec_render::{RecordingRenderer, RenderCommand};
    use kurbo::Rect;

    use super::*;

    const INCREMENT: HandlerId = HandlerId(1);

    /// A counter app: a label and an increment button.
    #[derive(Default)]
    struct Counter {
        count: i32,
        dirty: bool,
        broken: bool,
        invalid: bool,
        ticks: Vec<f64>,
        released: Rc<RefCell<Vec<HandlerId>>>,
    }

    impl HandlerStore for Counter {
        fn invoke(&mut self, id: HandlerId) -> Result<(), ScriptError> {
            if id == INCREMENT {
                self.count += 1;
                self.dirty = true;
            }
            Ok(())
        }

        fn release(&mut self, id: HandlerId) {
            self.released.borrow_mut().push(id);
        }
    }

    impl ScriptBridge for Counter {
        fn build_description(&mut self) -> Result<Description, ScriptError> {
            if self.broken {
                return Err(ScriptError::new("attempt to index a nil value"));
            }
            let label = Description::text(format!("count: {}", self.count)).key("label");
            let label = if self.invalid {
                label.child(Description::rect())
            } else {
                label
            };
            Ok(Description::column()
                .prop("BGColor", "#202020")
                .child(label)
                .child(
                    Description::rect()
                        .key("inc")
                        .prop("BGColor", "#4080ff")
                        .on_click(INCREMENT),
                ))
        }

        fn is_dirty(&self) -> bool {
            self.dirty
        }

        fn clear_dirty(&mut self) {
            self.dirty = false;
        }

        fn on_tick(&mut self, dt: f64) {
            self.ticks.push(dt);
        }
    }

    /// Fills the viewport with the root and stacks its children 20px apart.
    #[derive(Default)]
    struct StackSolver {
        runs: Rc<RefCell<usize>>,
    }

    impl LayoutSolver for StackSolver {
        fn solve(&mut self, tree: &mut NodeTree, root: NodeId, viewport: Size, _: &mut dyn FontService) {
            *self.runs.borrow_mut() += 1;
            tree.set_geometry(root, Rect::from_origin_size((0.0, 0.0), viewport));
            let kids: Vec<_> = tree.children(root).collect();
            for (i, kid) in kids.into_iter().enumerate() {
                let y = 20.0 * i as f64;
                tree.set_geometry(kid, Rect::new(0.0, y, viewport.width, y + 20.0));
            }
        }
    }

    type Loop = FrameLoop<Counter, MonospaceFonts, StackSolver>;

    fn counter_loop(counter: Counter) -> (Loop, Rc<RefCell<usize>>) {
        let solver = StackSolver::default();
        let runs = Rc::clone(&solver.runs);
        let fonts = MonospaceFonts::with_default_family(10.0);
        let config = RuntimeConfig::default().with_viewport(Size::new(200.0, 100.0));
        let frame_loop = FrameLoop::new(config, counter, fonts, solver).unwrap();
        (frame_loop, runs)
    }

    fn label(frame_loop: &Loop) -> Option<&str> {
        let root = frame_loop.tree().root()?;
        let label = frame_loop.tree().children(root).next()?;
        frame_loop.tree().text(label)
    }

    #[test]
    fn first_frame_solves_and_emits() {
        let (mut frame_loop, runs) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();

        let report = frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        assert_eq!(report.frame_index, 0);
        assert_eq!(report.reconciled, None);
        assert!(report.layout.is_some());
        assert_eq!(*runs.borrow(), 1);
        assert_eq!(report.repainted, 3);
        assert_eq!(renderer.viewport, Some(Size::new(200.0, 100.0)));

        let list = renderer.last().unwrap();
        assert!(list.is_balanced());
        assert!(list.iter().any(|c| matches!(
            c,
            RenderCommand::DrawText { text, .. } if text == "count: 0"
        )));
        assert_eq!(frame_loop.bridge().ticks, [0.016]);
    }

    #[test]
    fn idle_frames_reemit_without_solving() {
        let (mut frame_loop, runs) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();

        let report = frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        assert_eq!(report.frame_index, 1);
        assert_eq!(report.reconciled, None);
        assert_eq!(report.layout, None);
        assert_eq!(report.repainted, 0);
        assert_eq!(*runs.borrow(), 1);
        assert_eq!(renderer.frames.len(), 2);
        assert_eq!(renderer.frames[0], renderer.frames[1]);
    }

    #[test]
    fn click_updates_on_next_frame() {
        let (mut frame_loop, runs) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        let root = frame_loop.tree().root().unwrap();
        let button = frame_loop.tree().children(root).nth(1).unwrap();

        let handled = frame_loop.handle_input(&InputEvent::click(10.0, 30.0), &mut Tracer::none());
        assert_eq!(handled, Some(button));
        assert!(frame_loop.bridge().is_dirty());
        assert_eq!(label(&frame_loop), Some("count: 0"));

        let report = frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        let stats = report.reconciled.unwrap();
        assert_eq!(stats.built, 0);
        assert_eq!(stats.freed, 0);
        assert_eq!(stats.reused, 3);
        assert_eq!(label(&frame_loop), Some("count: 1"));
        assert!(report.layout.is_some());
        assert_eq!(*runs.borrow(), 2);
        assert!(!frame_loop.bridge().is_dirty());
        // Same handler rebound in place: nothing released.
        assert!(frame_loop.bridge().released.borrow().is_empty());
    }

    #[test]
    fn clicks_on_unbound_nodes_are_unhandled() {
        let (mut frame_loop, _) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        let mut tracer = Tracer::none();
        assert_eq!(frame_loop.handle_input(&InputEvent::click(10.0, 5.0), &mut tracer), None);
        assert_eq!(frame_loop.handle_input(&InputEvent::click(10.0, 500.0), &mut tracer), None);
        assert_eq!(frame_loop.handle_input(&InputEvent::key(13), &mut tracer), None);
        assert!(!frame_loop.bridge().is_dirty());
    }

    #[test]
    fn script_error_keeps_previous_tree() {
        let (mut frame_loop, _) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        let before = frame_loop.tree().root();

        let counter = frame_loop.bridge_mut();
        counter.broken = true;
        counter.dirty = true;
        counter.count = 9;
        let report = frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        assert_eq!(report.reconciled, None);
        assert_eq!(frame_loop.tree().root(), before);
        assert_eq!(label(&frame_loop), Some("count: 0"));
        assert!(!frame_loop.bridge().is_dirty());
        assert_eq!(renderer.frames.len(), 1);
    }

    #[test]
    fn schema_violation_is_fatal_and_leaves_tree() {
        let (mut frame_loop, _) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        let nodes = frame_loop.tree().len();

        let counter = frame_loop.bridge_mut();
        counter.invalid = true;
        counter.dirty = true;
        let err = frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap_err();
        assert!(matches!(err, FrameError::Schema(BuildError::TextWithChildren { .. })));
        assert_eq!(frame_loop.tree().len(), nodes);
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn initial_errors_fail_construction() {
        let fonts = MonospaceFonts::new();
        let broken = Counter {
            broken: true,
            ..Counter::default()
        };
        let err = Loop::new(RuntimeConfig::default(), broken, fonts, StackSolver::default()).unwrap_err();
        assert!(matches!(err, FrameError::InitialBuild(_)));

        let invalid = Counter {
            invalid: true,
            ..Counter::default()
        };
        let err = Loop::new(
            RuntimeConfig::default(),
            invalid,
            MonospaceFonts::new(),
            StackSolver::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Schema(_)));
    }

    #[test]
    fn resize_forces_a_solve() {
        let (mut frame_loop, runs) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();

        frame_loop.resize(Size::new(200.0, 100.0));
        frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        assert_eq!(*runs.borrow(), 1);

        frame_loop.resize(Size::new(400.0, 300.0));
        frame_loop
            .frame(0.016, &mut renderer, &mut Tracer::none())
            .unwrap();
        assert_eq!(*runs.borrow(), 2);
        let root = frame_loop.tree().root().unwrap();
        assert_eq!(frame_loop.tree().geometry(root), Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(renderer.viewport, Some(Size::new(400.0, 300.0)));
    }

    #[test]
    fn dropping_the_loop_releases_handlers_once() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let counter = Counter {
            released: Rc::clone(&released),
            ..Counter::default()
        };
        let (frame_loop, _) = counter_loop(counter);
        drop(frame_loop);
        assert_eq!(*released.borrow(), [INCREMENT]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn frames_are_traced_in_phase_order() {
        use fennec_core::trace::{PhaseBeginEvent, TraceSink};

        #[derive(Default)]
        struct Phases {
            begun: Vec<PhaseKind>,
            emitted: Vec<usize>,
            dispatched: Vec<Option<NodeId>>,
        }
        impl TraceSink for Phases {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.begun.push(e.phase);
            }
            fn on_emit(&mut self, e: &EmitEvent) {
                self.emitted.push(e.commands);
            }
            fn on_dispatch(&mut self, e: &DispatchEvent) {
                self.dispatched.push(e.handled_by);
            }
        }

        let (mut frame_loop, _) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        let mut sink = Phases::default();
        let mut tracer = Tracer::new(&mut sink);
        frame_loop.frame(0.016, &mut renderer, &mut tracer).unwrap();
        frame_loop.handle_input(&InputEvent::click(10.0, 30.0), &mut tracer);
        drop(tracer);

        assert_eq!(
            sink.begun,
            [
                PhaseKind::Reconcile,
                PhaseKind::Layout,
                PhaseKind::Emit,
                PhaseKind::Submit,
                PhaseKind::Input,
            ]
        );
        assert_eq!(sink.emitted, [renderer.last().unwrap().len()]);
        assert_eq!(sink.dispatched.len(), 1);
        assert!(sink.dispatched[0].is_some());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn schema_violation_still_closes_the_traced_frame() {
        use fennec_core::trace::{FrameBeginEvent, TraceSink};

        #[derive(Default)]
        struct Frames {
            events: Vec<(&'static str, u64)>,
        }
        impl TraceSink for Frames {
            fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
                self.events.push(("begin", e.frame_index));
            }
            fn on_frame_end(&mut self, e: &FrameEndEvent) {
                self.events.push(("end", e.frame_index));
            }
        }

        let (mut frame_loop, _) = counter_loop(Counter::default());
        let mut renderer = RecordingRenderer::new();
        let mut sink = Frames::default();
        let mut tracer = Tracer::new(&mut sink);
        frame_loop.frame(0.016, &mut renderer, &mut tracer).unwrap();

        let counter = frame_loop.bridge_mut();
        counter.invalid = true;
        counter.dirty = true;
        assert!(frame_loop.frame(0.016, &mut renderer, &mut tracer).is_err());
        drop(tracer);

        assert_eq!(sink.events, [("begin", 0), ("end", 0), ("begin", 1), ("end", 1)]);
        assert_eq!(renderer.frames.len(), 1);
    }
}
