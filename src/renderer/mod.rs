// renderer/mod.rs
// The interactive loop. One cooperative scheduler drives everything: each
// idle tick asks the engine whether to stop, steps it once, and composes a
// frame; key events mutate the view state between ticks. The stop transition
// is one-way and ends the process.

pub mod backend;
pub mod capture;
pub mod draw;
pub mod input;
pub mod painter;
pub mod state;


use std::path::Path;
use std::time::Duration;

use backend::RenderBackend;
use capture::FrameCapture;
use input::KeyOutcome;
use state::RenderState;

use crate::engine::Engine;
use crate::profile_scope;

const PAUSED_TICK: Duration = Duration::from_millis(10);

/// Owns the backend, the view state, and the capture counter for one
/// process.
pub struct Renderer<B: RenderBackend> {
    pub backend: B,
    pub state: RenderState,
    capture: FrameCapture,
    /// Base name for sequence captures triggered from the key table.
    capture_base: String,
}

impl<B: RenderBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RenderState::default(),
            capture: FrameCapture::new(),
            capture_base: "screenshot_".to_string(),
        }
    }

    pub fn with_capture_base(mut self, base: &str) -> Self {
        self.capture_base = base.to_string();
        self
    }

    /// Apply pending key presses. Every handled key repaints so a paused
    /// view still responds to inspection. Returns false on quit.
    pub fn handle_keys<E: Engine>(&mut self, engine: &E) -> bool {
        for key in self.backend.poll_keys() {
            let Some(action) = input::lookup(key) else {
                continue;
            };
            let n = engine.view().n();
            match input::apply_key(&mut self.state, action, n) {
                KeyOutcome::Quit => return false,
                KeyOutcome::Capture => {
                    self.capture.capture_sequence(&self.backend, &self.capture_base);
                }
                KeyOutcome::Handled => {}
            }
            let view = engine.view();
            draw::compose_frame(&mut self.backend, &view, &self.state);
            self.backend.present();
        }
        true
    }

    /// One idle tick: stop-check, step, compose, present. Returns false when
    /// the stopping condition has been reached.
    pub fn tick<E: Engine>(&mut self, engine: &mut E, end_time: f64) -> bool {
        if engine.should_stop(end_time) {
            return false;
        }
        {
            profile_scope!("step");
            engine.step();
        }
        if !self.state.pause_render {
            profile_scope!("visualization");
            let view = engine.view();
            draw::compose_frame(&mut self.backend, &view, &self.state);
            self.backend.present();
        }
        true
    }

    /// Capture the presented frame to an explicit path (single-shot mode).
    pub fn capture_frame(&mut self, path: &Path) {
        self.capture.capture_single(&self.backend, path);
    }

    /// Capture the presented frame under the numbered sequence name.
    pub fn capture_frame_sequence(&mut self) {
        self.capture.capture_sequence(&self.backend, &self.capture_base);
    }

    /// Run until the engine reports its stopping condition or the operator
    /// quits; either way the process ends here. `on_tick` is the host's
    /// scheduling hook, called after every completed step.
    pub fn run_interactive_with<E, F>(mut self, mut engine: E, end_time: f64, mut on_tick: F) -> !
    where
        E: Engine,
        F: FnMut(&E),
    {
        loop {
            if !self.handle_keys(&engine) {
                log::warn!("exiting visualization; this ends the run immediately");
                std::process::exit(0);
            }
            if self.state.pause_sim {
                // the idle source is suspended; only key events repaint
                spin_sleep::sleep(PAUSED_TICK);
                continue;
            }
            if !self.tick(&mut engine, end_time) {
                log::info!("stopping condition reached at t = {}", engine.view().t);
                std::process::exit(0);
            }
            on_tick(&engine);
        }
    }

    /// `run_interactive_with` without a host hook.
    pub fn run_interactive<E: Engine>(self, engine: E, end_time: f64) -> ! {
        self.run_interactive_with(engine, end_time, |_| {})
    }
}
