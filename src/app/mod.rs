// app/mod.rs
// Host-program wiring: logger, configuration, demo engine, periodic output
// scheduling, and the interactive loop (which never returns).

use std::path::PathBuf;

use anyhow::Result;

use crate::config::{self, RunConfig};
use crate::diagnostics::LocalReduce;
use crate::engine::Engine;
use crate::output::{self, Shard, TimingPrinter};
use crate::renderer::painter::Painter;
use crate::renderer::Renderer;
use crate::scenario::{kepler_disc, DemoEngine};
use crate::snapshot;

pub fn run() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let run_config = RunConfig::load_default();
    let engine = DemoEngine::new(
        kepler_disc(run_config.particles),
        run_config.dt,
        run_config.g,
    );

    let out_dir = PathBuf::from(&run_config.output_dir);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        log::error!(
            "cannot create output directory '{}': {e}",
            out_dir.display()
        );
    }

    let painter = Painter::new(
        config::WINDOW_WIDTH,
        config::WINDOW_HEIGHT,
        run_config.view_extent,
    );
    let renderer =
        Renderer::new(painter).with_capture_base(&format!("{}/frame_", out_dir.display()));

    let shard = Shard::solo();
    let reducer = LocalReduce;
    let mut timing = TimingPrinter::new();
    let end_time = run_config.end_time;
    let output_interval = run_config.output_interval;
    let snapshot_interval = run_config.snapshot_interval;
    let orbits_path = out_dir.join("orbits.txt");
    let state_path = out_dir.join("raw_state.txt");
    let dispersion_path = out_dir.join("velocity_dispersion.txt");
    let snapshot_path = out_dir.join("snapshot.bin");

    log::info!(
        "starting interactive run: {} bodies, dt = {}, end time = {}",
        run_config.particles,
        run_config.dt,
        end_time
    );

    renderer.run_interactive_with(engine, end_time, move |engine| {
        let view = engine.view();
        if output_interval > 0.0 && output::check_output_due(&view, output_interval) {
            output::append_orbit_series(&view, shard, &orbits_path);
            output::overwrite_raw_state(&view, shard, &state_path);
            output::append_velocity_dispersion(&view, shard, &reducer, &dispersion_path);
            timing.print(&view, shard, end_time);
        }
        if snapshot_interval > 0.0 && output::check_output_due(&view, snapshot_interval) {
            snapshot::write_snapshot_file(&view, &snapshot_path);
        }
    })
}
