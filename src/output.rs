// output.rs
// Line-oriented series writers, output scheduling, and the progress line.
// Every writer treats an open failure as a reported no-op so a missing
// directory never kills a long run.

use std::f64::consts::TAU;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::diagnostics::{StatsReduce, VelocityStats};
use crate::engine::SimView;
use crate::orbit;

/// Shard identity for multi-process runs. Rank 0 is the only shard that
/// prints timing or writes aggregate files; per-particle files get a rank
/// suffix whenever more than one shard exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shard {
    pub rank: u32,
    pub count: u32,
}

impl Shard {
    pub fn solo() -> Self {
        Self { rank: 0, count: 1 }
    }

    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    /// Per-shard file path: `out.txt` becomes `out.txt_1` on shard 1.
    pub fn suffixed(&self, path: &Path) -> PathBuf {
        if self.count <= 1 {
            return path.to_path_buf();
        }
        let mut s = path.as_os_str().to_os_string();
        s.push(format!("_{}", self.rank));
        PathBuf::from(s)
    }
}

/// True when the last step crossed an `interval`-spaced boundary, or at
/// t == 0 so the initial state is always recorded.
pub fn check_output_due(view: &SimView, interval: f64) -> bool {
    check_output_due_phase(view, interval, 0.0)
}

/// Phase-shifted variant: boundaries sit at (k - phase) * interval. The
/// floor comparison is symmetric in the sign of dt, so backward integration
/// schedules the same boundaries it would cross going forward.
pub fn check_output_due_phase(view: &SimView, interval: f64, phase: f64) -> bool {
    let shift = view.t + interval * phase;
    if (shift / interval).floor() != ((shift - view.dt) / interval).floor() {
        return true;
    }
    view.t == 0.0
}

fn open_writer(path: &Path, append: bool) -> Option<BufWriter<File>> {
    let opened = if append {
        OpenOptions::new().create(true).append(true).open(path)
    } else {
        File::create(path)
    };
    match opened {
        Ok(f) => Some(BufWriter::new(f)),
        Err(e) => {
            log::error!("error while opening file '{}': {e}", path.display());
            None
        }
    }
}

fn report_write_error(path: &Path, result: io::Result<()>) {
    if let Err(e) = result {
        log::error!("error while writing file '{}': {e}", path.display());
    }
}

/// One tab-separated line per particle: x y z vx vy vz.
pub fn append_raw_state(view: &SimView, shard: Shard, path: &Path) {
    write_raw_state(view, shard, path, true);
}

/// Truncating variant of `append_raw_state`.
pub fn overwrite_raw_state(view: &SimView, shard: Shard, path: &Path) {
    write_raw_state(view, shard, path, false);
}

fn write_raw_state(view: &SimView, shard: Shard, path: &Path, append: bool) {
    let path = shard.suffixed(path);
    let Some(mut of) = open_writer(&path, append) else {
        return;
    };
    let result = view.particles.iter().try_for_each(|p| {
        writeln!(
            of,
            "{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}",
            p.pos.x, p.pos.y, p.pos.z, p.vel.x, p.vel.y, p.vel.z
        )
    });
    report_write_error(&path, result.and_then(|_| of.flush()));
}

/// One line per non-reference body: t a e inc Omega omega l P f, each body
/// measured against the folded center of mass of all lower-indexed bodies.
pub fn append_orbit_series(view: &SimView, shard: Shard, path: &Path) {
    write_orbit_series(view, shard, path, true);
}

/// Truncating variant of `append_orbit_series`.
pub fn overwrite_orbit_series(view: &SimView, shard: Shard, path: &Path) {
    write_orbit_series(view, shard, path, false);
}

fn write_orbit_series(view: &SimView, shard: Shard, path: &Path, append: bool) {
    let path = shard.suffixed(path);
    let Some(mut of) = open_writer(&path, append) else {
        return;
    };
    let Some(first) = view.particles.first() else {
        return;
    };
    let mut com = *first;
    let result = (|| -> io::Result<()> {
        for p in &view.particles[1..] {
            let o = orbit::orbit_for(view.g, p, &com);
            writeln!(
                of,
                "{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}",
                view.t, o.a, o.e, o.inc, o.node, o.peri, o.l, o.period, o.f
            )?;
            com = orbit::fold_center_of_mass(com, *p);
        }
        of.flush()
    })();
    report_write_error(&path, result);
}

/// Velocity mean and rms dispersion: t Ax Ay Az Qx Qy Qz. Every shard folds
/// its own particles; the reduction must finish before the root reports, and
/// only the root writes.
pub fn append_velocity_dispersion(
    view: &SimView,
    shard: Shard,
    reducer: &dyn StatsReduce,
    path: &Path,
) {
    let local = VelocityStats::from_view(view).partial();
    let Some(total) = reducer.reduce(local) else {
        return;
    };
    if !shard.is_root() {
        return;
    }
    let Some(mut of) = open_writer(path, true) else {
        return;
    };
    let a = total.mean();
    let q = total.rms();
    let result = writeln!(
        of,
        "{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}",
        view.t, a.x, a.y, a.z, q.x, q.y, q.z
    )
    .and_then(|_| of.flush());
    report_write_error(path, result);
}

/// Raw binary positions, one 3-double record per particle.
pub fn write_binary_positions(view: &SimView, shard: Shard, path: &Path) {
    let path = shard.suffixed(path);
    let Some(mut of) = open_writer(&path, false) else {
        return;
    };
    for p in view.particles {
        if let Err(e) = bincode::serialize_into(&mut of, &p.pos) {
            log::error!("error while writing file '{}': {e}", path.display());
            return;
        }
    }
    report_write_error(&path, of.flush());
}

/// Wall-clock bookkeeping for the one-line progress status.
#[derive(Default)]
pub struct TimingPrinter {
    last: Option<Instant>,
}

impl TimingPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite the status line: particle count, time (orbits in a shearing
    /// frame), timestep, wall-clock seconds since the previous call, percent
    /// of `end_time`. Only the root shard prints. With the `profiling`
    /// feature the per-category share lines follow.
    pub fn print(&mut self, view: &SimView, shard: Shard, end_time: f64) {
        if !shard.is_root() {
            return;
        }
        let now = Instant::now();
        let elapsed = self
            .last
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        if self.last.is_some() {
            print!("\r");
        }
        self.last = Some(now);

        print!("N= {:<9} ", view.n());
        if view.integrator.is_shearing() {
            print!("t= {:<12.6} [orb]  ", view.t * view.shear_omega / TAU);
        } else {
            print!("t= {:<12.6}  ", view.t);
        }
        print!("dt= {:<12.6}  cpu= {:<9.6} [s]  ", view.dt, elapsed);
        if end_time > 0.0 && end_time.is_finite() {
            print!("t/tmax= {:5.2}%", view.t / end_time * 100.0);
        }
        #[cfg(feature = "profiling")]
        crate::PROFILER.lock().print_categories();
        let _ = io::stdout().flush();
    }
}
