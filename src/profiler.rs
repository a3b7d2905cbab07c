// profiler.rs
// Scoped wall-clock accounting. Engine stepping and frame composition are
// charged to separate buckets so the progress line can show where ticks go.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct Profiler {
    timings: HashMap<&'static str, Duration>,
    started: Instant,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            started: Instant::now(),
        }
    }

    pub fn finish(&mut self, guard: &ProfilerGuard) {
        let elapsed = guard.start.elapsed();
        *self.timings.entry(guard.name).or_default() += elapsed;
    }

    pub fn report_sorted(&self) -> Vec<(&'static str, Duration)> {
        let mut v: Vec<_> = self.timings.iter().map(|(n, d)| (*n, *d)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    }

    pub fn clear(&mut self) {
        self.timings.clear();
        self.started = Instant::now();
    }

    /// Append per-category share-of-wall-clock lines below the status line.
    pub fn print_categories(&self) {
        let wall = self.started.elapsed().as_secs_f64().max(1.0e-9);
        println!("\nCATEGORY        TIME");
        let mut accounted = 0.0;
        for (name, dur) in self.report_sorted() {
            let secs = dur.as_secs_f64();
            accounted += secs;
            println!("{:<15} {:5.2}%", name, secs / wall * 100.0);
        }
        println!("{:<15} {:5.2}%", "other", (1.0 - accounted / wall).max(0.0) * 100.0);
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ProfilerGuard {
    name: &'static str,
    start: Instant,
}

/// Start a profiling section. The guard updates the global profiler when
/// dropped.
pub fn start(name: &'static str) -> ProfilerGuard {
    ProfilerGuard {
        name,
        start: Instant::now(),
    }
}

#[cfg(feature = "profiling")]
impl Drop for ProfilerGuard {
    fn drop(&mut self) {
        crate::PROFILER.lock().finish(self);
    }
}

/// Profile a scope only when the `profiling` feature is enabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _guard = $crate::profiler::start($name);
    };
}
