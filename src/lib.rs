pub mod boundary;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod orbit;
pub mod output;
pub mod profiler;
pub mod renderer;
pub mod scenario;
pub mod snapshot;

pub mod app;

#[cfg(feature = "profiling")]
use once_cell::sync::Lazy;
#[cfg(feature = "profiling")]
use parking_lot::Mutex;

#[cfg(feature = "profiling")]
pub static PROFILER: Lazy<Mutex<profiler::Profiler>> =
    Lazy::new(|| Mutex::new(profiler::Profiler::new()));
