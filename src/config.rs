// config.rs
// Constants and the optional `nbody_scope.toml` run configuration. Missing
// file or missing fields fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "nbody_scope.toml";

pub const WINDOW_WIDTH: u32 = 700;
pub const WINDOW_HEIGHT: u32 = 700;

/// Samples along one orbit wire.
pub const WIRE_SAMPLES: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Disc bodies in the demo scene (plus one central mass).
    #[serde(default = "default_particles")]
    pub particles: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_g")]
    pub g: f64,
    /// Stop time handed to the engine; infinity runs until 'q'.
    #[serde(default = "default_end_time")]
    pub end_time: f64,
    /// Simulation-time spacing of the series outputs; 0 disables them.
    #[serde(default = "default_output_interval")]
    pub output_interval: f64,
    /// Simulation-time spacing of binary snapshots; 0 disables them.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// World units spanned vertically by the view.
    #[serde(default = "default_view_extent")]
    pub view_extent: f64,
}

fn default_particles() -> usize {
    64
}

fn default_dt() -> f64 {
    1.0e-3
}

fn default_g() -> f64 {
    1.0
}

fn default_end_time() -> f64 {
    f64::INFINITY
}

fn default_output_interval() -> f64 {
    0.1
}

fn default_snapshot_interval() -> f64 {
    1.0
}

fn default_output_dir() -> String {
    "out".to_string()
}

fn default_view_extent() -> f64 {
    40.0
}

impl Default for RunConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config must deserialize from defaults")
    }
}

impl RunConfig {
    /// Load `nbody_scope.toml` from the working directory, falling back to
    /// defaults when it is absent or unreadable.
    pub fn load_default() -> Self {
        Self::load(Path::new(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => {
                    log::info!("loaded configuration from '{}'", path.display());
                    config
                }
                Err(e) => {
                    log::error!("invalid configuration '{}': {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: RunConfig = toml::from_str("").unwrap();
        assert_eq!(config.particles, 64);
        assert!(config.end_time.is_infinite());
        assert_eq!(config.output_dir, "out");
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: RunConfig = toml::from_str("particles = 8\ndt = 0.5").unwrap();
        assert_eq!(config.particles, 8);
        assert_eq!(config.dt, 0.5);
        assert_eq!(config.g, 1.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = RunConfig::load(Path::new("/no/such/nbody_scope.toml"));
        assert_eq!(config.particles, RunConfig::default().particles);
    }
}
