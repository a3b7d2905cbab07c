// renderer/state.rs
// View state: mutated only by key events, read by every frame composition.
// One instance per process, owned by the render loop and passed down
// explicitly rather than living in a global.

/// Toggles, reference particle, and camera angles.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderState {
    /// Pauses the simulation; the idle source draws zero steps while set.
    pub pause_sim: bool,
    /// Pauses frame composition while the simulation keeps running.
    pub pause_render: bool,
    /// Solid spheres instead of point sprites (when collisions are active).
    pub spheres: bool,
    /// Tree-cell wireframes.
    pub tree: bool,
    /// Center-of-mass markers inside tree cells.
    pub mass: bool,
    /// Orbit wires (streaks in a shearing frame).
    pub wire: bool,
    /// Clear the frame before composing; off accumulates trails.
    pub clear: bool,
    /// Draw every ghost image instead of just the primary box.
    pub ghosts: bool,
    /// Particle the view recenters on; -1 = none. Always in [-1, N-1].
    pub reference: i64,
    /// Camera rotation around the x-axis, degrees.
    pub rotate_x: f64,
    /// Camera rotation around the z-axis, degrees.
    pub rotate_z: f64,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            pause_sim: false,
            pause_render: false,
            spheres: true,
            tree: false,
            mass: false,
            wire: false,
            clear: true,
            ghosts: false,
            reference: -1,
            rotate_x: 0.0,
            rotate_z: 0.0,
        }
    }
}

impl RenderState {
    /// Step the reference index by delta, wrapping within [-1, N-1].
    pub fn cycle_reference(&mut self, delta: i64, n: usize) {
        let n = n as i64;
        self.reference += delta;
        if self.reference >= n {
            self.reference = -1;
        } else if self.reference < -1 {
            self.reference = n - 1;
        }
    }
}
