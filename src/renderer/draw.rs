// renderer/draw.rs
// Frame composition. The order is fixed because later draws overlay earlier
// ones: clear, point cloud, solid spheres, orbit wires or streaks, tree
// cells, domain box. The wire and tree passes run once per ghost image,
// applying each shift and then its exact inverse so the global transform is
// restored between images.

use std::f64::consts::TAU;

use palette::Srgba;
use smallvec::smallvec;
use ultraviolet::DVec3;

use super::backend::RenderBackend;
use super::state::RenderState;
use crate::boundary::{self, GhostBox};
use crate::engine::{SimView, TreeArena, NO_CELL};
use crate::orbit;

/// Compose one frame of the current view into the backend.
pub fn compose_frame<B: RenderBackend>(backend: &mut B, view: &SimView, state: &RenderState) {
    if state.clear {
        backend.clear();
    }

    let reference = (state.reference >= 0)
        .then(|| view.particles.get(state.reference as usize))
        .flatten()
        .map(|p| p.pos);
    if let Some(pos) = reference {
        backend.translate(-pos);
    }
    backend.rotate_x_deg(state.rotate_x);
    backend.rotate_z_deg(state.rotate_z);

    let shifts = if state.ghosts {
        boundary::ghost_boxes(view)
    } else {
        smallvec![GhostBox::default()]
    };

    let points: Vec<DVec3> = view.particles.iter().map(|p| p.pos).collect();

    for gb in &shifts {
        backend.translate(gb.shift);
        // with clear off and wires on, only the wires accumulate
        if !(!state.clear && state.wire) {
            backend.set_color(Srgba::new(1.0, 1.0, 0.0, 0.9));
            backend.set_point_size(5.0);
            backend.draw_points(&points);
            if view.collisions_enabled && state.spheres {
                backend.set_color(Srgba::new(1.0, 1.0, 1.0, 1.0));
                for p in view.particles {
                    if p.radius > 0.0 {
                        backend.draw_solid_sphere(p.pos, p.radius);
                    }
                }
            }
        }
        if state.wire {
            if view.integrator.is_shearing() {
                draw_streaks(backend, view);
            } else {
                draw_orbit_wires(backend, view);
            }
        }
        if state.tree {
            if let Some(tree) = view.tree {
                draw_tree(backend, tree, state.mass);
            }
        }
        backend.translate(-gb.shift);
    }

    backend.set_color(Srgba::new(1.0, 0.0, 0.0, 0.4));
    backend.draw_wire_cube(DVec3::zero(), view.boxsize);

    backend.rotate_z_deg(-state.rotate_z);
    backend.rotate_x_deg(-state.rotate_x);
    if let Some(pos) = reference {
        backend.translate(pos);
    }
}

/// One Keplerian wire per body around the folded center of mass of all
/// lower-indexed bodies. Active and test bodies get distinct colors when the
/// engine distinguishes them; otherwise colors alternate by index.
fn draw_orbit_wires<B: RenderBackend>(backend: &mut B, view: &SimView) {
    let Some(first) = view.particles.first() else {
        return;
    };
    let mut com = *first;
    for (i, p) in view.particles.iter().enumerate().skip(1) {
        let color = if view.n_active > 0 {
            if (i as i64) >= view.n_active {
                Srgba::new(0.9, 1.0, 0.9, 0.9)
            } else {
                Srgba::new(1.0, 0.9, 0.0, 0.9)
            }
        } else if i % 2 == 1 {
            Srgba::new(0.0, 1.0, 0.0, 0.9)
        } else {
            Srgba::new(0.0, 0.0, 1.0, 0.9)
        };
        backend.set_color(color);

        let o = orbit::orbit_for(view.g, p, &com);
        backend.push_transform();
        backend.translate(com.pos);
        backend.rotate_z_deg(o.node.to_degrees());
        backend.rotate_x_deg(o.inc.to_degrees());
        backend.rotate_z_deg(o.peri.to_degrees());
        let mut wire = Vec::with_capacity(crate::config::WIRE_SAMPLES);
        for s in 0..crate::config::WIRE_SAMPLES {
            let nu = s as f64 * TAU / crate::config::WIRE_SAMPLES as f64;
            let radius = o.a * (1.0 - o.e * o.e) / (1.0 + o.e * nu.cos());
            wire.push(DVec3::new(radius * nu.cos(), radius * nu.sin(), 0.0));
        }
        backend.draw_line_loop(&wire);
        backend.pop_transform();

        com = orbit::fold_center_of_mass(com, *p);
    }
}

/// Shearing frames have no closed orbits to draw; short streaks approximate
/// each body's unperturbed local trajectory over a +-100 dt window, fading
/// toward both ends.
fn draw_streaks<B: RenderBackend>(backend: &mut B, view: &SimView) {
    let dt = view.dt;
    if dt == 0.0 {
        return;
    }
    for p in view.particles.iter().skip(1) {
        let mut streak = Vec::with_capacity(11);
        for s in -5..=5_i64 {
            let t = s as f64 * 20.0 * dt;
            let fade = 1.0 - (t / (120.0 * dt)).abs();
            let warmth = (t + 100.0 * dt) / (200.0 * dt);
            streak.push((
                p.pos + p.vel * t,
                Srgba::new(1.0, warmth as f32, 0.0, fade as f32),
            ));
        }
        backend.draw_line_strip(&streak);
    }
}

/// Pre-order wireframe walk over the tree arena: cell first, then children.
/// The explicit stack bounds recursion depth regardless of tree depth.
fn draw_tree<B: RenderBackend>(backend: &mut B, tree: &TreeArena, show_mass: bool) {
    let mut stack: Vec<u32> = tree.roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        let Some(cell) = tree.cells.get(index as usize) else {
            continue;
        };
        if show_mass {
            backend.set_color(Srgba::new(1.0, 0.5, 1.0, 0.4));
            backend.draw_solid_sphere(cell.com, 0.04 * cell.width);
        }
        backend.set_color(Srgba::new(1.0, 0.0, 0.0, 0.4));
        backend.draw_wire_cube(cell.center, DVec3::new(cell.width, cell.width, cell.width));
        for &child in cell.children.iter().rev() {
            if child != NO_CELL {
                stack.push(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Integrator, Particle, TreeCell};
    use std::collections::VecDeque;

    /// Backend that records the call sequence instead of rasterizing.
    struct Recorder {
        calls: Vec<String>,
        translation: DVec3,
        keys: VecDeque<char>,
    }

    impl Default for Recorder {
        fn default() -> Self {
            Self {
                calls: Vec::new(),
                translation: DVec3::zero(),
                keys: VecDeque::new(),
            }
        }
    }

    impl RenderBackend for Recorder {
        fn clear(&mut self) {
            self.calls.push("clear".into());
        }
        fn set_color(&mut self, _color: Srgba<f32>) {}
        fn set_point_size(&mut self, _size: f32) {}
        fn draw_points(&mut self, points: &[DVec3]) {
            self.calls.push(format!("points:{}", points.len()));
        }
        fn draw_solid_sphere(&mut self, center: DVec3, _radius: f64) {
            self.calls.push(format!("sphere:{:.1}", center.x));
        }
        fn draw_wire_cube(&mut self, center: DVec3, _extents: DVec3) {
            self.calls.push(format!("cube:{:.1}", center.x));
        }
        fn draw_line_loop(&mut self, _points: &[DVec3]) {
            self.calls.push("loop".into());
        }
        fn draw_line_strip(&mut self, points: &[(DVec3, Srgba<f32>)]) {
            self.calls.push(format!("strip:{}", points.len()));
        }
        fn translate(&mut self, shift: DVec3) {
            self.translation += shift;
        }
        fn rotate_x_deg(&mut self, _degrees: f64) {}
        fn rotate_z_deg(&mut self, _degrees: f64) {}
        fn push_transform(&mut self) {}
        fn pop_transform(&mut self) {}
        fn present(&mut self) {}
        fn viewport(&self) -> Option<(u32, u32)> {
            None
        }
        fn read_rgb(&self) -> Option<Vec<u8>> {
            None
        }
        fn poll_keys(&mut self) -> Vec<char> {
            self.keys.drain(..).collect()
        }
    }

    fn two_body() -> Vec<Particle> {
        vec![
            Particle::new(DVec3::zero(), DVec3::zero(), 1.0, 0.1),
            Particle::new(DVec3::unit_x(), DVec3::unit_y(), 1.0e-3, 0.01),
        ]
    }

    fn view<'a>(particles: &'a [Particle], tree: Option<&'a TreeArena>) -> SimView<'a> {
        SimView {
            particles,
            n_active: -1,
            t: 0.0,
            dt: 0.01,
            integrator: Integrator::Ias15,
            g: 1.0,
            boxsize: DVec3::new(4.0, 4.0, 4.0),
            nghost: [1, 0, 0],
            shear_omega: 0.0,
            collisions_enabled: true,
            tree,
        }
    }

    #[test]
    fn composition_order_is_fixed() {
        let particles = two_body();
        let v = view(&particles, None);
        let mut state = RenderState::default();
        state.wire = true;
        let mut rec = Recorder::default();
        compose_frame(&mut rec, &v, &state);

        let calls = rec.calls.join(",");
        // clear, points, spheres, one wire, bounding box
        assert!(calls.starts_with("clear,points:2"));
        assert!(calls.contains("loop"));
        assert!(calls.ends_with("cube:0.0"));
        let points_at = rec.calls.iter().position(|c| c.starts_with("points")).unwrap();
        let loop_at = rec.calls.iter().position(|c| c == "loop").unwrap();
        assert!(points_at < loop_at);
    }

    #[test]
    fn ghost_shifts_are_undone_exactly() {
        let particles = two_body();
        let v = view(&particles, None);
        let mut state = RenderState::default();
        state.ghosts = true;
        state.wire = true;
        let mut rec = Recorder::default();
        compose_frame(&mut rec, &v, &state);
        // three x-images drawn, net translation back to zero
        assert_eq!(rec.calls.iter().filter(|c| c.starts_with("points")).count(), 3);
        assert_eq!(rec.translation, DVec3::zero());
    }

    #[test]
    fn shearing_mode_replaces_wires_with_streaks() {
        let particles = two_body();
        let mut v = view(&particles, None);
        v.integrator = Integrator::Sei;
        let mut state = RenderState::default();
        state.wire = true;
        let mut rec = Recorder::default();
        compose_frame(&mut rec, &v, &state);
        assert!(rec.calls.iter().any(|c| c == "strip:11"));
        assert!(!rec.calls.iter().any(|c| c == "loop"));
    }

    #[test]
    fn spheres_require_collisions_and_toggle() {
        let particles = two_body();
        let mut v = view(&particles, None);
        v.collisions_enabled = false;
        let state = RenderState::default();
        let mut rec = Recorder::default();
        compose_frame(&mut rec, &v, &state);
        assert!(!rec.calls.iter().any(|c| c.starts_with("sphere")));

        v.collisions_enabled = true;
        let mut rec = Recorder::default();
        compose_frame(&mut rec, &v, &state);
        assert_eq!(rec.calls.iter().filter(|c| c.starts_with("sphere")).count(), 2);
    }

    #[test]
    fn tree_walk_is_preorder_cell_before_children() {
        // root at x=0 with children at x=1 and x=2; child 1 has a leaf at x=3
        let cells = vec![
            TreeCell {
                com: DVec3::zero(),
                mass: 4.0,
                center: DVec3::new(0.0, 0.0, 0.0),
                width: 4.0,
                children: [1, 2, NO_CELL, NO_CELL, NO_CELL, NO_CELL, NO_CELL, NO_CELL],
            },
            TreeCell {
                com: DVec3::zero(),
                mass: 2.0,
                center: DVec3::new(1.0, 0.0, 0.0),
                width: 2.0,
                children: [3, NO_CELL, NO_CELL, NO_CELL, NO_CELL, NO_CELL, NO_CELL, NO_CELL],
            },
            TreeCell {
                com: DVec3::zero(),
                mass: 1.0,
                center: DVec3::new(2.0, 0.0, 0.0),
                width: 2.0,
                children: [NO_CELL; 8],
            },
            TreeCell {
                com: DVec3::zero(),
                mass: 1.0,
                center: DVec3::new(3.0, 0.0, 0.0),
                width: 1.0,
                children: [NO_CELL; 8],
            },
        ];
        let tree = TreeArena {
            cells,
            roots: vec![0],
        };
        let particles = two_body();
        let v = view(&particles, Some(&tree));
        let mut state = RenderState::default();
        state.tree = true;
        let mut rec = Recorder::default();
        compose_frame(&mut rec, &v, &state);

        let cubes: Vec<&String> = rec.calls.iter().filter(|c| c.starts_with("cube")).collect();
        // cell first, then its children depth-first, bounding box last
        assert_eq!(
            cubes,
            ["cube:0.0", "cube:1.0", "cube:3.0", "cube:2.0", "cube:0.0"]
        );
    }
}
