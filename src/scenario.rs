// scenario.rs
// Demo host: a seeded disc scene and a minimal engine so the binary has
// something to observe. The real physics lives outside this crate; the
// stepper here is just enough to make orbits move.

use ultraviolet::DVec3;

use crate::engine::{Engine, Integrator, Particle, SimView};

/// Deterministic disc of `n` bodies on near-circular orbits around a central
/// mass. Velocities are set from the mass enclosed at each radius so the
/// disc starts close to equilibrium.
pub fn kepler_disc(n: usize) -> Vec<Particle> {
    fastrand::seed(0);
    let central_mass = 1.0e3;
    let outer_radius = (n.max(1) as f64).sqrt() * 1.5;

    let mut bodies = Vec::with_capacity(n + 1);
    bodies.push(Particle::new(
        DVec3::zero(),
        DVec3::zero(),
        central_mass,
        0.1,
    ));

    while bodies.len() < n + 1 {
        let a = fastrand::f64() * std::f64::consts::TAU;
        let (sin, cos) = a.sin_cos();
        let r = outer_radius * fastrand::f64().sqrt().max(0.05);
        let z = (fastrand::f64() - 0.5) * 0.05 * r;
        bodies.push(Particle::new(
            DVec3::new(r * cos, r * sin, z),
            DVec3::zero(),
            1.0,
            0.01,
        ));
    }

    bodies.sort_by(|a, b| a.pos.mag_sq().total_cmp(&b.pos.mag_sq()));
    let mut enclosed = 0.0;
    for body in bodies.iter_mut() {
        enclosed += body.mass;
        let r = body.pos.mag();
        if r == 0.0 {
            continue;
        }
        let v = (enclosed / r).sqrt();
        // circular velocity, perpendicular to the radius in the plane
        body.vel = DVec3::new(-body.pos.y, body.pos.x, 0.0) / r * v;
    }

    bodies
}

/// Direct-sum leapfrog engine for demos and tests. Stands in for the real
/// simulation core behind the same two primitives.
pub struct DemoEngine {
    particles: Vec<Particle>,
    t: f64,
    dt: f64,
    g: f64,
    boxsize: DVec3,
    accels: Vec<DVec3>,
}

impl DemoEngine {
    pub fn new(particles: Vec<Particle>, dt: f64, g: f64) -> Self {
        let extent = particles
            .iter()
            .map(|p| p.pos.mag())
            .fold(1.0_f64, f64::max)
            * 2.5;
        let accels = vec![DVec3::zero(); particles.len()];
        Self {
            particles,
            t: 0.0,
            dt,
            g,
            boxsize: DVec3::new(extent, extent, extent),
            accels,
        }
    }

    fn update_accels(&mut self) {
        let softening = 1.0e-4;
        for a in self.accels.iter_mut() {
            *a = DVec3::zero();
        }
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let d = self.particles[j].pos - self.particles[i].pos;
                let r2 = d.mag_sq() + softening;
                let inv_r3 = 1.0 / (r2 * r2.sqrt());
                self.accels[i] += d * (self.g * self.particles[j].mass * inv_r3);
                self.accels[j] -= d * (self.g * self.particles[i].mass * inv_r3);
            }
        }
    }
}

impl Engine for DemoEngine {
    fn view(&self) -> SimView<'_> {
        SimView {
            particles: &self.particles,
            n_active: -1,
            t: self.t,
            dt: self.dt,
            integrator: Integrator::LeapFrog,
            g: self.g,
            boxsize: self.boxsize,
            nghost: [0, 0, 0],
            shear_omega: 0.0,
            collisions_enabled: false,
            tree: None,
        }
    }

    fn step(&mut self) {
        let half = 0.5 * self.dt;
        self.update_accels();
        for (p, a) in self.particles.iter_mut().zip(&self.accels) {
            p.vel += *a * half;
            p.pos += p.vel * self.dt;
        }
        self.update_accels();
        for (p, a) in self.particles.iter_mut().zip(&self.accels) {
            p.vel += *a * half;
        }
        self.t += self.dt;
    }

    fn should_stop(&self, end_time: f64) -> bool {
        if !end_time.is_finite() {
            return false;
        }
        if self.dt >= 0.0 {
            self.t >= end_time
        } else {
            self.t <= end_time
        }
    }
}
