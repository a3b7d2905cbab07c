// orbit.rs
// Osculating orbital elements from a two-body relative Cartesian state, and
// the center-of-mass fold that chains references across the particle list.

use std::f64::consts::TAU;

use ultraviolet::DVec3;

use crate::engine::Particle;

/// Below this eccentricity / inclination the node and periapsis angles are
/// numerically meaningless and the longitude fallbacks take over.
const MIN_ANGLE: f64 = 1.0e-10;

/// Instantaneous Keplerian elements of a body relative to a reference mass.
/// Derived, never stored.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrbitElements {
    /// Semi-major axis (negative on hyperbolic orbits).
    pub a: f64,
    pub e: f64,
    /// Inclination, radians.
    pub inc: f64,
    /// Longitude of the ascending node.
    pub node: f64,
    /// Argument of periapsis; longitude of periapsis when the orbit is
    /// planar.
    pub peri: f64,
    /// Mean longitude.
    pub l: f64,
    /// Orbital period.
    pub period: f64,
    /// True anomaly.
    pub f: f64,
}

fn acos_clamped(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}

/// Derive the osculating elements of `p` around `reference` under
/// gravitational constant `g`. Circular (e ≈ 0) and planar (inc ≈ 0) states
/// fall back to longitude forms instead of producing NaN.
pub fn orbit_for(g: f64, p: &Particle, reference: &Particle) -> OrbitElements {
    let mu = g * (p.mass + reference.mass);
    let r = p.pos - reference.pos;
    let v = p.vel - reference.vel;
    let d = r.mag();
    let v2 = v.mag_sq();
    let vr = r.dot(v) / d;

    let h = r.cross(v);
    let hm = h.mag();
    let evec = (r * (v2 - mu / d) - v * (d * vr)) / mu;
    let e = evec.mag();

    let a = 1.0 / (2.0 / d - v2 / mu);
    let period = TAU * (a * a * a / mu).abs().sqrt();
    let inc = if hm > 0.0 { acos_clamped(h.z / hm) } else { 0.0 };

    // Node line: intersection of the orbital and reference planes.
    let nvec = DVec3::new(-h.y, h.x, 0.0);
    let nm = nvec.mag();
    let planar = inc < MIN_ANGLE || nm == 0.0;

    let node = if planar {
        0.0
    } else {
        let mut node = acos_clamped(nvec.x / nm);
        if nvec.y < 0.0 {
            node = TAU - node;
        }
        node
    };

    let peri = if e < MIN_ANGLE {
        0.0
    } else if planar {
        // Longitude of periapsis, measured from the x-axis.
        let mut peri = acos_clamped(evec.x / e);
        if evec.y < 0.0 {
            peri = TAU - peri;
        }
        peri
    } else {
        let mut peri = acos_clamped((nvec.x * evec.x + nvec.y * evec.y) / (nm * e));
        if evec.z < 0.0 {
            peri = TAU - peri;
        }
        peri
    };

    let f = if e < MIN_ANGLE {
        // Circular: measure from the node line (x-axis when planar), with
        // the winding sign taken from h.
        let refdir = if planar { DVec3::unit_x() } else { nvec / nm };
        let mut f = acos_clamped(refdir.dot(r) / d);
        if hm > 0.0 && refdir.cross(r).dot(h) < 0.0 {
            f = TAU - f;
        }
        f
    } else {
        let mut f = acos_clamped(evec.dot(r) / (e * d));
        if vr < 0.0 {
            f = TAU - f;
        }
        f
    };

    let l = if e < MIN_ANGLE || a <= 0.0 {
        // Circular or unbound: mean anomaly degenerates to the true anomaly.
        f + peri + node
    } else {
        let mut ea = acos_clamped((1.0 - d / a) / e);
        if vr < 0.0 {
            ea = TAU - ea;
        }
        ea - e * ea.sin() + peri + node
    };

    OrbitElements {
        a,
        e,
        inc,
        node,
        peri,
        l,
        period,
        f,
    }
}

/// Mass-weighted combination of an accumulated reference and one more body.
/// Element i uses the fold of bodies 0..i-1, so the walk is strictly
/// left-to-right over the index order.
pub fn fold_center_of_mass(com: Particle, p: Particle) -> Particle {
    let mass = com.mass + p.mass;
    if mass == 0.0 {
        return com;
    }
    Particle {
        pos: (com.pos * com.mass + p.pos * p.mass) / mass,
        vel: (com.vel * com.mass + p.vel * p.mass) / mass,
        mass,
        radius: 0.0,
    }
}
