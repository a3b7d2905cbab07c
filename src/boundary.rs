// boundary.rs
// Ghost-image enumeration for periodic and shearing-periodic domains.

use smallvec::{smallvec, SmallVec};
use ultraviolet::DVec3;

use crate::engine::SimView;

/// Shift applied uniformly to a whole frame's geometry to account for one
/// periodic image of the domain. Recomputed every invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostBox {
    pub shift: DVec3,
    pub shift_vel: DVec3,
}

impl Default for GhostBox {
    fn default() -> Self {
        Self {
            shift: DVec3::zero(),
            shift_vel: DVec3::zero(),
        }
    }
}

/// Enumerate the image shifts for the current boundary configuration, i
/// outermost and k innermost. An axis with ghost count 0 contributes only
/// its zero component, so a fully open domain yields exactly one identity
/// entry and the list stays inline.
pub fn ghost_boxes(view: &SimView) -> SmallVec<[GhostBox; 1]> {
    let [gx, gy, gz] = view.nghost;
    let (gx, gy, gz) = (i64::from(gx), i64::from(gy), i64::from(gz));
    let mut boxes = smallvec![];
    for i in -gx..=gx {
        for j in -gy..=gy {
            for k in -gz..=gz {
                boxes.push(ghost_box(view, i, j, k));
            }
        }
    }
    boxes
}

/// Shift vector for the image at integer offsets (i, j, k). In a shearing
/// frame the x-offset images drift in y at the background shear rate; the
/// drift is wrapped into [-Ly/2, Ly/2) so image rows stay adjacent to the
/// box, and the matching velocity offset is reported alongside.
pub fn ghost_box(view: &SimView, i: i64, j: i64, k: i64) -> GhostBox {
    let mut shift = DVec3::new(
        i as f64 * view.boxsize.x,
        j as f64 * view.boxsize.y,
        k as f64 * view.boxsize.z,
    );
    let mut shift_vel = DVec3::zero();
    if view.integrator.is_shearing() && i != 0 {
        let shear_rate = -1.5 * view.shear_omega * shift.x;
        let ly = view.boxsize.y;
        if ly > 0.0 {
            shift.y += (shear_rate * view.t + 0.5 * ly).rem_euclid(ly) - 0.5 * ly;
        }
        shift_vel.y += shear_rate;
    }
    GhostBox { shift, shift_vel }
}
