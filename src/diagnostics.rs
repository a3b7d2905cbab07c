// diagnostics.rs
// One-pass velocity statistics and their cross-shard reduction.

use ultraviolet::DVec3;

use crate::engine::SimView;

/// Running per-axis mean and sum of squared deviations over an index-ordered
/// pass of velocity samples. The incremental update keeps intermediate error
/// bounded where the naive subtract-a-large-mean form does not, so this must
/// stay a strict left-to-right fold.
#[derive(Clone, Copy, Debug)]
pub struct VelocityStats {
    n: u64,
    mean: DVec3,
    q: DVec3,
}

impl Default for VelocityStats {
    fn default() -> Self {
        Self {
            n: 0,
            mean: DVec3::zero(),
            q: DVec3::zero(),
        }
    }
}

impl VelocityStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one sample.
    pub fn push(&mut self, v: DVec3) {
        self.n += 1;
        let prev = self.mean;
        self.mean = prev + (v - prev) / self.n as f64;
        self.q += (v - prev) * (v - self.mean);
    }

    /// Accumulate every particle of the view. A shearing frame carries a
    /// background shear of -1.5 Omega x in vy which is removed before the
    /// sample enters the fold.
    pub fn from_view(view: &SimView) -> Self {
        let mut stats = Self::new();
        let shearing = view.integrator.is_shearing();
        for p in view.particles {
            let mut vel = p.vel;
            if shearing {
                vel.y += 1.5 * view.shear_omega * p.pos.x;
            }
            stats.push(vel);
        }
        stats
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> DVec3 {
        self.mean
    }

    /// Per-axis root-mean-square deviation, sqrt(Q/N).
    pub fn rms(&self) -> DVec3 {
        if self.n == 0 {
            return DVec3::zero();
        }
        let var = self.q / self.n as f64;
        DVec3::new(var.x.sqrt(), var.y.sqrt(), var.z.sqrt())
    }

    /// Extensive totals for reduction. Mean and Q are intensive and cannot
    /// be summed across shards; N, the raw velocity sum, and the squared
    /// deviations can.
    pub fn partial(&self) -> StatsPartial {
        StatsPartial {
            n: self.n,
            sum: self.mean * self.n as f64,
            sum_sq_dev: self.q,
        }
    }
}

/// Extensive (N, sum, sum-of-squared-deviations) triple from one shard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsPartial {
    pub n: u64,
    pub sum: DVec3,
    pub sum_sq_dev: DVec3,
}

impl Default for StatsPartial {
    fn default() -> Self {
        Self {
            n: 0,
            sum: DVec3::zero(),
            sum_sq_dev: DVec3::zero(),
        }
    }
}

impl StatsPartial {
    /// Combine two shards' totals. The cross term corrects Q for the
    /// difference between the shard means, so the merge matches a single
    /// pass over the concatenated samples up to rounding.
    pub fn merge(self, other: StatsPartial) -> StatsPartial {
        if self.n == 0 {
            return other;
        }
        if other.n == 0 {
            return self;
        }
        let n = self.n + other.n;
        let delta = other.sum / other.n as f64 - self.sum / self.n as f64;
        let weight = self.n as f64 * other.n as f64 / n as f64;
        StatsPartial {
            n,
            sum: self.sum + other.sum,
            sum_sq_dev: self.sum_sq_dev + other.sum_sq_dev + delta * delta * weight,
        }
    }

    pub fn mean(&self) -> DVec3 {
        if self.n == 0 {
            return DVec3::zero();
        }
        self.sum / self.n as f64
    }

    pub fn rms(&self) -> DVec3 {
        if self.n == 0 {
            return DVec3::zero();
        }
        let var = self.sum_sq_dev / self.n as f64;
        DVec3::new(var.x.sqrt(), var.y.sqrt(), var.z.sqrt())
    }
}

/// Reduction/transport seam for multi-shard deployments. A cluster build
/// sums partials across ranks and hands the total to the root only; every
/// shard must have finished its local pass before the reduction runs.
pub trait StatsReduce {
    /// Reduce a shard's totals. Returns None on non-root shards.
    fn reduce(&self, local: StatsPartial) -> Option<StatsPartial>;
}

/// Single-process reduction: the local totals are the global totals.
pub struct LocalReduce;

impl StatsReduce for LocalReduce {
    fn reduce(&self, local: StatsPartial) -> Option<StatsPartial> {
        Some(local)
    }
}
