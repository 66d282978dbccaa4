//! Per-sample force accumulation and velocity/displacement update.
//!
//! This is a discrete coupled-oscillator model, not a free-space spring law:
//! the force between grid neighbors is the stiffness times the *difference of
//! displacements*, with no rest-length term. Each enabled axis is an
//! independent wave equation over the grid.

use super::Lattice;

/// Smallest mass the integrator will divide by. A zero mass is a
/// configuration error; the snapshot clamps rather than trusting the
/// control surface.
pub const MIN_MASS: f32 = 1.0e-6;

/// One consistent physics configuration, read once per processing block.
///
/// Mass and damping are shared scalars across the whole lattice. The freedom
/// flags gate force computation per axis globally.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsParams {
    pub mass: f32,
    pub damping: f32,
    /// Degrees of freedom for particle movement, indexed X/Y/Z.
    pub freedom: [bool; 3],
    /// Freezes integration; synthesis keeps reading the held displacements.
    pub paused: bool,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 0.0,
            freedom: [true, false, false],
            paused: false,
        }
    }
}

impl PhysicsParams {
    #[inline]
    pub fn effective_mass(&self) -> f32 {
        self.mass.max(MIN_MASS)
    }

    #[inline]
    pub fn frozen(&self) -> bool {
        !self.freedom.iter().any(|&f| f)
    }
}

/// Advance the lattice by one sample.
///
/// Order per step:
/// 1. X-neighbor pairs accumulate `k * (d[i+1] - d[i])` into both particles'
///    accelerations, equal and opposite; writes into boundary anchors are
///    skipped.
/// 2. When two-dimensional, Y-neighbor pairs do the same along columns.
/// 3. Interior particles integrate `v += (a/m - v*damping) * dt` then
///    `d += v * dt` (semi-implicit Euler with linear damping).
/// 4. All accelerations are zeroed; they never persist across samples.
///
/// With every axis disabled, interior velocities are forced to zero and no
/// forces are computed (frozen policy, not merely zero net force).
///
/// Never panics and never allocates; per-step work is O(grid size).
pub fn step(lattice: &mut Lattice, params: &PhysicsParams, dt: f32) {
    if params.frozen() {
        freeze(lattice);
        return;
    }

    accumulate_x_forces(lattice, &params.freedom);
    if lattice.is_two_dimensional() {
        accumulate_y_forces(lattice, &params.freedom);
    }

    let m = params.effective_mass();
    let b = params.damping;
    let (nx, ny) = (lattice.nx(), lattice.ny());
    for y in 0..ny {
        for x in 0..nx {
            if lattice.is_boundary(x, y) {
                continue;
            }
            let i = lattice.idx(x, y);
            let p = &mut lattice.particles[i];
            for c in 0..3 {
                if !params.freedom[c] {
                    continue;
                }
                p.velocity[c] += (p.acceleration[c] / m - p.velocity[c] * b) * dt;
                p.displacement[c] += p.velocity[c] * dt;
            }
        }
    }

    for p in &mut lattice.particles {
        p.acceleration = [0.0; 3];
    }
}

fn freeze(lattice: &mut Lattice) {
    let (nx, ny) = (lattice.nx(), lattice.ny());
    for y in 0..ny {
        for x in 0..nx {
            if lattice.is_boundary(x, y) {
                continue;
            }
            let i = lattice.idx(x, y);
            lattice.particles[i].velocity = [0.0; 3];
            lattice.particles[i].acceleration = [0.0; 3];
        }
    }
}

fn accumulate_x_forces(lattice: &mut Lattice, freedom: &[bool; 3]) {
    let (nx, ny) = (lattice.nx(), lattice.ny());
    let (y_lo, y_hi) = if lattice.is_two_dimensional() {
        (1, ny - 1)
    } else {
        (0, ny)
    };
    for y in y_lo..y_hi {
        for i in 0..nx - 1 {
            let k = lattice.x_springs[i].k;
            let a = lattice.idx(i, y);
            let b = lattice.idx(i + 1, y);
            let left_fixed = lattice.is_boundary(i, y);
            let right_fixed = lattice.is_boundary(i + 1, y);
            for c in 0..3 {
                if !freedom[c] {
                    continue;
                }
                let f = k
                    * (lattice.particles[b].displacement[c]
                        - lattice.particles[a].displacement[c]);
                if !left_fixed {
                    lattice.particles[a].acceleration[c] += f;
                }
                if !right_fixed {
                    lattice.particles[b].acceleration[c] -= f;
                }
            }
        }
    }
}

fn accumulate_y_forces(lattice: &mut Lattice, freedom: &[bool; 3]) {
    let (nx, ny) = (lattice.nx(), lattice.ny());
    for x in 1..nx - 1 {
        for j in 0..ny - 1 {
            let k = lattice.y_springs[j].k;
            let a = lattice.idx(x, j);
            let b = lattice.idx(x, j + 1);
            let below_fixed = lattice.is_boundary(x, j);
            let above_fixed = lattice.is_boundary(x, j + 1);
            for c in 0..3 {
                if !freedom[c] {
                    continue;
                }
                let f = k
                    * (lattice.particles[b].displacement[c]
                        - lattice.particles[a].displacement[c]);
                if !below_fixed {
                    lattice.particles[a].acceleration[c] += f;
                }
                if !above_fixed {
                    lattice.particles[b].acceleration[c] -= f;
                }
            }
        }
    }
}
