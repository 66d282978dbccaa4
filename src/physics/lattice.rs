//! The particle grid and its spring topology.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use itertools::iproduct;
use tracing::debug;

use super::{ConfigError, Particle, Spring};

/// A rectangular grid of particles joined by springs along X and
/// (when two-dimensional) Y.
///
/// Column 0 and column `nx - 1` are fixed boundary anchors. A lattice with
/// `ny > 3` is two-dimensional: rows 0 and `ny - 1` become anchors as well
/// and Y-springs start coupling the interior rows. Anchors never receive
/// internally summed forces and are never integrated; their displacement
/// changes only through [`reset`](Lattice::reset) or external drive.
pub struct Lattice {
    nx: usize,
    ny: usize,
    /// Row-major: `particles[y * nx + x]`
    pub(crate) particles: Vec<Particle>,
    pub(crate) x_springs: Vec<Spring>,
    pub(crate) y_springs: Vec<Spring>,
}

impl Lattice {
    /// Allocate a fresh `nx` x `ny` grid with all dynamic state zeroed and
    /// every spring at the given stiffness.
    ///
    /// Grids below 2x1 are rejected here, never mid-simulation.
    pub fn build(nx: usize, ny: usize, stiffness: f32) -> Result<Self, ConfigError> {
        if nx < 2 || ny < 1 {
            return Err(ConfigError::GridTooSmall { nx, ny });
        }
        debug!(nx, ny, stiffness, "building lattice");
        let y_spring_count = ny.saturating_sub(1);
        Ok(Self {
            nx,
            ny,
            particles: vec![Particle::default(); nx * ny],
            x_springs: vec![Spring::new(stiffness); nx - 1],
            y_springs: vec![Spring::new(stiffness); y_spring_count],
        })
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// True when the grid couples along Y (`ny > 3`: one interior row plus
    /// the two row anchors is the minimum for 2D motion).
    #[inline]
    pub fn is_two_dimensional(&self) -> bool {
        self.ny > 3
    }

    #[inline]
    pub(crate) fn idx(&self, x: usize, y: usize) -> usize {
        y * self.nx + x
    }

    /// Whether `(x, y)` is a fixed boundary anchor.
    #[inline]
    pub fn is_boundary(&self, x: usize, y: usize) -> bool {
        x == 0
            || x == self.nx - 1
            || (self.is_two_dimensional() && (y == 0 || y == self.ny - 1))
    }

    #[inline]
    pub fn particle(&self, x: usize, y: usize) -> &Particle {
        &self.particles[y * self.nx + x]
    }

    #[inline]
    pub fn particle_mut(&mut self, x: usize, y: usize) -> &mut Particle {
        &mut self.particles[y * self.nx + x]
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn x_springs(&self) -> &[Spring] {
        &self.x_springs
    }

    pub fn y_springs(&self) -> &[Spring] {
        &self.y_springs
    }

    /// Stiffness of the spring joining columns `i` and `i + 1`.
    pub fn set_x_stiffness(&mut self, i: usize, k: f32) {
        if let Some(s) = self.x_springs.get_mut(i) {
            s.k = k;
        }
    }

    /// Stiffness of the spring joining rows `j` and `j + 1`.
    pub fn set_y_stiffness(&mut self, j: usize, k: f32) {
        if let Some(s) = self.y_springs.get_mut(j) {
            s.k = k;
        }
    }

    pub fn set_all_stiffness(&mut self, k: f32) {
        for s in self.x_springs.iter_mut().chain(self.y_springs.iter_mut()) {
            s.k = k;
        }
    }

    /// Iterate `(x, y)` coordinates of every non-anchor particle.
    pub fn interior_coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let (nx, ny) = (self.nx, self.ny);
        let (y_lo, y_hi) = if self.is_two_dimensional() {
            (1, ny - 1)
        } else {
            (0, ny)
        };
        iproduct!(y_lo..y_hi, 1..nx - 1).map(|(y, x)| (x, y))
    }

    /// Number of non-anchor particles.
    pub fn interior_count(&self) -> usize {
        let rows = if self.is_two_dimensional() {
            self.ny - 2
        } else {
            self.ny
        };
        (self.nx - 2) * rows
    }

    /// Zero displacement, velocity and acceleration of every particle
    /// without reallocating. Idempotent.
    pub fn reset(&mut self) {
        for p in &mut self.particles {
            p.reset();
        }
    }

    /// Copy the current displacement grid (row-major), for drawing.
    pub fn snapshot_displacements(&self) -> Vec<[f32; 3]> {
        self.particles.iter().map(|p| p.displacement).collect()
    }
}

/// The lattice behind the reset lock.
///
/// Exactly one mutex serializes `reset()` (and draw snapshots) against the
/// integrator, which holds it for one block of substeps at a time. A reset
/// therefore appears atomic with respect to a full integration step; it can
/// never interleave with a partial force-accumulation pass. The lock is held
/// only across the mutation window, never across I/O.
#[derive(Clone)]
pub struct SharedLattice {
    inner: Arc<Mutex<Lattice>>,
}

impl SharedLattice {
    pub fn new(lattice: Lattice) -> Self {
        Self {
            inner: Arc::new(Mutex::new(lattice)),
        }
    }

    /// Build and wrap in one go.
    pub fn build(nx: usize, ny: usize, stiffness: f32) -> Result<Self, ConfigError> {
        Ok(Self::new(Lattice::build(nx, ny, stiffness)?))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Lattice> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Zero all particle state. Blocks for at most one in-flight block of
    /// integration substeps.
    pub fn reset(&self) {
        debug!("lattice reset");
        self.lock().reset();
    }

    /// Run a closure with exclusive access, for control-rate edits like
    /// per-spring stiffness changes.
    pub fn with<R>(&self, f: impl FnOnce(&mut Lattice) -> R) -> R {
        f(&mut self.lock())
    }

    /// Displacements for the draw path. The copy is consistent, but may lag
    /// the audio thread by up to one block.
    pub fn snapshot_displacements(&self) -> Vec<[f32; 3]> {
        self.lock().snapshot_displacements()
    }
}
