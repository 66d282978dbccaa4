//! The data entities of the lattice.

/// One spatial axis of particle motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes, in component order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a particle's state vectors.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A point mass on the lattice.
///
/// Mass is not stored per particle; it is a shared scalar in
/// [`PhysicsParams`](crate::PhysicsParams). Acceleration is a transient
/// per-step force accumulator, zeroed after every velocity update.
#[derive(Clone, Copy, Debug, Default)]
pub struct Particle {
    pub displacement: [f32; 3],
    pub velocity: [f32; 3],
    pub acceleration: [f32; 3],
}

impl Particle {
    /// Zero all dynamic state.
    pub fn reset(&mut self) {
        *self = Particle::default();
    }
}

/// A spring joining two grid-adjacent particles along one axis.
///
/// Only the stiffness is stored; connectivity is implicit in the parallel
/// spring arrays of the [`Lattice`](crate::Lattice).
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    pub k: f32,
}

impl Spring {
    pub fn new(k: f32) -> Self {
        Self { k }
    }
}
