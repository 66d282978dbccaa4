//! Lattice physics: particles, springs, and the per-sample integrator.
//!
//! Everything here is plain synchronous code with no audio dependencies, so
//! the force model can be tested step by step. The real-time wrapper lives in
//! [`crate::nodes::source::LatticeNode`].

mod integrator;
mod lattice;
mod particle;

pub use integrator::{step, PhysicsParams, MIN_MASS};
pub use lattice::{Lattice, SharedLattice};
pub use particle::{Axis, Particle, Spring};

use core::fmt;

/// Errors rejected at build/reconfigure time.
///
/// The audio path itself never returns errors: every invalid configuration is
/// caught before it can reach a processing block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Grid smaller than the 2x1 minimum (two anchors and nothing between is
    /// the degenerate floor; anything below cannot hold a spring).
    GridTooSmall { nx: usize, ny: usize },
    /// A sample rate of zero would make the time step infinite.
    ZeroSampleRate,
    /// Scale name not in the closed set of ratio tables.
    UnknownScale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::GridTooSmall { nx, ny } => {
                write!(f, "lattice grid {nx}x{ny} is below the 2x1 minimum")
            }
            ConfigError::ZeroSampleRate => write!(f, "sample rate must be non-zero"),
            ConfigError::UnknownScale => write!(f, "unknown scale name"),
        }
    }
}

impl std::error::Error for ConfigError {}
