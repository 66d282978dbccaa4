//! Audio source nodes (generators with no audio inputs)

mod lattice;

pub use lattice::{LatticeMessage, LatticeNode};
