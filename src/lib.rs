//! Schwingt - coupled-oscillator lattice sonification
//!
//! A rectangular grid of mass points joined by springs is integrated once per
//! audio sample, and the resulting displacements drive banks of additive,
//! bell, FM and AM oscillators. Live audio input can push energy back into
//! the lattice.
//!
//! Design principles:
//! - Each graph has a fixed sample rate (from device or explicit)
//! - Nodes receive parameters via message ring buffers, not shared state
//! - The only lock on the audio thread is the lattice reset lock, held for
//!   at most one block of integration substeps
//! - CPAL devices are discoverable, sinks are just nodes

mod engine;
mod graph;
mod node;

pub mod device;
pub mod drive;
pub mod nodes;
pub mod physics;
pub mod scale;
pub mod synth;

pub use engine::{Handle, Schwingt};
pub use node::{AudioNode, NodeId, ProcessContext};
pub use physics::{Axis, ConfigError, Lattice, PhysicsParams, SharedLattice};
pub use scale::Scale;
pub use synth::SynthParams;
