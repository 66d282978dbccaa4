//! Built-in audio nodes
//!
//! Nodes are organized into three categories:
//! - `source`: Generate audio (no audio inputs) - the lattice voice
//! - `effect`: Process audio (inputs → outputs) - gain, reverb
//! - `sink`: Consume audio (no audio outputs) - device outputs, scopes

pub mod effect;
pub mod sink;
pub mod source;

// Re-export common types at the top level for convenience
pub use effect::{Gain, GainMessage, Reverb, ReverbMessage};
pub use sink::ScopeSink;
pub use source::{LatticeMessage, LatticeNode};

#[cfg(feature = "cpal_io")]
pub use sink::CpalSink;
