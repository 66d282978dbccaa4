//! Audio effect nodes (inputs → outputs)

mod gain;
mod reverb;

pub use gain::{Gain, GainMessage};
pub use reverb::{Reverb, ReverbMessage};
