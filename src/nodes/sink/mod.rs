//! Audio sink nodes (consumers with no audio outputs)

#[cfg(feature = "cpal_io")]
mod cpal_sink;
mod scope_sink;

#[cfg(feature = "cpal_io")]
pub use cpal_sink::CpalSink;
pub use scope_sink::ScopeSink;
