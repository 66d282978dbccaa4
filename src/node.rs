//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call. Contains the graph's sample
/// rate and the buffer size (always 64 samples in the current implementation).
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per buffer (currently always 64)
    pub buffer_size: usize,
}

impl ProcessContext {
    /// Integration time step derived from the sample rate.
    #[inline]
    pub fn time_step(&self) -> f32 {
        1.0 / self.sample_rate as f32
    }
}

/// Unique identifier for a node within a graph.
///
/// You typically don't interact with this directly - use
/// [`Handle`](crate::Handle) instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: Generate audio (0 inputs, 1+ outputs) - the lattice voice
/// - **Effects**: Process audio (1+ inputs, 1+ outputs) - gain, reverb
/// - **Sinks**: Consume audio (1+ inputs, 0 outputs) - device outputs, scopes
///
/// # Message-Based Parameters
///
/// Instead of shared mutable state, nodes receive parameter updates via
/// messages drained at the start of each processed block. A whole block sees
/// one consistent parameter snapshot; a message sent mid-block takes effect
/// one block later at most.
///
/// ```
/// use schwingt::{AudioNode, ProcessContext};
/// use dasp_graph::{Buffer, Input};
///
/// enum PulseMessage {
///     SetFrequency(f32),
/// }
///
/// struct Pulse {
///     frequency: f32,
///     phase: f32,
/// }
///
/// impl AudioNode for Pulse {
///     type Message = PulseMessage;
///
///     fn process(
///         &mut self,
///         ctx: &ProcessContext,
///         messages: impl Iterator<Item = PulseMessage>,
///         _inputs: &[Input],
///         outputs: &mut [Buffer],
///     ) {
///         for msg in messages {
///             match msg {
///                 PulseMessage::SetFrequency(f) => self.frequency = f,
///             }
///         }
///         for sample in outputs[0].iter_mut() {
///             *sample = if self.phase < 0.5 { 0.2 } else { -0.2 };
///             self.phase = (self.phase + self.frequency / ctx.sample_rate as f32) % 1.0;
///         }
///     }
///
///     fn num_outputs(&self) -> usize { 1 }
/// }
/// ```
///
/// Nodes without runtime parameters use `()` as the message type.
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates.
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// Called once per audio block (64 samples). Implementations should:
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write to `outputs`
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize {
        0
    }

    /// Number of audio output channels.
    fn num_outputs(&self) -> usize {
        1
    }
}
