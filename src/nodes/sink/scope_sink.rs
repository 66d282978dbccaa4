//! Ring-buffer sink for waveform display and offline capture.

use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, ProcessContext};

/// A sink that writes interleaved stereo into an `rtrb` ring buffer.
///
/// The control surface drains the consumer side for waveform display; tests
/// use it to capture engine output deterministically. When the ring fills,
/// new samples are dropped - display is best-effort, audio never blocks.
pub struct ScopeSink {
    producer: Producer<f32>,
    channels: usize,
}

impl ScopeSink {
    /// Create a sink and the consumer that reads from it.
    pub fn new(capacity: usize) -> (Self, Consumer<f32>) {
        let (producer, consumer) = RingBuffer::new(capacity.max(128));
        (
            Self {
                producer,
                channels: 2,
            },
            consumer,
        )
    }
}

impl AudioNode for ScopeSink {
    type Message = ();

    fn process(
        &mut self,
        ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let Some(input) = inputs.first() else {
            return;
        };
        let buffers = input.buffers();
        if buffers.is_empty() {
            return;
        }

        for i in 0..ctx.buffer_size {
            for ch in 0..self.channels {
                let src = buffers.get(ch).unwrap_or(&buffers[0]);
                let _ = self.producer.push(src[i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        1
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        0
    }
}
