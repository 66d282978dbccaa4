//! CPAL audio output sink

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::SupportedStreamConfig;
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, warn};

use crate::node::{AudioNode, ProcessContext};

/// A sink that outputs audio to a CPAL device.
///
/// The CPAL stream runs on its own thread; this node feeds samples into a
/// ring buffer the stream consumes. A missed deadline shows up as an
/// underrun here - reported upward, never masked.
pub struct CpalSink {
    buffer: Producer<f32>,
    channels: usize,
    /// Tracks how many samples CPAL has consumed
    samples_consumed: Arc<AtomicUsize>,
    /// Tracks underrun state for diagnostics
    had_underrun: Arc<AtomicBool>,
}

impl CpalSink {
    /// Create a new sink for the given device and config
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Self {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;

        // Ring buffer sized for ~100ms of audio to handle scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let samples_consumed = Arc::new(AtomicUsize::new(0));
        let had_underrun = Arc::new(AtomicBool::new(false));

        // Spawn stream on a dedicated thread; the stream lives as long as
        // the thread does.
        let device = device.clone();
        let consumed = samples_consumed.clone();
        let underrun = had_underrun.clone();
        std::thread::spawn(move || {
            let stream = match sample_format {
                cpal::SampleFormat::F32 => {
                    build_stream::<f32>(&device, &stream_config, consumer, consumed, underrun)
                }
                cpal::SampleFormat::I16 => {
                    build_stream::<i16>(&device, &stream_config, consumer, consumed, underrun)
                }
                cpal::SampleFormat::U16 => {
                    build_stream::<u16>(&device, &stream_config, consumer, consumed, underrun)
                }
                other => {
                    error!(?other, "unsupported output sample format");
                    return;
                }
            };
            match stream {
                Ok(stream) => {
                    if let Err(e) = stream.play() {
                        error!(%e, "failed to start output stream");
                        return;
                    }
                    loop {
                        std::thread::park();
                    }
                }
                Err(e) => error!(%e, "failed to build output stream"),
            }
        });

        Self {
            buffer: producer,
            channels,
            samples_consumed,
            had_underrun,
        }
    }

    /// Returns how many samples have been played
    #[inline]
    pub fn samples_consumed(&self) -> usize {
        self.samples_consumed.load(Ordering::Relaxed)
    }

    /// Returns available space in the buffer (in samples)
    #[inline]
    pub fn buffer_available(&self) -> usize {
        self.buffer.slots()
    }

    /// Check and clear the underrun flag
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _| {
            let mut starved = false;
            for sample in data.iter_mut() {
                let s = consumer.pop().unwrap_or_else(|_| {
                    starved = true;
                    0.0
                });
                *sample = T::from_sample(s.clamp(-1.0, 1.0));
            }
            // Warn once per underrun episode; check_underrun() re-arms it.
            if starved && !had_underrun.swap(true, Ordering::Relaxed) {
                warn!("output stream underrun");
            }
            samples_consumed.fetch_add(data.len(), Ordering::Relaxed);
        },
        |err| warn!(%err, "output stream error"),
        None,
    )
}

impl AudioNode for CpalSink {
    type Message = (); // No control messages

    fn process(
        &mut self,
        _ctx: &ProcessContext,
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

        let buffer_len = buffers[0].len();
        let samples_needed = buffer_len * self.channels;

        // Check for overrun (generating faster than consuming)
        if self.buffer.slots() < samples_needed {
            // Skip this block rather than partially write
            debug!("output ring full, skipping block");
            return;
        }

        // Interleave channels into the ring buffer
        for i in 0..buffer_len {
            for ch in 0..self.channels {
                // Duplicate the last source channel when the device has more
                let src_ch = ch.min(buffers.len() - 1);
                let _ = self.buffer.push(buffers[src_ch][i]);
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
