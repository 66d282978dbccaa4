//! CPAL device discovery, sink creation, and input capture

#[cfg(feature = "cpal_io")]
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
#[cfg(feature = "cpal_io")]
use tracing::{debug, error, warn};

/// A discovered audio output device
pub struct CpalDevice {
    #[cfg(feature = "cpal_io")]
    device: cpal::Device,
    #[cfg(feature = "cpal_io")]
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    /// Get the default output device
    #[cfg(feature = "cpal_io")]
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let config = device.default_output_config().ok()?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());
        debug!(name, "selected default output device");

        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    #[cfg(not(feature = "cpal_io"))]
    pub fn default_output() -> Option<Self> {
        None
    }

    /// List all available output devices
    #[cfg(feature = "cpal_io")]
    pub fn list_outputs() -> Vec<Self> {
        let host = cpal::default_host();
        host.output_devices()
            .map(|devices| {
                devices
                    .filter_map(|device| {
                        let config = device.default_output_config().ok()?;
                        let name = device.name().unwrap_or_else(|_| "Unknown".into());
                        Some(Self {
                            sample_rate: config.sample_rate().0,
                            channels: config.channels(),
                            name,
                            device,
                            config,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(not(feature = "cpal_io"))]
    pub fn list_outputs() -> Vec<Self> {
        Vec::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Create a sink node that outputs to this device
    #[cfg(feature = "cpal_io")]
    pub fn create_sink(&self) -> crate::nodes::CpalSink {
        crate::nodes::CpalSink::new(&self.device, &self.config)
    }
}

/// Capture samples from the default input device into a ring buffer.
///
/// The consumer side plugs into
/// [`LatticeNode::with_input`](crate::nodes::LatticeNode::with_input) to let
/// live audio drive the lattice. Samples are interleaved stereo; a mono
/// device is duplicated to both channels.
#[cfg(feature = "cpal_io")]
pub fn capture_default_input() -> Option<rtrb::Consumer<f32>> {
    let host = cpal::default_host();
    let device = host.default_input_device()?;
    let config = device.default_input_config().ok()?;
    let name = device.name().unwrap_or_else(|_| "Unknown".into());
    let channels = config.channels() as usize;
    debug!(name, channels, "selected default input device");

    let sample_rate = config.sample_rate().0;
    let capacity = ((sample_rate as usize / 10) * 2).next_power_of_two().max(8192);
    let (mut producer, consumer) = rtrb::RingBuffer::<f32>::new(capacity);

    let stream_config = config.config();
    std::thread::spawn(move || {
        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                for frame in data.chunks(channels) {
                    let left = frame[0];
                    let right = if channels > 1 { frame[1] } else { left };
                    // Full ring means the engine is behind; drop input rather
                    // than block the capture callback.
                    let _ = producer.push(left);
                    let _ = producer.push(right);
                }
            },
            |err| warn!(%err, "input stream error"),
            None,
        );
        match stream {
            Ok(stream) => {
                if let Err(e) = stream.play() {
                    error!(%e, "failed to start input stream");
                    return;
                }
                loop {
                    std::thread::park();
                }
            }
            Err(e) => error!(%e, "failed to build input stream"),
        }
    });

    Some(consumer)
}

#[cfg(not(feature = "cpal_io"))]
pub fn capture_default_input() -> Option<rtrb::Consumer<f32>> {
    None
}
