//! Audio-input drive: external forcing of the lattice from input energy.
//!
//! Each input channel keeps a fixed-capacity ring of recent samples and a
//! rolling sum of squares over a configurable window, giving a cheap O(1)
//! RMS per pushed sample. The RMS is threshold-gated and linearly scaled
//! into a force injected into one target particle's acceleration.

use crate::physics::Axis;

/// Ring capacity, also the upper bound on the RMS window.
pub const INPUT_RING_CAPACITY: usize = 4096;

/// Smallest RMS window the control surface may request.
pub const MIN_RMS_WINDOW: usize = 512;

/// Where a channel's drive force lands.
#[derive(Clone, Copy, Debug)]
pub struct DriveTarget {
    /// Grid coordinates of the driven particle.
    pub x: usize,
    pub y: usize,
    pub axis: Axis,
}

impl Default for DriveTarget {
    fn default() -> Self {
        Self {
            x: 1,
            y: 0,
            axis: Axis::X,
        }
    }
}

/// One channel of input history.
struct ChannelRing {
    samples: Box<[f32; INPUT_RING_CAPACITY]>,
    write: usize,
    /// Rolling sum of squares over the last `window` samples.
    sum_squares: f64,
    window: usize,
}

impl ChannelRing {
    fn new(window: usize) -> Self {
        Self {
            samples: Box::new([0.0; INPUT_RING_CAPACITY]),
            write: 0,
            sum_squares: 0.0,
            window,
        }
    }

    fn set_window(&mut self, window: usize) {
        let window = window.clamp(MIN_RMS_WINDOW, INPUT_RING_CAPACITY);
        if window != self.window {
            self.window = window;
            self.recompute();
        }
    }

    fn push(&mut self, value: f32) {
        // The sample leaving the window stops contributing.
        let outgoing_idx =
            (self.write + INPUT_RING_CAPACITY - self.window) % INPUT_RING_CAPACITY;
        let outgoing = self.samples[outgoing_idx];
        self.sum_squares -= f64::from(outgoing) * f64::from(outgoing);

        self.samples[self.write] = value;
        self.sum_squares += f64::from(value) * f64::from(value);
        self.write = (self.write + 1) % INPUT_RING_CAPACITY;

        // Incremental f64 sums drift; occasionally rebuild from the ring.
        if self.write == 0 {
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        let mut sum = 0.0f64;
        for i in 0..self.window {
            let idx = (self.write + INPUT_RING_CAPACITY - 1 - i) % INPUT_RING_CAPACITY;
            let s = f64::from(self.samples[idx]);
            sum += s * s;
        }
        self.sum_squares = sum;
    }

    fn rms(&self) -> f32 {
        (self.sum_squares.max(0.0) / self.window as f64).sqrt() as f32
    }
}

/// RMS-gated external forcing, two channels (left/right).
pub struct DriveInput {
    channels: [ChannelRing; 2],
    pub threshold: f32,
    pub scale: f32,
    /// When set, each channel drives its own target; otherwise both channels
    /// drive the left target.
    pub stereo_split: bool,
    pub targets: [DriveTarget; 2],
}

impl Default for DriveInput {
    fn default() -> Self {
        Self::new(2048)
    }
}

impl DriveInput {
    pub fn new(rms_window: usize) -> Self {
        let window = rms_window.clamp(MIN_RMS_WINDOW, INPUT_RING_CAPACITY);
        Self {
            channels: [ChannelRing::new(window), ChannelRing::new(window)],
            threshold: 1.0,
            scale: 1.0,
            stereo_split: false,
            targets: [DriveTarget::default(); 2],
        }
    }

    /// Resize the rolling window (bounded to the ring capacity).
    pub fn set_rms_window(&mut self, window: usize) {
        for ch in &mut self.channels {
            ch.set_window(window);
        }
    }

    /// Append one input sample to a channel's history.
    pub fn push_sample(&mut self, channel: usize, value: f32) {
        self.channels[channel & 1].push(value);
    }

    /// Rolling RMS of a channel over its current window.
    pub fn rms(&self, channel: usize) -> f32 {
        self.channels[channel & 1].rms()
    }

    /// Threshold-gated, linearly scaled drive force for a channel.
    ///
    /// Zero while the rolling RMS sits at or below the threshold; above it,
    /// proportional to the excess.
    pub fn drive_force(&self, channel: usize) -> f32 {
        let rms = self.rms(channel);
        if rms > self.threshold {
            (rms - self.threshold) * self.scale
        } else {
            0.0
        }
    }

    /// Target particle/axis for a channel, honoring stereo-split mode.
    pub fn target(&self, channel: usize) -> DriveTarget {
        if self.stereo_split {
            self.targets[channel & 1]
        } else {
            self.targets[0]
        }
    }
}
