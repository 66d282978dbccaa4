//! Master gain stage

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// Messages to control gain
#[derive(Clone, Copy, Debug)]
pub enum GainMessage {
    /// Set the gain multiplier (1.0 = unity, 0.0 = silence)
    SetGain(f32),
}

/// Volume control with click-free smoothing.
///
/// The applied gain moves exponentially toward the target so a control-rate
/// jump never lands as a step in the audio.
pub struct Gain {
    target: f32,
    smoothed: f32,
    /// Per-sample smoothing coefficient (0.0 = instant)
    coeff: f32,
}

impl Gain {
    pub fn new(gain: f32) -> Self {
        Self {
            target: gain,
            smoothed: gain,
            coeff: 0.995, // ~7ms at 48kHz
        }
    }

    /// Disable smoothing for instant gain changes
    pub fn without_smoothing(mut self) -> Self {
        self.coeff = 0.0;
        self
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.target
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                GainMessage::SetGain(g) => self.target = g.max(0.0),
            }
        }

        let silence = |outputs: &mut [Buffer]| {
            for buffer in outputs.iter_mut() {
                buffer.iter_mut().for_each(|s| *s = 0.0);
            }
        };
        let Some(input) = inputs.first() else {
            silence(outputs);
            return;
        };
        let in_buffers = input.buffers();
        if in_buffers.is_empty() {
            silence(outputs);
            return;
        }

        let mut advanced = self.smoothed;
        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            let in_buffer = in_buffers.get(ch).unwrap_or(&in_buffers[0]);

            // Channels track the same gain trajectory.
            let mut g = self.smoothed;
            for (out, &sample) in out_buffer.iter_mut().zip(in_buffer.iter()) {
                g = self.target + self.coeff * (g - self.target);
                *out = sample * g;
            }
            if ch == 0 {
                advanced = g;
            }
        }
        self.smoothed = advanced;
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        1
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        2
    }
}
