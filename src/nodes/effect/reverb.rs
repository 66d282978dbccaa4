//! Schroeder reverberation
//!
//! Four parallel damped comb filters into two series allpasses per channel,
//! after Schroeder (1962) and the public-domain Freeverb tunings. The tail
//! parameter maps to comb feedback; the wet mix is fixed.

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// Messages to control the reverb
#[derive(Clone, Copy, Debug)]
pub enum ReverbMessage {
    /// Decay control, 0.0 (tight) to 1.0 (long). Mapped to comb feedback.
    SetTail(f32),
    /// Bypass without dropping the node from the graph.
    SetEnabled(bool),
}

// Freeverb comb/allpass delay tunings (samples at 44.1kHz); the right
// channel is offset for stereo decorrelation.
const COMB_DELAYS: [usize; 4] = [1557, 1617, 1491, 1422];
const ALLPASS_DELAYS: [usize; 2] = [225, 556];
const STEREO_SPREAD: usize = 23;
const DAMPING: f32 = 0.2;
const WET: f32 = 0.35;

struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    filter_state: f32,
}

impl Comb {
    fn new(delay: usize) -> Self {
        Self {
            buffer: vec![0.0; delay],
            pos: 0,
            filter_state: 0.0,
        }
    }

    fn process(&mut self, input: f32, feedback: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        // One-pole lowpass in the feedback path absorbs highs first.
        self.filter_state = delayed * (1.0 - DAMPING) + self.filter_state * DAMPING;
        self.buffer[self.pos] = input + self.filter_state * feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        delayed
    }
}

struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    fn new(delay: usize) -> Self {
        Self {
            buffer: vec![0.0; delay],
            pos: 0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        self.buffer[self.pos] = input + delayed * 0.5;
        self.pos = (self.pos + 1) % self.buffer.len();
        delayed - input
    }
}

struct ChannelReverb {
    combs: [Comb; 4],
    allpasses: [Allpass; 2],
}

impl ChannelReverb {
    fn new(spread: usize) -> Self {
        Self {
            combs: [
                Comb::new(COMB_DELAYS[0] + spread),
                Comb::new(COMB_DELAYS[1] + spread),
                Comb::new(COMB_DELAYS[2] + spread),
                Comb::new(COMB_DELAYS[3] + spread),
            ],
            allpasses: [
                Allpass::new(ALLPASS_DELAYS[0] + spread),
                Allpass::new(ALLPASS_DELAYS[1] + spread),
            ],
        }
    }

    fn process(&mut self, input: f32, feedback: f32) -> f32 {
        let mut wet = 0.0;
        for comb in &mut self.combs {
            wet += comb.process(input, feedback);
        }
        wet *= 0.25;
        for allpass in &mut self.allpasses {
            wet = allpass.process(wet);
        }
        wet
    }
}

/// Stereo Schroeder reverb effect.
pub struct Reverb {
    enabled: bool,
    tail: f32,
    left: ChannelReverb,
    right: ChannelReverb,
}

impl Default for Reverb {
    fn default() -> Self {
        Self::new(0.15)
    }
}

impl Reverb {
    pub fn new(tail: f32) -> Self {
        Self {
            enabled: true,
            tail: tail.clamp(0.0, 1.0),
            left: ChannelReverb::new(0),
            right: ChannelReverb::new(STEREO_SPREAD),
        }
    }

    /// Comb feedback for the current tail setting, kept below unity so the
    /// tail always decays.
    #[inline]
    fn feedback(&self) -> f32 {
        0.5 + self.tail * 0.48
    }
}

impl AudioNode for Reverb {
    type Message = ReverbMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = ReverbMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                ReverbMessage::SetTail(t) => self.tail = t.clamp(0.0, 1.0),
                ReverbMessage::SetEnabled(on) => self.enabled = on,
            }
        }

        let Some(input) = inputs.first() else {
            for buffer in outputs.iter_mut() {
                buffer.iter_mut().for_each(|s| *s = 0.0);
            }
            return;
        };
        let in_buffers = input.buffers();
        if in_buffers.is_empty() {
            return;
        }

        let feedback = self.feedback();
        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            let in_buffer = in_buffers.get(ch).unwrap_or(&in_buffers[0]);
            let channel = if ch == 0 { &mut self.left } else { &mut self.right };
            for (out, &dry) in out_buffer.iter_mut().zip(in_buffer.iter()) {
                if self.enabled {
                    let wet = channel.process(dry, feedback);
                    *out = (dry * (1.0 - WET) + wet * WET).clamp(-1.0, 1.0);
                } else {
                    *out = dry;
                }
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_produces_a_decaying_tail() {
        let mut ch = ChannelReverb::new(0);
        let feedback = 0.8;
        let mut energy_early = 0.0f32;
        let mut energy_late = 0.0f32;
        // Impulse, then silence.
        for n in 0..96_000 {
            let input = if n == 0 { 1.0 } else { 0.0 };
            let out = ch.process(input, feedback);
            if (2_000..10_000).contains(&n) {
                energy_early += out * out;
            }
            if n >= 88_000 {
                energy_late += out * out;
            }
        }
        assert!(energy_early > 0.0, "tail should ring after the impulse");
        assert!(
            energy_late < energy_early / 10.0,
            "tail must decay: early {energy_early}, late {energy_late}"
        );
    }

    #[test]
    fn longer_tail_rings_longer() {
        let measure = |tail: f32| {
            let mut r = Reverb::new(tail);
            let fb = r.feedback();
            let mut late = 0.0f32;
            for n in 0..48_000 {
                let input = if n == 0 { 1.0 } else { 0.0 };
                let out = r.left.process(input, fb);
                if n >= 40_000 {
                    late += out * out;
                }
            }
            late
        };
        assert!(measure(1.0) > measure(0.0));
    }
}
