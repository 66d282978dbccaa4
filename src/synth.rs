//! Displacement-driven synthesis: additive, bell, FM and AM banks.
//!
//! One [`SynthVoice`] reads the current lattice displacements once per audio
//! sample and produces one stereo frame. Every enabled mode contributes an
//! additive term to the same frame; there is no voice hierarchy. Oscillator
//! phases persist across samples and wrap modulo 2π so they never drift.

use core::f32::consts::TAU;

use crate::physics::{Axis, Lattice};
use crate::scale::Scale;

/// Oscillator frequencies at or below zero are clamped up to this.
pub const MIN_FREQ_HZ: f32 = 0.01;

/// One consistent synthesis configuration, read once per processing block.
///
/// Defaults follow the original instrument: 60 Hz roots, half volume, a
/// pentatonic additive bank and a Bohlen-Pierce bell bank, all modes off.
#[derive(Clone, Copy, Debug)]
pub struct SynthParams {
    pub additive_on: bool,
    pub additive_root: f32,
    pub additive_volume: f32,
    pub additive_scale: Scale,
    pub additive_axis: Axis,

    pub bell_on: bool,
    pub bell_root: f32,
    pub bell_volume: f32,
    pub bell_scale: Scale,
    pub bell_axis: Axis,

    pub fm_on: bool,
    pub fm_axis: Axis,
    /// Modulator frequency as a ratio of each partial's carrier.
    pub fm_ratio: f32,
    pub fm_width: f32,

    pub am_on: bool,
    pub am_axis: Axis,

    /// Left/right split by interior column; mono sums everything to both.
    pub stereo_on: bool,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            additive_on: false,
            additive_root: 60.0,
            additive_volume: 0.5,
            additive_scale: Scale::Pentatonic,
            additive_axis: Axis::X,
            bell_on: false,
            bell_root: 60.0,
            bell_volume: 0.5,
            bell_scale: Scale::BohlenPierce,
            bell_axis: Axis::X,
            fm_on: false,
            fm_axis: Axis::X,
            fm_ratio: 1.5,
            fm_width: 2.0,
            am_on: false,
            am_axis: Axis::X,
            stereo_on: false,
        }
    }
}

/// Per-partial phase accumulators for one oscillator bank.
struct PartialBank {
    carrier_phases: Vec<f32>,
    mod_phases: Vec<f32>,
}

impl PartialBank {
    fn new() -> Self {
        Self {
            carrier_phases: Vec::new(),
            mod_phases: Vec::new(),
        }
    }

    fn ensure_len(&mut self, n: usize) {
        if self.carrier_phases.len() != n {
            self.carrier_phases.resize(n, 0.0);
            self.mod_phases.resize(n, 0.0);
        }
    }
}

/// The synthesis engine state: two partial banks and the AM scan position.
pub struct SynthVoice {
    sample_rate: f32,
    additive: PartialBank,
    bell: PartialBank,
    /// Cycles through interior particles, one per sample, choosing whose
    /// displacement modulates the amplitude.
    am_counter: usize,
}

impl SynthVoice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            additive: PartialBank::new(),
            bell: PartialBank::new(),
            am_counter: 0,
        }
    }

    /// Produce one stereo frame from the current displacement snapshot.
    ///
    /// Must be called once per sample; phases advance on every call.
    pub fn render(&mut self, lattice: &Lattice, params: &SynthParams) -> (f32, f32) {
        let interior = lattice.interior_count();
        self.additive.ensure_len(interior);
        self.bell.ensure_len(interior);

        let mut left = 0.0f32;
        let mut right = 0.0f32;

        if params.additive_on {
            let (l, r) = render_bank(
                &mut self.additive,
                lattice,
                params,
                params.additive_root,
                params.additive_volume,
                params.additive_scale,
                params.additive_axis,
                self.sample_rate,
            );
            left += l;
            right += r;
        }

        if params.bell_on {
            let (l, r) = render_bank(
                &mut self.bell,
                lattice,
                params,
                params.bell_root,
                params.bell_volume,
                params.bell_scale,
                params.bell_axis,
                self.sample_rate,
            );
            left += l;
            right += r;
        }

        if params.am_on && interior > 0 {
            self.am_counter = (self.am_counter + 1) % interior;
            let (x, y) = lattice
                .interior_coords()
                .nth(self.am_counter)
                .unwrap_or((1, 0));
            let d = lattice.particle(x, y).displacement[params.am_axis.index()];
            // Clamp so modulation can never flip the signal's sign.
            let gain = (1.0 + d).max(0.0);
            left *= gain;
            right *= gain;
        }

        // Hard limit to the valid sample range.
        (left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0))
    }
}

/// Sum one bank of partials. Each interior particle, in row-major order, is
/// one partial; its displacement on the bank's axis sets the amplitude.
#[allow(clippy::too_many_arguments)]
fn render_bank(
    bank: &mut PartialBank,
    lattice: &Lattice,
    params: &SynthParams,
    root: f32,
    volume: f32,
    scale: Scale,
    axis: Axis,
    sample_rate: f32,
) -> (f32, f32) {
    let mut left = 0.0f32;
    let mut right = 0.0f32;
    let mid_column = lattice.nx() / 2;

    for (p, (x, y)) in lattice.interior_coords().enumerate() {
        let particle = lattice.particle(x, y);
        let amp = particle.displacement[axis.index()] * volume;

        let freq = (root * scale.ratio(p)).max(MIN_FREQ_HZ);
        let mut inc = TAU * freq / sample_rate;

        if params.fm_on {
            let mod_phase = &mut bank.mod_phases[p];
            *mod_phase = (*mod_phase + TAU * freq * params.fm_ratio / sample_rate) % TAU;
            let depth = params.fm_width * particle.displacement[params.fm_axis.index()];
            inc *= 1.0 + depth * mod_phase.sin();
        }

        let phase = &mut bank.carrier_phases[p];
        *phase = (*phase + inc).rem_euclid(TAU);
        let sample = phase.sin() * amp;

        if params.stereo_on {
            if x < mid_column {
                left += sample;
            } else {
                right += sample;
            }
        } else {
            left += sample;
            right += sample;
        }
    }

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Lattice;

    const SR: u32 = 48000;

    fn held_lattice(nx: usize, displaced: usize, d: f32) -> Lattice {
        let mut l = Lattice::build(nx, 1, 1.0).unwrap();
        l.particle_mut(displaced, 0).displacement[0] = d;
        l
    }

    #[test]
    fn silent_when_all_modes_off() {
        let lattice = held_lattice(4, 1, 1.0);
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams::default();
        for _ in 0..64 {
            assert_eq!(voice.render(&lattice, &params), (0.0, 0.0));
        }
    }

    #[test]
    fn additive_partial_is_a_sine_at_root_times_ratio() {
        // One displaced interior particle held still: the output is a pure
        // sine at root * ratio[0], amplitude displacement * volume.
        let lattice = held_lattice(4, 1, 0.8);
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams {
            additive_on: true,
            additive_root: 100.0,
            additive_volume: 0.5,
            ..Default::default()
        };
        let freq = 100.0 * params.additive_scale.ratio(0);
        for n in 1..=256 {
            let (l, r) = voice.render(&lattice, &params);
            let expected = (TAU * freq * n as f32 / SR as f32).sin() * 0.8 * 0.5;
            assert!((l - expected).abs() < 1e-4, "sample {n}: {l} vs {expected}");
            assert_eq!(l, r);
        }
    }

    #[test]
    fn bell_bank_uses_its_own_scale_and_root() {
        let lattice = held_lattice(4, 1, 1.0);
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams {
            bell_on: true,
            bell_root: 220.0,
            bell_volume: 1.0,
            ..Default::default()
        };
        let freq = 220.0 * Scale::BohlenPierce.ratio(0);
        let (l, _) = voice.render(&lattice, &params);
        let expected = (TAU * freq / SR as f32).sin();
        assert!((l - expected).abs() < 1e-4);
    }

    #[test]
    fn scale_swap_keeps_phase_continuous() {
        let mut lattice = held_lattice(4, 1, 0.5);
        // Second partial actually changes ratio when the table swaps.
        lattice.particle_mut(2, 0).displacement[0] = 0.5;
        let mut voice = SynthVoice::new(SR);
        let mut params = SynthParams {
            additive_on: true,
            additive_root: 440.0,
            additive_volume: 1.0,
            ..Default::default()
        };
        let mut prev = 0.0f32;
        // Highest ratio in either table bounds the per-sample increment.
        let max_ratio = 32.0f32;
        let max_delta = TAU * 440.0 * max_ratio / SR as f32;
        for n in 0..512 {
            if n == 256 {
                params.additive_scale = Scale::Chromatic;
            }
            let (l, _) = voice.render(&lattice, &params);
            // The waveform may not jump further than one sample's largest
            // possible phase increment allows.
            assert!((l - prev).abs() <= max_delta.min(2.0));
            assert!(l.is_finite());
            prev = l;
        }
    }

    #[test]
    fn am_never_goes_negative_gain() {
        let mut lattice = held_lattice(4, 1, 0.9);
        // Deep negative displacement would flip the signal without the clamp.
        lattice.particle_mut(2, 0).displacement[0] = -3.0;
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams {
            additive_on: true,
            am_on: true,
            ..Default::default()
        };
        for _ in 0..512 {
            let (l, r) = voice.render(&lattice, &params);
            assert!(l.is_finite() && r.is_finite());
            assert!((-1.0..=1.0).contains(&l));
            assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn stereo_splits_by_column() {
        // 6 columns: interior 1..=4, midpoint 3. Displace column 1 only; in
        // stereo mode everything lands on the left channel.
        let lattice = held_lattice(6, 1, 1.0);
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams {
            additive_on: true,
            stereo_on: true,
            additive_volume: 1.0,
            ..Default::default()
        };
        let mut left_energy = 0.0f32;
        let mut right_energy = 0.0f32;
        for _ in 0..1024 {
            let (l, r) = voice.render(&lattice, &params);
            left_energy += l * l;
            right_energy += r * r;
        }
        assert!(left_energy > 0.0);
        assert_eq!(right_energy, 0.0);
    }

    #[test]
    fn zero_root_clamped_to_epsilon() {
        let lattice = held_lattice(4, 1, 1.0);
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams {
            additive_on: true,
            additive_root: 0.0,
            ..Default::default()
        };
        for _ in 0..64 {
            let (l, _) = voice.render(&lattice, &params);
            assert!(l.is_finite());
        }
    }

    #[test]
    fn fm_stays_bounded() {
        let lattice = held_lattice(4, 1, 1.0);
        let mut voice = SynthVoice::new(SR);
        let params = SynthParams {
            additive_on: true,
            fm_on: true,
            fm_width: 5.0,
            ..Default::default()
        };
        for _ in 0..4096 {
            let (l, r) = voice.render(&lattice, &params);
            assert!((-1.0..=1.0).contains(&l));
            assert!((-1.0..=1.0).contains(&r));
        }
    }
}
