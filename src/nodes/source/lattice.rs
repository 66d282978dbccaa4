//! The lattice voice: physics integration plus synthesis as one source node.
//!
//! Per processed block, in order: drain parameter messages, drain pending
//! input samples into the drive window, lock the lattice, then per sample
//! inject drive force → integrate one step → synthesize one stereo frame.
//! The lock spans exactly one block of substeps, so a concurrent `reset()`
//! lands between blocks, never inside a partial force pass.

use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer};
use tracing::{debug, warn};

use crate::drive::{DriveInput, DriveTarget};
use crate::node::{AudioNode, ProcessContext};
use crate::physics::{step, Axis, Lattice, PhysicsParams, SharedLattice};
use crate::scale::Scale;
use crate::synth::{SynthParams, SynthVoice};

/// Control-rate parameter updates for the lattice voice.
///
/// Each message mutates one field of the physics or synthesis snapshot; the
/// snapshots themselves are only read between blocks, so a block always sees
/// a consistent configuration.
#[derive(Clone, Copy, Debug)]
pub enum LatticeMessage {
    /// Zero all particle state, keeping the grid.
    Reset,
    /// Discard the grid and build a fresh one. Invalid dimensions are
    /// rejected and the old grid stays.
    Rebuild {
        nx: usize,
        ny: usize,
        stiffness: f32,
    },

    SetMass(f32),
    SetDamping(f32),
    SetFreedom(Axis, bool),
    SetPaused(bool),
    /// Stiffness of the X-spring joining columns `i` and `i + 1`.
    SetXStiffness(usize, f32),
    /// Stiffness of the Y-spring joining rows `j` and `j + 1`.
    SetYStiffness(usize, f32),
    SetAllStiffness(f32),

    SetAdditiveOn(bool),
    SetAdditiveRoot(f32),
    SetAdditiveVolume(f32),
    SetAdditiveScale(Scale),
    SetAdditiveAxis(Axis),

    SetBellOn(bool),
    SetBellRoot(f32),
    SetBellVolume(f32),
    SetBellScale(Scale),
    SetBellAxis(Axis),

    SetFmOn(bool),
    SetFmRatio(f32),
    SetFmWidth(f32),
    SetFmAxis(Axis),

    SetAmOn(bool),
    SetAmAxis(Axis),

    SetStereo(bool),

    SetDriveOn(bool),
    SetStereoSplit(bool),
    SetDriveTarget { channel: usize, target: DriveTarget },
    SetInputThreshold(f32),
    SetInputScale(f32),
    SetRmsWindow(usize),
}

/// Source node producing the sonified lattice as a stereo signal.
pub struct LatticeNode {
    lattice: SharedLattice,
    physics: PhysicsParams,
    synth: SynthParams,
    voice: SynthVoice,
    drive: DriveInput,
    drive_on: bool,
    /// Interleaved stereo input samples from the capture device.
    input: Option<Consumer<f32>>,
    /// Interleaved stereo tap of recent output, for waveform display.
    scope: Option<Producer<f32>>,
}

impl LatticeNode {
    pub fn new(lattice: SharedLattice, sample_rate: u32) -> Self {
        Self {
            lattice,
            physics: PhysicsParams::default(),
            synth: SynthParams::default(),
            voice: SynthVoice::new(sample_rate),
            drive: DriveInput::default(),
            drive_on: false,
            input: None,
            scope: None,
        }
    }

    /// Feed live input samples (interleaved stereo) into the drive window.
    pub fn with_input(mut self, input: Consumer<f32>) -> Self {
        self.input = Some(input);
        self
    }

    /// Tap recent output samples (interleaved stereo) for display.
    pub fn with_scope(mut self, scope: Producer<f32>) -> Self {
        self.scope = Some(scope);
        self
    }

    fn handle(&mut self, msg: LatticeMessage) {
        use LatticeMessage::*;
        match msg {
            Reset => self.lattice.reset(),
            Rebuild { nx, ny, stiffness } => match Lattice::build(nx, ny, stiffness) {
                Ok(fresh) => {
                    debug!(nx, ny, "lattice rebuilt");
                    self.lattice.with(|l| *l = fresh);
                }
                Err(e) => warn!(%e, "rebuild rejected"),
            },
            SetMass(m) => self.physics.mass = m,
            SetDamping(b) => self.physics.damping = b,
            SetFreedom(axis, on) => self.physics.freedom[axis.index()] = on,
            SetPaused(p) => self.physics.paused = p,
            SetXStiffness(i, k) => self.lattice.with(|l| l.set_x_stiffness(i, k)),
            SetYStiffness(j, k) => self.lattice.with(|l| l.set_y_stiffness(j, k)),
            SetAllStiffness(k) => self.lattice.with(|l| l.set_all_stiffness(k)),
            SetAdditiveOn(on) => self.synth.additive_on = on,
            SetAdditiveRoot(f) => self.synth.additive_root = f,
            SetAdditiveVolume(v) => self.synth.additive_volume = v,
            SetAdditiveScale(s) => self.synth.additive_scale = s,
            SetAdditiveAxis(a) => self.synth.additive_axis = a,
            SetBellOn(on) => self.synth.bell_on = on,
            SetBellRoot(f) => self.synth.bell_root = f,
            SetBellVolume(v) => self.synth.bell_volume = v,
            SetBellScale(s) => self.synth.bell_scale = s,
            SetBellAxis(a) => self.synth.bell_axis = a,
            SetFmOn(on) => self.synth.fm_on = on,
            SetFmRatio(r) => self.synth.fm_ratio = r,
            SetFmWidth(w) => self.synth.fm_width = w,
            SetFmAxis(a) => self.synth.fm_axis = a,
            SetAmOn(on) => self.synth.am_on = on,
            SetAmAxis(a) => self.synth.am_axis = a,
            SetStereo(on) => self.synth.stereo_on = on,
            SetDriveOn(on) => self.drive_on = on,
            SetStereoSplit(split) => self.drive.stereo_split = split,
            SetDriveTarget { channel, target } => {
                self.drive.targets[channel & 1] = target;
            }
            SetInputThreshold(t) => self.drive.threshold = t,
            SetInputScale(s) => self.drive.scale = s,
            SetRmsWindow(w) => self.drive.set_rms_window(w),
        }
    }

    fn drain_input(&mut self) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        while input.slots() >= 2 {
            let l = input.pop().unwrap_or(0.0);
            let r = input.pop().unwrap_or(0.0);
            self.drive.push_sample(0, l);
            self.drive.push_sample(1, r);
        }
    }

    /// Add each channel's gated drive force into its target particle's
    /// acceleration. Targets are clamped into the interior so anchors stay
    /// anchored; a grid with no interior absorbs nothing.
    fn inject_drive(&self, lattice: &mut Lattice) {
        for channel in 0..2 {
            let force = self.drive.drive_force(channel);
            if force == 0.0 {
                continue;
            }
            let target = self.drive.target(channel);
            let Some((x, y)) = clamp_to_interior(lattice, target) else {
                continue;
            };
            lattice.particle_mut(x, y).acceleration[target.axis.index()] += force;
        }
    }
}

fn clamp_to_interior(lattice: &Lattice, target: DriveTarget) -> Option<(usize, usize)> {
    // A 2-column grid is all anchors: valid to build, nothing to drive.
    if lattice.interior_count() == 0 {
        return None;
    }
    let x = target.x.clamp(1, lattice.nx() - 2);
    let y = if lattice.is_two_dimensional() {
        target.y.clamp(1, lattice.ny() - 2)
    } else {
        target.y.min(lattice.ny() - 1)
    };
    Some((x, y))
}

impl AudioNode for LatticeNode {
    type Message = LatticeMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = LatticeMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            self.handle(msg);
        }
        self.drain_input();

        let [first, second, ..] = outputs else {
            return;
        };
        let dt = ctx.time_step();

        // One lock per block: a reset blocks for at most these substeps.
        let shared = self.lattice.clone();
        let mut lattice = shared.lock();
        for i in 0..ctx.buffer_size {
            if !self.physics.paused {
                if self.drive_on {
                    self.inject_drive(&mut lattice);
                }
                step(&mut lattice, &self.physics, dt);
            }
            let (l, r) = self.voice.render(&lattice, &self.synth);
            first[i] = l;
            second[i] = r;
        }
        drop(lattice);

        if let Some(scope) = self.scope.as_mut() {
            for i in 0..ctx.buffer_size {
                // Display tap is best-effort; drop samples when full.
                let _ = scope.push(first[i]);
                let _ = scope.push(second[i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        0
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ProcessContext;
    use dasp_graph::Buffer;

    const CTX: ProcessContext = ProcessContext {
        sample_rate: 48000,
        buffer_size: 64,
    };

    fn run_block(node: &mut LatticeNode, msgs: Vec<LatticeMessage>) -> (Buffer, Buffer) {
        let mut outputs = [Buffer::default(), Buffer::default()];
        node.process(&CTX, msgs.into_iter(), &[], &mut outputs);
        let [l, r] = outputs;
        (l, r)
    }

    #[test]
    fn reset_message_zeroes_everything() {
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        shared.with(|l| l.particle_mut(1, 0).displacement[0] = 1.0);
        let mut node = LatticeNode::new(shared.clone(), 48000);

        run_block(&mut node, vec![]);
        run_block(&mut node, vec![LatticeMessage::Reset]);

        for p in shared.lock().particles() {
            assert_eq!(p.displacement, [0.0; 3]);
            assert_eq!(p.velocity, [0.0; 3]);
            assert_eq!(p.acceleration, [0.0; 3]);
        }
        // Idempotent: a second reset changes nothing.
        run_block(&mut node, vec![LatticeMessage::Reset]);
        for p in shared.lock().particles() {
            assert_eq!(p.displacement, [0.0; 3]);
        }
    }

    #[test]
    fn rebuild_rejects_invalid_grid() {
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        let mut node = LatticeNode::new(shared.clone(), 48000);
        run_block(
            &mut node,
            vec![LatticeMessage::Rebuild {
                nx: 1,
                ny: 0,
                stiffness: 1.0,
            }],
        );
        // Old grid survives.
        assert_eq!(shared.lock().nx(), 4);

        run_block(
            &mut node,
            vec![LatticeMessage::Rebuild {
                nx: 8,
                ny: 1,
                stiffness: 2.0,
            }],
        );
        assert_eq!(shared.lock().nx(), 8);
    }

    #[test]
    fn paused_lattice_holds_still() {
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        shared.with(|l| l.particle_mut(1, 0).displacement[0] = 1.0);
        let mut node = LatticeNode::new(shared.clone(), 48000);
        run_block(&mut node, vec![LatticeMessage::SetPaused(true)]);
        assert_eq!(shared.lock().particle(1, 0).displacement[0], 1.0);
    }

    #[test]
    fn additive_output_appears_once_enabled() {
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        shared.with(|l| l.particle_mut(1, 0).displacement[0] = 0.5);
        let mut node = LatticeNode::new(shared, 48000);

        let (l, _) = run_block(&mut node, vec![]);
        assert!(l.iter().all(|&s| s == 0.0));

        let (l, r) = run_block(
            &mut node,
            vec![
                LatticeMessage::SetAdditiveOn(true),
                LatticeMessage::SetPaused(true),
            ],
        );
        assert!(l.iter().any(|&s| s != 0.0));
        assert!(l.iter().zip(r.iter()).all(|(a, b)| a == b));
        assert!(l.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn input_drive_pushes_the_lattice() {
        let (mut producer, consumer) = rtrb::RingBuffer::new(8192);
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        let mut node = LatticeNode::new(shared.clone(), 48000).with_input(consumer);

        // Loud constant input, threshold low enough to gate open.
        for _ in 0..2048 {
            producer.push(1.0).unwrap();
            producer.push(1.0).unwrap();
        }
        let msgs = vec![
            LatticeMessage::SetDriveOn(true),
            LatticeMessage::SetInputThreshold(0.1),
            LatticeMessage::SetInputScale(2.0),
        ];
        run_block(&mut node, msgs);
        for _ in 0..32 {
            run_block(&mut node, vec![]);
        }
        let moved = shared
            .lock()
            .particle(1, 0)
            .displacement[0]
            .abs();
        assert!(moved > 0.0, "drive force should displace the target");
    }

    #[test]
    fn quiet_input_never_drives() {
        let (mut producer, consumer) = rtrb::RingBuffer::new(8192);
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        let mut node = LatticeNode::new(shared.clone(), 48000).with_input(consumer);
        for _ in 0..2048 {
            producer.push(0.05).unwrap();
            producer.push(0.05).unwrap();
        }
        run_block(&mut node, vec![LatticeMessage::SetDriveOn(true)]);
        for _ in 0..32 {
            run_block(&mut node, vec![]);
        }
        assert_eq!(shared.lock().particle(1, 0).displacement[0], 0.0);
    }

    #[test]
    fn drive_on_all_anchor_grid_is_a_no_op() {
        // 2x1 is the minimum valid grid and has no interior to push on.
        let (mut producer, consumer) = rtrb::RingBuffer::new(8192);
        let shared = SharedLattice::build(2, 1, 1.0).unwrap();
        let mut node = LatticeNode::new(shared.clone(), 48000).with_input(consumer);
        for _ in 0..2048 {
            producer.push(1.0).unwrap();
            producer.push(1.0).unwrap();
        }
        run_block(
            &mut node,
            vec![
                LatticeMessage::SetDriveOn(true),
                LatticeMessage::SetInputThreshold(0.1),
            ],
        );
        for _ in 0..8 {
            run_block(&mut node, vec![]);
        }
        for p in shared.lock().particles() {
            assert_eq!(p.displacement, [0.0; 3]);
            assert_eq!(p.acceleration, [0.0; 3]);
        }
    }

    #[test]
    fn scope_tap_sees_output() {
        let (producer, mut consumer) = rtrb::RingBuffer::new(4096);
        let shared = SharedLattice::build(4, 1, 1.0).unwrap();
        shared.with(|l| l.particle_mut(1, 0).displacement[0] = 0.5);
        let mut node = LatticeNode::new(shared, 48000).with_scope(producer);
        run_block(&mut node, vec![LatticeMessage::SetAdditiveOn(true)]);
        assert_eq!(consumer.slots(), 128); // 64 stereo frames
        assert!(core::iter::from_fn(|| consumer.pop().ok()).any(|s| s != 0.0));
    }
}
