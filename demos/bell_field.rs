//! Bell textures from a 6x6 membrane, driven by the default input device.
//!
//! Run with: cargo run --example bell_field --features cpal_io
//!
//! Microphone energy above the threshold pushes on one corner of the
//! membrane; the resulting waves ring Bohlen-Pierce bells with a slow FM
//! shimmer on top.

use std::thread::sleep;
use std::time::{Duration, Instant};

use schwingt::device::{capture_default_input, CpalDevice};
use schwingt::drive::DriveTarget;
use schwingt::nodes::{Gain, LatticeMessage, LatticeNode, Reverb};
use schwingt::{Axis, Schwingt, SharedLattice};

fn main() {
    tracing_subscriber::fmt::init();

    let device = CpalDevice::default_output().expect("No default output device");
    println!("Using: {} @ {}Hz", device.name(), device.sample_rate());

    let sample_rate = device.sample_rate();
    let shared = SharedLattice::build(6, 6, 6.0).expect("grid is valid");

    let mut engine = Schwingt::new(sample_rate)
        .expect("nonzero sample rate")
        .with_output(device.create_sink());

    let mut voice = LatticeNode::new(shared.clone(), sample_rate);
    match capture_default_input() {
        Some(input) => {
            voice = voice.with_input(input);
            println!("Input device captured; make some noise.");
        }
        None => println!("No input device; running free."),
    }

    let mut voice = engine.add(voice);
    let mut reverb = engine.add(Reverb::new(0.7));
    let gain = engine.add(Gain::new(0.7));
    engine.connect(&voice, &reverb);
    engine.connect(&reverb, &gain);
    engine.output(&gain);

    for msg in [
        LatticeMessage::SetBellOn(true),
        LatticeMessage::SetBellRoot(90.0),
        LatticeMessage::SetFmOn(true),
        LatticeMessage::SetFmRatio(1.5),
        LatticeMessage::SetFmWidth(1.0),
        LatticeMessage::SetStereo(true),
        LatticeMessage::SetDriveOn(true),
        LatticeMessage::SetInputThreshold(0.05),
        LatticeMessage::SetInputScale(4.0),
        LatticeMessage::SetDriveTarget {
            channel: 0,
            target: DriveTarget {
                x: 1,
                y: 1,
                axis: Axis::X,
            },
        },
    ] {
        voice.send(msg).ok();
    }
    reverb
        .send(schwingt::nodes::ReverbMessage::SetTail(0.7))
        .ok();

    println!("Listening... Ctrl+C to stop");

    for _ in 0..8 {
        engine.process();
    }

    let start = Instant::now();
    let rate = sample_rate as f64;
    let mut last_nudge = Instant::now();

    loop {
        let target = (start.elapsed().as_secs_f64() * rate / 64.0) as u64 + 6;
        while engine.blocks_processed() < target {
            engine.process();
        }

        // Keep the field alive even in silence.
        if last_nudge.elapsed() > Duration::from_secs(5) {
            shared.with(|l| l.particle_mut(3, 3).displacement[0] += 0.3);
            last_nudge = Instant::now();
        }

        sleep(Duration::from_micros(500));
    }
}
