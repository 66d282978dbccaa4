//! Plucked-string drone from an 8-particle line.
//!
//! Run with: cargo run --example lattice_drone --features cpal_io
//!
//! Lists available devices and lets you pick one, then plucks the lattice
//! every couple of seconds and lets the coupled oscillation ring.

use std::io::{self, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use schwingt::device::CpalDevice;
use schwingt::nodes::{Gain, LatticeMessage, LatticeNode, Reverb, ReverbMessage};
use schwingt::{Scale, Schwingt, SharedLattice};

fn main() {
    tracing_subscriber::fmt::init();

    let devices = CpalDevice::list_outputs();
    if devices.is_empty() {
        eprintln!("No audio output devices found!");
        return;
    }

    println!("Available audio output devices:");
    for (i, device) in devices.iter().enumerate() {
        println!(
            "  [{}] {} ({}Hz, {} ch)",
            i,
            device.name(),
            device.sample_rate(),
            device.channels()
        );
    }

    print!("\nSelect device [0]: ");
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    let choice: usize = input.trim().parse().unwrap_or(0);

    let device = devices.into_iter().nth(choice).unwrap_or_else(|| {
        println!("Invalid choice, using default device");
        CpalDevice::default_output().expect("No default device")
    });
    println!("\nUsing: {} @ {}Hz", device.name(), device.sample_rate());

    let sample_rate = device.sample_rate();
    let shared = SharedLattice::build(8, 1, 12.0).expect("grid is valid");

    let mut engine = Schwingt::new(sample_rate)
        .expect("nonzero sample rate")
        .with_output(device.create_sink());

    let mut voice = engine.add(LatticeNode::new(shared.clone(), sample_rate));
    let mut reverb = engine.add(Reverb::new(0.4));
    let gain = engine.add(Gain::new(0.8));
    engine.connect(&voice, &reverb);
    engine.connect(&reverb, &gain);
    engine.output(&gain);

    voice.send(LatticeMessage::SetAdditiveOn(true)).ok();
    voice.send(LatticeMessage::SetAdditiveRoot(110.0)).ok();
    voice
        .send(LatticeMessage::SetAdditiveScale(Scale::Pentatonic))
        .ok();
    voice.send(LatticeMessage::SetStereo(true)).ok();
    reverb.send(ReverbMessage::SetEnabled(true)).ok();

    println!("Droning... Ctrl+C to stop");

    // Pre-fill the sink's ring so the stream never starts starved.
    for _ in 0..8 {
        engine.process();
    }

    let start = Instant::now();
    let rate = sample_rate as f64;
    let mut last_pluck = Instant::now();
    let mut pluck_site = 2usize;

    loop {
        let target = (start.elapsed().as_secs_f64() * rate / 64.0) as u64 + 6;
        while engine.blocks_processed() < target {
            engine.process();
        }

        if last_pluck.elapsed() > Duration::from_secs(2) {
            shared.with(|l| l.particle_mut(pluck_site, 0).displacement[0] += 0.5);
            pluck_site = 1 + (pluck_site % 6);
            last_pluck = Instant::now();
        }

        sleep(Duration::from_micros(500));
    }
}
