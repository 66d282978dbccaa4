use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dasp_graph::Buffer;

use schwingt::nodes::LatticeNode;
use schwingt::{AudioNode, Lattice, PhysicsParams, ProcessContext, SharedLattice};

pub fn criterion_benchmark(c: &mut Criterion) {
    let ctx = ProcessContext {
        sample_rate: 48000,
        buffer_size: 64,
    };

    c.bench_function("LatticeNode.process() 10x1", |b| {
        let shared = SharedLattice::build(10, 1, 4.0).unwrap();
        shared.with(|l| l.particle_mut(3, 0).displacement[0] = 0.5);
        let mut node = LatticeNode::new(shared, 48000);
        let mut outputs = [Buffer::default(), Buffer::default()];

        b.iter(move || node.process(&ctx, core::iter::empty(), &[], &mut outputs))
    });

    c.bench_function("LatticeNode.process() 16x16", |b| {
        let shared = SharedLattice::build(16, 16, 4.0).unwrap();
        shared.with(|l| l.particle_mut(5, 5).displacement[0] = 0.5);
        let mut node = LatticeNode::new(shared, 48000);
        let mut outputs = [Buffer::default(), Buffer::default()];

        b.iter(move || node.process(&ctx, core::iter::empty(), &[], &mut outputs))
    });

    c.bench_function("physics::step 32x32", |b| {
        let mut lattice = Lattice::build(32, 32, 4.0).unwrap();
        lattice.particle_mut(7, 9).displacement[0] = 0.5;
        let params = PhysicsParams::default();

        b.iter(|| schwingt::physics::step(black_box(&mut lattice), &params, 1.0 / 48000.0))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
