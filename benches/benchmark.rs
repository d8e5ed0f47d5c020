use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector2;
use quadgrav::{
    body_creator::DistrBodyCreator,
    BarnesHut, DirectSummation, ForceSolver, Gravity, Simulation, SimulationConfig,
};
use rand::{rngs::StdRng, SeedableRng};

fn seeded<S: ForceSolver>(solver: S, n: usize) -> Simulation<S> {
    // sparse bodies so few merge while measuring
    let config = SimulationConfig {
        width: 20_000.,
        height: 20_000.,
        radius_range: (1, 1),
        ..Default::default()
    };
    let mut sim = Simulation::new(config.extent(), Gravity::default(), solver).unwrap();
    let mut creator = DistrBodyCreator::rng(&config, StdRng::seed_from_u64(0));
    sim.seed(&mut creator, n).unwrap();
    sim
}

fn force_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("force evaluation");
    for n in [100, 1_000, 5_000] {
        let sim = seeded(DirectSummation, n);
        let bodies = sim.bodies().to_vec();
        let domain = *sim.domain();
        let gravity = Gravity::default();
        let mut forces = vec![Vector2::zeros(); n];

        group.bench_with_input(BenchmarkId::new("barnes hut", n), &n, |b, _| {
            let mut bh = BarnesHut::default();
            b.iter(|| bh.calculate_forces(&bodies, &domain, &gravity, &mut forces))
        });

        if n <= 1_000 {
            group.bench_with_input(BenchmarkId::new("direct summation", n), &n, |b, _| {
                b.iter(|| {
                    DirectSummation.calculate_forces(&bodies, &domain, &gravity, &mut forces)
                })
            });
        }
    }
    group.finish();
}

fn simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation step");
    for n in [100, 1_000] {
        group.bench_with_input(BenchmarkId::new("barnes hut", n), &n, |b, &n| {
            b.iter_batched_ref(
                || seeded(BarnesHut::default(), n),
                |sim| sim.step(),
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("direct summation", n), &n, |b, &n| {
            b.iter_batched_ref(
                || seeded(DirectSummation, n),
                |sim| sim.step(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, force_evaluation, simulation_step);
criterion_main!(benches);
