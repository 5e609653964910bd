use criterion::{Criterion, criterion_group, criterion_main};
use dlo_sim::{Dlo, DloConfiguration};
use rand::SeedableRng;

const ITERATIONS: usize = 100;

fn dlo_benchmark(c: &mut Criterion) {
    let config = DloConfiguration {
        perturbation: 0.0005,
        ..DloConfiguration::default()
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let mut dlo = Dlo::from_config(config, &mut rng).unwrap();
    c.bench_function("DLO crossing strands step", |b| {
        b.iter(|| {
            for _ in 0..ITERATIONS {
                dlo.simulate();
            }
        });
    });
}

criterion_group!(benches, dlo_benchmark);
criterion_main!(benches);
