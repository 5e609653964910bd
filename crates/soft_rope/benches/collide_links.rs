use criterion::{Criterion, criterion_group, criterion_main};
use glam::DVec3;
use rand::{Rng, SeedableRng};
use soft_rope::{ContactParameters, Link, MassPoint, detect_link_contact};

const LINK_PAIRS: usize = 1000;

fn random_section(rng: &mut rand::rngs::StdRng) -> [MassPoint; 3] {
    let center = DVec3::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    );
    [
        DVec3::new(0.0, 0.05, 0.0),
        DVec3::new(0.0, -0.025, 0.025),
        DVec3::new(0.0, -0.025, -0.025),
    ]
    .map(|offset| MassPoint::with_mass(center + offset, rng.random_range(0.5..2.0)))
}

fn collide_links_benchmark(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let mut point_masses = Vec::new();
    let mut pairs = Vec::new();
    for _ in 0..LINK_PAIRS {
        let base = point_masses.len();
        for _ in 0..4 {
            point_masses.extend(random_section(&mut rng));
        }
        let link = |k: usize| [base + 3 * k, base + 3 * k + 1, base + 3 * k + 2];
        pairs.push((Link::new(link(0), link(1)), Link::new(link(2), link(3))));
    }
    let params = ContactParameters::new(0.3, 0.4);
    c.bench_function("Link pair narrow phase", |b| {
        b.iter(|| {
            pairs
                .iter()
                .filter_map(|(first, second)| {
                    detect_link_contact(&point_masses, first, second, &params)
                })
                .count()
        });
    });
}

criterion_group!(benches, collide_links_benchmark);
criterion_main!(benches);
