use std::{env, error::Error};

use dlo_sim::{Dlo, DloConfiguration};
use log::{LevelFilter, info};
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let config = match env::args().nth(1) {
        Some(path) => {
            info!("loading configuration from {path}");
            DloConfiguration::load(path)?
        }
        None => DloConfiguration::default(),
    };
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    info!("seed {seed}");

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut dlo = Dlo::from_config(config, &mut rng)?;
    let start = std::time::Instant::now();
    let summary = dlo.run();
    info!(
        "simulated {:.3} s in {:?}: {} contacts, deepest {:.3e}",
        dlo.time(),
        start.elapsed(),
        summary.contacts,
        summary.max_depth
    );

    for (i, strand) in dlo.strands.iter().enumerate() {
        println!("strand {i}, centroid {}", strand.centroid(&dlo.rope));
        for point in strand.point_indices() {
            print!("{}", dlo.rope.point_masses[point]);
        }
    }
    Ok(())
}
