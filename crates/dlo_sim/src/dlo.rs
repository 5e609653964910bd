use glam::DVec3;
use log::{debug, info};
use rand::Rng;
use soft_rope::{Rope, StepParameters, StepReport};

use crate::{
    config::DloConfiguration,
    error::DloError,
    strand::{Strand, build_strand},
};

/// Totals over a run of steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub steps: usize,
    pub contacts: usize,
    pub max_depth: f64,
}

pub struct Dlo {
    pub config: DloConfiguration,
    pub rope: Rope,
    pub strands: Vec<Strand>,
    params: StepParameters,
    iteration: usize,
}

impl Dlo {
    pub fn from_config(
        config: DloConfiguration,
        rng: &mut rand::rngs::StdRng,
    ) -> Result<Self, DloError> {
        config.validate()?;

        let mut rope = Rope::new();
        let strands = config
            .strands
            .iter()
            .map(|strand| build_strand(&mut rope, strand, &config))
            .collect::<Result<Vec<_>, _>>()?;

        if config.perturbation > 0.0 {
            for point_mass in rope.point_masses.iter_mut().filter(|p| !p.is_fixed()) {
                let offset = DVec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                ) * config.perturbation;
                point_mass.perturb(offset);
            }
        }

        info!(
            "built {} strands: {} point masses, {} springs, {} links",
            strands.len(),
            rope.point_masses.len(),
            rope.springs.len(),
            rope.links.len()
        );
        Ok(Dlo {
            params: config.step_parameters(),
            config,
            rope,
            strands,
            iteration: 0,
        })
    }

    /// Advances the simulation by one time step.
    pub fn simulate(&mut self) -> StepReport {
        let report = self.rope.step(&self.params);
        self.iteration += 1;
        report
    }

    /// Runs the configured number of iterations.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let progress_interval = (self.config.iterations / 10).max(1);
        for _ in 0..self.config.iterations {
            let report = self.simulate();
            summary.steps += 1;
            summary.contacts += report.contacts;
            summary.max_depth = summary.max_depth.max(report.max_depth);
            if self.iteration % progress_interval == 0 {
                info!(
                    "iteration {}/{}: kinetic energy {:.6e} J, {} contacts",
                    self.iteration,
                    self.config.iterations,
                    self.rope.kinetic_energy(),
                    report.contacts
                );
            }
        }
        debug!("run finished: {summary:?}");
        summary
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn time(&self) -> f64 {
        self.iteration as f64 * self.config.timestep
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::config::StrandConfiguration;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(0)
    }

    /// A strand pinned along x with a second one across it along z, `drop_height` above.
    fn crossing(drop_height: f64, pin_upper: bool) -> DloConfiguration {
        DloConfiguration {
            iterations: 300,
            strands: vec![
                StrandConfiguration {
                    start: DVec3::new(-0.3, 0.0, 0.0),
                    end: DVec3::new(0.3, 0.0, 0.0),
                    sections: 6,
                    pin_start: true,
                    pin_end: true,
                },
                StrandConfiguration {
                    start: DVec3::new(0.0, drop_height, -0.3),
                    end: DVec3::new(0.0, drop_height, 0.3),
                    sections: 6,
                    pin_start: pin_upper,
                    pin_end: pin_upper,
                },
            ],
            ..DloConfiguration::default()
        }
    }

    #[test]
    fn test_build_from_default_config() {
        let dlo = Dlo::from_config(DloConfiguration::default(), &mut rng()).unwrap();
        assert_eq!(dlo.strands.len(), 2);
        assert_eq!(dlo.rope.point_masses.len(), 21 * 3 + 17 * 3);
        assert_eq!(dlo.rope.links.len(), 20 + 16);
        assert_eq!(dlo.strands[1].links, 20..36);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DloConfiguration {
            timestep: -1.0,
            ..DloConfiguration::default()
        };
        assert!(matches!(
            Dlo::from_config(config, &mut rng()),
            Err(DloError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_perturbation_is_bounded_and_seeded() {
        let config = DloConfiguration {
            perturbation: 0.001,
            ..crossing(0.1, false)
        };
        let a = Dlo::from_config(config.clone(), &mut rng()).unwrap();
        let b = Dlo::from_config(config, &mut rng()).unwrap();
        for (p, q) in a.rope.point_masses.iter().zip(&b.rope.point_masses) {
            assert_eq!(p.position(), q.position());
            let offset = p.position() - p.reference_position();
            assert!(offset.abs().max_element() <= 0.001);
            if p.is_fixed() {
                assert_eq!(offset, DVec3::ZERO);
            }
        }
    }

    #[test]
    fn test_dropped_strand_rests_on_pinned_strand() {
        let mut dlo = Dlo::from_config(crossing(0.05, false), &mut rng()).unwrap();
        let summary = dlo.run();
        assert_eq!(summary.steps, 300);
        assert!(summary.contacts > 0);
        assert!((dlo.time() - 0.3).abs() < 1e-12);

        // Both strands have a structural triangle right at the crossing
        let crossing_height = |strand: &Strand| {
            strand.triangles[3]
                .iter()
                .map(|&i| dlo.rope.point_masses[i].position().y)
                .sum::<f64>()
                / 3.0
        };
        let gap = crossing_height(&dlo.strands[1]) - crossing_height(&dlo.strands[0]);
        assert!(gap > dlo.config.link_radius, "upper strand sank to {gap}");
        assert!(gap < 0.05, "upper strand never landed, gap {gap}");
    }

    #[test]
    fn test_separated_strands_never_touch() {
        let config = DloConfiguration {
            gravity: DVec3::ZERO,
            iterations: 50,
            ..crossing(0.5, true)
        };
        let mut dlo = Dlo::from_config(config, &mut rng()).unwrap();
        let summary = dlo.run();
        assert_eq!(summary.contacts, 0);
        assert!(dlo.rope.kinetic_energy() < 1e-20);
    }
}
