use std::{fs, path::Path};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use soft_rope::{ContactParameters, StepParameters};

use crate::error::DloError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DloConfiguration {
    /// Integration step (s)
    pub timestep: f64,
    pub iterations: usize,
    pub gravity: DVec3,
    /// Linear drag applied to every point mass
    pub damping: f64,
    /// Radius of the capped cylinder around every link, two links touch at twice this distance
    pub link_radius: f64,
    // Coulomb friction between colliding links
    pub friction_coefficient: f64,
    /// [0,1] Fraction of the approach velocity kept after a contact
    pub restitution: f64,
    pub spring_constant: f64,
    pub dampener_coefficient: f64,
    /// Mass of every strand point (kg)
    pub point_mass: f64,
    /// Distance from the centerline to the vertices of a structural triangle
    pub cross_section_radius: f64,
    /// Largest random offset applied to the initial positions
    pub perturbation: f64,
    /// Random seed for the perturbation, drawn at random when absent
    pub seed: Option<u64>,
    pub strands: Vec<StrandConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandConfiguration {
    pub start: DVec3,
    pub end: DVec3,
    /// Number of links, the strand gets one more structural triangle
    pub sections: usize,
    #[serde(default)]
    pub pin_start: bool,
    #[serde(default)]
    pub pin_end: bool,
}

impl Default for DloConfiguration {
    /// A strand pinned at both ends with a second one dropped across it
    fn default() -> Self {
        DloConfiguration {
            timestep: 0.001,
            iterations: 2000,
            gravity: DVec3::new(0.0, -9.8, 0.0),
            damping: 0.01,
            link_radius: 0.02,
            friction_coefficient: 0.4,
            restitution: 0.0,
            spring_constant: 2000.0,
            dampener_coefficient: 0.5,
            point_mass: 0.01,
            cross_section_radius: 0.01,
            perturbation: 0.0,
            seed: None,
            strands: vec![
                StrandConfiguration {
                    start: DVec3::new(-0.5, 0.0, 0.0),
                    end: DVec3::new(0.5, 0.0, 0.0),
                    sections: 20,
                    pin_start: true,
                    pin_end: true,
                },
                StrandConfiguration {
                    start: DVec3::new(0.0, 0.1, -0.4),
                    end: DVec3::new(0.0, 0.1, 0.4),
                    sections: 16,
                    pin_start: false,
                    pin_end: false,
                },
            ],
        }
    }
}

impl DloConfiguration {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DloError> {
        let config: DloConfiguration = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DloError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| DloError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), DloError> {
        let positive = [
            ("timestep", self.timestep),
            ("link_radius", self.link_radius),
            ("point_mass", self.point_mass),
            ("cross_section_radius", self.cross_section_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("damping", self.damping),
            ("friction_coefficient", self.friction_coefficient),
            ("spring_constant", self.spring_constant),
            ("dampener_coefficient", self.dampener_coefficient),
            ("perturbation", self.perturbation),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(invalid(format!(
                "restitution must be within [0, 1], got {}",
                self.restitution
            )));
        }
        if !self.gravity.is_finite() {
            return Err(invalid(format!("gravity must be finite, got {}", self.gravity)));
        }
        for (i, strand) in self.strands.iter().enumerate() {
            if strand.sections == 0 {
                return Err(invalid(format!("strand {i} needs at least one section")));
            }
            if !(strand.start.is_finite() && strand.end.is_finite())
                || strand.start.distance(strand.end) <= 0.0
            {
                return Err(invalid(format!("strand {i} has no length")));
            }
            // Non adjacent links of a straight strand must start out apart
            let section_length = strand.start.distance(strand.end) / strand.sections as f64;
            if section_length <= 2.0 * self.link_radius {
                return Err(invalid(format!(
                    "strand {i} sections of {section_length} are not longer than the link diameter"
                )));
            }
        }
        Ok(())
    }

    pub fn step_parameters(&self) -> StepParameters {
        StepParameters {
            time_step: self.timestep,
            gravity: self.gravity,
            damping: self.damping,
            contact: ContactParameters {
                radius: self.link_radius,
                friction: self.friction_coefficient,
                restitution: self.restitution,
                time_step: self.timestep,
            },
        }
    }
}

fn invalid(message: String) -> DloError {
    DloError::InvalidConfig(message)
}
