use glam::DVec3;
use log::debug;
use rayon::prelude::*;

use crate::{
    collision::{ContactParameters, LinkContact, detect_link_contact},
    error::RopeError,
    link::Link,
    point_mass::MassPoint,
    spring::Spring,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParameters {
    pub time_step: f64,
    pub gravity: DVec3,
    /// Linear drag applied to every point mass
    pub damping: f64,
    pub contact: ContactParameters,
}

/// Proof that a step was begun on a rope, consumed when the step ends.
#[must_use = "a step must be ended with Rope::end_step"]
#[derive(Debug)]
pub struct StepToken {
    step: u64,
}

impl StepToken {
    pub fn step(&self) -> u64 {
        self.step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    pub contacts: usize,
    pub max_depth: f64,
}

/// A deformable linear object: point masses held together by springs, with capped cylinder links
/// along its structural triangles for collision.
#[derive(Default)]
pub struct Rope {
    pub point_masses: Vec<MassPoint>,
    pub springs: Vec<Spring>,
    pub links: Vec<Link>,
    completed_steps: u64,
    step_open: bool,
    /// Time step of the current step's prediction
    predicted_time_step: Option<f64>,
}

impl Rope {
    pub fn new() -> Self {
        Rope::default()
    }

    /// Returns the index of the new point mass
    pub fn add_point_mass(&mut self, point_mass: MassPoint) -> usize {
        self.point_masses.push(point_mass);
        self.point_masses.len() - 1
    }

    pub fn add_spring(&mut self, spring: Spring) -> Result<(), RopeError> {
        let len = self.point_masses.len();
        for anchor in [spring.anchor_a, spring.anchor_b] {
            if anchor >= len {
                return Err(RopeError::PointOutOfRange { index: anchor, len });
            }
        }
        if spring.anchor_a == spring.anchor_b {
            return Err(RopeError::DegenerateSpring(spring.anchor_a));
        }
        self.springs.push(spring);
        Ok(())
    }

    pub fn add_link(&mut self, link: Link) -> Result<(), RopeError> {
        link.validate(self.point_masses.len())?;
        self.links.push(link);
        Ok(())
    }

    /// Every pair of links that do not share a point, in a stable order.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let links = &self.links;
        (0..links.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                ((i + 1)..links.len())
                    .filter(move |&j| !links[i].shares_point(&links[j]))
                    .map(move |j| (i, j))
            })
            .collect()
    }

    /// Starts a step: commits the deferred forces and clears the correction accumulators.
    pub fn begin_step(&mut self) -> StepToken {
        assert!(
            !self.step_open,
            "step {} is still open",
            self.completed_steps
        );
        for point_mass in &mut self.point_masses {
            point_mass.reset_force();
            point_mass.reset_displacement();
            point_mass.reset_restitution_velocity();
        }
        self.step_open = true;
        self.predicted_time_step = None;
        StepToken {
            step: self.completed_steps,
        }
    }

    pub fn apply_external_force<F>(&mut self, _token: &StepToken, function: F)
    where
        F: Fn(&MassPoint) -> DVec3,
    {
        for point_mass in &mut self.point_masses {
            let force = function(point_mass);
            point_mass.add_external_force(force);
        }
    }

    /// Weight of every dynamic point mass
    pub fn apply_gravity(&mut self, token: &StepToken, gravity: DVec3) {
        self.apply_external_force(token, |point_mass| gravity * point_mass.mass());
    }

    pub fn apply_damping(&mut self, _token: &StepToken, coefficient: f64) {
        for point_mass in &mut self.point_masses {
            point_mass.add_damping_force(coefficient);
        }
    }

    pub fn apply_spring_forces(&mut self, _token: &StepToken) {
        for spring in &self.springs {
            spring.apply_force(&mut self.point_masses);
        }
    }

    pub fn predict(&mut self, _token: &StepToken, time_step: f64) {
        self.point_masses
            .par_iter_mut()
            .for_each(|point_mass| point_mass.predict(time_step));
        self.predicted_time_step = Some(time_step);
    }

    /// Evaluates every candidate link pair in parallel and folds the contacts into the point
    /// masses in pair order, so the accumulated result does not depend on scheduling.
    ///
    /// Deferred friction forces are sized for the time step the point masses were predicted
    /// with, whatever `params.time_step` says.
    pub fn resolve_collisions(
        &mut self,
        token: &StepToken,
        params: &ContactParameters,
    ) -> StepReport {
        let Some(time_step) = self.predicted_time_step else {
            panic!(
                "collisions of step {} resolved before the prediction",
                token.step
            );
        };
        let params = &ContactParameters {
            time_step,
            ..*params
        };
        let pairs = self.candidate_pairs();
        let point_masses = &self.point_masses;
        let links = &self.links;
        let contacts: Vec<LinkContact> = pairs
            .par_iter()
            .filter(|(i, j)| {
                let (min_a, max_a) = links[*i].bounds(point_masses, params.radius);
                let (min_b, max_b) = links[*j].bounds(point_masses, params.radius);
                min_a.cmple(max_b).all() && min_b.cmple(max_a).all()
            })
            .filter_map(|(i, j)| {
                detect_link_contact(point_masses, &links[*i], &links[*j], params)
            })
            .collect();

        let mut report = StepReport::default();
        for contact in &contacts {
            contact.apply(&mut self.point_masses);
            report.contacts += 1;
            report.max_depth = report.max_depth.max(contact.depth);
        }
        report
    }

    /// Applies the step's corrections and moves every point mass to its new state.
    pub fn end_step(&mut self, token: StepToken) {
        assert!(
            self.step_open && token.step == self.completed_steps,
            "step token {} does not match the open step {}",
            token.step,
            self.completed_steps
        );
        self.point_masses.par_iter_mut().for_each(|point_mass| {
            point_mass.correct_position();
            point_mass.correct_velocity();
            point_mass.synchronize_positions_and_velocities();
        });
        self.step_open = false;
        self.completed_steps += 1;
    }

    /// One full step: reset, forces, prediction, collisions, corrections.
    pub fn step(&mut self, params: &StepParameters) -> StepReport {
        let token = self.begin_step();
        let step = token.step();
        self.apply_gravity(&token, params.gravity);
        self.apply_damping(&token, params.damping);
        self.apply_spring_forces(&token);
        self.predict(&token, params.time_step);
        let report = self.resolve_collisions(&token, &params.contact);
        self.end_step(token);
        debug!(
            "step {step}: {} contacts, max depth {}",
            report.contacts, report.max_depth
        );
        report
    }

    pub fn completed_steps(&self) -> u64 {
        self.completed_steps
    }

    /// Average position of the point masses
    pub fn centroid(&self) -> DVec3 {
        if self.point_masses.is_empty() {
            return DVec3::ZERO;
        }
        self.point_masses
            .iter()
            .map(|point_mass| point_mass.position())
            .sum::<DVec3>()
            / self.point_masses.len() as f64
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.point_masses
            .iter()
            .map(|point_mass| 0.5 * point_mass.mass() * point_mass.velocity().length_squared())
            .sum()
    }
}
