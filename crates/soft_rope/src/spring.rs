use crate::point_mass::MassPoint;

/// Structural spring-dampener between two point masses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// Index to MassPoint
    pub anchor_a: usize,
    /// Index to MassPoint
    pub anchor_b: usize,
    pub rest_length: f64,
    pub spring_constant: f64,
    pub damping_coefficient: f64,
}

impl Spring {
    /// Spring at rest for the current distance between its anchors
    pub fn at_rest(
        point_masses: &[MassPoint],
        anchor_a: usize,
        anchor_b: usize,
        spring_constant: f64,
        damping_coefficient: f64,
    ) -> Self {
        Spring {
            anchor_a,
            anchor_b,
            rest_length: point_masses[anchor_a]
                .position()
                .distance(point_masses[anchor_b].position()),
            spring_constant,
            damping_coefficient,
        }
    }

    /// Calculate the spring-dampener force and add it to both anchors' active force
    pub fn apply_force(&self, point_masses: &mut [MassPoint]) {
        let point_a = &point_masses[self.anchor_a];
        let point_b = &point_masses[self.anchor_b];

        let offset = point_a.position() - point_b.position();
        let distance = offset.length();
        if distance == 0.0 {
            return;
        }

        let direction = offset / distance;
        let relative_velocity = point_a.velocity() - point_b.velocity();
        let velocity_towards = relative_velocity.dot(direction);

        let force = (-self.spring_constant * (distance - self.rest_length)
            - self.damping_coefficient * velocity_towards)
            * direction;

        point_masses[self.anchor_a].add_external_force(force);
        point_masses[self.anchor_b].add_external_force(-force);
    }

    pub fn elongation(&self, point_masses: &[MassPoint]) -> f64 {
        point_masses[self.anchor_a]
            .position()
            .distance(point_masses[self.anchor_b].position())
            - self.rest_length
    }
}
