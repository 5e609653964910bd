use glam::DVec3;

use crate::{error::RopeError, point_mass::MassPoint};

/// Structural triangle of the object, three indices into the point masses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle(pub [usize; 3]);

impl Triangle {
    /// Centroid of the predicted positions
    pub fn centroid(&self, point_masses: &[MassPoint]) -> DVec3 {
        self.0
            .iter()
            .map(|&i| point_masses[i].predicted_position())
            .sum::<DVec3>()
            / 3.0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn validate(&self, len: usize) -> Result<(), RopeError> {
        if let Some(&index) = self.0.iter().find(|&&i| i >= len) {
            return Err(RopeError::PointOutOfRange { index, len });
        }
        let [a, b, c] = self.0;
        if a == b || b == c || a == c {
            return Err(RopeError::DegenerateTriangle(self.0));
        }
        Ok(())
    }
}

/// Capped cylinder collision proxy whose centerline joins the centroids of two consecutive
/// structural triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub start: Triangle,
    pub end: Triangle,
}

impl Link {
    pub fn new(start: [usize; 3], end: [usize; 3]) -> Self {
        Link {
            start: Triangle(start),
            end: Triangle(end),
        }
    }

    /// Start triangle vertices followed by the end triangle vertices.
    pub fn vertices(&self) -> [usize; 6] {
        let [a, b, c] = self.start.0;
        let [d, e, f] = self.end.0;
        [a, b, c, d, e, f]
    }

    /// Contribution of each of [Link::vertices] to the centerline point at parameter `s`.
    ///
    /// Each triangle spreads its share of the linear interpolation evenly over its vertices, so
    /// the weights always sum to one and a triangle at the far end of the segment gets nothing.
    pub fn weights(s: f64) -> [f64; 6] {
        let start = (1.0 - s) / 3.0;
        let end = s / 3.0;
        [start, start, start, end, end, end]
    }

    pub fn centerline(&self, point_masses: &[MassPoint]) -> (DVec3, DVec3) {
        (
            self.start.centroid(point_masses),
            self.end.centroid(point_masses),
        )
    }

    /// Adjacent links sharing a triangle (or any vertex) never collide with each other.
    pub fn shares_point(&self, other: &Link) -> bool {
        other
            .vertices()
            .iter()
            .any(|&i| self.start.contains(i) || self.end.contains(i))
    }

    pub fn validate(&self, len: usize) -> Result<(), RopeError> {
        self.start.validate(len)?;
        self.end.validate(len)?;
        if self.end.0.iter().any(|&i| self.start.contains(i)) {
            return Err(RopeError::DegenerateLink {
                start: self.start.0,
                end: self.end.0,
            });
        }
        Ok(())
    }

    /// Predicted velocity of the centerline point with the given weights
    pub fn velocity_at(&self, point_masses: &[MassPoint], weights: &[f64; 6]) -> DVec3 {
        self.vertices()
            .iter()
            .zip(weights)
            .map(|(&i, w)| point_masses[i].predicted_velocity() * *w)
            .sum()
    }

    /// Acceleration of the centerline point produced by the forces added this step. Contact forces
    /// committed from the previous step are left out.
    pub fn acceleration_at(&self, point_masses: &[MassPoint], weights: &[f64; 6]) -> DVec3 {
        self.vertices()
            .iter()
            .zip(weights)
            .map(|(&i, w)| {
                point_masses[i].immediate_force() * point_masses[i].inverse_mass() * *w
            })
            .sum()
    }

    /// Inverse of the effective mass seen at the centerline point, zero when every contributing
    /// vertex is fixed.
    pub fn inverse_mass_at(&self, point_masses: &[MassPoint], weights: &[f64; 6]) -> f64 {
        self.vertices()
            .iter()
            .zip(weights)
            .map(|(&i, w)| w * w * point_masses[i].inverse_mass())
            .sum()
    }

    /// Loose bounds of the centerline inflated by `radius`, used to skip distant pairs early.
    pub fn bounds(&self, point_masses: &[MassPoint], radius: f64) -> (DVec3, DVec3) {
        let (a, b) = self.centerline(point_masses);
        (a.min(b) - DVec3::splat(radius), a.max(b) + DVec3::splat(radius))
    }
}
