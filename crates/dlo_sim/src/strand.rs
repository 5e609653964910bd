use std::{f64::consts::TAU, ops::Range};

use glam::DVec3;
use soft_rope::{Link, MassPoint, Rope, Spring};

use crate::{
    config::{DloConfiguration, StrandConfiguration},
    error::DloError,
};

/// Where a strand's elements were placed in the rope.
#[derive(Debug, Clone, PartialEq)]
pub struct Strand {
    /// Structural triangles from start to end
    pub triangles: Vec<[usize; 3]>,
    /// Indices to the rope links
    pub links: Range<usize>,
}

impl Strand {
    pub fn point_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.triangles.iter().flatten().copied()
    }

    /// Average of the strand's current positions
    pub fn centroid(&self, rope: &Rope) -> DVec3 {
        let count = self.triangles.len() * 3;
        self.point_indices()
            .map(|i| rope.point_masses[i].position())
            .sum::<DVec3>()
            / count as f64
    }
}

/// Adds a straight strand to the rope. Every section boundary gets a structural triangle around
/// the centerline, springs run along the triangle edges, along the strand and diagonally across
/// its faces, and a link joins every pair of consecutive triangles.
pub fn build_strand(
    rope: &mut Rope,
    strand: &StrandConfiguration,
    config: &DloConfiguration,
) -> Result<Strand, DloError> {
    let tangent = (strand.end - strand.start).normalize();
    let u = tangent.any_orthonormal_vector();
    let w = tangent.cross(u);
    let offsets: [DVec3; 3] = core::array::from_fn(|v| {
        let angle = TAU * v as f64 / 3.0;
        config.cross_section_radius * (angle.cos() * u + angle.sin() * w)
    });

    let mut triangles = Vec::with_capacity(strand.sections + 1);
    for k in 0..=strand.sections {
        let center = strand.start.lerp(strand.end, k as f64 / strand.sections as f64);
        let pinned = (k == 0 && strand.pin_start) || (k == strand.sections && strand.pin_end);
        let mass = if pinned { 0.0 } else { config.point_mass };
        triangles.push(offsets.map(|offset| {
            rope.add_point_mass(MassPoint::with_mass(center + offset, mass))
        }));
    }

    let mut anchors = Vec::new();
    for (k, triangle) in triangles.iter().enumerate() {
        for v in 0..3 {
            anchors.push((triangle[v], triangle[(v + 1) % 3]));
            if let Some(next) = triangles.get(k + 1) {
                anchors.push((triangle[v], next[v]));
                // Shear
                anchors.push((triangle[v], next[(v + 1) % 3]));
            }
        }
    }
    for (a, b) in anchors {
        let spring = Spring::at_rest(
            &rope.point_masses,
            a,
            b,
            config.spring_constant,
            config.dampener_coefficient,
        );
        rope.add_spring(spring)?;
    }

    let first_link = rope.links.len();
    for pair in triangles.windows(2) {
        rope.add_link(Link::new(pair[0], pair[1]))?;
    }

    Ok(Strand {
        links: first_link..rope.links.len(),
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strand(sections: usize) -> StrandConfiguration {
        StrandConfiguration {
            start: DVec3::ZERO,
            end: DVec3::new(1.0, 0.0, 0.0),
            sections,
            pin_start: true,
            pin_end: false,
        }
    }

    #[test]
    fn test_strand_topology() {
        let mut rope = Rope::new();
        let config = DloConfiguration::default();
        let built = build_strand(&mut rope, &strand(4), &config).unwrap();
        assert_eq!(rope.point_masses.len(), 15);
        assert_eq!(built.triangles.len(), 5);
        assert_eq!(built.links, 0..4);
        // 3 edges per triangle, 6 along and across every section
        assert_eq!(rope.springs.len(), 5 * 3 + 4 * 6);
        assert!(rope.springs.iter().all(|s| s.elongation(&rope.point_masses).abs() < 1e-12));
    }

    #[test]
    fn test_centerline_follows_strand() {
        let mut rope = Rope::new();
        let config = DloConfiguration::default();
        let built = build_strand(&mut rope, &strand(4), &config).unwrap();
        let (a, b) = rope.links[built.links.start].centerline(&rope.point_masses);
        assert!(a.length() < 1e-12);
        assert!((b - DVec3::new(0.25, 0.0, 0.0)).length() < 1e-12);
        for i in built.point_indices() {
            let p = rope.point_masses[i].position();
            let radial = DVec3::new(0.0, p.y, p.z).length();
            assert!((radial - config.cross_section_radius).abs() < 1e-12);
        }
        assert!((built.centroid(&rope) - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_pinned_ends_are_fixed() {
        let mut rope = Rope::new();
        let config = DloConfiguration::default();
        let built = build_strand(&mut rope, &strand(3), &config).unwrap();
        for &i in &built.triangles[0] {
            assert!(rope.point_masses[i].is_fixed());
        }
        for &i in &built.triangles[3] {
            assert_eq!(rope.point_masses[i].mass(), config.point_mass);
        }
    }

    #[test]
    fn test_links_of_one_strand_only_pair_when_apart() {
        let mut rope = Rope::new();
        let config = DloConfiguration::default();
        build_strand(&mut rope, &strand(4), &config).unwrap();
        assert_eq!(rope.candidate_pairs(), vec![(0, 2), (0, 3), (1, 3)]);
    }
}
