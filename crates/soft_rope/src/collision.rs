//! Narrow phase collision between two volumetric links.
//!
//! Each link is a capped cylinder of radius `radius` around the segment joining the centroids of
//! two structural triangles. When the cylinders of two links overlap, the response is spread over
//! the twelve triangle vertices with the interpolation weights of the closest points:
//!
//! - a displacement along the contact normal that separates the centerlines by the penetration
//! - a restitution velocity that cancels (or reflects) the approach velocity
//! - deferred reaction and friction forces that act from the next step on
//!
//! Detection only reads the point masses, so pairs can be evaluated in parallel and the resulting
//! [LinkContact] records folded into the accumulators afterwards.

use glam::DVec3;
use log::{debug, trace};

use crate::{link::Link, point_mass::MassPoint, segment::closest_points};

/// Integration time step of the reference setup (s)
pub const DEFAULT_TIME_STEP: f64 = 0.001;

const NORMAL_EPSILON: f64 = 1e-12;
const SLIP_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactParameters {
    /// Radius of every link cylinder
    pub radius: f64,
    /// Coulomb friction coefficient
    pub friction: f64,
    /// [0,1] Fraction of the approach velocity reflected by the contact
    pub restitution: f64,
    /// Step length used to turn friction impulses into deferred forces
    pub time_step: f64,
}

impl ContactParameters {
    pub fn new(radius: f64, friction: f64) -> Self {
        ContactParameters {
            radius,
            friction,
            restitution: 0.0,
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

/// What a single contact adds to one point mass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contribution {
    /// Index to MassPoint
    pub point: usize,
    /// Added to the deferred force
    pub force: DVec3,
    pub displacement: DVec3,
    pub restitution_velocity: DVec3,
}

/// A detected overlap between two links and its response.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkContact {
    /// Penetration depth, `2 * radius - distance`
    pub depth: f64,
    /// Unit normal pointing from the second link towards the first
    pub normal: DVec3,
    /// Closest point parameter along the first link
    pub s: f64,
    /// Closest point parameter along the second link
    pub t: f64,
    /// First link vertices followed by the second link vertices
    pub contributions: [Contribution; 12],
}

impl LinkContact {
    /// Adds every contribution to the matching accumulators.
    pub fn apply(&self, point_masses: &mut [MassPoint]) {
        for contribution in &self.contributions {
            let point_mass = &mut point_masses[contribution.point];
            point_mass.add_deferred_force(contribution.force);
            point_mass.add_displacement(contribution.displacement);
            point_mass.add_restitution_velocity(contribution.restitution_velocity);
        }
    }
}

/// Detects an overlap between `first` and `second` and computes the response without touching
/// the point masses. Returns `None` when the links are at least `2 * radius` apart.
///
/// Panics if a link refers to a point outside of `point_masses`.
pub fn detect_link_contact(
    point_masses: &[MassPoint],
    first: &Link,
    second: &Link,
    params: &ContactParameters,
) -> Option<LinkContact> {
    let (a0, a1) = first.centerline(point_masses);
    let (b0, b1) = second.centerline(point_masses);
    let proximity = closest_points(a0, a1, b0, b1);
    let distance = proximity.distance();
    let reach = 2.0 * params.radius;
    // Touching is not overlapping, NaN is neither
    if !(distance < reach) {
        return None;
    }

    let depth = reach - distance;
    let normal = if distance > NORMAL_EPSILON {
        (proximity.on_first - proximity.on_second) / distance
    } else {
        fallback_normal(a1 - a0, b1 - b0)
    };

    let first_weights = Link::weights(proximity.s);
    let second_weights = Link::weights(proximity.t);
    let mut contributions = [Contribution::default(); 12];
    for (slot, point) in contributions
        .iter_mut()
        .zip(first.vertices().into_iter().chain(second.vertices()))
    {
        slot.point = point;
    }

    let inverse_mass = first.inverse_mass_at(point_masses, &first_weights)
        + second.inverse_mass_at(point_masses, &second_weights);
    if inverse_mass <= 0.0 {
        debug!("contact of depth {depth} between two immovable links");
        return Some(LinkContact {
            depth,
            normal,
            s: proximity.s,
            t: proximity.t,
            contributions,
        });
    }

    let relative_velocity = first.velocity_at(point_masses, &first_weights)
        - second.velocity_at(point_masses, &second_weights);
    let approach = relative_velocity.dot(normal);
    let normal_impulse = if approach < 0.0 {
        -(1.0 + params.restitution) * approach / inverse_mass
    } else {
        0.0
    };

    // Support against the forces of this step pressing the links together, last step's reaction
    // excluded
    let pressing = (first.acceleration_at(point_masses, &first_weights)
        - second.acceleration_at(point_masses, &second_weights))
    .dot(normal);
    let reaction = if pressing < 0.0 {
        -pressing / inverse_mass
    } else {
        0.0
    };

    let tangential = relative_velocity - approach * normal;
    let slip = tangential.length();
    let friction = if slip > SLIP_EPSILON && params.time_step > 0.0 {
        let bound = params.friction * (normal_impulse + reaction * params.time_step);
        // Never more than what stops the sliding
        let impulse = bound.min(slip / inverse_mass);
        -tangential / slip * (impulse / params.time_step)
    } else {
        DVec3::ZERO
    };
    let force = reaction * normal + friction;

    trace!(
        "link contact depth {depth}, normal {normal}, impulse {normal_impulse}, reaction {reaction}"
    );

    let separation = depth / inverse_mass;
    let weights = first_weights.into_iter().chain(second_weights);
    for (k, (slot, weight)) in contributions.iter_mut().zip(weights).enumerate() {
        let inverse = point_masses[slot.point].inverse_mass();
        if inverse <= 0.0 {
            continue;
        }
        // Second link points are pushed the other way
        let sign = if k < 6 { 1.0 } else { -1.0 };
        slot.force = sign * weight * force;
        slot.displacement = sign * weight * inverse * separation * normal;
        slot.restitution_velocity = sign * weight * inverse * normal_impulse * normal;
    }

    Some(LinkContact {
        depth,
        normal,
        s: proximity.s,
        t: proximity.t,
        contributions,
    })
}

/// Detects and resolves a collision between two links, accumulating the response into the twelve
/// point masses involved. Returns whether the links overlap.
pub fn collide_links(
    point_masses: &mut [MassPoint],
    first: &Link,
    second: &Link,
    params: &ContactParameters,
) -> bool {
    match detect_link_contact(point_masses, first, second, params) {
        Some(contact) => {
            contact.apply(point_masses);
            true
        }
        None => false,
    }
}

/// Normal for coincident centerlines, consistent for a given pair of directions.
fn fallback_normal(first_direction: DVec3, second_direction: DVec3) -> DVec3 {
    let crossing = first_direction.cross(second_direction);
    if crossing.length_squared() > NORMAL_EPSILON {
        return crossing.normalize();
    }
    [first_direction, second_direction]
        .into_iter()
        .find(|d| d.length_squared() > NORMAL_EPSILON)
        .map(|d| d.normalize().any_orthonormal_vector())
        .unwrap_or(DVec3::Z)
}
