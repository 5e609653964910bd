use glam::DVec3;

const DEGENERATE_EPSILON: f64 = 1e-12;

/// Closest points between two segments, with their interpolation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProximity {
    /// [0,1] parameter along the first segment
    pub s: f64,
    /// [0,1] parameter along the second segment
    pub t: f64,
    pub on_first: DVec3,
    pub on_second: DVec3,
}

impl SegmentProximity {
    pub fn distance(&self) -> f64 {
        (self.on_first - self.on_second).length()
    }
}

/// Closest points between segments `p1 q1` and `p2 q2`.
///
/// Zero length segments collapse to their start point. Parallel segments pick the middle of the
/// part of the first segment that faces the second one, or the nearest end when they do not face
/// each other at all.
pub fn closest_points(p1: DVec3, q1: DVec3, p2: DVec3, q2: DVec3) -> SegmentProximity {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= DEGENERATE_EPSILON && e <= DEGENERATE_EPSILON {
        (0.0, 0.0)
    } else if a <= DEGENERATE_EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= DEGENERATE_EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let s = if denom > DEGENERATE_EPSILON * a * e {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                // Projections of the second segment's ends onto the first
                let from = (-c / a).clamp(0.0, 1.0);
                let to = ((b - c) / a).clamp(0.0, 1.0);
                0.5 * (from + to)
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    SegmentProximity {
        s,
        t,
        on_first: p1 + d1 * s,
        on_second: p2 + d2 * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_segments() {
        let prox = closest_points(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(0.0, 1.5, 0.0),
            DVec3::new(1.0, 1.5, 0.0),
        );
        assert!((prox.distance() - 1.5).abs() < 1e-12);
        assert_eq!(prox.s, 0.5);
        assert_eq!(prox.t, 0.5);
    }

    #[test]
    fn test_partially_overlapping_parallel_segments() {
        let prox = closest_points(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(0.5, 1.0, 0.0),
            DVec3::new(1.5, 1.0, 0.0),
        );
        assert!((prox.s - 0.75).abs() < 1e-12);
        assert!((prox.t - 0.25).abs() < 1e-12);
        assert!((prox.distance() - 1.0).abs() < 1e-12);

        // Opposite direction, same overlap
        let prox = closest_points(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(1.5, 1.0, 0.0),
            DVec3::new(0.5, 1.0, 0.0),
        );
        assert!((prox.s - 0.75).abs() < 1e-12);
        assert!((prox.on_second - DVec3::new(0.75, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_disjoint_parallel_segments() {
        let prox = closest_points(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(3.0, 1.0, 0.0),
        );
        assert_eq!(prox.s, 1.0);
        assert_eq!(prox.t, 0.0);
        assert!((prox.distance() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_segments() {
        // x axis segment under a z axis segment, crossing at (0.5, 1, 0.5)
        let prox = closest_points(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(0.5, 1.0, 0.0),
            DVec3::new(0.5, 1.0, 1.0),
        );
        assert!((prox.s - 0.5).abs() < 1e-12);
        assert!((prox.t - 0.0).abs() < 1e-12);
        assert!((prox.distance() - 1.0).abs() < 1e-12);

        let prox = closest_points(
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, -1.0),
            DVec3::new(0.0, 2.0, 1.0),
        );
        assert!((prox.s - 0.5).abs() < 1e-12);
        assert!((prox.t - 0.5).abs() < 1e-12);
        assert!((prox.on_second - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_endpoint_clamping() {
        // Second segment lies beyond the end of the first
        let prox = closest_points(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(3.0, 0.0, -1.0),
            DVec3::new(3.0, 0.0, 1.0),
        );
        assert_eq!(prox.s, 1.0);
        assert!((prox.t - 0.5).abs() < 1e-12);
        assert!((prox.distance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segments() {
        let prox = closest_points(DVec3::ONE, DVec3::ONE, DVec3::ZERO, DVec3::ZERO);
        assert!((prox.distance() - 3f64.sqrt()).abs() < 1e-12);

        let prox = closest_points(
            DVec3::new(0.5, 1.0, 0.0),
            DVec3::new(0.5, 1.0, 0.0),
            DVec3::ZERO,
            DVec3::X,
        );
        assert_eq!(prox.s, 0.0);
        assert!((prox.t - 0.5).abs() < 1e-12);
        assert!((prox.distance() - 1.0).abs() < 1e-12);
    }
}
