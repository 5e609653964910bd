use std::fmt;

use glam::DVec3;

/// How a point responds to forces and contact corrections.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mobility {
    /// Never integrated, only anchors springs and links
    #[default]
    Fixed,
    Dynamic { mass: f64 },
}

impl Mobility {
    /// Non-positive (or NaN) masses pin the point in place.
    pub fn from_mass(mass: f64) -> Self {
        if mass > 0.0 {
            Mobility::Dynamic { mass }
        } else {
            Mobility::Fixed
        }
    }
}

/// Where a point is within the per-step reset, accumulate, correct, synchronize cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    Accumulating,
    Correcting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StepFlags {
    force_reset: bool,
    displacement_reset: bool,
    velocity_reset: bool,
    position_corrected: bool,
    velocity_corrected: bool,
}

/// A material point of a deformable linear object.
///
/// Positions and velocities are kept at three consecutive instants t - dt, t and t + dt, where the
/// t + dt samples are predictions until the step's corrections are applied. Contact response is
/// gathered in three accumulators: a displacement `dr`, a restitution velocity `v_res` and a
/// deferred force `df` that becomes the active force `f` at the start of the following step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassPoint {
    r0: DVec3,
    r_minus: DVec3,
    r: DVec3,
    r_plus: DVec3,
    v0: DVec3,
    v_minus: DVec3,
    v: DVec3,
    v_plus: DVec3,
    f: DVec3, // Active force for the current step
    df: DVec3, // Force accumulated for the next step
    fc: DVec3, // Part of `f` committed from last step's `df`
    dr: DVec3,
    v_res: DVec3,
    mobility: Mobility,
    flags: StepFlags,
}

impl MassPoint {
    /// Creates a static mass point at `position`.
    pub fn new(position: DVec3) -> Self {
        MassPoint {
            r0: position,
            r_minus: position,
            r: position,
            r_plus: position,
            ..Default::default()
        }
    }

    pub fn with_mass(position: DVec3, mass: f64) -> Self {
        let mut point = MassPoint::new(position);
        point.set_mass(mass);
        point
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mobility = Mobility::from_mass(mass);
    }

    /// Places a default constructed point. The reference position is left untouched.
    pub fn set_position(&mut self, position: DVec3) {
        self.r_minus = position;
        self.r = position;
        self.r_plus = position;
    }

    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.v0 = velocity;
        self.v_minus = velocity;
        self.v = velocity;
        self.v_plus = velocity;
    }

    /// Commits last step's deferred force as the active force and clears the deferred buffer.
    pub fn reset_force(&mut self) {
        assert!(
            !self.flags.position_corrected && !self.flags.velocity_corrected,
            "force reset after corrections were applied"
        );
        self.f = self.df;
        self.fc = self.df;
        self.df = DVec3::ZERO;
        self.flags.force_reset = true;
    }

    pub fn reset_displacement(&mut self) {
        assert!(
            !self.flags.position_corrected,
            "displacement reset after the position correction"
        );
        self.dr = DVec3::ZERO;
        self.flags.displacement_reset = true;
    }

    pub fn reset_restitution_velocity(&mut self) {
        assert!(
            !self.flags.velocity_corrected,
            "restitution velocity reset after the velocity correction"
        );
        self.v_res = DVec3::ZERO;
        self.flags.velocity_reset = true;
    }

    /// Adds the accumulated displacement to the predicted position. Once per step.
    pub fn correct_position(&mut self) {
        assert!(
            self.flags.displacement_reset,
            "position corrected without resetting the displacement accumulator"
        );
        assert!(
            !self.flags.position_corrected,
            "position corrected twice in one step"
        );
        self.r_plus += self.dr;
        self.flags.position_corrected = true;
    }

    /// Adds the accumulated restitution velocity to the predicted velocity. Once per step.
    pub fn correct_velocity(&mut self) {
        assert!(
            self.flags.velocity_reset,
            "velocity corrected without resetting the restitution accumulator"
        );
        assert!(
            !self.flags.velocity_corrected,
            "velocity corrected twice in one step"
        );
        self.v_plus += self.v_res;
        self.flags.velocity_corrected = true;
    }

    /// Immediate force contribution, gravity or user forces.
    pub fn add_external_force(&mut self, force: DVec3) {
        self.f += force;
    }

    /// Linear drag proportional to the current velocity.
    pub fn add_damping_force(&mut self, coefficient: f64) {
        self.f += -coefficient * self.v;
    }

    /// Force that only starts acting at the next step.
    pub fn add_deferred_force(&mut self, force: DVec3) {
        assert!(
            self.flags.force_reset,
            "deferred force added before the force reset"
        );
        self.df += force;
    }

    pub fn add_displacement(&mut self, displacement: DVec3) {
        assert!(
            self.flags.displacement_reset && !self.flags.position_corrected,
            "displacement added outside of the accumulation phase"
        );
        self.dr += displacement;
    }

    pub fn add_restitution_velocity(&mut self, velocity: DVec3) {
        assert!(
            self.flags.velocity_reset && !self.flags.velocity_corrected,
            "restitution velocity added outside of the accumulation phase"
        );
        self.v_res += velocity;
    }

    /// Symplectic Euler prediction of the t + dt samples from the active force.
    pub fn predict(&mut self, timestep: f64) {
        match self.mobility {
            Mobility::Fixed => {
                self.v_plus = DVec3::ZERO;
                self.r_plus = self.r;
            }
            Mobility::Dynamic { mass } => {
                self.v_plus = self.v + self.f / mass * timestep;
                self.r_plus = self.r + self.v_plus * timestep;
            }
        }
    }

    /// Shifts the time samples one step forward. The t + dt samples stay stale until the next
    /// prediction.
    pub fn synchronize_positions_and_velocities(&mut self) {
        assert!(
            self.flags.force_reset
                && self.flags.position_corrected
                && self.flags.velocity_corrected,
            "synchronized before the step was reset and corrected"
        );
        self.r_minus = self.r;
        self.r = self.r_plus;
        self.v_minus = self.v;
        self.v = self.v_plus;
        self.flags = StepFlags::default();
    }

    /// Moves the current position directly, bypassing the time samples.
    pub fn perturb(&mut self, offset: DVec3) {
        self.r += offset;
    }

    pub fn phase(&self) -> StepPhase {
        if self.flags.position_corrected || self.flags.velocity_corrected {
            StepPhase::Correcting
        } else if self.flags == StepFlags::default() {
            StepPhase::Idle
        } else {
            StepPhase::Accumulating
        }
    }

    pub fn mobility(&self) -> Mobility {
        self.mobility
    }

    /// Zero for fixed points.
    pub fn mass(&self) -> f64 {
        match self.mobility {
            Mobility::Fixed => 0.0,
            Mobility::Dynamic { mass } => mass,
        }
    }

    pub fn inverse_mass(&self) -> f64 {
        match self.mobility {
            Mobility::Fixed => 0.0,
            Mobility::Dynamic { mass } => 1.0 / mass,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.mobility == Mobility::Fixed
    }

    pub fn reference_position(&self) -> DVec3 {
        self.r0
    }

    pub fn previous_position(&self) -> DVec3 {
        self.r_minus
    }

    pub fn position(&self) -> DVec3 {
        self.r
    }

    pub fn predicted_position(&self) -> DVec3 {
        self.r_plus
    }

    pub fn initial_velocity(&self) -> DVec3 {
        self.v0
    }

    pub fn previous_velocity(&self) -> DVec3 {
        self.v_minus
    }

    pub fn velocity(&self) -> DVec3 {
        self.v
    }

    pub fn predicted_velocity(&self) -> DVec3 {
        self.v_plus
    }

    pub fn force(&self) -> DVec3 {
        self.f
    }

    /// Active force without the deferred contact forces committed at the last reset, i.e. what
    /// was added during the current step.
    pub fn immediate_force(&self) -> DVec3 {
        self.f - self.fc
    }

    pub fn deferred_force(&self) -> DVec3 {
        self.df
    }

    pub fn displacement(&self) -> DVec3 {
        self.dr
    }

    pub fn restitution_velocity(&self) -> DVec3 {
        self.v_res
    }
}

impl fmt::Display for MassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "({}, {}, {}) -- ({}, {}, {})",
            self.r.x, self.r.y, self.r.z, self.r0.x, self.r0.y, self.r0.z
        )
    }
}
