pub mod collision;
pub mod error;
pub mod link;
pub mod point_mass;
pub mod rope;
pub mod segment;
pub mod spring;

pub use collision::{
    ContactParameters, Contribution, LinkContact, collide_links, detect_link_contact,
};
pub use error::RopeError;
pub use link::{Link, Triangle};
pub use point_mass::{MassPoint, Mobility, StepPhase};
pub use rope::{Rope, StepParameters, StepReport, StepToken};
pub use spring::Spring;
