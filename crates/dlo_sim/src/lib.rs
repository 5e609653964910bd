pub mod config;
pub mod dlo;
pub mod error;
pub mod strand;
pub use config::{DloConfiguration, StrandConfiguration};
pub use dlo::{Dlo, RunSummary};
pub use error::DloError;
pub use soft_rope::MassPoint;
pub use soft_rope::Rope;
