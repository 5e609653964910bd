use std::path::PathBuf;

use soft_rope::RopeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DloError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Rope(#[from] RopeError),
}
