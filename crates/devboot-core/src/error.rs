//! Errors that stop a bootstrap before anything is created or spawned.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("Failed to read profile overrides {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid profile: {0}")]
    Invalid(String),
}
