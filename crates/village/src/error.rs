use std::path::PathBuf;

use thiserror::Error;

use crate::entity::{EntityId, ResourceId};

#[derive(Debug, Error)]
pub enum VillageError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("unknown resource {0}")]
    UnknownResource(ResourceId),
}

pub type Result<T> = std::result::Result<T, VillageError>;
