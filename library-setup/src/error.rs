//! Error taxonomy for the setup pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Boxed driver error carried by connection and query failures.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stage-terminal conditions. Row-level problems never show up here.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config file {} not found (template: {})", path.display(), template.display())]
    ConfigMissing { path: PathBuf, template: PathBuf },

    #[error("required setting {key} has no value")]
    ConfigIncomplete { key: String },

    #[error("setting {key}={value:?} is invalid: {reason}")]
    ConfigInvalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("could not connect to database {database}: {source}")]
    Connection {
        database: String,
        #[source]
        source: DriverError,
    },

    #[error("failed to {action}: {source}")]
    Query {
        action: String,
        #[source]
        source: DriverError,
    },

    #[error("schema file {} not found", path.display())]
    SchemaFileMissing { path: PathBuf },

    #[error("seed file {} unusable: {reason}", path.display())]
    SeedFileMissing { path: PathBuf, reason: String },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub(crate) fn query(action: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Query {
            action: action.into(),
            source: source.into(),
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;
