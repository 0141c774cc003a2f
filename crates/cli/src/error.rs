use std::path::PathBuf;

use thiserror::Error;

use gateway_core::{ErrorKind, GatewayError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no stored credentials at {path}: log in again")]
    CredentialsNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt options file {path}: {source}")]
    CorruptOptions {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl CliError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Kind in the shared error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::CredentialsNotFound { .. } => ErrorKind::NotFound,
            CliError::Storage { .. } | CliError::CorruptOptions { .. } => ErrorKind::Internal,
            CliError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            CliError::Gateway(e) => e.kind(),
        }
    }
}
