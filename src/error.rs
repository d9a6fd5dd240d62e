//! Error types for the model registry.
//!
//! Discovery-time failures (`Format`, `Reference`, `Io`) are normally turned
//! into scan warnings by the registry; lookup-time failures (`NotFound`,
//! `ModelNotInDistribution`, `Unsupported`, `Decode`) are returned to callers.

use std::path::PathBuf;
use thiserror::Error;

/// Registry error type.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Requested fullname is absent from the registry index
    #[error("no model or resource named '{0}'")]
    NotFound(String),

    /// Distribution does not define the requested name
    #[error("undefined model '{name}' in {dist}")]
    ModelNotInDistribution { name: String, dist: String },

    /// Definition file is not valid JSON or fails schema validation
    #[error("invalid definition file {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// Definition file references an undefined model
    #[error("bad reference in {}: {message}", path.display())]
    Reference { path: PathBuf, message: String },

    /// Filesystem read failure
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation not supported for this kind of distribution
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Escaped project-name token is not valid base16 UTF-8
    #[error("cannot decode project name token '{token}': {message}")]
    Decode { token: String, message: String },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
