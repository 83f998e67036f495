//! Error types for manifest synthesis
//!
//! Synthesis has exactly one failure mode that matters in practice: a missing
//! or unreadable config template. It is fatal and unrecovered: the pass
//! aborts and no output is produced. Serialization and output-write errors
//! exist as structured variants so the renderer and CLI can report them with
//! context.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for synthesis operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required config template is missing or unreadable
    #[error("failed to load config template {path}: {source}")]
    ConfigLoad {
        /// Path of the template that could not be read
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A resource failed to serialize into the output manifest
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// The rendered manifest could not be written
    #[error("failed to write manifest {path}: {source}")]
    Output {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

impl Error {
    /// Create a config-load error for the given template path
    pub fn config_load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an output-write error for the given destination path
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Get the file path if this error is associated with one
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::ConfigLoad { path, .. } => Some(path),
            Error::Output { path, .. } => Some(path),
            Error::Serialization { .. } => None,
        }
    }
}
