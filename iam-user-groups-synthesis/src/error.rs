//! Error types for inventory loading and policy synthesis

use std::path::PathBuf;
use thiserror::Error;

use crate::aws::AwsError;

/// Result alias used across the crate.
pub type SynthesisResult<T> = std::result::Result<T, SynthesisError>;

#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Malformed or duplicate input specs. Fatal to the evaluation and
    /// raised before any resource is produced.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        /// Inventory field the problem was found on, e.g. `users[2].name`
        field: Option<String>,
    },

    #[error("Failed to parse inventory: {0}")]
    InventoryParse(#[from] serde_json::Error),

    #[error("File system error during {operation} on path '{path}': {source}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render plan: {0}")]
    Render(String),

    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl SynthesisError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    pub(crate) fn configuration_at(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub(crate) fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }

    /// Whether this error was caused by the operator's input rather than the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::InventoryParse(_))
    }

    /// Field the configuration error points at, if known.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Configuration { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
