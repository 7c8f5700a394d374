//! Error types for lanchr-plist.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One problem found while validating a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All errors that can arise from descriptor codec operations.
#[derive(Debug, Error)]
pub enum PlistError {
    /// Filesystem error, with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a decodable property list.
    #[error("failed to decode plist {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    #[error("failed to encode plist {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    /// Validation refused the write; nothing was written.
    #[error("invalid descriptor for {path}: {}", join_errors(.errors))]
    Invalid {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },

    /// Export bundle JSON error.
    #[error("export bundle JSON error: {0}")]
    BundleJson(#[from] serde_json::Error),

    /// The bundle decoded but is missing required fields.
    #[error("invalid export bundle: {0}")]
    InvalidBundle(String),

    #[error("unknown template '{name}'; available: {available}")]
    UnknownTemplate { name: String, available: String },

    #[error("invalid calendar spec: {0}")]
    CalendarSpec(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience constructor for [`PlistError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PlistError {
    PlistError::Io {
        path: path.into(),
        source,
    }
}
