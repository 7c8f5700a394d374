//! Error types for lanchr-core.

use thiserror::Error;

/// Errors from resolving process-wide platform configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `dirs::home_dir()` returned `None`, so `~/Library/LaunchAgents` cannot be located.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// `id -u` could not be spawned.
    #[error("failed to run `id -u`: {0}")]
    UidCommand(#[source] std::io::Error),

    /// `id -u` ran but did not produce a usable uid.
    #[error("failed to resolve current uid: {0}")]
    Uid(String),
}
