//! Error types for lanchr-agent.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use lanchr_launchctl::LaunchctlError;
use lanchr_plist::PlistError;

/// A lifecycle operation, as named in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Enable,
    Disable,
    Restart,
    Load,
    Unload,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Restart => "restart",
            Action::Load => "load",
            Action::Unload => "unload",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All errors that scanner, manager and doctor surface.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("service not found: {label}")]
    NotFound { label: String },

    /// Refused before any service-manager call.
    #[error("cannot {action} {target}: descriptor is in the SIP-protected /System/Library tree")]
    Protected { action: Action, target: String },

    #[error("{action} {label} requires elevated privileges")]
    PermissionDenied {
        action: Action,
        label: String,
        #[source]
        source: LaunchctlError,
    },

    #[error("{action} {label} failed: {source}")]
    Action {
        action: Action,
        label: String,
        #[source]
        source: LaunchctlError,
    },

    /// The live service list could not be read.
    #[error("failed to list services: {0}")]
    Scan(#[source] LaunchctlError),

    #[error("cannot read descriptor {}: {source}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: PlistError,
    },
}

impl AgentError {
    /// Classify a failed control call.
    pub(crate) fn from_control(action: Action, label: &str, source: LaunchctlError) -> Self {
        if source.is_permission_denied() {
            AgentError::PermissionDenied {
                action,
                label: label.to_string(),
                source,
            }
        } else {
            AgentError::Action {
                action,
                label: label.to_string(),
                source,
            }
        }
    }
}
