use thiserror::Error;

/// Substrings launchctl prints when the caller lacks privileges.
pub const PRIVILEGE_MARKERS: &[&str] = &[
    "permission denied",
    "operation not permitted",
    "not privileged",
    "could not write configuration",
];

/// launchctl exit status for "Operation not permitted"-style refusals.
pub const PRIVILEGE_EXIT_CODE: i32 = 36;

/// Error surface for launchctl invocation and output handling.
#[derive(Debug, Error)]
pub enum LaunchctlError {
    /// The process could not be spawned at all.
    #[error("failed to run {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// launchctl ran and exited unsuccessfully.
    #[error("{command} failed ({}): {}", status_text(.code), output_text(.stdout, .stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("launchd management is only supported on macOS")]
    Unsupported,
}

impl LaunchctlError {
    /// Whether launchctl refused the operation for lack of privileges.
    ///
    /// launchctl has no structured error contract, so this matches known
    /// phrases in its output plus the one exit status it uses for refusals.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            LaunchctlError::Failed {
                code,
                stdout,
                stderr,
                ..
            } => {
                if *code == Some(PRIVILEGE_EXIT_CODE) {
                    return true;
                }
                let text = format!("{stdout}\n{stderr}").to_lowercase();
                PRIVILEGE_MARKERS.iter().any(|marker| text.contains(marker))
            }
            LaunchctlError::Io { source, .. } => {
                source.kind() == std::io::ErrorKind::PermissionDenied
            }
            LaunchctlError::Unsupported => false,
        }
    }
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn output_text(stdout: &str, stderr: &str) -> String {
    match (stdout.is_empty(), stderr.is_empty()) {
        (_, false) => stderr.to_string(),
        (false, true) => stdout.to_string(),
        (true, true) => "no output".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(code: Option<i32>, stderr: &str) -> LaunchctlError {
        LaunchctlError::Failed {
            command: "launchctl enable system/com.example".to_string(),
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn classifies_privilege_refusals() {
        assert!(failed(Some(1), "Could not write configuration for service").is_permission_denied());
        assert!(failed(Some(150), "Operation not permitted while System Integrity Protection is engaged").is_permission_denied());
        assert!(failed(Some(1), "Bootstrap failed: 1: Operation not permitted").is_permission_denied());
        assert!(failed(Some(36), "").is_permission_denied());
        assert!(failed(Some(1), "Not privileged to set domain environment").is_permission_denied());
    }

    #[test]
    fn other_failures_are_not_privilege_errors() {
        assert!(!failed(Some(113), "Could not find service \"x\" in domain").is_permission_denied());
        assert!(!failed(None, "").is_permission_denied());
        assert!(!LaunchctlError::Unsupported.is_permission_denied());
    }

    #[test]
    fn message_prefers_stderr() {
        let msg = failed(Some(5), "Input/output error").to_string();
        assert!(msg.contains("exit status 5"), "got: {msg}");
        assert!(msg.contains("Input/output error"), "got: {msg}");
    }
}
