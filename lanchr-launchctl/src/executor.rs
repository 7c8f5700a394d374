use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use crate::disabled::parse_print_disabled;
use crate::error::LaunchctlError;
use crate::list::{parse_list, ListEntry};
use crate::print::{parse_print_service, ServiceInfo};

/// Control surface of the OS service manager.
///
/// Targets are launchctl strings: `gui/<uid>/<label>`, `system/<label>` for
/// services, `gui/<uid>` or `system` for domains.
pub trait Executor: Send + Sync {
    /// `launchctl list`: every job launchd currently tracks for this session.
    fn list(&self) -> Result<Vec<ListEntry>, LaunchctlError>;

    /// `launchctl print <service-target>`
    fn print_service(&self, service_target: &str) -> Result<ServiceInfo, LaunchctlError>;

    /// `launchctl print-disabled <domain-target>`. Never fails: an inaccessible
    /// domain reads as "nothing disabled".
    fn print_disabled(&self, domain_target: &str) -> HashMap<String, bool>;

    /// `launchctl blame <service-target>`: why the service was launched.
    fn blame(&self, service_target: &str) -> Result<String, LaunchctlError>;

    fn enable(&self, service_target: &str) -> Result<(), LaunchctlError>;

    fn disable(&self, service_target: &str) -> Result<(), LaunchctlError>;

    /// `launchctl bootstrap <domain-target> <plist>`
    fn bootstrap(&self, domain_target: &str, plist_path: &Path) -> Result<(), LaunchctlError>;

    /// `launchctl bootout <service-target>`
    fn bootout(&self, service_target: &str) -> Result<(), LaunchctlError>;

    /// `launchctl kickstart -p` (or `-kp` to kill a running instance first).
    fn kickstart(&self, service_target: &str, kill: bool) -> Result<(), LaunchctlError>;

    /// `launchctl kill <signal> <service-target>`
    fn kill(&self, signal: &str, service_target: &str) -> Result<(), LaunchctlError>;
}

/// Runs launchctl with the given arguments and returns its stdout.
///
/// Implementations report a nonzero exit as [`LaunchctlError::Failed`].
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<String, LaunchctlError>;
}

/// Spawns the real `launchctl` binary.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, args: &[&str]) -> Result<String, LaunchctlError> {
        ensure_macos()?;

        let command = describe(args);
        let output = Command::new("launchctl")
            .args(args)
            .output()
            .map_err(|source| LaunchctlError::Io {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        Err(LaunchctlError::Failed {
            command,
            code: output.status.code(),
            stdout: stdout.trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// [`Executor`] backed by a [`CommandRunner`].
#[derive(Debug, Clone, Default)]
pub struct LaunchctlExecutor<R = SystemRunner> {
    runner: R,
}

impl LaunchctlExecutor<SystemRunner> {
    /// Executor that shells out to `/bin/launchctl`.
    pub fn new() -> Self {
        Self {
            runner: SystemRunner,
        }
    }
}

impl<R: CommandRunner> LaunchctlExecutor<R> {
    /// Executor with a custom runner (for testing).
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    fn run(&self, args: &[&str]) -> Result<String, LaunchctlError> {
        tracing::debug!(command = %describe(args), "running launchctl");
        self.runner.run(args)
    }
}

impl<R: CommandRunner> Executor for LaunchctlExecutor<R> {
    fn list(&self) -> Result<Vec<ListEntry>, LaunchctlError> {
        let out = self.run(&["list"])?;
        Ok(parse_list(&out))
    }

    fn print_service(&self, service_target: &str) -> Result<ServiceInfo, LaunchctlError> {
        let out = self.run(&["print", service_target])?;
        Ok(parse_print_service(&out))
    }

    fn print_disabled(&self, domain_target: &str) -> HashMap<String, bool> {
        match self.run(&["print-disabled", domain_target]) {
            Ok(out) => parse_print_disabled(&out),
            Err(err) => {
                tracing::debug!(error = %err, domain = domain_target, "print-disabled failed");
                HashMap::new()
            }
        }
    }

    fn blame(&self, service_target: &str) -> Result<String, LaunchctlError> {
        let out = self.run(&["blame", service_target])?;
        Ok(out.trim().to_string())
    }

    fn enable(&self, service_target: &str) -> Result<(), LaunchctlError> {
        self.run(&["enable", service_target]).map(drop)
    }

    fn disable(&self, service_target: &str) -> Result<(), LaunchctlError> {
        self.run(&["disable", service_target]).map(drop)
    }

    fn bootstrap(&self, domain_target: &str, plist_path: &Path) -> Result<(), LaunchctlError> {
        let path = plist_path.to_string_lossy();
        self.run(&["bootstrap", domain_target, &path]).map(drop)
    }

    fn bootout(&self, service_target: &str) -> Result<(), LaunchctlError> {
        self.run(&["bootout", service_target]).map(drop)
    }

    fn kickstart(&self, service_target: &str, kill: bool) -> Result<(), LaunchctlError> {
        let flags = if kill { "-kp" } else { "-p" };
        self.run(&["kickstart", flags, service_target]).map(drop)
    }

    fn kill(&self, signal: &str, service_target: &str) -> Result<(), LaunchctlError> {
        self.run(&["kill", signal, service_target]).map(drop)
    }
}

fn describe(args: &[&str]) -> String {
    let mut command = String::from("launchctl");
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

#[cfg(target_os = "macos")]
fn ensure_macos() -> Result<(), LaunchctlError> {
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn ensure_macos() -> Result<(), LaunchctlError> {
    Err(LaunchctlError::Unsupported)
}
