//! Lifecycle operations: enable, disable, restart, load, unload, info.
//!
//! Every mutation resolves its target first and refuses anything under the
//! protected tree before launchctl is invoked. Each makes exactly one control
//! call and never retries.

use std::path::Path;

use lanchr_core::{Service, Status};
use lanchr_launchctl::{Executor, LaunchctlError};

use crate::error::{Action, AgentError};
use crate::scanner::Scanner;

pub struct Manager<E> {
    scanner: Scanner<E>,
}

impl<E: Executor> Manager<E> {
    pub fn new(scanner: Scanner<E>) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &Scanner<E> {
        &self.scanner
    }

    /// `launchctl enable`
    pub fn enable(&self, label: &str) -> Result<(), AgentError> {
        self.control(Action::Enable, label, |exec, target| exec.enable(target))
    }

    /// `launchctl disable`
    pub fn disable(&self, label: &str) -> Result<(), AgentError> {
        self.control(Action::Disable, label, |exec, target| exec.disable(target))
    }

    /// `launchctl kickstart -kp`: kill the running instance and start anew.
    pub fn restart(&self, label: &str) -> Result<(), AgentError> {
        self.control(Action::Restart, label, |exec, target| exec.kickstart(target, true))
    }

    /// `launchctl bootout`
    pub fn unload(&self, label: &str) -> Result<(), AgentError> {
        self.control(Action::Unload, label, |exec, target| exec.bootout(target))
    }

    /// Bootstrap the descriptor at `path` into the domain its location implies.
    pub fn load(&self, path: &Path) -> Result<(), AgentError> {
        let platform = self.scanner.platform();
        if platform.is_protected(path) {
            return Err(AgentError::Protected {
                action: Action::Load,
                target: path.display().to_string(),
            });
        }

        let descriptor = lanchr_plist::parse(path).map_err(|source| AgentError::Descriptor {
            path: path.to_path_buf(),
            source,
        })?;
        let label = match descriptor.label() {
            Some(label) => label.to_string(),
            None => path.display().to_string(),
        };

        let domain_target = platform.domain_target(platform.kind_from_path(path));
        self.scanner
            .executor()
            .bootstrap(&domain_target, path)
            .map_err(|source| AgentError::from_control(Action::Load, &label, source))?;

        tracing::info!("loaded {label} into {domain_target}");
        Ok(())
    }

    /// The service plus whatever `launchctl print` and `blame` can add.
    ///
    /// Enrichment is best effort; the scanned record is returned unchanged
    /// when either call fails.
    pub fn info(&self, label: &str) -> Result<Service, AgentError> {
        let mut service = self.scanner.find_by_label(label)?;
        let target = self
            .scanner
            .platform()
            .service_target(service.kind, &service.label);
        let executor = self.scanner.executor();

        match executor.print_service(&target) {
            Ok(info) => {
                if info.pid > 0 {
                    service.pid = info.pid;
                    service.status = Status::Running;
                }
                if info.state.as_deref() == Some("running") {
                    service.status = Status::Running;
                }
                if service.program.is_none() {
                    service.program = info.program.filter(|p| !p.is_empty());
                }
            }
            Err(err) => tracing::debug!("print {target} failed: {err}"),
        }

        match executor.blame(&target) {
            Ok(reason) if !reason.is_empty() => service.blame = Some(reason),
            Ok(_) => {}
            Err(err) => tracing::debug!("blame {target} failed: {err}"),
        }

        Ok(service)
    }

    fn control<F>(&self, action: Action, label: &str, call: F) -> Result<(), AgentError>
    where
        F: FnOnce(&E, &str) -> Result<(), LaunchctlError>,
    {
        let service = self.scanner.find_by_label(label)?;
        let platform = self.scanner.platform();

        if let Some(path) = service.plist_path() {
            if platform.is_protected(path) {
                return Err(AgentError::Protected {
                    action,
                    target: label.to_string(),
                });
            }
        }

        let target = platform.service_target(service.kind, &service.label);
        call(self.scanner.executor(), &target)
            .map_err(|source| AgentError::from_control(action, label, source))?;

        tracing::info!("{action} {target}");
        Ok(())
    }
}
