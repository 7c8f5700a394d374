#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use assert_fs::prelude::*;
use assert_fs::TempDir;

use lanchr_core::{Domain, Platform, PlistDir, ServiceKind};
use lanchr_launchctl::{Executor, LaunchctlError, ListEntry, ServiceInfo};

pub const UID: u32 = 501;

/// In-memory service manager that records every call.
#[derive(Default)]
pub struct FakeExecutor {
    pub live: Vec<ListEntry>,
    pub list_fails: bool,
    pub disabled: HashMap<String, HashMap<String, bool>>,
    pub info: Option<ServiceInfo>,
    pub blame: Option<String>,
    pub control_stderr: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeExecutor {
    pub fn with_live(entries: &[(&str, i64, i64)]) -> Self {
        Self {
            live: entries
                .iter()
                .map(|(label, pid, status)| ListEntry {
                    pid: *pid,
                    status: *status,
                    label: label.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn disable_in(mut self, domain: &str, label: &str) -> Self {
        self.disabled
            .entry(domain.to_string())
            .or_default()
            .insert(label.to_string(), true);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Calls that change state; reads are excluded.
    pub fn control_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !call.starts_with("list")
                    && !call.starts_with("print")
                    && !call.starts_with("blame")
            })
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }

    fn control(&self, call: String) -> Result<(), LaunchctlError> {
        self.record(call.clone());
        match &self.control_stderr {
            Some(stderr) => Err(LaunchctlError::Failed {
                command: format!("launchctl {call}"),
                code: Some(1),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Executor for FakeExecutor {
    fn list(&self) -> Result<Vec<ListEntry>, LaunchctlError> {
        self.record("list".to_string());
        if self.list_fails {
            return Err(LaunchctlError::Unsupported);
        }
        Ok(self.live.clone())
    }

    fn print_service(&self, service_target: &str) -> Result<ServiceInfo, LaunchctlError> {
        self.record(format!("print {service_target}"));
        self.info.clone().ok_or(LaunchctlError::Unsupported)
    }

    fn print_disabled(&self, domain_target: &str) -> HashMap<String, bool> {
        self.record(format!("print-disabled {domain_target}"));
        self.disabled.get(domain_target).cloned().unwrap_or_default()
    }

    fn blame(&self, service_target: &str) -> Result<String, LaunchctlError> {
        self.record(format!("blame {service_target}"));
        self.blame.clone().ok_or(LaunchctlError::Unsupported)
    }

    fn enable(&self, service_target: &str) -> Result<(), LaunchctlError> {
        self.control(format!("enable {service_target}"))
    }

    fn disable(&self, service_target: &str) -> Result<(), LaunchctlError> {
        self.control(format!("disable {service_target}"))
    }

    fn bootstrap(&self, domain_target: &str, plist_path: &Path) -> Result<(), LaunchctlError> {
        self.control(format!("bootstrap {domain_target} {}", plist_path.display()))
    }

    fn bootout(&self, service_target: &str) -> Result<(), LaunchctlError> {
        self.control(format!("bootout {service_target}"))
    }

    fn kickstart(&self, service_target: &str, kill: bool) -> Result<(), LaunchctlError> {
        let flag = if kill { "-kp" } else { "-p" };
        self.control(format!("kickstart {flag} {service_target}"))
    }

    fn kill(&self, signal: &str, service_target: &str) -> Result<(), LaunchctlError> {
        self.control(format!("kill {signal} {service_target}"))
    }
}

/// A fake machine: user agents, global daemons, and a protected system tree
/// all rooted in one temp directory.
pub struct Fixture {
    pub root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        for dir in [
            "home/Library/LaunchAgents",
            "Library/LaunchDaemons",
            "System/Library/LaunchDaemons",
        ] {
            root.child(dir).create_dir_all().expect("mkdir");
        }
        Self { root }
    }

    pub fn user_agents(&self) -> PathBuf {
        self.root.path().join("home/Library/LaunchAgents")
    }

    pub fn global_daemons(&self) -> PathBuf {
        self.root.path().join("Library/LaunchDaemons")
    }

    pub fn system_daemons(&self) -> PathBuf {
        self.root.path().join("System/Library/LaunchDaemons")
    }

    pub fn platform(&self) -> Platform {
        Platform::with_dirs(
            &self.root.path().join("home"),
            UID,
            vec![
                PlistDir::new(self.user_agents(), Domain::User, ServiceKind::Agent),
                PlistDir::new(self.global_daemons(), Domain::Global, ServiceKind::Daemon),
                PlistDir::new(self.system_daemons(), Domain::System, ServiceKind::Daemon),
            ],
            vec![self.root.path().join("System/Library")],
        )
    }

    /// Write a descriptor with the given inner `<dict>` body.
    pub fn write(&self, dir: &Path, file: &str, body: &str) -> PathBuf {
        let path = dir.join(file);
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\">\n<dict>\n{body}\n</dict>\n</plist>\n"
        );
        std::fs::write(&path, xml).expect("write descriptor");
        path
    }

    pub fn write_labelled(&self, dir: &Path, file: &str, label: &str) -> PathBuf {
        self.write(
            dir,
            file,
            &format!(
                "<key>Label</key><string>{label}</string>\n\
                 <key>ProgramArguments</key><array><string>/bin/sh</string></array>"
            ),
        )
    }
}
