//! Domain types shared by the scanner, doctor, manager, and presentation.
//!
//! A [`Service`] is an owned, immutable-once-built value: it is produced fresh
//! by every scan and carries no references back into the scanner. Anything
//! that "enriches" a service (see `Manager::info`) returns a new value.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The launchd domain a service belongs to, decided by the directory tree its
/// descriptor was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// `~/Library/LaunchAgents`
    #[default]
    User,
    /// `/Library/LaunchAgents`, `/Library/LaunchDaemons`
    Global,
    /// `/System/Library/LaunchAgents`, `/System/Library/LaunchDaemons`
    System,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::User => write!(f, "user"),
            Domain::Global => write!(f, "global"),
            Domain::System => write!(f, "system"),
        }
    }
}

/// Launch agents run in a user session; launch daemons run system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    #[default]
    Agent,
    Daemon,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Agent => write!(f, "agent"),
            ServiceKind::Daemon => write!(f, "daemon"),
        }
    }
}

/// Computed runtime status of a service.
///
/// Precedence when merging: a live pid wins (`Running`), then a nonzero last
/// exit status (`Error`), then disabled-map membership (`Disabled`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Stopped,
    Running,
    Error,
    Disabled,
}

impl Status {
    /// Single-character marker used in tabular output.
    pub fn indicator(self) -> char {
        match self {
            Status::Running => '*',
            Status::Stopped => '-',
            Status::Error => '!',
            Status::Disabled => 'x',
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Stopped => write!(f, "stopped"),
            Status::Running => write!(f, "running"),
            Status::Error => write!(f, "error"),
            Status::Disabled => write!(f, "disabled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor value types
// ---------------------------------------------------------------------------

/// `KeepAlive` is either a plain boolean or a dictionary of conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeepAlive {
    Simple(bool),
    Conditional(KeepAliveConditions),
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepAlive::Simple(value) => write!(f, "{value}"),
            KeepAlive::Conditional(conditions) => {
                let mut parts = Vec::new();
                if let Some(v) = conditions.successful_exit {
                    parts.push(format!("SuccessfulExit={v}"));
                }
                if let Some(v) = conditions.crashed {
                    parts.push(format!("Crashed={v}"));
                }
                for (path, v) in &conditions.path_state {
                    parts.push(format!("PathState[{path}]={v}"));
                }
                for (job, v) in &conditions.other_job_enabled {
                    parts.push(format!("OtherJobEnabled[{job}]={v}"));
                }
                if parts.is_empty() {
                    write!(f, "{{}}")
                } else {
                    write!(f, "{{{}}}", parts.join(", "))
                }
            }
        }
    }
}

/// Structured `KeepAlive` conditions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeepAliveConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_exit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crashed: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path_state: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other_job_enabled: BTreeMap<String, bool>,
}

/// One `StartCalendarInterval` entry. Unset fields are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalendarInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
}

impl CalendarInterval {
    /// True when every field is a wildcard.
    pub fn is_empty(&self) -> bool {
        self.minute.is_none()
            && self.hour.is_none()
            && self.day.is_none()
            && self.weekday.is_none()
            && self.month.is_none()
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// A descriptor file that lost the duplicate-label tie-break. Keeps the keys
/// the per-file health checks read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ShadowedDescriptor {
    pub path: PathBuf,
    pub declared_label: Option<String>,
    /// Effective binary: `Program`, else the first `ProgramArguments` entry.
    pub program: Option<String>,
    pub standard_out_path: Option<String>,
    pub standard_error_path: Option<String>,
}

/// A launch agent or daemon: descriptor data correlated with live launchd state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    // Identity
    pub label: String,
    pub domain: Domain,
    pub kind: ServiceKind,

    // Runtime
    pub status: Status,
    /// `-1` when not running.
    pub pid: i64,
    pub last_exit_status: i64,

    // Provenance
    /// `None` for services known only to launchd (orphaned or ephemeral).
    pub plist_path: Option<PathBuf>,
    /// The raw `Label` key. `None` when the descriptor omitted it and the
    /// filename stem was substituted.
    pub declared_label: Option<String>,
    /// Other descriptor files that declared the same label, sorted by path.
    /// The inventory keeps one record per label; these lost the tie-break.
    pub shadowed: Vec<ShadowedDescriptor>,

    // Descriptor
    pub program: Option<String>,
    pub program_arguments: Vec<String>,
    pub run_at_load: bool,
    pub keep_alive: Option<KeepAlive>,
    pub start_interval: Option<u64>,
    pub calendar_intervals: Vec<CalendarInterval>,
    pub watch_paths: Vec<String>,
    pub queue_directories: Vec<String>,
    pub standard_out_path: Option<String>,
    pub standard_error_path: Option<String>,
    pub working_directory: Option<String>,
    pub environment: BTreeMap<String, String>,
    pub user_name: Option<String>,
    pub group_name: Option<String>,
    pub disabled: bool,
    pub exit_timeout: Option<u64>,
    pub throttle_interval: Option<u64>,
    pub nice: Option<i64>,
    pub process_type: Option<String>,
    pub mach_services: BTreeSet<String>,
    pub sockets: BTreeSet<String>,

    /// Why launchd started the service. Only set by `Manager::info`.
    pub blame: Option<String>,
}

impl Service {
    /// A service with identity only: stopped, not running, no descriptor.
    pub fn new(label: impl Into<String>, domain: Domain, kind: ServiceKind) -> Self {
        Self {
            label: label.into(),
            domain,
            kind,
            status: Status::Stopped,
            pid: -1,
            last_exit_status: 0,
            plist_path: None,
            declared_label: None,
            shadowed: Vec::new(),
            program: None,
            program_arguments: Vec::new(),
            run_at_load: false,
            keep_alive: None,
            start_interval: None,
            calendar_intervals: Vec::new(),
            watch_paths: Vec::new(),
            queue_directories: Vec::new(),
            standard_out_path: None,
            standard_error_path: None,
            working_directory: None,
            environment: BTreeMap::new(),
            user_name: None,
            group_name: None,
            disabled: false,
            exit_timeout: None,
            throttle_interval: None,
            nice: None,
            process_type: None,
            mach_services: BTreeSet::new(),
            sockets: BTreeSet::new(),
            blame: None,
        }
    }

    /// Label starts with `com.apple.`.
    pub fn is_apple(&self) -> bool {
        self.label.starts_with("com.apple.")
    }

    pub fn has_plist(&self) -> bool {
        self.plist_path.is_some()
    }

    pub fn plist_path(&self) -> Option<&Path> {
        self.plist_path.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.pid > 0
    }

    /// Effective binary: `Program`, else the first `ProgramArguments` entry.
    pub fn binary_path(&self) -> Option<&str> {
        match self.program.as_deref() {
            Some(program) if !program.is_empty() => Some(program),
            _ => self
                .program_arguments
                .first()
                .map(String::as_str)
                .filter(|arg| !arg.is_empty()),
        }
    }

    /// Apply live state using the fixed precedence: pid > 0 → running, else
    /// nonzero exit → error, else disabled → disabled, else stopped.
    pub fn apply_runtime(&mut self, pid: i64, last_exit_status: i64, disabled: bool) {
        self.pid = pid;
        self.last_exit_status = last_exit_status;
        if disabled {
            self.disabled = true;
        }
        self.status = resolve_status(pid, last_exit_status, disabled);
    }
}

/// Status precedence shared by every merge path.
pub fn resolve_status(pid: i64, last_exit_status: i64, disabled: bool) -> Status {
    if pid > 0 {
        Status::Running
    } else if last_exit_status != 0 {
        Status::Error
    } else if disabled {
        Status::Disabled
    } else {
        Status::Stopped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_precedence() {
        assert_eq!(resolve_status(42, 1, true), Status::Running);
        assert_eq!(resolve_status(-1, 78, true), Status::Error);
        assert_eq!(resolve_status(-1, 0, true), Status::Disabled);
        assert_eq!(resolve_status(-1, 0, false), Status::Stopped);
        assert_eq!(resolve_status(0, 0, false), Status::Stopped);
    }

    #[test]
    fn binary_path_prefers_program() {
        let mut svc = Service::new("com.example.a", Domain::User, ServiceKind::Agent);
        assert_eq!(svc.binary_path(), None);

        svc.program_arguments = vec!["/usr/bin/true".into(), "--flag".into()];
        assert_eq!(svc.binary_path(), Some("/usr/bin/true"));

        svc.program = Some("/bin/echo".into());
        assert_eq!(svc.binary_path(), Some("/bin/echo"));
    }

    #[test]
    fn apply_runtime_marks_disabled_even_when_running() {
        let mut svc = Service::new("com.example.a", Domain::User, ServiceKind::Agent);
        svc.apply_runtime(311, 0, true);
        assert_eq!(svc.status, Status::Running);
        assert!(svc.disabled);
    }

    #[test]
    fn display_names() {
        assert_eq!(Domain::Global.to_string(), "global");
        assert_eq!(ServiceKind::Daemon.to_string(), "daemon");
        assert_eq!(Status::Disabled.to_string(), "disabled");
        assert_eq!(Status::Error.indicator(), '!');
    }

    #[test]
    fn keep_alive_display() {
        assert_eq!(KeepAlive::Simple(true).to_string(), "true");
        let conditional = KeepAlive::Conditional(KeepAliveConditions {
            crashed: Some(true),
            ..Default::default()
        });
        assert_eq!(conditional.to_string(), "{Crashed=true}");
    }
}
