//! The fixed table of descriptor directories and launchctl target strings.
//!
//! Every path classification (domain, kind, SIP protection) is a prefix
//! predicate over this one table, so platform differences live here only.
//!
//! # API pattern
//!
//! - [`Platform::detect`]: resolves home via `dirs::home_dir()` and uid via `id -u`.
//! - [`Platform::at`]: explicit home and uid; used in tests with `TempDir`.
//! - [`Platform::with_dirs`]: explicit directory table; used by scanner tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::CoreError;
use crate::types::{Domain, ServiceKind};

/// Root of the SIP-protected tree. Descriptors below it are immutable.
pub const PROTECTED_ROOT: &str = "/System/Library";

pub const GLOBAL_AGENTS_DIR: &str = "/Library/LaunchAgents";
pub const GLOBAL_DAEMONS_DIR: &str = "/Library/LaunchDaemons";
pub const SYSTEM_AGENTS_DIR: &str = "/System/Library/LaunchAgents";
pub const SYSTEM_DAEMONS_DIR: &str = "/System/Library/LaunchDaemons";

/// Descriptor file extension, without the dot.
pub const PLIST_EXTENSION: &str = "plist";

/// A directory that holds descriptor files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlistDir {
    pub path: PathBuf,
    pub domain: Domain,
    pub kind: ServiceKind,
}

impl PlistDir {
    pub fn new(path: impl Into<PathBuf>, domain: Domain, kind: ServiceKind) -> Self {
        Self {
            path: path.into(),
            domain,
            kind,
        }
    }
}

/// `<home>/Library/LaunchAgents`
pub fn user_agents_dir(home: &Path) -> PathBuf {
    home.join("Library").join("LaunchAgents")
}

/// Process-wide platform configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    home: PathBuf,
    uid: u32,
    dirs: Vec<PlistDir>,
    protected: Vec<PathBuf>,
}

impl Platform {
    /// Resolve home and uid for the current process.
    pub fn detect() -> Result<Self, CoreError> {
        let home = dirs::home_dir().ok_or(CoreError::HomeNotFound)?;
        let uid = current_uid()?;
        Ok(Self::at(&home, uid))
    }

    /// The standard macOS table for an explicit home and uid.
    pub fn at(home: &Path, uid: u32) -> Self {
        let dirs = vec![
            PlistDir::new(user_agents_dir(home), Domain::User, ServiceKind::Agent),
            PlistDir::new(GLOBAL_AGENTS_DIR, Domain::Global, ServiceKind::Agent),
            PlistDir::new(GLOBAL_DAEMONS_DIR, Domain::Global, ServiceKind::Daemon),
            PlistDir::new(SYSTEM_AGENTS_DIR, Domain::System, ServiceKind::Agent),
            PlistDir::new(SYSTEM_DAEMONS_DIR, Domain::System, ServiceKind::Daemon),
        ];
        Self {
            home: home.to_path_buf(),
            uid,
            dirs,
            protected: vec![PathBuf::from(PROTECTED_ROOT)],
        }
    }

    /// A custom table. `protected` lists the roots that lifecycle operations
    /// must never touch.
    pub fn with_dirs(home: &Path, uid: u32, dirs: Vec<PlistDir>, protected: Vec<PathBuf>) -> Self {
        Self {
            home: home.to_path_buf(),
            uid,
            dirs,
            protected,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn plist_dirs(&self) -> &[PlistDir] {
        &self.dirs
    }

    pub fn user_agents_dir(&self) -> PathBuf {
        user_agents_dir(&self.home)
    }

    /// True when `path` lies under a protected root (component-wise prefix).
    pub fn is_protected(&self, path: &Path) -> bool {
        self.protected
            .iter()
            .any(|root| path != root.as_path() && path.starts_with(root))
    }

    /// The table entry whose directory contains `path` (longest match).
    pub fn locate(&self, path: &Path) -> Option<&PlistDir> {
        self.dirs
            .iter()
            .filter(|dir| path.starts_with(&dir.path))
            .max_by_key(|dir| dir.path.components().count())
    }

    /// Domain for a descriptor path; unknown locations default to `User`.
    pub fn domain_from_path(&self, path: &Path) -> Domain {
        self.locate(path).map(|dir| dir.domain).unwrap_or_default()
    }

    /// Kind for a descriptor path; unknown locations default to `Agent`.
    pub fn kind_from_path(&self, path: &Path) -> ServiceKind {
        self.locate(path).map(|dir| dir.kind).unwrap_or_default()
    }

    /// `gui/<uid>`
    pub fn gui_domain_target(&self) -> String {
        format!("gui/{}", self.uid)
    }

    /// `system`
    pub fn system_domain_target(&self) -> String {
        "system".to_string()
    }

    /// Domain target for bootstrap: daemons live in `system`, agents in the
    /// caller's GUI session.
    pub fn domain_target(&self, kind: ServiceKind) -> String {
        match kind {
            ServiceKind::Agent => self.gui_domain_target(),
            ServiceKind::Daemon => self.system_domain_target(),
        }
    }

    /// `<domain-target>/<label>`
    pub fn service_target(&self, kind: ServiceKind, label: &str) -> String {
        format!("{}/{label}", self.domain_target(kind))
    }
}

fn current_uid() -> Result<u32, CoreError> {
    let output = Command::new("id")
        .arg("-u")
        .output()
        .map_err(CoreError::UidCommand)?;
    if !output.status.success() {
        return Err(CoreError::Uid(format!(
            "`id -u` exited with status {}",
            output.status
        )));
    }

    let uid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    uid.parse::<u32>()
        .map_err(|_| CoreError::Uid(format!("`id -u` printed '{uid}', expected a number")))
}
