//! Health checks over the service inventory.
//!
//! | Check                  | Severity |
//! |------------------------|----------|
//! | missing binary         | critical |
//! | world-writable plist   | warning  |
//! | duplicate label        | warning  |
//! | filename/label mismatch| warning  |
//! | crashed (exit != 0)    | critical |
//! | missing log directory  | warning  |
//! | missing `Label` key    | critical |
//!
//! File checks run over every descriptor behind a service, including the
//! ones that lost a duplicate-label tie-break. None of them can abort the run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use lanchr_core::Service;
use lanchr_launchctl::Executor;

use crate::error::AgentError;
use crate::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    pub fn indicator(self) -> &'static str {
        match self {
            Severity::Critical => "[!]",
            Severity::Warning => "[~]",
            Severity::Ok => "[ok]",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        })
    }
}

/// One diagnostic result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plist_path: Option<PathBuf>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    fn new(severity: Severity, service: &Service, message: String, suggestion: String) -> Self {
        Self {
            severity,
            label: service.label.clone(),
            plist_path: service.plist_path.clone(),
            message,
            suggestion: Some(suggestion),
        }
    }

    fn for_file(
        severity: Severity,
        file: &DescriptorFile<'_>,
        message: String,
        suggestion: String,
    ) -> Self {
        Self {
            severity,
            label: file.label.to_string(),
            plist_path: file.path.map(Path::to_path_buf),
            message,
            suggestion: Some(suggestion),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub ok: usize,
}

pub struct Doctor<'a, E> {
    scanner: &'a Scanner<E>,
}

impl<'a, E: Executor> Doctor<'a, E> {
    pub fn new(scanner: &'a Scanner<E>) -> Self {
        Self { scanner }
    }

    /// Scan, then run every check. Critical findings first.
    pub fn check(&self) -> Result<Vec<Finding>, AgentError> {
        let services = self.scanner.scan_all()?;
        Ok(diagnose(&services))
    }
}

/// The per-file view of a service: the winning record, or one of the
/// descriptors it shadowed.
struct DescriptorFile<'a> {
    label: &'a str,
    path: Option<&'a Path>,
    declared_label: Option<&'a str>,
    binary: Option<&'a str>,
    standard_out_path: Option<&'a str>,
    standard_error_path: Option<&'a str>,
}

fn descriptor_files(service: &Service) -> Vec<DescriptorFile<'_>> {
    let primary = DescriptorFile {
        label: &service.label,
        path: service.plist_path(),
        declared_label: service.declared_label.as_deref(),
        binary: service.binary_path(),
        standard_out_path: service.standard_out_path.as_deref(),
        standard_error_path: service.standard_error_path.as_deref(),
    };
    std::iter::once(primary)
        .chain(service.shadowed.iter().map(|shadow| DescriptorFile {
            label: &service.label,
            path: Some(shadow.path.as_path()),
            declared_label: shadow.declared_label.as_deref(),
            binary: shadow.program.as_deref(),
            standard_out_path: shadow.standard_out_path.as_deref(),
            standard_error_path: shadow.standard_error_path.as_deref(),
        }))
        .collect()
}

/// Run every check over `services`, sorted by severity (stable).
pub fn diagnose(services: &[Service]) -> Vec<Finding> {
    let file_checks: [fn(&DescriptorFile<'_>) -> Vec<Finding>; 5] = [
        missing_binary,
        insecure_permissions,
        filename_mismatch,
        stale_log_dirs,
        missing_label,
    ];
    let service_checks: [fn(&Service) -> Vec<Finding>; 2] = [duplicate_label, crashed];

    let mut findings: Vec<Finding> = Vec::new();
    for service in services {
        for file in descriptor_files(service) {
            findings.extend(file_checks.iter().flat_map(|check| check(&file)));
        }
        findings.extend(service_checks.iter().flat_map(|check| check(service)));
    }
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    findings
}

pub fn count_by_severity(findings: &[Finding]) -> SeverityCounts {
    findings
        .iter()
        .fold(SeverityCounts::default(), |mut counts, finding| {
            match finding.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Ok => counts.ok += 1,
            }
            counts
        })
}

// ---- per-file checks ----

fn missing_binary(file: &DescriptorFile<'_>) -> Vec<Finding> {
    match file.binary {
        Some(binary) if !Path::new(binary).exists() => vec![Finding::for_file(
            Severity::Critical,
            file,
            format!("binary not found at {binary}"),
            "Remove or update the plist to point to a valid binary".to_string(),
        )],
        _ => Vec::new(),
    }
}

fn insecure_permissions(file: &DescriptorFile<'_>) -> Vec<Finding> {
    let Some(path) = file.path else {
        return Vec::new();
    };
    if !is_world_writable(path) {
        return Vec::new();
    }
    vec![Finding::for_file(
        Severity::Warning,
        file,
        "world-writable plist".to_string(),
        format!("Fix permissions: chmod 644 {}", path.display()),
    )]
}

#[cfg(unix)]
fn is_world_writable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o002 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_world_writable(_path: &Path) -> bool {
    false
}

fn filename_mismatch(file: &DescriptorFile<'_>) -> Vec<Finding> {
    let (Some(path), Some(declared)) = (file.path, file.declared_label) else {
        return Vec::new();
    };
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    if stem == declared {
        return Vec::new();
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    vec![Finding::for_file(
        Severity::Warning,
        file,
        format!("filename {filename:?} does not match label {declared:?}"),
        "Rename the plist to match its Label key".to_string(),
    )]
}

fn stale_log_dirs(file: &DescriptorFile<'_>) -> Vec<Finding> {
    [file.standard_out_path, file.standard_error_path]
        .into_iter()
        .flatten()
        .filter_map(|log| Path::new(log).parent())
        .filter(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .map(|dir| {
            Finding::for_file(
                Severity::Warning,
                file,
                format!("log directory does not exist: {}", dir.display()),
                format!("Create the directory: mkdir -p {}", dir.display()),
            )
        })
        .collect()
}

fn missing_label(file: &DescriptorFile<'_>) -> Vec<Finding> {
    let Some(path) = file.path else {
        return Vec::new();
    };
    if file.declared_label.is_some() {
        return Vec::new();
    }
    vec![Finding::for_file(
        Severity::Critical,
        file,
        "plist missing required Label key".to_string(),
        format!("Add a Label key to {}", path.display()),
    )]
}

// ---- per-service checks ----

fn duplicate_label(service: &Service) -> Vec<Finding> {
    let Some(winner) = service.plist_path() else {
        return Vec::new();
    };
    if service.shadowed.is_empty() {
        return Vec::new();
    }

    let paths: Vec<String> = std::iter::once(winner)
        .chain(service.shadowed.iter().map(|shadow| shadow.path.as_path()))
        .map(|path| path.display().to_string())
        .collect();

    vec![Finding {
        severity: Severity::Warning,
        label: service.label.clone(),
        plist_path: None,
        message: format!(
            "duplicate label found in {} plists: {}",
            paths.len(),
            paths.join(", ")
        ),
        suggestion: Some("Remove duplicate plists or use unique labels".to_string()),
    }]
}

fn crashed(service: &Service) -> Vec<Finding> {
    if service.last_exit_status == 0 || service.is_running() {
        return Vec::new();
    }
    vec![Finding::new(
        Severity::Critical,
        service,
        format!("last exit status: {}", service.last_exit_status),
        "Check logs for the service to diagnose the crash".to_string(),
    )]
}
