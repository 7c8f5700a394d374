//! Service discovery: descriptor files correlated with live launchd state.
//!
//! ## Scan order
//!
//! 1. Enumerate `*.plist` files in every directory of the [`Platform`] table.
//! 2. Parse them on a bounded rayon pool, one job per file.
//! 3. `launchctl list` (fatal on failure).
//! 4. `print-disabled` for `gui/<uid>` and `system` (best effort).
//! 5. Merge, keyed by label. Descriptors are visited in path order so the
//!    lexicographically first file wins a duplicated label.
//! 6. Live labels with no descriptor become user agents without a plist.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::thread;

use rayon::prelude::*;

use lanchr_core::platform::PLIST_EXTENSION;
use lanchr_core::{Domain, Platform, PlistDir, Service, ServiceKind, ShadowedDescriptor};
use lanchr_launchctl::{Executor, ListEntry};
use lanchr_plist::{Descriptor, PlistError};

use crate::error::AgentError;

/// A descriptor file that could not be decoded. It is left out of the
/// inventory; the rest of the scan proceeds.
#[derive(Debug)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub error: PlistError,
}

/// Inventory plus the files that were skipped.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub services: Vec<Service>,
    pub parse_failures: Vec<ParseFailure>,
}

/// Discovers services across every descriptor directory.
pub struct Scanner<E> {
    platform: Platform,
    executor: E,
}

impl<E: Executor> Scanner<E> {
    pub fn new(platform: Platform, executor: E) -> Self {
        Self { platform, executor }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Every known service. Fails only when the live list cannot be read.
    pub fn scan_all(&self) -> Result<Vec<Service>, AgentError> {
        Ok(self.scan_report()?.services)
    }

    /// Like [`Scanner::scan_all`], also returning per-file parse failures.
    pub fn scan_report(&self) -> Result<ScanReport, AgentError> {
        let jobs = discover(&self.platform);
        let parsed = parse_all(jobs);

        let live = self.executor.list().map_err(AgentError::Scan)?;
        let disabled = self.disabled_labels();

        let report = merge(parsed, live, &disabled);
        tracing::debug!(
            services = report.services.len(),
            failures = report.parse_failures.len(),
            "scan complete"
        );
        Ok(report)
    }

    /// Services found in one domain. Descriptor-less services count as `user`.
    pub fn scan_domain(&self, domain: Domain) -> Result<Vec<Service>, AgentError> {
        let mut services = self.scan_all()?;
        services.retain(|service| service.domain == domain);
        Ok(services)
    }

    /// Rescan and return the service with exactly this label.
    pub fn find_by_label(&self, label: &str) -> Result<Service, AgentError> {
        self.scan_all()?
            .into_iter()
            .find(|service| service.label == label)
            .ok_or_else(|| AgentError::NotFound {
                label: label.to_string(),
            })
    }

    /// Labels disabled in either the GUI or the system domain.
    fn disabled_labels(&self) -> HashSet<String> {
        let targets = [
            self.platform.gui_domain_target(),
            self.platform.system_domain_target(),
        ];
        targets
            .iter()
            .flat_map(|target| self.executor.print_disabled(target))
            .filter(|(_, disabled)| *disabled)
            .map(|(label, _)| label)
            .collect()
    }
}

// ---- discovery ----

#[derive(Debug, Clone)]
struct ParseJob {
    path: PathBuf,
    domain: Domain,
    kind: ServiceKind,
}

struct Parsed {
    job: ParseJob,
    result: Result<Descriptor, PlistError>,
}

fn discover(platform: &Platform) -> Vec<ParseJob> {
    platform.plist_dirs().iter().flat_map(list_dir).collect()
}

fn list_dir(dir: &PlistDir) -> Vec<ParseJob> {
    let entries = match std::fs::read_dir(&dir.path) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("skipping {}: {err}", dir.path.display());
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == PLIST_EXTENSION))
        .map(|path| ParseJob {
            path,
            domain: dir.domain,
            kind: dir.kind,
        })
        .collect()
}

// ---- parse phase ----

fn worker_count(jobs: usize) -> usize {
    let cores = thread::available_parallelism().map_or(1, |n| n.get());
    cores.min(jobs).max(1)
}

fn parse_one(job: &ParseJob) -> Parsed {
    Parsed {
        job: job.clone(),
        result: lanchr_plist::parse(&job.path),
    }
}

/// Parse every job on a bounded pool, returning results sorted by path.
fn parse_all(jobs: Vec<ParseJob>) -> Vec<Parsed> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let workers = worker_count(jobs.len());
    let mut parsed: Vec<Parsed> = match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|idx| format!("lanchr-parse-{idx}"))
        .build()
    {
        Ok(pool) => pool.install(|| jobs.par_iter().map(parse_one).collect()),
        Err(err) => {
            tracing::debug!("parse pool unavailable, parsing inline: {err}");
            jobs.iter().map(parse_one).collect()
        }
    };

    parsed.sort_by(|a, b| a.job.path.cmp(&b.job.path));
    parsed
}

// ---- merge ----

fn merge(parsed: Vec<Parsed>, live: Vec<ListEntry>, disabled: &HashSet<String>) -> ScanReport {
    let live: HashMap<String, ListEntry> = live
        .into_iter()
        .map(|entry| (entry.label.clone(), entry))
        .collect();

    let mut report = ScanReport::default();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for Parsed { job, result } in parsed {
        let descriptor = match result {
            Ok(descriptor) => descriptor,
            Err(error) => {
                tracing::warn!("skipping unparseable descriptor {}: {error}", job.path.display());
                report.parse_failures.push(ParseFailure {
                    path: job.path,
                    error,
                });
                continue;
            }
        };

        let label = effective_label(&descriptor, &job.path);
        if let Some(&index) = by_label.get(&label) {
            report.services[index]
                .shadowed
                .push(shadowed(job.path, &descriptor));
            continue;
        }

        let mut service = from_descriptor(label, &job, descriptor);
        let (pid, status) = live
            .get(&service.label)
            .map_or((-1, 0), |entry| (entry.pid, entry.status));
        service.apply_runtime(pid, status, disabled.contains(&service.label));

        by_label.insert(service.label.clone(), report.services.len());
        report.services.push(service);
    }

    let mut orphans: Vec<&ListEntry> = live
        .values()
        .filter(|entry| !by_label.contains_key(&entry.label))
        .collect();
    orphans.sort_by(|a, b| a.label.cmp(&b.label));

    for entry in orphans {
        let mut service = Service::new(entry.label.clone(), Domain::User, ServiceKind::Agent);
        service.apply_runtime(entry.pid, entry.status, disabled.contains(&entry.label));
        report.services.push(service);
    }

    report
}

/// The descriptor's `Label`, else the file stem.
fn effective_label(descriptor: &Descriptor, path: &Path) -> String {
    match descriptor.label() {
        Some(label) => label.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn shadowed(path: PathBuf, descriptor: &Descriptor) -> ShadowedDescriptor {
    ShadowedDescriptor {
        path,
        declared_label: descriptor.label().map(str::to_string),
        program: descriptor.program_path().map(str::to_string),
        standard_out_path: descriptor.standard_out_path.clone(),
        standard_error_path: descriptor.standard_error_path.clone(),
    }
}

fn from_descriptor(label: String, job: &ParseJob, descriptor: Descriptor) -> Service {
    let mut service = Service::new(label, job.domain, job.kind);
    service.plist_path = Some(job.path.clone());
    service.declared_label = descriptor.label().map(str::to_string);
    service.calendar_intervals = descriptor
        .start_calendar_interval
        .as_ref()
        .map(|schedule| schedule.intervals())
        .unwrap_or_default();
    service.mach_services = descriptor.mach_services.keys().cloned().collect();
    service.sockets = descriptor.sockets.keys().cloned().collect();

    service.program = descriptor.program;
    service.program_arguments = descriptor.program_arguments;
    service.run_at_load = descriptor.run_at_load;
    service.keep_alive = descriptor.keep_alive;
    service.start_interval = descriptor.start_interval;
    service.watch_paths = descriptor.watch_paths;
    service.queue_directories = descriptor.queue_directories;
    service.standard_out_path = descriptor.standard_out_path;
    service.standard_error_path = descriptor.standard_error_path;
    service.working_directory = descriptor.working_directory;
    service.environment = descriptor.environment_variables;
    service.user_name = descriptor.user_name;
    service.group_name = descriptor.group_name;
    service.disabled = descriptor.disabled;
    service.exit_timeout = descriptor.exit_timeout;
    service.throttle_interval = descriptor.throttle_interval;
    service.nice = descriptor.nice;
    service.process_type = descriptor.process_type;
    service
}
