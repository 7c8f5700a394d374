//! `lanchr list`: the inventory as a table or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use lanchr_core::{Domain, Service, ServiceKind, Status};

use super::{print_json, scanner, truncate, Output};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only services from this domain.
    #[arg(short, long, value_enum)]
    pub domain: Option<DomainFilter>,

    /// Only services in this state.
    #[arg(short, long, value_enum)]
    pub status: Option<StatusFilter>,

    /// Only agents or only daemons.
    #[arg(short = 't', long = "type", value_enum)]
    pub kind: Option<KindFilter>,

    /// Hide com.apple.* services.
    #[arg(long)]
    pub no_apple: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DomainFilter {
    User,
    Global,
    System,
}

impl From<DomainFilter> for Domain {
    fn from(filter: DomainFilter) -> Self {
        match filter {
            DomainFilter::User => Domain::User,
            DomainFilter::Global => Domain::Global,
            DomainFilter::System => Domain::System,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Running,
    Stopped,
    Error,
    Disabled,
}

impl From<StatusFilter> for Status {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Running => Status::Running,
            StatusFilter::Stopped => Status::Stopped,
            StatusFilter::Error => Status::Error,
            StatusFilter::Disabled => Status::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindFilter {
    Agent,
    Daemon,
}

impl From<KindFilter> for ServiceKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Agent => ServiceKind::Agent,
            KindFilter::Daemon => ServiceKind::Daemon,
        }
    }
}

impl ListArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let services = scanner()?.scan_all().context("failed to scan services")?;
        let mut services: Vec<Service> = services.into_iter().filter(|s| self.keeps(s)).collect();
        services.sort_by(|a, b| a.label.cmp(&b.label));

        if out.json {
            return print_services_json(&services);
        }
        print_services_table(&services);
        Ok(())
    }

    fn keeps(&self, service: &Service) -> bool {
        self.domain.map_or(true, |d| service.domain == Domain::from(d))
            && self.status.map_or(true, |s| service.status == Status::from(s))
            && self.kind.map_or(true, |k| service.kind == ServiceKind::from(k))
            && !(self.no_apple && service.is_apple())
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "")]
    indicator: String,
    #[tabled(rename = "pid")]
    pid: String,
    #[tabled(rename = "label")]
    label: String,
    #[tabled(rename = "domain")]
    domain: String,
    #[tabled(rename = "binary")]
    binary: String,
}

#[derive(Serialize)]
struct ServiceJson<'a> {
    label: &'a str,
    domain: Domain,
    #[serde(rename = "type")]
    kind: ServiceKind,
    status: Status,
    pid: i64,
    last_exit_status: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    plist_path: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<&'a str>,
}

pub fn print_services_json(services: &[Service]) -> Result<()> {
    let rows: Vec<ServiceJson<'_>> = services
        .iter()
        .map(|s| ServiceJson {
            label: &s.label,
            domain: s.domain,
            kind: s.kind,
            status: s.status,
            pid: s.pid,
            last_exit_status: s.last_exit_status,
            plist_path: s.plist_path.as_ref(),
            program: s.binary_path(),
        })
        .collect();
    print_json(&rows)
}

pub fn print_services_table(services: &[Service]) {
    if services.is_empty() {
        println!("No services found.");
        return;
    }

    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|s| ServiceRow {
            indicator: status_indicator(s.status),
            pid: if s.is_running() {
                s.pid.to_string()
            } else {
                "-".to_string()
            },
            label: truncate(&s.label, 42),
            domain: s.domain.to_string(),
            binary: truncate(s.binary_path().unwrap_or(""), 50),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} running  {} stopped  {} error  {} disabled",
        status_indicator(Status::Running),
        status_indicator(Status::Stopped),
        status_indicator(Status::Error),
        status_indicator(Status::Disabled),
    );
}

fn status_indicator(status: Status) -> String {
    let mark = status.indicator().to_string();
    match status {
        Status::Running => mark.green().bold().to_string(),
        Status::Stopped => mark.bright_black().to_string(),
        Status::Error => mark.red().bold().to_string(),
        Status::Disabled => mark.yellow().to_string(),
    }
}
