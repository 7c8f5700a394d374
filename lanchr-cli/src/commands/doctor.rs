//! `lanchr doctor`: grouped health report.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use lanchr_agent::{count_by_severity, Doctor, Finding, Severity, SeverityCounts};

use super::{print_json, scanner, Output};

#[derive(Args, Debug)]
pub struct DoctorArgs {}

#[derive(Serialize)]
struct DoctorJson<'a> {
    summary: SeverityCounts,
    findings: &'a [Finding],
}

impl DoctorArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let scanner = scanner()?;
        let findings = Doctor::new(&scanner)
            .check()
            .context("failed to run doctor")?;
        let summary = count_by_severity(&findings);

        if out.json {
            return print_json(&DoctorJson {
                summary,
                findings: &findings,
            });
        }

        println!("{}", "DOCTOR REPORT".bold());
        println!("=============");
        println!();
        if findings.is_empty() {
            println!("All services passed health checks.");
            return Ok(());
        }

        print_group(&findings, Severity::Critical, summary.critical);
        print_group(&findings, Severity::Warning, summary.warning);
        println!("Run 'lanchr list' to see all services.");
        Ok(())
    }
}

fn print_group(findings: &[Finding], severity: Severity, count: usize) {
    if count == 0 {
        return;
    }
    let heading = format!("{severity} ({count})");
    let (heading, marker) = match severity {
        Severity::Critical => (heading.red().bold(), severity.indicator().red()),
        _ => (heading.yellow().bold(), severity.indicator().yellow()),
    };
    println!("{heading}");
    for finding in findings.iter().filter(|f| f.severity == severity) {
        println!("  {marker} {}: {}", finding.label.bold(), finding.message);
        if let Some(suggestion) = &finding.suggestion {
            println!("      Suggestion: {suggestion}");
        }
    }
    println!();
}
