//! `lanchr info <label>`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use lanchr_core::Service;

use super::{manager, print_json, Output};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Service label, e.g. `com.example.agent`.
    pub label: String,
}

impl InfoArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let service = manager()?
            .info(&self.label)
            .with_context(|| format!("failed to get info for {:?}", self.label))?;

        if out.json {
            return print_json(&service);
        }
        print_fields(&service);
        Ok(())
    }
}

fn print_fields(s: &Service) {
    let none = || "(none)".to_string();
    let field = |name: &str, value: String| {
        println!("{:<22} {}", format!("{name}:").bold(), value);
    };

    field("Label", s.label.clone());
    field("Domain", s.domain.to_string());
    field("Type", s.kind.to_string());
    field("State", s.status.to_string());
    field(
        "PID",
        if s.is_running() {
            s.pid.to_string()
        } else {
            "-".to_string()
        },
    );
    if let Some(path) = s.plist_path() {
        field("Plist Path", path.display().to_string());
    }
    if let Some(program) = &s.program {
        field("Program", program.clone());
    }
    field(
        "Arguments",
        if s.program_arguments.is_empty() {
            none()
        } else {
            s.program_arguments.join(" ")
        },
    );
    field("Run At Load", s.run_at_load.to_string());
    field(
        "Keep Alive",
        s.keep_alive.as_ref().map_or_else(none, ToString::to_string),
    );
    field(
        "Start Interval",
        s.start_interval.map_or_else(none, |secs| format!("{secs}s")),
    );
    if !s.calendar_intervals.is_empty() {
        let schedule: Vec<String> = s
            .calendar_intervals
            .iter()
            .map(|c| {
                let part = |v: Option<i64>| v.map_or_else(|| "*".to_string(), |n| n.to_string());
                format!(
                    "{} {} {} {} {}",
                    part(c.minute),
                    part(c.hour),
                    part(c.day),
                    part(c.month),
                    part(c.weekday)
                )
            })
            .collect();
        field("Calendar", schedule.join(", "));
    }
    field(
        "Watch Paths",
        if s.watch_paths.is_empty() {
            none()
        } else {
            s.watch_paths.join(", ")
        },
    );
    field(
        "Working Directory",
        s.working_directory.clone().unwrap_or_else(none),
    );
    field("Stdout Path", s.standard_out_path.clone().unwrap_or_else(none));
    field("Stderr Path", s.standard_error_path.clone().unwrap_or_else(none));
    if !s.environment.is_empty() {
        let env: Vec<String> = s
            .environment
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        field("Environment", env.join(", "));
    }
    if let Some(user) = &s.user_name {
        field("User", user.clone());
    }
    if let Some(timeout) = s.exit_timeout {
        field("Exit Timeout", format!("{timeout}s"));
    }
    if !s.mach_services.is_empty() {
        field("Mach Services", join(&s.mach_services));
    }
    if !s.sockets.is_empty() {
        field("Sockets", join(&s.sockets));
    }
    field("Last Exit Code", s.last_exit_status.to_string());
    field("Disabled", s.disabled.to_string());
    if let Some(blame) = &s.blame {
        field("Blame", blame.clone());
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
