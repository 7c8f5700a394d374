//! `lanchr create`: scaffold a descriptor from flags and an optional template.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use lanchr_core::platform::user_agents_dir;
use lanchr_core::KeepAlive;
use lanchr_plist::{
    apply_defaults, parse_calendar_spec, CalendarSchedule, Descriptor, Template, Validation,
};

use super::{home_dir, manager, print_json, ActionResult, Output};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Service label, e.g. `com.example.myagent`.
    #[arg(short, long)]
    pub label: String,

    /// Executable path.
    #[arg(short, long)]
    pub program: String,

    /// Program arguments, comma-separated.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// StartInterval in seconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// StartCalendarInterval as "minute hour day month weekday"; `*` skips a field.
    #[arg(long)]
    pub calendar: Option<String>,

    /// Set RunAtLoad.
    #[arg(long)]
    pub run_at_load: bool,

    /// Set KeepAlive.
    #[arg(long)]
    pub keep_alive: bool,

    /// StandardOutPath (default: /tmp/<label>.stdout.log).
    #[arg(long)]
    pub stdout: Option<String>,

    /// StandardErrorPath (default: /tmp/<label>.stderr.log).
    #[arg(long)]
    pub stderr: Option<String>,

    /// WorkingDirectory.
    #[arg(long)]
    pub working_dir: Option<String>,

    /// Environment variable as KEY=VALUE; repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Built-in template: simple, interval, calendar, keepalive, watcher.
    #[arg(long)]
    pub template: Option<Template>,

    /// Output path (default: ~/Library/LaunchAgents/<label>.plist).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bootstrap the descriptor after writing it.
    #[arg(long)]
    pub load: bool,
}

impl CreateArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let descriptor = self.descriptor()?;
        let path = match &self.output {
            Some(path) => path.clone(),
            None => {
                let dir = user_agents_dir(&home_dir()?);
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                dir.join(format!("{}.plist", self.label))
            }
        };

        lanchr_plist::write(&descriptor, &path, Validation::Full)
            .context("failed to write plist")?;
        if !out.json {
            println!("Created {}", path.display());
        }

        if self.load {
            manager()?.load(&path).context("failed to load plist")?;
            if !out.json {
                println!("Loaded {}", self.label);
            }
        }

        if out.json {
            let mut result = ActionResult::new("create", self.label);
            result.plist_path = Some(path);
            result.loaded = Some(self.load);
            return print_json(&result);
        }
        Ok(())
    }

    /// Template first, then explicit flags on top, then default log paths.
    fn descriptor(&self) -> Result<Descriptor> {
        let mut descriptor = self
            .template
            .map(|template| template.descriptor())
            .unwrap_or_default();

        descriptor.label = Some(self.label.clone());
        descriptor.program = Some(self.program.clone());
        if !self.args.is_empty() {
            descriptor.program_arguments = std::iter::once(self.program.clone())
                .chain(self.args.iter().cloned())
                .collect();
        }
        if let Some(interval) = self.interval {
            descriptor.start_interval = Some(interval);
        }
        if let Some(spec) = &self.calendar {
            let interval = parse_calendar_spec(spec).context("invalid calendar spec")?;
            descriptor.start_calendar_interval = Some(CalendarSchedule::Single(interval));
        }
        if self.run_at_load {
            descriptor.run_at_load = true;
        }
        if self.keep_alive {
            descriptor.keep_alive = Some(KeepAlive::Simple(true));
        }
        if let Some(path) = &self.stdout {
            descriptor.standard_out_path = Some(path.clone());
        }
        if let Some(path) = &self.stderr {
            descriptor.standard_error_path = Some(path.clone());
        }
        if let Some(dir) = &self.working_dir {
            descriptor.working_directory = Some(dir.clone());
        }
        for pair in &self.env {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("invalid --env {pair:?}: expected KEY=VALUE");
            };
            descriptor
                .environment_variables
                .insert(key.to_string(), value.to_string());
        }

        apply_defaults(&mut descriptor);
        Ok(descriptor)
    }
}
