//! `lanchr edit <label> [--reload]`: open a descriptor in the user's editor.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;

use super::{manager, print_json, ActionResult, Output};

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Service label, e.g. `com.example.agent`.
    pub label: String,

    /// Bootout and bootstrap the service after editing.
    #[arg(long)]
    pub reload: bool,
}

impl EditArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let manager = manager()?;
        let service = manager
            .scanner()
            .find_by_label(&self.label)
            .with_context(|| format!("failed to find service {:?}", self.label))?;

        let Some(path) = service.plist_path() else {
            bail!("service {:?} has no plist on disk", self.label);
        };
        if manager.scanner().platform().is_protected(path) {
            bail!("cannot edit {:?}: service is SIP-protected", self.label);
        }

        let (program, args) = editor_command(
            std::env::var("VISUAL").ok(),
            std::env::var("EDITOR").ok(),
        );
        tracing::debug!("opening {} with {program}", path.display());
        let status = Command::new(&program)
            .args(&args)
            .arg(path)
            .status()
            .with_context(|| format!("failed to run editor {program:?}"))?;
        if !status.success() {
            bail!("editor {program:?} exited with {status}");
        }

        let lint = lint(path);
        if !out.json {
            match &lint {
                Ok(()) => println!("Plist validation passed."),
                Err(problems) => println!("Warning: plist validation failed:\n{problems}"),
            }
        }

        if self.reload {
            if !out.json {
                println!("Reloading {}...", self.label);
            }
            if let Err(err) = manager.unload(&self.label) {
                tracing::debug!("unload before reload failed: {err}");
            }
            manager.load(path).context("failed to reload service")?;
            if !out.json {
                println!("Service reloaded.");
            }
        }

        if out.json {
            let mut result = ActionResult::new("edit", self.label.as_str());
            result.plist_path = Some(path.to_path_buf());
            result.loaded = Some(self.reload);
            result.ok = lint.is_ok();
            return print_json(&result);
        }
        Ok(())
    }
}

/// `$VISUAL`, then `$EDITOR`, then `vi`. The value may carry its own flags,
/// e.g. `code --wait`.
fn editor_command(visual: Option<String>, editor: Option<String>) -> (String, Vec<String>) {
    let chosen = [visual, editor]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string());

    let mut words = chosen.split_whitespace().map(str::to_string);
    let program = words.next().unwrap_or_else(|| "vi".to_string());
    (program, words.collect())
}

/// Decode and validate the edited file, describing every problem found.
fn lint(path: &Path) -> Result<(), String> {
    let descriptor = lanchr_plist::parse(path).map_err(|err| err.to_string())?;
    let problems = lanchr_plist::validate(&descriptor);
    if problems.is_empty() {
        return Ok(());
    }
    Err(problems
        .iter()
        .map(|problem| format!("  {problem}"))
        .collect::<Vec<_>>()
        .join("\n"))
}
