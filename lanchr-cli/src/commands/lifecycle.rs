//! `lanchr enable|disable|restart|unload <label>` and `lanchr load <path>`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use lanchr_agent::Action;

use super::{manager, print_json, ActionResult, Output};

#[derive(Args, Debug)]
pub struct LabelArgs {
    /// Service label, e.g. `com.example.agent`.
    pub label: String,
}

impl LabelArgs {
    pub fn run(self, action: Action, out: Output) -> Result<()> {
        let manager = manager()?;
        match action {
            Action::Enable => manager.enable(&self.label)?,
            Action::Disable => manager.disable(&self.label)?,
            Action::Restart => manager.restart(&self.label)?,
            Action::Unload => manager.unload(&self.label)?,
            Action::Load => anyhow::bail!("load takes a descriptor path"),
        }

        if out.json {
            return print_json(&ActionResult::new(action.as_str(), self.label));
        }
        println!("{} {}", past_tense(action), self.label);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Path to the descriptor to bootstrap.
    pub path: PathBuf,
}

impl LoadArgs {
    pub fn run(self, out: Output) -> Result<()> {
        manager()?.load(&self.path)?;

        if out.json {
            let mut result = ActionResult::new("load", self.path.display().to_string());
            result.plist_path = Some(self.path);
            return print_json(&result);
        }
        println!("Loaded {}", self.path.display());
        Ok(())
    }
}

fn past_tense(action: Action) -> &'static str {
    match action {
        Action::Enable => "Enabled",
        Action::Disable => "Disabled",
        Action::Restart => "Restarted",
        Action::Load => "Loaded",
        Action::Unload => "Unloaded",
    }
}
