//! `lanchr import <file>`: install a bundle as a user agent.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use lanchr_core::platform::user_agents_dir;
use lanchr_plist::{ExportBundle, Validation};

use super::{home_dir, manager, print_json, ActionResult, Output};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Bundle produced by `lanchr export`.
    pub file: PathBuf,

    /// Bootstrap the descriptor after writing it.
    #[arg(long)]
    pub load: bool,
}

impl ImportArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let bundle = ExportBundle::read_file(&self.file).context("failed to read export bundle")?;

        let dir = user_agents_dir(&home_dir()?);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(format!("{}.plist", bundle.label));
        if path.exists() {
            bail!(
                "plist already exists at {}; remove it first or use a different label",
                path.display()
            );
        }

        // The binary may not be installed on this machine yet.
        lanchr_plist::write(&bundle.descriptor(), &path, Validation::LabelOnly)
            .context("failed to write plist")?;

        if self.load {
            if let Err(err) = manager().and_then(|m| Ok(m.load(&path)?)) {
                if !out.json {
                    println!("Imported {} to {}", bundle.label, path.display());
                }
                return Err(err.context("failed to load plist"));
            }
        }

        if out.json {
            let mut result = ActionResult::new("import", bundle.label);
            result.plist_path = Some(path);
            result.loaded = Some(self.load);
            return print_json(&result);
        }
        println!("Imported {} to {}", bundle.label, path.display());
        if self.load {
            println!("Loaded {}", bundle.label);
        }
        Ok(())
    }
}
