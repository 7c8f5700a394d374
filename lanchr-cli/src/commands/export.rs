//! `lanchr export <label> [file]`: portable JSON bundle.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lanchr_plist::ExportBundle;

use super::{scanner, Output};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Service label.
    pub label: String,

    /// Destination file; stdout when omitted.
    pub file: Option<PathBuf>,
}

impl ExportArgs {
    pub fn run(self, _out: Output) -> Result<()> {
        let service = scanner()?
            .find_by_label(&self.label)
            .with_context(|| format!("failed to find service {:?}", self.label))?;
        let Some(plist_path) = service.plist_path() else {
            anyhow::bail!("service {:?} has no plist on disk; cannot export", self.label);
        };

        let descriptor = lanchr_plist::parse(plist_path)
            .with_context(|| format!("failed to parse plist for {:?}", self.label))?;
        let bundle = ExportBundle::new(
            &service.label,
            descriptor,
            plist_path,
            service.domain,
            service.kind,
        );

        match &self.file {
            Some(file) => {
                bundle
                    .write_file(file)
                    .context("failed to write export bundle")?;
                eprintln!("Exported {} to {}", self.label, file.display());
            }
            None => bundle
                .write_to(std::io::stdout().lock())
                .context("failed to write export bundle")?,
        }
        Ok(())
    }
}
