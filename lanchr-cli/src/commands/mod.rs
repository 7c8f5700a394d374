//! Subcommand implementations. Each `XArgs` owns its flags and a `run`.

pub mod create;
pub mod doctor;
pub mod edit;
pub mod export;
pub mod import;
pub mod info;
pub mod lifecycle;
pub mod list;
pub mod search;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use lanchr_agent::{Manager, Scanner};
use lanchr_core::Platform;
use lanchr_launchctl::LaunchctlExecutor;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

pub fn scanner() -> Result<Scanner<LaunchctlExecutor>> {
    let platform = Platform::detect().context("could not determine home directory or uid")?;
    tracing::debug!(
        home = %platform.home().display(),
        uid = platform.uid(),
        "detected platform"
    );
    Ok(Scanner::new(platform, LaunchctlExecutor::new()))
}

pub fn manager() -> Result<Manager<LaunchctlExecutor>> {
    Ok(Manager::new(scanner()?))
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON")?
    );
    Ok(())
}

/// JSON result of a mutating command.
#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub ok: bool,
    pub action: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plist_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded: Option<bool>,
}

impl ActionResult {
    pub fn new(action: &'static str, label: impl Into<String>) -> Self {
        Self {
            ok: true,
            action,
            label: label.into(),
            plist_path: None,
            loaded: None,
        }
    }
}

/// Truncate to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("com.example.very.long.label", 12), "com.examp...");
    }
}
