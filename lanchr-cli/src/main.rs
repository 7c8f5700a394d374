//! lanchr: inspect, manage, and diagnose macOS launch agents and daemons.
//!
//! # Usage
//!
//! ```text
//! lanchr list [--domain user|global|system] [--status ...] [--type agent|daemon] [--no-apple]
//! lanchr info <label>
//! lanchr search <query> [--regex | --path]
//! lanchr enable|disable|restart|unload <label>
//! lanchr load <path>
//! lanchr doctor
//! lanchr edit <label> [--reload]
//! lanchr create --label <label> --program <path> [--template <name>] [...]
//! lanchr export <label> [file]
//! lanchr import <file> [--load]
//! ```
//!
//! Every command accepts `--json` and `--verbose`.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use commands::{
    create::CreateArgs,
    doctor::DoctorArgs,
    edit::EditArgs,
    export::ExportArgs,
    import::ImportArgs,
    info::InfoArgs,
    lifecycle::{LabelArgs, LoadArgs},
    list::ListArgs,
    search::SearchArgs,
    Output,
};
use lanchr_agent::{Action, AgentError};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "lanchr",
    version,
    about = "Inspect, manage, and diagnose macOS launch agents and daemons",
    long_about = None,
)]
struct Cli {
    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print a shell completion script and exit.
    #[arg(long, hide = true, value_enum, value_name = "SHELL")]
    generate_completion: Option<CompletionShell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => clap_complete::Shell::Bash,
            CompletionShell::Zsh => clap_complete::Shell::Zsh,
            CompletionShell::Fish => clap_complete::Shell::Fish,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all agents and daemons.
    List(ListArgs),

    /// Show descriptor keys and live state for one service.
    Info(InfoArgs),

    /// Search services by label, program, descriptor path, or arguments.
    Search(SearchArgs),

    /// Enable a service.
    Enable(LabelArgs),

    /// Disable a service.
    Disable(LabelArgs),

    /// Kill and restart a service.
    Restart(LabelArgs),

    /// Bootstrap a descriptor into its domain.
    Load(LoadArgs),

    /// Remove a service from its domain.
    Unload(LabelArgs),

    /// Diagnose broken descriptors, missing binaries, and crashed services.
    Doctor(DoctorArgs),

    /// Scaffold a new descriptor.
    Create(CreateArgs),

    /// Open a service's plist in $VISUAL or $EDITOR, then validate it.
    Edit(EditArgs),

    /// Export a service to a portable JSON bundle.
    Export(ExportArgs),

    /// Install a service from an export bundle.
    Import(ImportArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            if let Some(hint) = hint(&err) {
                eprintln!("{} {hint}", "hint:".yellow().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.generate_completion {
        let mut command = Cli::command();
        clap_complete::generate(
            clap_complete::Shell::from(shell),
            &mut command,
            "lanchr",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let out = Output { json: cli.json };
    match command {
        Commands::List(args) => args.run(out),
        Commands::Info(args) => args.run(out),
        Commands::Search(args) => args.run(out),
        Commands::Enable(args) => args.run(Action::Enable, out),
        Commands::Disable(args) => args.run(Action::Disable, out),
        Commands::Restart(args) => args.run(Action::Restart, out),
        Commands::Load(args) => args.run(out),
        Commands::Unload(args) => args.run(Action::Unload, out),
        Commands::Doctor(args) => args.run(out),
        Commands::Create(args) => args.run(out),
        Commands::Edit(args) => args.run(out),
        Commands::Export(args) => args.run(out),
        Commands::Import(args) => args.run(out),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn hint(err: &anyhow::Error) -> Option<String> {
    let agent = err.chain().find_map(|cause| cause.downcast_ref::<AgentError>())?;
    match agent {
        AgentError::PermissionDenied { .. } => {
            Some("re-run with sudo to manage system services".to_string())
        }
        AgentError::NotFound { .. } => {
            Some("run `lanchr list` to see available services".to_string())
        }
        AgentError::Protected { .. } => Some(
            "services under /System/Library are protected by System Integrity Protection"
                .to_string(),
        ),
        _ => None,
    }
}
