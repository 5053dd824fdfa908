//! smartcommit - CLI entry point.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use smartcommit::config::{env_api_key, ConfigStore};
use smartcommit::git::{GitRepository, DEFAULT_HISTORY_COUNT};
use smartcommit::session::{Session, State, TaskRunner};
use smartcommit::tui;

/// Interactively write a Conventional Commits message for the staged changes.
#[derive(Parser, Debug)]
#[command(name = "smartcommit")]
#[command(about = "Write a Conventional Commits message for your staged changes with AI help")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    /// (defaults to ~/.config/smartcommit/config.json)
    #[arg(long, env = "SMARTCOMMIT_CONFIG")]
    config: Option<PathBuf>,

    /// Append debug logs to this file (the terminal is busy with the interface)
    #[arg(long, env = "SMARTCOMMIT_LOG")]
    log_file: Option<PathBuf>,

    /// Number of recent commits given to the model as context
    #[arg(long, default_value_t = DEFAULT_HISTORY_COUNT)]
    history: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let store = match cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location().context("Failed to locate config file")?,
    };
    tracing::debug!("Using config at {}", store.path().display());

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let repo = Arc::new(GitRepository::new(cwd));
    let api_key = env_api_key();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let runner = TaskRunner::new(store, repo, api_key.clone(), cli.history);
    let session = Session::new(api_key);

    let result = tui::run(session, runner, runtime.handle());
    runtime.shutdown_background();
    let session = result.context("Terminal interface failed")?;

    Ok(report(&session))
}

/// Print the final outcome once the terminal is restored.
fn report(session: &Session) -> ExitCode {
    match session.state() {
        State::Success => {
            println!("Successfully committed!");
            ExitCode::SUCCESS
        }
        State::Error => {
            if let Some(err) = session.error() {
                eprintln!("Error: {err}");
                if let Some(fix) = err.remediation() {
                    eprintln!("To fix it, run: {fix}");
                }
            }
            ExitCode::FAILURE
        }
        _ => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "smartcommit=debug".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
