//! The checks that run before the interview can start.

use tracing::{debug, info};

use crate::config::{ConfigStore, Readiness};
use crate::error::{GitError, SessionError};
use crate::git::Repository;

use super::event::Outcome;

/// Staged diffs longer than this many characters are not sent to a backend.
pub const MAX_DIFF_CHARS: usize = 40_000;

/// Load configuration, then inspect the repository.
///
/// In order: incomplete configuration → [`Outcome::SetupRequired`]; `git`
/// missing → failure; not in a work tree → [`Outcome::NoRepo`]; nothing
/// staged → failure; oversized diff → [`Outcome::DiffTooLarge`]; otherwise
/// [`Outcome::Ready`] with the diff and the last `history_count` commits.
pub fn check_prerequisites(
    store: &ConfigStore,
    repo: &dyn Repository,
    env_api_key: Option<&str>,
    history_count: usize,
) -> Outcome {
    run_checks(store, repo, env_api_key, history_count).unwrap_or_else(Outcome::Failed)
}

fn run_checks(
    store: &ConfigStore,
    repo: &dyn Repository,
    env_api_key: Option<&str>,
    history_count: usize,
) -> Result<Outcome, SessionError> {
    let config = store.load()?;
    if let Readiness::NeedsSetup(step) = config.readiness(env_api_key) {
        info!(?step, "Configuration incomplete, starting setup");
        return Ok(Outcome::SetupRequired { config, step });
    }

    repo.check_installed()?;

    if !repo.is_inside_repository() {
        return Ok(Outcome::NoRepo);
    }

    let diff = repo.staged_diff()?;
    if diff.trim().is_empty() {
        return Err(GitError::NothingStaged.into());
    }

    let chars = diff.chars().count();
    if chars > MAX_DIFF_CHARS {
        info!(chars, limit = MAX_DIFF_CHARS, "Staged diff too large for analysis");
        return Ok(Outcome::DiffTooLarge { config, chars });
    }

    let history = repo.recent_history(history_count)?;
    debug!(chars, history_chars = history.len(), "Prerequisites satisfied");

    Ok(Outcome::Ready {
        config,
        diff,
        history,
    })
}
