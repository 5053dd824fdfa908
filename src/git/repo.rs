//! Repository access behind a trait so the session can be driven by fakes.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// What the interview needs from the repository it runs in.
#[cfg_attr(test, mockall::automock)]
pub trait Repository: Send + Sync {
    /// Fails with [`GitError::NotInstalled`] when `git` is not on `PATH`.
    fn check_installed(&self) -> Result<(), GitError>;

    fn is_inside_repository(&self) -> bool;

    /// Unified patch of the staged changes. Empty when nothing is staged.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// The last `count` commits formatted for prompting.
    fn recent_history(&self, count: usize) -> Result<String, GitError>;

    /// `git commit`, with `-e -m <message>` when a message is given.
    ///
    /// The caller decides how to run it; the editor needs the terminal.
    fn commit_command(&self, message: &str) -> Command;
}

/// [`Repository`] backed by git2, rooted at a working directory.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open(&self) -> Result<git2::Repository, GitError> {
        git2::Repository::discover(&self.root).map_err(GitError::Open)
    }
}

impl Repository for GitRepository {
    fn check_installed(&self) -> Result<(), GitError> {
        which::which("git")
            .map(|path| debug!("Using git at {}", path.display()))
            .map_err(|_| GitError::NotInstalled)
    }

    fn is_inside_repository(&self) -> bool {
        match git2::Repository::discover(&self.root) {
            Ok(repo) => !repo.is_bare(),
            Err(e) => {
                debug!("No repository at {}: {e}", self.root.display());
                false
            }
        }
    }

    fn staged_diff(&self) -> Result<String, GitError> {
        let repo = self.open()?;
        super::diff::staged_diff(&repo)
    }

    fn recent_history(&self, count: usize) -> Result<String, GitError> {
        let repo = self.open()?;
        super::history::recent_history(&repo, count)
    }

    fn commit_command(&self, message: &str) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.root).arg("commit");
        if !message.is_empty() {
            cmd.args(["-e", "-m", message]);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_commit_command_without_message() {
        let repo = GitRepository::new("/tmp");
        let cmd = repo.commit_command("");
        assert_eq!(cmd.get_program(), "git");
        assert_eq!(args(&cmd), vec!["commit"]);
    }

    #[test]
    fn test_commit_command_with_message_opens_editor() {
        let repo = GitRepository::new("/tmp");
        let cmd = repo.commit_command("feat: add x\n\nbody");
        assert_eq!(args(&cmd), vec!["commit", "-e", "-m", "feat: add x\n\nbody"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepository::new(dir.path());
        assert!(!repo.is_inside_repository());
        assert!(matches!(repo.staged_diff(), Err(GitError::Open(_))));
    }

    #[test]
    fn test_inside_repository_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = GitRepository::new(&nested);
        assert!(repo.is_inside_repository());
        assert_eq!(repo.staged_diff().unwrap(), "");
        assert_eq!(repo.recent_history(10).unwrap(), "");
    }

    #[test]
    fn test_bare_repository_is_not_a_work_tree() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init_bare(dir.path()).unwrap();

        let repo = GitRepository::new(dir.path());
        assert!(!repo.is_inside_repository());
    }
}
