//! Recent commit history, formatted as prompt context.

use git2::{Commit, ErrorCode, Repository, Sort};

use crate::error::GitError;

/// Default number of history entries sent to the backend.
pub const DEFAULT_HISTORY_COUNT: usize = 10;

/// The last `count` commits reachable from HEAD, newest first.
///
/// Each entry reads:
///
/// ```text
/// Commit: <short hash>
/// Subject: <subject>
/// Body:
/// <body>
/// ---
/// ```
///
/// Entries are separated by a newline. A repository without commits yields
/// an empty string.
pub fn recent_history(repo: &Repository, count: usize) -> Result<String, GitError> {
    match repo.head() {
        Ok(_) => {}
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(String::new());
        }
        Err(e) => return Err(GitError::History(e)),
    }

    let mut revwalk = repo.revwalk().map_err(GitError::History)?;
    revwalk.push_head().map_err(GitError::History)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(GitError::History)?;

    let mut entries = Vec::with_capacity(count);
    for oid_result in revwalk.take(count) {
        let oid = oid_result.map_err(GitError::History)?;
        let commit = repo.find_commit(oid).map_err(GitError::History)?;
        entries.push(format_entry(&commit));
    }

    Ok(entries.join("\n"))
}

fn format_entry(commit: &Commit<'_>) -> String {
    let short = commit
        .as_object()
        .short_id()
        .ok()
        .and_then(|buf| buf.as_str().map(str::to_string))
        .unwrap_or_else(|| commit.id().to_string().chars().take(7).collect());
    let subject = commit.summary().unwrap_or("");
    let body = commit.body().unwrap_or("").trim_end();

    if body.is_empty() {
        format!("Commit: {short}\nSubject: {subject}\nBody:\n\n---")
    } else {
        format!("Commit: {short}\nSubject: {subject}\nBody:\n{body}\n\n---")
    }
}
