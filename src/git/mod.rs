//! Git operations using git2-rs.

pub mod conventional;
pub mod diff;
pub mod history;
pub mod repo;

pub use conventional::{parse_subject, CommitType, ConventionalSubject};
pub use history::DEFAULT_HISTORY_COUNT;
#[cfg(test)]
pub use repo::MockRepository;
pub use repo::{GitRepository, Repository};
