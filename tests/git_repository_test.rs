//! Integration tests for repository access through the `Repository` trait.

mod common;

use common::TestRepo;
use smartcommit::git::{parse_subject, CommitType, GitRepository, Repository};

#[test]
fn test_discovers_repository_from_subdirectory() {
    let repo = TestRepo::new();
    repo.commit("chore: initial");
    repo.write_staged("src/lib.rs", "pub mod cache;\n");

    let git = GitRepository::new(repo.path().join("src"));

    assert!(git.is_inside_repository());
    let diff = git.staged_diff().unwrap();
    assert!(diff.contains("src/lib.rs"));
    assert!(diff.contains("+pub mod cache;"));
}

#[test]
fn test_history_is_limited_and_newest_first() {
    let repo = TestRepo::new();
    for subject in ["feat: one", "fix: two", "docs: three"] {
        repo.commit(subject);
    }

    let git = GitRepository::new(repo.path());
    let history = git.recent_history(2).unwrap();

    assert_eq!(history.matches("Commit: ").count(), 2);
    let newest = history.find("Subject: docs: three").unwrap();
    let older = history.find("Subject: fix: two").unwrap();
    assert!(newest < older);
    assert!(!history.contains("Subject: feat: one"));
}

#[test]
fn test_history_includes_commit_bodies() {
    let repo = TestRepo::new();
    repo.commit("feat(api): add pagination\n\nPages are 50 items.");

    let history = GitRepository::new(repo.path()).recent_history(10).unwrap();

    assert!(history.contains("Subject: feat(api): add pagination\nBody:\nPages are 50 items.\n\n---"));
}

#[test]
fn test_unstaged_changes_are_not_in_diff() {
    let repo = TestRepo::new();
    repo.commit("chore: initial");
    repo.write("scratch.txt", "not staged\n");

    let diff = GitRepository::new(repo.path()).staged_diff().unwrap();
    assert!(diff.trim().is_empty());
}

#[test]
fn test_history_subjects_parse_as_conventional() {
    let repo = TestRepo::new();
    repo.commit("feat(cache)!: drop the v1 format");

    let head = repo.head_message();
    let subject = parse_subject(head.lines().next().unwrap()).unwrap();

    assert_eq!(subject.commit_type, CommitType::Feat);
    assert_eq!(subject.scope.as_deref(), Some("cache"));
    assert!(subject.breaking);
    assert_eq!(subject.description, "drop the v1 format");
}
