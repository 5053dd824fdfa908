//! smartcommit - An interactive assistant that writes Conventional Commits messages.
//!
//! # Overview
//!
//! smartcommit reads the staged diff and recent history of the current git
//! repository, asks a few clarifying questions generated by an LLM (OpenAI
//! or a local Ollama server), drafts a commit message from the answers, and
//! opens it in `git commit -e` for final review.

pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod session;
pub mod tui;

// Re-export commonly used types
pub use config::{Config, ConfigStore, ProviderKind};
pub use error::{ConfigError, GitError, ProviderError, SessionError};
pub use git::{CommitType, ConventionalSubject, GitRepository, Repository};
pub use llm::{build_provider, Answer, CommitDraft, HistoryAnalysis, Provider};
pub use session::{Effect, Event, Key, Outcome, Session, State, Task, TaskRunner};
