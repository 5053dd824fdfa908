//! The interview state machine and the tasks it drives.

pub mod event;
pub mod machine;
pub mod prerequisites;
pub mod state;
pub mod tasks;

pub use crate::llm::Answer;
pub use event::{Effect, Event, Key, Outcome, Task, TaskKind};
pub use machine::Session;
pub use prerequisites::{check_prerequisites, MAX_DIFF_CHARS};
pub use state::{LoadingTask, SetupStep, State};
pub use tasks::{ProviderFactory, TaskFuture, TaskRunner};
