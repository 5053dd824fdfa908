//! What flows into and out of [`Session::update`](super::Session::update).

use crate::config::Config;
use crate::error::SessionError;
use crate::llm::{Answer, CommitDraft, HistoryAnalysis};

use super::state::SetupStep;

/// A key press, reduced to what the interview distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Esc,
    CtrlC,
}

#[derive(Debug)]
pub enum Event {
    Key(Key),
    Resize { width: u16, height: u16 },
    /// Spinner animation frame.
    Tick,
    /// The pending task finished.
    Completed(Outcome),
}

/// Result of one task. Every task reports exactly one.
#[derive(Debug)]
pub enum Outcome {
    SetupRequired { config: Config, step: SetupStep },
    NoRepo,
    DiffTooLarge { config: Config, chars: usize },
    Ready {
        config: Config,
        diff: String,
        history: String,
    },
    ConfigSaved,
    HistoryAnalyzed(HistoryAnalysis),
    QuestionsGenerated(Vec<String>),
    MessageGenerated(CommitDraft),
    Committed,
    Failed(SessionError),
}

/// Work the session asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    CheckPrerequisites,
    SaveConfig(Config),
    AnalyzeHistory {
        config: Config,
        diff: String,
        history: String,
    },
    GenerateQuestions {
        config: Config,
        diff: String,
        history: String,
    },
    GenerateMessage {
        config: Config,
        diff: String,
        history: String,
        answers: Vec<Answer>,
    },
    /// Run `git commit`; an empty message leaves the editor blank.
    Commit { message: String },
}

/// Discriminant of [`Task`], kept while the task is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    CheckPrerequisites,
    SaveConfig,
    AnalyzeHistory,
    GenerateQuestions,
    GenerateMessage,
    Commit,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::CheckPrerequisites => TaskKind::CheckPrerequisites,
            Task::SaveConfig(_) => TaskKind::SaveConfig,
            Task::AnalyzeHistory { .. } => TaskKind::AnalyzeHistory,
            Task::GenerateQuestions { .. } => TaskKind::GenerateQuestions,
            Task::GenerateMessage { .. } => TaskKind::GenerateMessage,
            Task::Commit { .. } => TaskKind::Commit,
        }
    }
}

/// What the runtime should do after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Run(Task),
    Quit,
}
