//! Screens of the interview.

/// What a `Loading` screen is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingTask {
    Prerequisites,
    CommitMessage,
}

/// Sub-steps of provider setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    ChooseProvider,
    ConfirmDetectedKey,
    EnterApiKey,
    OllamaUrl,
    OllamaModel,
}

impl SetupStep {
    /// Steps that read a line of text from the input field.
    pub fn takes_text(self) -> bool {
        matches!(
            self,
            SetupStep::EnterApiKey | SetupStep::OllamaUrl | SetupStep::OllamaModel
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Loading(LoadingTask),
    Setup(SetupStep),
    Welcome,
    HistoryAnalysis,
    Analysis,
    Questioning,
    Commit,
    Success,
    Error,
    NoRepo,
    DiffTooLarge,
}

impl State {
    /// Whether a bare `q` ends the session.
    ///
    /// Where the screen takes text or offers `q` as a menu choice it is
    /// handled there instead.
    pub fn quits_on_q(self) -> bool {
        !matches!(
            self,
            State::Questioning | State::Setup(_) | State::Welcome | State::DiffTooLarge
        )
    }

    /// Whether the screen shows a spinner.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            State::Loading(_) | State::HistoryAnalysis | State::Analysis
        )
    }
}
