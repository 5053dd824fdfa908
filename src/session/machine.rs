//! The interview reducer.
//!
//! [`Session::update`] is the only place state changes. It performs no I/O:
//! anything slow comes back as an [`Effect::Run`] for the runtime to execute,
//! and the result arrives later as [`Event::Completed`].

use tracing::{debug, warn};

use crate::config::{Config, ProviderKind, DEFAULT_OLLAMA_URL, SUGGESTED_OLLAMA_MODEL};
use crate::error::SessionError;
use crate::git::parse_subject;
use crate::llm::{Answer, CommitDraft, HistoryAnalysis};

use super::event::{Effect, Event, Key, Outcome, Task, TaskKind};
use super::state::{LoadingTask, SetupStep, State};

/// Spinner frames, advanced on every tick.
pub const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug)]
pub struct Session {
    state: State,
    config: Config,
    detected_api_key: Option<String>,
    diff: String,
    history: String,
    diff_chars: usize,
    history_context: Vec<String>,
    questions: Vec<String>,
    question_index: usize,
    answers: Vec<Answer>,
    input: String,
    draft: Option<CommitDraft>,
    error: Option<SessionError>,
    pending: Option<TaskKind>,
    width: u16,
    height: u16,
    spinner_frame: usize,
}

impl Session {
    /// `detected_api_key` is `OPENAI_API_KEY`, offered during setup.
    pub fn new(detected_api_key: Option<String>) -> Self {
        Self {
            state: State::Loading(LoadingTask::Prerequisites),
            config: Config::default(),
            detected_api_key,
            diff: String::new(),
            history: String::new(),
            diff_chars: 0,
            history_context: Vec::new(),
            questions: Vec::new(),
            question_index: 0,
            answers: Vec::new(),
            input: String::new(),
            draft: None,
            error: None,
            pending: None,
            width: 80,
            height: 24,
            spinner_frame: 0,
        }
    }

    /// The first effect: check prerequisites.
    pub fn start(&mut self) -> Effect {
        self.state = State::Loading(LoadingTask::Prerequisites);
        self.dispatch(Task::CheckPrerequisites)
    }

    pub fn update(&mut self, event: Event) -> Effect {
        match event {
            Event::Resize { width, height } => {
                self.width = width;
                self.height = height;
                Effect::None
            }
            Event::Tick => {
                self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
                Effect::None
            }
            Event::Key(key) => self.on_key(key),
            Event::Completed(outcome) => {
                self.pending = None;
                self.on_outcome(outcome)
            }
        }
    }

    fn dispatch(&mut self, task: Task) -> Effect {
        debug!(task = ?task.kind(), state = ?self.state, "Dispatching task");
        self.pending = Some(task.kind());
        Effect::Run(task)
    }

    fn on_key(&mut self, key: Key) -> Effect {
        if key == Key::CtrlC {
            return Effect::Quit;
        }
        if key == Key::Char('q') && self.state.quits_on_q() {
            return Effect::Quit;
        }
        if self.pending.is_some() {
            return Effect::None;
        }

        match self.state {
            State::Welcome => self.on_welcome_key(key),
            State::DiffTooLarge => match key {
                Key::Char('m') | Key::Enter => self.begin_commit(String::new()),
                Key::Char('q') => Effect::Quit,
                _ => Effect::None,
            },
            State::Setup(step) => self.on_setup_key(step, key),
            State::Questioning => self.on_question_key(key),
            State::Loading(_)
            | State::HistoryAnalysis
            | State::Analysis
            | State::Commit
            | State::Success
            | State::Error
            | State::NoRepo => Effect::None,
        }
    }

    fn on_welcome_key(&mut self, key: Key) -> Effect {
        match key {
            Key::Char('1') | Key::Enter => {
                self.state = State::HistoryAnalysis;
                self.dispatch(Task::AnalyzeHistory {
                    config: self.config.clone(),
                    diff: self.diff.clone(),
                    history: self.history.clone(),
                })
            }
            Key::Char('2') => self.begin_commit(String::new()),
            Key::Char('c') | Key::Char('C') => {
                self.enter_setup(SetupStep::ChooseProvider);
                Effect::None
            }
            _ => Effect::None,
        }
    }

    fn on_setup_key(&mut self, step: SetupStep, key: Key) -> Effect {
        match step {
            SetupStep::ChooseProvider => {
                match key {
                    Key::Char('1') => {
                        if self.detected_api_key.is_some() {
                            self.enter_setup(SetupStep::ConfirmDetectedKey);
                        } else {
                            self.enter_setup(SetupStep::EnterApiKey);
                        }
                    }
                    Key::Char('2') => {
                        self.enter_setup(SetupStep::OllamaUrl);
                        self.input = DEFAULT_OLLAMA_URL.to_string();
                    }
                    _ => {}
                }
                Effect::None
            }
            SetupStep::ConfirmDetectedKey => match key {
                Key::Char('y') | Key::Char('Y') | Key::Enter => {
                    match self.detected_api_key.clone() {
                        Some(api_key) => {
                            self.config.provider = ProviderKind::OpenAi;
                            self.config.openai_api_key = api_key;
                            self.save_config()
                        }
                        None => {
                            self.enter_setup(SetupStep::EnterApiKey);
                            Effect::None
                        }
                    }
                }
                Key::Char('n') | Key::Char('N') => {
                    self.enter_setup(SetupStep::EnterApiKey);
                    Effect::None
                }
                _ => Effect::None,
            },
            SetupStep::EnterApiKey | SetupStep::OllamaUrl | SetupStep::OllamaModel => {
                if key != Key::Enter {
                    self.edit_input(key);
                    return Effect::None;
                }
                let value = self.input.trim().to_string();
                if value.is_empty() {
                    return Effect::None;
                }
                match step {
                    SetupStep::EnterApiKey => {
                        self.config.provider = ProviderKind::OpenAi;
                        self.config.openai_api_key = value;
                        self.save_config()
                    }
                    SetupStep::OllamaUrl => {
                        self.config.ollama_url = value;
                        self.enter_setup(SetupStep::OllamaModel);
                        self.input = SUGGESTED_OLLAMA_MODEL.to_string();
                        Effect::None
                    }
                    _ => {
                        self.config.provider = ProviderKind::Ollama;
                        self.config.ollama_model = value;
                        self.save_config()
                    }
                }
            }
        }
    }

    fn on_question_key(&mut self, key: Key) -> Effect {
        if key != Key::Enter {
            self.edit_input(key);
            return Effect::None;
        }

        let answer = self.input.trim().to_string();
        if answer.is_empty() {
            return Effect::None;
        }

        let Some(question) = self.questions.get(self.question_index).cloned() else {
            return self.begin_message_generation();
        };
        self.answers.push(Answer::new(question, answer));
        self.question_index += 1;
        self.input.clear();

        if self.question_index >= self.questions.len() {
            self.begin_message_generation()
        } else {
            Effect::None
        }
    }

    fn edit_input(&mut self, key: Key) {
        match key {
            Key::Char(c) => self.input.push(c),
            Key::Backspace => {
                self.input.pop();
            }
            Key::Enter | Key::Esc | Key::CtrlC => {}
        }
    }

    fn enter_setup(&mut self, step: SetupStep) {
        self.state = State::Setup(step);
        self.input.clear();
    }

    fn save_config(&mut self) -> Effect {
        self.input.clear();
        self.state = State::Loading(LoadingTask::Prerequisites);
        self.dispatch(Task::SaveConfig(self.config.clone()))
    }

    fn begin_commit(&mut self, message: String) -> Effect {
        self.state = State::Commit;
        self.dispatch(Task::Commit { message })
    }

    fn begin_message_generation(&mut self) -> Effect {
        self.state = State::Loading(LoadingTask::CommitMessage);
        self.dispatch(Task::GenerateMessage {
            config: self.config.clone(),
            diff: self.diff.clone(),
            history: self.history_with_context(),
            answers: self.answers.clone(),
        })
    }

    /// Raw history plus the bullets kept by history analysis.
    pub fn history_with_context(&self) -> String {
        if self.history_context.is_empty() {
            return self.history.clone();
        }
        format!(
            "{}\n\nKey Context from History:\n- {}",
            self.history,
            self.history_context.join("\n- ")
        )
    }

    fn on_outcome(&mut self, outcome: Outcome) -> Effect {
        match outcome {
            Outcome::SetupRequired { config, step } => {
                self.config = config;
                self.enter_setup(step);
                Effect::None
            }
            Outcome::NoRepo => {
                self.state = State::NoRepo;
                Effect::None
            }
            Outcome::DiffTooLarge { config, chars } => {
                self.config = config;
                self.diff_chars = chars;
                self.state = State::DiffTooLarge;
                Effect::None
            }
            Outcome::Ready {
                config,
                diff,
                history,
            } => {
                self.config = config;
                self.diff_chars = diff.chars().count();
                self.diff = diff;
                self.history = history;
                self.state = State::Welcome;
                Effect::None
            }
            Outcome::ConfigSaved => {
                self.state = State::Loading(LoadingTask::Prerequisites);
                self.dispatch(Task::CheckPrerequisites)
            }
            Outcome::HistoryAnalyzed(analysis) => self.on_history_analyzed(analysis),
            Outcome::QuestionsGenerated(questions) => {
                debug!(count = questions.len(), "Questions generated");
                self.questions = questions;
                self.question_index = 0;
                self.answers.clear();
                self.input.clear();
                if self.questions.is_empty() {
                    self.begin_message_generation()
                } else {
                    self.state = State::Questioning;
                    Effect::None
                }
            }
            Outcome::MessageGenerated(draft) => {
                if parse_subject(&draft.subject).is_none() {
                    warn!(subject = %draft.subject, "Generated subject is not a conventional commit");
                }
                let message = draft.format();
                self.draft = Some(draft);
                self.begin_commit(message)
            }
            Outcome::Committed => {
                self.state = State::Success;
                Effect::Quit
            }
            Outcome::Failed(err) => {
                warn!("Session failed: {err}");
                self.error = Some(err);
                self.state = State::Error;
                Effect::None
            }
        }
    }

    fn on_history_analyzed(&mut self, analysis: HistoryAnalysis) -> Effect {
        self.history_context = if analysis.is_relevant {
            analysis
                .key_context
                .into_iter()
                .map(|point| point.trim().to_string())
                .filter(|point| !point.is_empty())
                .collect()
        } else {
            Vec::new()
        };
        debug!(
            relevant = analysis.is_relevant,
            kept = self.history_context.len(),
            "History analyzed"
        );

        self.state = State::Analysis;
        self.dispatch(Task::GenerateQuestions {
            config: self.config.clone(),
            diff: self.diff.clone(),
            history: self.history.clone(),
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn diff_chars(&self) -> usize {
        self.diff_chars
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// The question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.question_index).map(String::as_str)
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn draft(&self) -> Option<&CommitDraft> {
        self.draft.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn pending(&self) -> Option<TaskKind> {
        self.pending
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }
}
