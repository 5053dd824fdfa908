//! Turns [`Task`]s into [`Outcome`]s.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigStore};
use crate::error::{ProviderError, SessionError};
use crate::git::Repository;
use crate::llm::{build_provider, Provider};

use super::event::{Outcome, Task};
use super::prerequisites::check_prerequisites;

/// A task in flight. Owns everything it needs.
pub type TaskFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

/// Builds the backend for a validated configuration.
pub type ProviderFactory =
    Box<dyn Fn(&Config) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// Executes session tasks against the configuration store, the repository
/// and the selected backend.
pub struct TaskRunner {
    store: ConfigStore,
    repo: Arc<dyn Repository>,
    env_api_key: Option<String>,
    history_count: usize,
    factory: ProviderFactory,
    provider: Option<(Config, Arc<dyn Provider>)>,
}

impl TaskRunner {
    pub fn new(
        store: ConfigStore,
        repo: Arc<dyn Repository>,
        env_api_key: Option<String>,
        history_count: usize,
    ) -> Self {
        Self {
            store,
            repo,
            env_api_key,
            history_count,
            factory: Box::new(|config: &Config| build_provider(config).map(Arc::from)),
            provider: None,
        }
    }

    /// Replace how backends are built.
    pub fn with_provider_factory(
        mut self,
        factory: impl Fn(&Config) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        self.factory = Box::new(factory);
        self.provider = None;
        self
    }

    /// The backend for `config`, built once and reused while it is unchanged.
    fn provider_for(&mut self, config: &Config) -> Result<Arc<dyn Provider>, ProviderError> {
        if let Some((cached, provider)) = &self.provider {
            if cached == config {
                return Ok(Arc::clone(provider));
            }
        }
        let provider = (self.factory)(config)?;
        self.provider = Some((config.clone(), Arc::clone(&provider)));
        Ok(provider)
    }

    /// Start `task`. The returned future resolves to its single outcome.
    ///
    /// `Commit` runs `git commit` with inherited stdio; callers that own the
    /// terminal should use [`TaskRunner::commit`] after releasing it.
    pub fn run(&mut self, task: Task) -> TaskFuture {
        info!(task = ?task.kind(), "Running task");
        match task {
            Task::CheckPrerequisites => {
                let store = self.store.clone();
                let repo = Arc::clone(&self.repo);
                let env_api_key = self.env_api_key.clone();
                let history_count = self.history_count;
                Box::pin(async move {
                    check_prerequisites(&store, repo.as_ref(), env_api_key.as_deref(), history_count)
                })
            }
            Task::SaveConfig(config) => {
                let outcome = match self.store.save(&config) {
                    Ok(()) => Outcome::ConfigSaved,
                    Err(e) => Outcome::Failed(e.into()),
                };
                Box::pin(async move { outcome })
            }
            Task::AnalyzeHistory {
                config,
                diff,
                history,
            } => match self.provider_for(&config) {
                Ok(provider) => Box::pin(async move {
                    match provider.analyze_history(&diff, &history).await {
                        Ok(analysis) => Outcome::HistoryAnalyzed(analysis),
                        Err(e) => Outcome::Failed(e.into()),
                    }
                }),
                Err(e) => failed(e),
            },
            Task::GenerateQuestions {
                config,
                diff,
                history,
            } => match self.provider_for(&config) {
                Ok(provider) => Box::pin(async move {
                    match provider.generate_questions(&diff, &history).await {
                        Ok(questions) => Outcome::QuestionsGenerated(questions),
                        Err(e) => Outcome::Failed(e.into()),
                    }
                }),
                Err(e) => failed(e),
            },
            Task::GenerateMessage {
                config,
                diff,
                history,
                answers,
            } => match self.provider_for(&config) {
                Ok(provider) => Box::pin(async move {
                    match provider
                        .generate_commit_message(&diff, &history, &answers)
                        .await
                    {
                        Ok(draft) => Outcome::MessageGenerated(draft),
                        Err(e) => Outcome::Failed(e.into()),
                    }
                }),
                Err(e) => failed(e),
            },
            Task::Commit { message } => {
                let mut command = self.repo.commit_command(&message);
                Box::pin(async move {
                    tokio::task::spawn_blocking(move || commit_outcome(command.status()))
                        .await
                        .unwrap_or_else(|e| {
                            Outcome::Failed(SessionError::Commit(format!("commit task aborted: {e}")))
                        })
                })
            }
        }
    }

    /// Start `task` on the current tokio runtime and send its outcome to `tx`.
    pub fn spawn(&mut self, task: Task, tx: UnboundedSender<Outcome>) {
        let future = self.run(task);
        tokio::spawn(async move {
            if tx.send(future.await).is_err() {
                debug!("Session ended before the task finished");
            }
        });
    }

    /// Run `git commit` on the calling thread, blocking until the editor
    /// closes.
    pub fn commit(&self, message: &str) -> Outcome {
        info!(manual = message.is_empty(), "Running git commit");
        commit_outcome(self.repo.commit_command(message).status())
    }
}

fn failed(err: impl Into<SessionError>) -> TaskFuture {
    let outcome = Outcome::Failed(err.into());
    Box::pin(async move { outcome })
}

fn commit_outcome(status: io::Result<ExitStatus>) -> Outcome {
    match status {
        Ok(status) if status.success() => Outcome::Committed,
        Ok(status) => {
            warn!(%status, "git commit exited unsuccessfully");
            Outcome::Failed(SessionError::Commit(status.to_string()))
        }
        Err(e) => Outcome::Failed(SessionError::Spawn(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::config::ProviderKind;
    use crate::git::MockRepository;
    use crate::llm::{Answer, CommitDraft, HistoryAnalysis, MockProvider};

    fn config() -> Config {
        Config {
            provider: ProviderKind::OpenAi,
            openai_api_key: "sk-1".to_string(),
            ..Config::default()
        }
    }

    fn runner_with(provider: MockProvider) -> TaskRunner {
        let dir = std::env::temp_dir().join("smartcommit-tasks-unused");
        let provider: Arc<dyn Provider> = Arc::new(provider);
        TaskRunner::new(
            ConfigStore::new(dir.join("config.json")),
            Arc::new(MockRepository::new()),
            None,
            10,
        )
        .with_provider_factory(move |_| Ok(Arc::clone(&provider)))
    }

    #[tokio::test]
    async fn test_generate_questions() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate_questions()
            .withf(|diff, history| diff.contains("+x") && history.contains('h'))
            .returning(|_, _| Ok(vec!["Why?".to_string()]));
        let mut runner = runner_with(provider);

        let outcome = runner
            .run(Task::GenerateQuestions {
                config: config(),
                diff: "+x".to_string(),
                history: "h".to_string(),
            })
            .await;

        match outcome {
            Outcome::QuestionsGenerated(questions) => assert_eq!(questions, vec!["Why?"]),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_message_passes_answers_in_order() {
        let mut provider = MockProvider::new();
        provider
            .expect_generate_commit_message()
            .withf(|_, _, answers| {
                answers.len() == 2 && answers[0].question == "A?" && answers[1].question == "B?"
            })
            .returning(|_, _, _| {
                Ok(CommitDraft {
                    subject: "fix: x".to_string(),
                    body: String::new(),
                })
            });
        let mut runner = runner_with(provider);

        let outcome = runner
            .run(Task::GenerateMessage {
                config: config(),
                diff: "+x".to_string(),
                history: String::new(),
                answers: vec![Answer::new("A?", "1"), Answer::new("B?", "2")],
            })
            .await;

        assert!(matches!(outcome, Outcome::MessageGenerated(draft) if draft.subject == "fix: x"));
    }

    #[tokio::test]
    async fn test_provider_error_becomes_failure() {
        let mut provider = MockProvider::new();
        provider
            .expect_analyze_history()
            .returning(|_, _| Err(ProviderError::MalformedResponse("eof".to_string())));
        let mut runner = runner_with(provider);

        let outcome = runner
            .run(Task::AnalyzeHistory {
                config: config(),
                diff: "+x".to_string(),
                history: String::new(),
            })
            .await;

        match outcome {
            Outcome::Failed(err) => assert!(err.to_string().contains("failed to parse JSON response")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_built_once_per_config() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let mut runner = TaskRunner::new(
            ConfigStore::new(std::env::temp_dir().join("smartcommit-unused.json")),
            Arc::new(MockRepository::new()),
            None,
            10,
        )
        .with_provider_factory(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut provider = MockProvider::new();
            provider
                .expect_analyze_history()
                .returning(|_, _| Ok(HistoryAnalysis::default()));
            provider
                .expect_generate_questions()
                .returning(|_, _| Ok(vec![]));
            Ok(Arc::new(provider) as Arc<dyn Provider>)
        });

        runner
            .run(Task::AnalyzeHistory {
                config: config(),
                diff: String::new(),
                history: String::new(),
            })
            .await;
        runner
            .run(Task::GenerateQuestions {
                config: config(),
                diff: String::new(),
                history: String::new(),
            })
            .await;
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        let mut other = config();
        other.openai_api_key = "sk-2".to_string();
        runner
            .run(Task::GenerateQuestions {
                config: other,
                diff: String::new(),
                history: String::new(),
            })
            .await;
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unbuildable_provider_fails_task() {
        let mut runner = TaskRunner::new(
            ConfigStore::new(std::env::temp_dir().join("smartcommit-unused.json")),
            Arc::new(MockRepository::new()),
            None,
            10,
        );
        let outcome = runner
            .run(Task::GenerateQuestions {
                config: Config::default(),
                diff: String::new(),
                history: String::new(),
            })
            .await;

        assert!(matches!(
            outcome,
            Outcome::Failed(SessionError::Provider(ProviderError::UnknownProvider(_)))
        ));
    }

    #[tokio::test]
    async fn test_save_config_writes_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        let mut runner = TaskRunner::new(store.clone(), Arc::new(MockRepository::new()), None, 10);

        let outcome = runner.run(Task::SaveConfig(config())).await;

        assert!(matches!(outcome, Outcome::ConfigSaved));
        assert_eq!(store.load().unwrap(), config());
    }

    #[test]
    fn test_commit_outcomes() {
        let mut repo = MockRepository::new();
        repo.expect_commit_command().returning(|message| {
            let mut cmd = Command::new("sh");
            if message.is_empty() {
                cmd.args(["-c", "exit 1"]);
            } else {
                cmd.args(["-c", "exit 0"]);
            }
            cmd
        });
        let runner = TaskRunner::new(
            ConfigStore::new(std::env::temp_dir().join("smartcommit-unused.json")),
            Arc::new(repo),
            None,
            10,
        );

        assert!(matches!(runner.commit("feat: x"), Outcome::Committed));
        assert!(matches!(
            runner.commit(""),
            Outcome::Failed(SessionError::Commit(_))
        ));
    }

    #[test]
    fn test_commit_spawn_failure() {
        let outcome = commit_outcome(Err(io::Error::new(io::ErrorKind::NotFound, "no git")));
        assert!(matches!(outcome, Outcome::Failed(SessionError::Spawn(_))));
    }
}
