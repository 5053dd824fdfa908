//! Text-generation backends.
//!
//! Both backends speak the chat-completions protocol and are asked for
//! schema-constrained JSON replies. Which one is used is decided once per
//! validated configuration by [`build_provider`].

pub mod client;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod schema;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{Config, ProviderKind};
use crate::error::ProviderError;

pub use client::ChatClient;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use schema::{Answer, CommitDraft, HistoryAnalysis};

/// The three questions the interview asks a backend.
///
/// This abstraction allows mocking the backend in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Clarifying questions about the staged change. May be empty.
    async fn generate_questions(
        &self,
        diff: &str,
        history: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Draft the commit message from the change, history and answers.
    async fn generate_commit_message(
        &self,
        diff: &str,
        history: &str,
        answers: &[Answer],
    ) -> Result<CommitDraft, ProviderError>;

    /// Decide whether recent history bears on the change.
    async fn analyze_history(
        &self,
        diff: &str,
        history: &str,
    ) -> Result<HistoryAnalysis, ProviderError>;
}

/// Select the backend named by `config`.
pub fn build_provider(config: &Config) -> Result<Box<dyn Provider>, ProviderError> {
    match &config.provider {
        ProviderKind::OpenAi => {
            let key = config.openai_api_key.trim();
            if key.is_empty() {
                return Err(ProviderError::MissingCredential);
            }
            debug!("Using OpenAI provider");
            Ok(Box::new(OpenAiProvider::new(key)))
        }
        ProviderKind::Ollama => {
            debug!(url = %config.ollama_url, model = %config.ollama_model, "Using Ollama provider");
            Ok(Box::new(OllamaProvider::new(
                &config.ollama_url,
                config.ollama_model.trim(),
            )))
        }
        ProviderKind::Unset | ProviderKind::Other(_) => {
            Err(ProviderError::UnknownProvider(config.provider.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_openai_requires_key() {
        let config = Config {
            provider: ProviderKind::OpenAi,
            ..Config::default()
        };
        assert!(matches!(
            build_provider(&config),
            Err(ProviderError::MissingCredential)
        ));

        let config = Config {
            provider: ProviderKind::OpenAi,
            openai_api_key: "sk-1".to_string(),
            ..Config::default()
        };
        assert!(build_provider(&config).is_ok());
    }

    #[test]
    fn test_build_ollama() {
        let config = Config {
            provider: ProviderKind::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
            ..Config::default()
        };
        assert!(build_provider(&config).is_ok());
    }

    #[test]
    fn test_build_unknown_provider() {
        let config = Config {
            provider: ProviderKind::Other("anthropic".to_string()),
            ..Config::default()
        };
        match build_provider(&config) {
            Err(ProviderError::UnknownProvider(name)) => assert_eq!(name, "anthropic"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
