//! Local Ollama backend via its OpenAI-compatible endpoint.

use async_trait::async_trait;

use crate::error::ProviderError;

use super::client::ChatClient;
use super::prompt::OLLAMA_PROMPTS;
use super::schema::{Answer, CommitDraft, HistoryAnalysis};
use super::Provider;

/// Ollama ignores the bearer token but the protocol requires one.
const PLACEHOLDER_API_KEY: &str = "ollama";

pub struct OllamaProvider {
    client: ChatClient,
}

impl OllamaProvider {
    pub fn new(url: &str, model: impl Into<String>) -> Self {
        Self {
            client: ChatClient::new(normalize_base_url(url), PLACEHOLDER_API_KEY, model),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn classify(&self, err: ProviderError) -> ProviderError {
        match err {
            ProviderError::Api { status: 404, message } if mentions_missing_model(&message) => {
                ProviderError::ModelNotFound {
                    model: self.client.model().to_string(),
                }
            }
            other => other,
        }
    }
}

/// Turn a server URL into the `/v1/` API base.
///
/// `http://localhost:11434` becomes `http://localhost:11434/v1/`; a URL that
/// already ends in `v1` or `v1/` only gains the trailing slash.
pub fn normalize_base_url(url: &str) -> String {
    let mut base = url.trim().to_string();
    if !base.is_empty() && !base.ends_with('/') {
        base.push('/');
    }
    if !base.ends_with("v1/") {
        base.push_str("v1/");
    }
    base
}

fn mentions_missing_model(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("model") && lower.contains("not found")
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn generate_questions(
        &self,
        diff: &str,
        history: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.client
            .questions(&OLLAMA_PROMPTS, diff, history)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn generate_commit_message(
        &self,
        diff: &str,
        history: &str,
        answers: &[Answer],
    ) -> Result<CommitDraft, ProviderError> {
        self.client
            .commit_message(&OLLAMA_PROMPTS, diff, history, answers)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn analyze_history(
        &self,
        diff: &str,
        history: &str,
    ) -> Result<HistoryAnalysis, ProviderError> {
        self.client
            .history_analysis(&OLLAMA_PROMPTS, diff, history)
            .await
            .map_err(|e| self.classify(e))
    }
}
