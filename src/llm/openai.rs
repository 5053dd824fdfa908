//! Hosted OpenAI backend.

use async_trait::async_trait;

use crate::error::ProviderError;

use super::client::ChatClient;
use super::prompt::OPENAI_PROMPTS;
use super::schema::{Answer, CommitDraft, HistoryAnalysis};
use super::Provider;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
pub const OPENAI_MODEL: &str = "gpt-4o-2024-08-06";

pub struct OpenAiProvider {
    client: ChatClient,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(OPENAI_BASE_URL, api_key)
    }

    /// Point at an OpenAI-compatible endpoint other than api.openai.com.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: ChatClient::new(base_url, api_key, OPENAI_MODEL),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn generate_questions(
        &self,
        diff: &str,
        history: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.client.questions(&OPENAI_PROMPTS, diff, history).await
    }

    async fn generate_commit_message(
        &self,
        diff: &str,
        history: &str,
        answers: &[Answer],
    ) -> Result<CommitDraft, ProviderError> {
        self.client
            .commit_message(&OPENAI_PROMPTS, diff, history, answers)
            .await
    }

    async fn analyze_history(
        &self,
        diff: &str,
        history: &str,
    ) -> Result<HistoryAnalysis, ProviderError> {
        self.client
            .history_analysis(&OPENAI_PROMPTS, diff, history)
            .await
    }
}
