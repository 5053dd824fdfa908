//! Chat-completions client shared by the OpenAI and Ollama providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ProviderError;

use super::prompt::{self, PromptSet};
use super::schema::{Answer, CommitDraft, HistoryAnalysis, QuestionsResponse, StructuredResponse};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    description: &'static str,
    schema: Value,
    strict: bool,
}

impl ResponseFormat {
    fn for_response<T: StructuredResponse>() -> Self {
        Self {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: T::NAME,
                description: T::DESCRIPTION,
                schema: T::schema(),
                strict: true,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Error bodies come as `{"error": {"message": ..}}` from OpenAI-compatible
/// endpoints and as `{"error": ".."}` from Ollama's native handlers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { error: ErrorDetail },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// A model endpoint speaking the chat-completions protocol.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// `base_url` must end with `/`; `chat/completions` is appended to it.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}chat/completions", self.base_url)
    }

    /// Send one system + user exchange and parse the reply as `T`.
    pub async fn complete<T: StructuredResponse>(
        &self,
        system: &str,
        user: &str,
    ) -> Result<T, ProviderError> {
        let endpoint = self.endpoint();
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat::for_response::<T>(),
        };

        info!(model = %self.model, schema = T::NAME, "Requesting completion");
        debug!(
            endpoint = %endpoint,
            prompt_chars = user.chars().count(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ProviderError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Backend returned an error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_completion(&body)
    }

    pub async fn questions(
        &self,
        prompts: &PromptSet,
        diff: &str,
        history: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let response: QuestionsResponse = self
            .complete(prompts.questions, &prompt::context_prompt(diff, history))
            .await?;
        Ok(response.questions)
    }

    pub async fn commit_message(
        &self,
        prompts: &PromptSet,
        diff: &str,
        history: &str,
        answers: &[Answer],
    ) -> Result<CommitDraft, ProviderError> {
        self.complete(
            prompts.commit_message,
            &prompt::commit_prompt(diff, history, answers),
        )
        .await
    }

    pub async fn history_analysis(
        &self,
        prompts: &PromptSet,
        diff: &str,
        history: &str,
    ) -> Result<HistoryAnalysis, ProviderError> {
        self.complete(
            prompts.history_analysis,
            &prompt::context_prompt(diff, history),
        )
        .await
    }
}

/// Extract the first choice's content and parse it as `T`.
fn parse_completion<T: StructuredResponse>(body: &str) -> Result<T, ProviderError> {
    let completion: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("response contained no message content".to_string())
        })?;

    serde_json::from_str(&content).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Detailed { error }) => error.message,
        Ok(ErrorBody::Plain { error }) => error,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_parse_completion_extracts_content() {
        let body = completion_body(r#"{"questions": ["Why?", "How?"]}"#);
        let parsed: QuestionsResponse = parse_completion(&body).unwrap();
        assert_eq!(parsed.questions, vec!["Why?", "How?"]);
    }

    #[test]
    fn test_parse_completion_without_choices_is_malformed() {
        let body = json!({ "choices": [] }).to_string();
        let result = parse_completion::<QuestionsResponse>(&body);
        assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_completion_schema_violation_is_malformed() {
        let body = completion_body(r#"{"subject": "feat: x"}"#);
        let result = parse_completion::<CommitDraft>(&body);
        assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#),
            "Incorrect API key"
        );
        assert_eq!(
            error_message(r#"{"error": "model 'llama3.1' not found"}"#),
            "model 'llama3.1' not found"
        );
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-2024-08-06",
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "usr" },
            ],
            response_format: ResponseFormat::for_response::<HistoryAnalysis>(),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o-2024-08-06");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(
            value["response_format"]["json_schema"]["name"],
            "history_analysis_response"
        );
        assert_eq!(value["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = ChatClient::new("http://localhost:11434/v1/", "ollama", "llama3.1");
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }
}
