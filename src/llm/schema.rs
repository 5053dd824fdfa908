//! Structured response types and their JSON schemas.
//!
//! Every backend call asks for a reply constrained to one of these shapes.
//! Replies are deserialized strictly: unknown fields and missing fields are
//! both rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A reply shape a backend can be asked to produce.
pub trait StructuredResponse: DeserializeOwned {
    /// Schema name sent in `response_format.json_schema.name`.
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn schema() -> Value;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

impl StructuredResponse for QuestionsResponse {
    const NAME: &'static str = "questions_response";
    const DESCRIPTION: &'static str = "List of clarifying questions";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A list of 3 short, specific questions to ask the user to clarify the intent and 'why' behind the changes."
                }
            },
            "required": ["questions"],
            "additionalProperties": false
        })
    }
}

/// A generated commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitDraft {
    pub subject: String,
    pub body: String,
}

impl CommitDraft {
    /// Render as a git commit message: subject, blank line, body.
    ///
    /// A blank body yields the subject alone.
    pub fn format(&self) -> String {
        let subject = self.subject.trim();
        let body = self.body.trim();
        if body.is_empty() {
            subject.to_string()
        } else {
            format!("{subject}\n\n{body}")
        }
    }
}

impl StructuredResponse for CommitDraft {
    const NAME: &'static str = "commit_message_response";
    const DESCRIPTION: &'static str = "A structured commit message";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "subject": {
                    "type": "string",
                    "description": "The commit message subject line, following Conventional Commits specification."
                },
                "body": {
                    "type": "string",
                    "description": "The detailed commit message body explaining the 'what' and 'why'."
                }
            },
            "required": ["subject", "body"],
            "additionalProperties": false
        })
    }
}

/// Whether recent history bears on the staged change, and what to keep from it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryAnalysis {
    pub is_relevant: bool,
    pub key_context: Vec<String>,
}

impl StructuredResponse for HistoryAnalysis {
    const NAME: &'static str = "history_analysis_response";
    const DESCRIPTION: &'static str = "Analysis of project history relevance";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "is_relevant": {
                    "type": "boolean",
                    "description": "Whether the recent history is relevant to the current changes."
                },
                "key_context": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A list of key context points from the history that are relevant to the current changes."
                }
            },
            "required": ["is_relevant", "key_context"],
            "additionalProperties": false
        })
    }
}

/// One clarifying question and the user's answer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

impl Answer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_body() {
        let draft = CommitDraft {
            subject: "fix(api): handle timeout".to_string(),
            body: "Large repos took longer than the default.".to_string(),
        };
        assert_eq!(
            draft.format(),
            "fix(api): handle timeout\n\nLarge repos took longer than the default."
        );
    }

    #[test]
    fn test_format_blank_body_is_subject_only() {
        let draft = CommitDraft {
            subject: "chore: bump deps ".to_string(),
            body: "  \n".to_string(),
        };
        assert_eq!(draft.format(), "chore: bump deps");
    }

    #[test]
    fn test_strict_parsing_rejects_missing_field() {
        let result = serde_json::from_str::<CommitDraft>(r#"{"subject": "feat: x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_strict_parsing_rejects_unknown_field() {
        let result =
            serde_json::from_str::<QuestionsResponse>(r#"{"questions": [], "extra": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schemas_require_every_property() {
        for schema in [
            QuestionsResponse::schema(),
            CommitDraft::schema(),
            HistoryAnalysis::schema(),
        ] {
            assert_eq!(schema["additionalProperties"], false);
            let properties = schema["properties"].as_object().unwrap();
            let required: Vec<&str> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            for key in properties.keys() {
                assert!(required.contains(&key.as_str()), "{key} not required");
            }
        }
    }
}
