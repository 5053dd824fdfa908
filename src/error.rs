//! Error types for smartcommit modules using thiserror.

use thiserror::Error;

/// Errors from loading or saving the configuration record.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory for the config file")]
    NoHomeDir,

    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git was not found on PATH. Install git and try again.")]
    NotInstalled,

    #[error("Failed to open repository: {0}")]
    Open(#[source] git2::Error),

    #[error("Failed to get staged diff: {0}")]
    Diff(#[source] git2::Error),

    #[error("Failed to get git history: {0}")]
    History(#[source] git2::Error),

    #[error("no staged changes found")]
    NothingStaged,
}

/// Errors from the text-generation backends.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model '{model}' not found")]
    ModelNotFound { model: String },

    #[error("failed to parse JSON response: {0}")]
    MalformedResponse(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No OpenAI API key configured")]
    MissingCredential,
}

/// A failure that ends the interview session.
///
/// This is what the error screen displays. Each variant keeps the
/// underlying error so the message is shown as encountered.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("git commit failed: {0}")]
    Commit(String),

    #[error("Failed to run git commit: {0}")]
    Spawn(#[source] std::io::Error),
}

impl SessionError {
    /// A shell command that fixes the error, when one is known.
    pub fn remediation(&self) -> Option<String> {
        match self {
            SessionError::Provider(ProviderError::ModelNotFound { model }) => {
                Some(format!("ollama pull {model}"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_staged_message() {
        let err = SessionError::from(GitError::NothingStaged);
        assert_eq!(err.to_string(), "no staged changes found");
    }

    #[test]
    fn test_model_not_found_has_remediation() {
        let err = SessionError::from(ProviderError::ModelNotFound {
            model: "llama3.1".to_string(),
        });
        assert_eq!(err.remediation().as_deref(), Some("ollama pull llama3.1"));
    }

    #[test]
    fn test_other_errors_have_no_remediation() {
        let err = SessionError::from(ProviderError::MalformedResponse("eof".to_string()));
        assert!(err.remediation().is_none());
        assert!(err.to_string().contains("failed to parse JSON response"));
    }
}
