//! Persisted provider configuration.
//!
//! The record lives at `~/.config/smartcommit/config.json` and holds which
//! backend to use plus its credentials. When no record exists yet, `load`
//! returns first-run defaults seeded from `OPENAI_API_KEY`.

use std::env;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ConfigError;
use crate::session::SetupStep;

/// Environment variable holding the default OpenAI credential.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default endpoint of a locally running Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model written into first-run defaults.
pub const FIRST_RUN_OLLAMA_MODEL: &str = "llama3";

/// Model suggested by the setup flow.
pub const SUGGESTED_OLLAMA_MODEL: &str = "llama3.1";

/// Which text-generation backend to talk to.
///
/// Serialized as a plain string (`"openai"`, `"ollama"`). An empty string
/// means no provider has been chosen yet; anything else is kept verbatim so
/// a hand-edited record round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    #[default]
    Unset,
    Other(String),
}

impl ProviderKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Unset => "",
            ProviderKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ProviderKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "openai" => ProviderKind::OpenAi,
            "ollama" => ProviderKind::Ollama,
            "" => ProviderKind::Unset,
            _ => ProviderKind::Other(value),
        }
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Provider selection and credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub ollama_model: String,
    #[serde(default)]
    pub ollama_url: String,
}

impl Config {
    /// Defaults used when no record has been written yet.
    pub fn first_run(env_api_key: Option<String>) -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            openai_api_key: env_api_key.unwrap_or_default(),
            ollama_model: FIRST_RUN_OLLAMA_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
        }
    }

    /// Whether the record is complete enough to build a provider from.
    ///
    /// A missing OpenAI key with `OPENAI_API_KEY` set offers the detected key
    /// instead of starting setup from scratch.
    pub fn readiness(&self, env_api_key: Option<&str>) -> Readiness {
        match self.provider {
            ProviderKind::OpenAi if self.openai_api_key.trim().is_empty() => match env_api_key {
                Some(_) => Readiness::NeedsSetup(SetupStep::ConfirmDetectedKey),
                None => Readiness::NeedsSetup(SetupStep::ChooseProvider),
            },
            ProviderKind::OpenAi => Readiness::Ready,
            ProviderKind::Ollama
                if self.ollama_url.trim().is_empty() || self.ollama_model.trim().is_empty() =>
            {
                Readiness::NeedsSetup(SetupStep::ChooseProvider)
            }
            ProviderKind::Ollama => Readiness::Ready,
            ProviderKind::Unset | ProviderKind::Other(_) => {
                Readiness::NeedsSetup(SetupStep::ChooseProvider)
            }
        }
    }
}

/// Result of [`Config::readiness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NeedsSetup(SetupStep),
}

/// Read the OpenAI credential from the environment, ignoring blank values.
pub fn env_api_key() -> Option<String> {
    env::var(OPENAI_API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Loads and saves the configuration record at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/smartcommit/config.json`.
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(
            home.join(".config").join("smartcommit").join("config.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record, or first-run defaults if there is none.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(ConfigError::Parse),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                Ok(Config::first_run(env_api_key()))
            }
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    /// Write the record atomically (temp file in the same directory, then rename).
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(ConfigError::Write)?;

        let content = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;

        let mut file = NamedTempFile::new_in(&dir).map_err(ConfigError::Write)?;
        file.write_all(content.as_bytes())
            .map_err(ConfigError::Write)?;
        file.persist(&self.path)
            .map_err(|e| ConfigError::Write(e.error))?;

        debug!("Saved config to {}", self.path.display());
        Ok(())
    }
}
