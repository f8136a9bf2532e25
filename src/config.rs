//! Configuration for Hearth.
//!
//! Everything is resolved once at startup into an explicit struct; nothing
//! reads the environment or config files after that.
//!
//! Search order:
//! 1. Explicit path if provided
//! 2. hearth.yml in current directory
//! 3. ~/.config/hearth/hearth.yml
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HearthError, Result};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// System prompt used when no override file is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert chef recommending delicious and useful recipes. \
     Present only one recipe at a time. If the user doesn't specify what ingredients \
     they have available, assume only basic ingredients are available. \
     Be descriptive in the steps of the recipe, so it is easy to follow. \
     Have variety in your recipes, don't just recommend the same thing over and over. \
     You can manage families, their members, and shopping lists with the tools \
     available to you when the user asks for it.";

/// Top-level configuration for Hearth
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider settings.
    pub llm: LlmConfig,

    /// Storage settings.
    pub storage: StorageConfig,

    /// System prompt settings.
    pub prompt: PromptConfig,
}

impl Config {
    /// Load configuration with fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // Try project config
        let project_config = PathBuf::from("hearth.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from hearth.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load hearth.yml: {}", e);
                }
            }
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("hearth").join("hearth.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| HearthError::Config(format!("Failed to read config file: {}", e)))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| HearthError::Config(format!("Failed to parse config file: {}", e)))?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.is_empty() {
            return Err(HearthError::Config("llm.model must not be empty".to_string()));
        }
        if self.llm.timeout_ms == 0 {
            return Err(HearthError::Config("llm.timeout-ms must be > 0".to_string()));
        }
        Ok(())
    }

    /// Resolve the active system prompt.
    ///
    /// Reads the configured override file when present; falls back to the
    /// default prompt with a logged warning when it is missing or unreadable.
    pub fn resolve_system_prompt(&self) -> String {
        if let Some(path) = &self.prompt.system_prompt_path {
            match fs::read_to_string(path) {
                Ok(content) => return content.trim().to_string(),
                Err(e) => {
                    log::warn!(
                        "System prompt override '{}' could not be read ({}), using default prompt",
                        path.display(),
                        e
                    );
                }
            }
        }
        DEFAULT_SYSTEM_PROMPT.to_string()
    }
}

/// LLM provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier sent with every completion request.
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Chat completions endpoint (OpenAI-compatible).
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Timeout per LLM call in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_ms: 300_000,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hearth")
            .join("hearth.db");
        Self { db_path }
    }
}

/// System prompt settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Optional path to a file overriding the built-in system prompt.
    #[serde(rename = "system-prompt-path")]
    pub system_prompt_path: Option<PathBuf>,
}
