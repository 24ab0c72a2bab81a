//! Configuration management for mlchat
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.mlchat/config.toml (or `--config <path>`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::completion::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::completion::GeminiClient;
use crate::conversation::DEFAULT_SYSTEM_INSTRUCTION;
use crate::errors::{ChatError, Result};
use crate::index::QdrantIndexConfig;
use crate::rag::pipeline::validate_config;
use crate::rag::{PipelineConfig, DEFAULT_TOP_K};

/// Complete configuration for mlchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,
    pub index: IndexConfig,
    pub session: SessionConfig,
    pub repl: ReplSettings,
}

/// Hosted model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub url: String,
    pub collection: String,
    pub embedding_model: String,
    pub text_field: String,
    pub top_k: usize,
    pub timeout_secs: u64,
}

/// Per-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub system_instruction: String,
}

/// REPL input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplSettings {
    /// Input-line history file (not the conversation)
    pub history_file: String,
    pub persist_history: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        let qdrant = QdrantIndexConfig::default();
        Self {
            url: qdrant.url,
            collection: qdrant.collection,
            embedding_model: qdrant.embedding_model,
            text_field: qdrant.text_field,
            top_k: DEFAULT_TOP_K,
            timeout_secs: qdrant.timeout_secs,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl Default for ReplSettings {
    fn default() -> Self {
        Self {
            history_file: "~/.mlchat/history".to_string(),
            persist_history: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatError::ConfigError(format!("Failed to read config {}: {}", path.display(), e)))?;

        toml::from_str(&contents)
            .map_err(|e| ChatError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load from ~/.mlchat/config.toml when present, else built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mlchat").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.completion.model.trim().is_empty() {
            return Err(ChatError::ConfigError("completion.model must not be empty".to_string()));
        }

        if self.completion.timeout_secs == 0 {
            return Err(ChatError::ConfigError(
                "completion.timeout_secs must be greater than 0".to_string()
            ));
        }

        if self.index.url.trim().is_empty() {
            return Err(ChatError::ConfigError("index.url must not be empty".to_string()));
        }

        if self.index.collection.trim().is_empty() {
            return Err(ChatError::ConfigError("index.collection must not be empty".to_string()));
        }

        if self.index.text_field.trim().is_empty() {
            return Err(ChatError::ConfigError("index.text_field must not be empty".to_string()));
        }

        validate_config(&self.pipeline())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ChatError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ChatError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ChatError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Index settings in the shape the Qdrant client wants
    pub fn qdrant(&self) -> QdrantIndexConfig {
        QdrantIndexConfig {
            url: self.index.url.clone(),
            collection: self.index.collection.clone(),
            text_field: self.index.text_field.clone(),
            embedding_model: self.index.embedding_model.clone(),
            timeout_secs: self.index.timeout_secs,
        }
    }

    /// Gemini client for the configured model and endpoint
    pub fn completion_client(&self, api_key: Option<String>) -> Result<GeminiClient> {
        GeminiClient::with_config(
            &self.completion.api_base,
            &self.completion.model,
            api_key,
            Duration::from_secs(self.completion.timeout_secs),
        )
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            top_k: self.index.top_k,
        }
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Input history path, if history persistence is on
    pub fn history_path(&self) -> Option<PathBuf> {
        if self.repl.persist_history && !self.repl.history_file.is_empty() {
            Some(Self::expand_path(&self.repl.history_file))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.completion.model, "gemini-2.5-flash-lite");
        assert_eq!(config.index.collection, "chunks");
        assert_eq!(config.index.top_k, 3);
        assert!(config.session.system_instruction.contains("expert on machine learning"));
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_top_k() {
        let mut config = Config::default();
        config.index.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_collection() {
        let mut config = Config::default();
        config.index.collection = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[index]\ncollection = \"hands_on_ml\"\ntop_k = 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.index.collection, "hands_on_ml");
        assert_eq!(config.index.top_k, 5);
        assert_eq!(config.index.text_field, "page_content");
        assert_eq!(config.completion.model, "gemini-2.5-flash-lite");
    }

    #[test]
    fn test_invalid_value_fails_validation_not_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[index]\ntop_k = 0\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.index.top_k, 0);
        assert!(matches!(config.validate(), Err(ChatError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[index\ntop_k = ").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(ChatError::ConfigError(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.toml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.completion.model = "gemini-2.5-pro".to_string();
        config.save(&path).unwrap();

        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.completion.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_history_path_disabled() {
        let mut config = Config::default();
        assert!(config.history_path().is_some());

        config.repl.persist_history = false;
        assert!(config.history_path().is_none());
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = "/absolute/path";
        let expanded = Config::expand_path(path);
        assert_eq!(expanded.to_string_lossy(), path);
    }
}
