//! Layered configuration for the Concierge engine.
//!
//! Precedence: built-in defaults -> config file
//! (~/.config/concierge/config.toml) -> environment variables (CONCIERGE_*)
//! -> CLI flags applied by the caller.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// A (keyword, bonus) pair applied during retrieval scoring.
///
/// When the keyword appears in both the question and an entry's combined
/// text, the bonus is added to that entry's similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBoost {
    /// Acronym or domain keyword, matched case-insensitively.
    pub keyword: String,

    /// Additive score bonus.
    #[serde(default = "default_keyword_bonus")]
    pub bonus: f32,
}

fn default_keyword_bonus() -> f32 {
    0.25
}

/// Retrieval scoring gates and boosts.
///
/// The thresholds are empirically chosen gates, not guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Score at or above which a match is accepted as strong.
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f32,

    /// Score at or above which a match is accepted with lower confidence.
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f32,

    /// Minimum score a cross-topic fallback hit must reach to be accepted.
    #[serde(default = "default_global_floor")]
    pub global_floor: f32,

    /// How many times the canonical question is repeated when composing the
    /// document text an entry's embedding is computed from.
    #[serde(default = "default_question_weight")]
    pub question_weight: usize,

    /// Keyword boost pairs injected into scoring.
    #[serde(default)]
    pub keyword_boosts: Vec<KeywordBoost>,
}

fn default_strong_threshold() -> f32 {
    0.65
}

fn default_medium_threshold() -> f32 {
    0.35
}

fn default_global_floor() -> f32 {
    0.40
}

fn default_question_weight() -> usize {
    5
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            strong_threshold: default_strong_threshold(),
            medium_threshold: default_medium_threshold(),
            global_floor: default_global_floor(),
            question_weight: default_question_weight(),
            keyword_boosts: Vec::new(),
        }
    }
}

impl RetrievalSettings {
    /// Validate threshold ordering and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("strong_threshold", self.strong_threshold),
            ("medium_threshold", self.medium_threshold),
            ("global_floor", self.global_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError(format!("{name} must be in 0.0-1.0, got {value}")));
            }
        }
        if self.medium_threshold > self.strong_threshold {
            return Err(ConfigError(format!(
                "medium_threshold ({}) must not exceed strong_threshold ({})",
                self.medium_threshold, self.strong_threshold
            )));
        }
        if self.question_weight == 0 {
            return Err(ConfigError("question_weight must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Dialogue flow settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueSettings {
    /// Phrases that force a reset to the root menu from any state.
    #[serde(default = "default_reset_phrases")]
    pub reset_phrases: Vec<String>,

    /// Phrases that request a transfer to a human agent.
    #[serde(default = "default_transfer_phrases")]
    pub transfer_phrases: Vec<String>,

    /// Retrieval misses tolerated before the escalation offer (cap = 1).
    #[serde(default = "default_retry_cap")]
    pub retry_cap: u8,

    /// Catch-all topic label the classifier may fall back to. Searches
    /// against this label are skipped in the duel.
    #[serde(default = "default_catch_all_topic")]
    pub catch_all_topic: String,

    /// Sector used for escalation when the session has no context.
    #[serde(default = "default_sector")]
    pub default_sector: String,
}

fn default_reset_phrases() -> Vec<String> {
    ["hi", "hello", "hey", "menu", "start", "back", "exit"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_transfer_phrases() -> Vec<String> {
    ["transfer", "agent", "human", "attendant"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_retry_cap() -> u8 {
    1
}

fn default_catch_all_topic() -> String {
    "Other".to_string()
}

fn default_sector() -> String {
    "General Support".to_string()
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            reset_phrases: default_reset_phrases(),
            transfer_phrases: default_transfer_phrases(),
            retry_cap: default_retry_cap(),
            catch_all_topic: default_catch_all_topic(),
            default_sector: default_sector(),
        }
    }
}

/// Language model collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Model used for classification, privacy and verification calls.
    #[serde(default = "default_triage_model")]
    pub triage_model: String,

    /// Model used for answer rewriting.
    #[serde(default = "default_rewrite_model")]
    pub rewrite_model: String,

    /// API key; normally injected through CONCIERGE_LLM_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for an OpenAI-compatible endpoint.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Attempt cap for rate-limited calls before degrading.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_triage_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_rewrite_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_retries() -> u32 {
    3
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            triage_model: default_triage_model(),
            rewrite_model: default_rewrite_model(),
            api_key: None,
            api_base_url: None,
            max_retries: default_max_retries(),
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API key; normally injected through CONCIERGE_EMBEDDING_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for an OpenAI-compatible endpoint.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            api_key: None,
            api_base_url: None,
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConciergeConfig {
    /// Path to the knowledge base TOML file.
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: String,

    /// Path to the menu tree TOML file.
    #[serde(default = "default_menu_path")]
    pub menu_path: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retrieval gates and boosts.
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Dialogue flow settings.
    #[serde(default)]
    pub dialogue: DialogueSettings,

    /// Language model collaborator settings.
    #[serde(default)]
    pub llm: LlmSettings,

    /// Embedding service settings.
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "concierge")
}

fn default_knowledge_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("knowledge.toml"))
        .unwrap_or_else(|| PathBuf::from("./knowledge.toml"))
        .to_string_lossy()
        .to_string()
}

fn default_menu_path() -> String {
    project_dirs()
        .map(|p| p.config_dir().join("menu.toml"))
        .unwrap_or_else(|| PathBuf::from("./menu.toml"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            menu_path: default_menu_path(),
            log_level: default_log_level(),
            retrieval: RetrievalSettings::default(),
            dialogue: DialogueSettings::default(),
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl ConciergeConfig {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/concierge/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CONCIERGE_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = project_dirs()
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONCIERGE")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError(e.to_string()))?;

        let settings: ConciergeConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError(e.to_string()))?;

        settings.retrieval.validate()?;
        Ok(settings)
    }
}
