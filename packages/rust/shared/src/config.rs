//! Application configuration for LexDraft.
//!
//! User config lives at `~/.lexdraft/lexdraft.toml`.
//! CLI flags override config file values, which override defaults.
//! Credentials are never stored here: the config only names the env var.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LexDraftError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lexdraft.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lexdraft";

// ---------------------------------------------------------------------------
// Config structs (matching lexdraft.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Request routing and context policy.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Generation collaborator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Retrieval sidecar settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Conversation store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Which classification strategy routes requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Rule-based classification before generation.
    #[default]
    Heuristic,
    /// The generator tags its own output.
    Tagged,
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "heuristic" => Ok(Self::Heuristic),
            "tagged" => Ok(Self::Tagged),
            other => Err(format!(
                "unknown strategy '{other}': expected 'heuristic' or 'tagged'"
            )),
        }
    }
}

/// `[assistant]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Classification strategy.
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Prior turns replayed to the generator (0 = unbounded).
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Longest accepted request, in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_history_turns: default_max_history_turns(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_max_history_turns() -> usize {
    20
}
fn default_max_message_chars() -> usize {
    10_000
}

/// `[generator]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Messages API base URL.
    #[serde(default = "default_generator_url")]
    pub base_url: String,

    /// Model to generate with.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f32,

    /// Upper bound on one generation call; exceeding it fails the turn.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_generator_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_generator_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_model() -> String {
    "claude-3-7-sonnet-20250219".into()
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_generation_timeout() -> u64 {
    120
}

/// `[retrieval]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the retrieval sidecar.
    #[serde(default = "default_sidecar_url")]
    pub sidecar_url: String,

    /// Vector database path handed to the sidecar's `/load`.
    #[serde(default = "default_vector_db_path")]
    pub database_path: String,

    /// Number of passages requested per query.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Timeout for each sidecar call.
    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u64,

    /// Path segment marking the root of local source documents.
    #[serde(default = "default_data_root_marker")]
    pub data_root_marker: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            sidecar_url: default_sidecar_url(),
            database_path: default_vector_db_path(),
            top_k: default_top_k(),
            timeout_secs: default_retrieval_timeout(),
            data_root_marker: default_data_root_marker(),
        }
    }
}

fn default_sidecar_url() -> String {
    "http://127.0.0.1:5050".into()
}
fn default_vector_db_path() -> String {
    "vector_database.pkl".into()
}
fn default_top_k() -> u32 {
    3
}
fn default_retrieval_timeout() -> u64 {
    10
}
fn default_data_root_marker() -> String {
    "data".into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Conversation database file. A leading `~/` expands to the home directory.
    #[serde(default = "default_storage_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    "~/.lexdraft/conversations.db".into()
}

impl StorageConfig {
    /// Resolve `database_path`, expanding a leading `~/`.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        expand_home(&self.database_path)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lexdraft/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| LexDraftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lexdraft/lexdraft.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LexDraftError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LexDraftError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LexDraftError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LexDraftError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LexDraftError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the generator API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.generator.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(LexDraftError::config(format!(
            "generator API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Check that the generator API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    resolve_api_key(config).map(|_| ())
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| LexDraftError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
