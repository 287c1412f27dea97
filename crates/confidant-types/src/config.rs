//! Configuration types for Confidant.
//!
//! `AppConfig` represents the optional `confidant.toml`. Every field has a
//! default, and the defaults reproduce the fixed constants the service was
//! designed around (10 turns of history, temperature 0.7, 2048-token context).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Location of the SQLite file holding the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Local model artifact, inference engine, and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Pre-downloaded quantized model file (GGUF).
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// Context window the engine loads the model with.
    #[serde(default = "default_context_window")]
    pub context_window: u32,

    /// OpenAI-compatible endpoint of the local engine.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with each request. Defaults to the file stem.
    #[serde(default)]
    pub name: Option<String>,

    /// Bearer token for the engine, if it was started with one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Launch the engine as a child process at startup.
    #[serde(default = "default_spawn_server")]
    pub spawn_server: bool,

    #[serde(default = "default_server_binary")]
    pub server_binary: String,

    /// How long to wait for the engine to answer before giving up at startup.
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Upper bound on one generation. Unset means wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Hugging Face repository the model file is downloaded from.
    #[serde(default = "default_repo_id")]
    pub repo_id: String,

    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models").join(default_filename())
}

fn default_context_window() -> u32 {
    2048
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_spawn_server() -> bool {
    true
}

fn default_server_binary() -> String {
    "llama-server".to_string()
}

fn default_startup_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f64 {
    0.7
}

fn default_repo_id() -> String {
    "Qwen/Qwen2.5-3B-Instruct-GGUF".to_string()
}

fn default_filename() -> String {
    "qwen2.5-3b-instruct-q4_k_m.gguf".to_string()
}

impl ModelConfig {
    /// The model identifier to request: explicit `name`, else the file stem.
    pub fn model_id(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "local".to_string())
        })
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            context_window: default_context_window(),
            base_url: default_base_url(),
            name: None,
            api_key: None,
            spawn_server: default_spawn_server(),
            server_binary: default_server_binary(),
            startup_timeout_secs: default_startup_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: None,
            request_timeout_secs: None,
            repo_id: default_repo_id(),
            filename: default_filename(),
        }
    }
}

/// Chat pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of most recent turns fed back to the model.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Exchanges allowed to run at once against the single loaded model.
    #[serde(default = "default_max_concurrent_exchanges")]
    pub max_concurrent_exchanges: usize,

    /// Overrides the built-in counselor persona.
    #[serde(default)]
    pub persona: Option<String>,
}

fn default_history_limit() -> u32 {
    10
}

fn default_max_concurrent_exchanges() -> usize {
    1
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            max_concurrent_exchanges: default_max_concurrent_exchanges(),
            persona: None,
        }
    }
}
