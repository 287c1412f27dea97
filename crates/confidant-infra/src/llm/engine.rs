//! Lifecycle of the local inference engine.
//!
//! The model is served by llama.cpp's `llama-server`, which loads the GGUF
//! file once and answers OpenAI-style chat completion requests. At startup
//! [`LocalEngine::start`] checks the model file, optionally spawns the server
//! as a child process, and blocks until the endpoint answers. Any failure here
//! is fatal: the HTTP listener is never bound without a loaded model.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use confidant_types::config::ModelConfig;
use reqwest::Url;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Interval between readiness checks.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors raised while bringing the engine up.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("invalid engine url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to spawn '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("inference server exited during startup ({0})")]
    Exited(ExitStatus),

    #[error("inference server at {url} not ready after {waited_secs}s")]
    NotReady { url: String, waited_secs: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Handle on a ready local engine.
///
/// Owns the server child process when it was spawned by us; the child is
/// killed on [`shutdown`](Self::shutdown) or when the handle is dropped.
pub struct LocalEngine {
    base_url: String,
    model_id: String,
    child: Mutex<Option<Child>>,
}

impl LocalEngine {
    /// Bring the engine up according to `config` and wait until it answers.
    pub async fn start(config: &ModelConfig) -> Result<Self, EngineError> {
        if !config.path.is_file() {
            return Err(EngineError::ModelNotFound(config.path.clone()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let mut child = if config.spawn_server {
            Some(spawn_server(config)?)
        } else {
            tracing::info!(url = %base_url, "Using externally managed inference server");
            None
        };

        let timeout = Duration::from_secs(config.startup_timeout_secs);
        let client = reqwest::Client::new();
        wait_ready(&client, &base_url, config.api_key.as_deref(), timeout, child.as_mut()).await?;

        tracing::info!(
            url = %base_url,
            model = %config.path.display(),
            context_window = config.context_window,
            "Inference engine ready"
        );

        Ok(Self {
            base_url,
            model_id: config.model_id(),
            child: Mutex::new(child),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Stop the spawned server, if any. Idempotent.
    pub async fn shutdown(&self) {
        let Some(mut child) = self.child.lock().await.take() else {
            return;
        };
        if let Err(e) = child.kill().await {
            tracing::warn!("Failed to stop inference server: {e}");
        } else {
            tracing::info!("Inference server stopped");
        }
    }
}

/// Command-line arguments for `llama-server` derived from the config.
pub fn server_args(config: &ModelConfig) -> Result<Vec<String>, EngineError> {
    let url = Url::parse(&config.base_url).map_err(|e| EngineError::InvalidBaseUrl {
        url: config.base_url.clone(),
        reason: e.to_string(),
    })?;
    let host = url.host_str().ok_or_else(|| EngineError::InvalidBaseUrl {
        url: config.base_url.clone(),
        reason: "missing host".to_string(),
    })?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| EngineError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: "missing port".to_string(),
        })?;

    let mut args = vec![
        "--model".to_string(),
        config.path.display().to_string(),
        "--ctx-size".to_string(),
        config.context_window.to_string(),
        "--host".to_string(),
        host.to_string(),
        "--port".to_string(),
        port.to_string(),
    ];
    if let Some(name) = &config.name {
        args.extend(["--alias".to_string(), name.clone()]);
    }
    if let Some(key) = &config.api_key {
        args.extend(["--api-key".to_string(), key.clone()]);
    }
    Ok(args)
}

fn spawn_server(config: &ModelConfig) -> Result<Child, EngineError> {
    let args = server_args(config)?;
    tracing::info!(binary = %config.server_binary, ?args, "Spawning inference server");

    Command::new(&config.server_binary)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| EngineError::Spawn {
            binary: config.server_binary.clone(),
            source,
        })
}

/// Poll `{base_url}/models` until it returns success, the child exits, or
/// `timeout` elapses.
async fn wait_ready(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    timeout: Duration,
    mut child: Option<&mut Child>,
) -> Result<(), EngineError> {
    let ready_url = format!("{base_url}/models");
    let started = Instant::now();

    loop {
        if let Some(child) = child.as_deref_mut() {
            if let Some(status) = child.try_wait()? {
                return Err(EngineError::Exited(status));
            }
        }

        let mut request = client.get(&ready_url).timeout(READY_POLL_INTERVAL * 4);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }
        match request.send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            Ok(resp) => tracing::debug!(status = %resp.status(), "Inference server still loading"),
            Err(e) => tracing::debug!("Inference server not reachable yet: {e}"),
        }

        if started.elapsed() >= timeout {
            return Err(EngineError::NotReady {
                url: base_url.to_string(),
                waited_secs: timeout.as_secs(),
            });
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}
