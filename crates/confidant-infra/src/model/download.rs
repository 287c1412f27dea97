//! Fetch the quantized model file from the Hugging Face hub.
//!
//! The body is streamed to `{dest}.part` and renamed into place only after
//! the last byte is flushed, so an interrupted download never leaves a
//! truncated file at the path the engine loads from.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

const HF_BASE_URL: &str = "https://huggingface.co";

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Direct download URL of `file` in the Hugging Face repository `repo`.
pub fn huggingface_url(repo: &str, file: &str) -> String {
    format!("{HF_BASE_URL}/{repo}/resolve/main/{file}")
}

/// Temporary path the body is written to before the final rename.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Stream `url` into `dest`, reporting `(downloaded, total)` after each chunk.
///
/// Returns the number of bytes written. Parent directories are created as
/// needed. On any failure the partial file is removed and `dest` is untouched.
pub async fn download_model(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> Result<u64, DownloadError> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = part_path(dest);
    let result = stream_to_file(client, url, &tmp, &mut on_progress).await;

    match result {
        Ok(written) => {
            tokio::fs::rename(&tmp, dest).await?;
            tracing::info!(url, dest = %dest.display(), bytes = written, "Model downloaded");
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    tmp: &Path,
    on_progress: &mut impl FnMut(u64, Option<u64>),
) -> Result<u64, DownloadError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let total = response.content_length();
    let mut file = tokio::fs::File::create(tmp).await?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        on_progress(downloaded, total);
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(downloaded)
}
