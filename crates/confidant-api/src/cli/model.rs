//! `confidant download-model`: fetch the GGUF file the engine loads.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use confidant_infra::model::download::{download_model, huggingface_url};
use confidant_types::config::ModelConfig;

pub async fn download(
    model: &ModelConfig,
    repo: Option<String>,
    file: Option<String>,
    force: bool,
) -> Result<()> {
    let dest = &model.path;
    if dest.exists() && !force {
        println!(
            "  {} Model already present at {} (use {} to download again)",
            style("i").blue().bold(),
            style(dest.display()).cyan(),
            style("--force").yellow()
        );
        return Ok(());
    }

    let repo = repo.unwrap_or_else(|| model.repo_id.clone());
    let file = file.unwrap_or_else(|| model.filename.clone());
    let url = huggingface_url(&repo, &file);

    println!(
        "  {} Downloading {} from {}",
        style("↓").bold(),
        style(&file).cyan(),
        style(&repo).dim()
    );

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("=> "),
    );

    let client = reqwest::Client::new();
    let result = download_model(&client, &url, dest, |done, total| {
        if let Some(total) = total {
            bar.set_length(total);
        }
        bar.set_position(done);
    })
    .await;

    match result {
        Ok(bytes) => {
            bar.finish_and_clear();
            println!(
                "  {} Saved {} ({:.1} MiB)",
                style("✓").green().bold(),
                style(dest.display()).cyan(),
                bytes as f64 / (1024.0 * 1024.0)
            );
            Ok(())
        }
        Err(e) => {
            bar.abandon();
            Err(e.into())
        }
    }
}
