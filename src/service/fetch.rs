use std::path::PathBuf;

use anyhow::{Context, Result};

use registry_local::FetchOptions;

use crate::config::AppConfig;
use crate::service::common::open_registry;
use crate::ui::Output;

pub async fn fetch(
    name: &str,
    version: &str,
    download: bool,
    target: Option<PathBuf>,
    json: bool,
    force_local: bool,
    force_global: bool,
) -> Result<bool> {
    let output = Output::new();

    let config = AppConfig::load_with_scope(force_local, force_global)?;
    let registry = open_registry(&config).await?;

    let options = FetchOptions {
        download,
        download_path: target.unwrap_or_else(|| config.download_dir.clone()),
    };

    if download {
        output.status("Downloading", &format!("{} {}", name, version));
    }

    let fetched = registry.fetch(name, version, &options).await;
    let Some(record) = fetched.record else {
        output.error(&fetched.message);
        return Ok(false);
    };

    if json {
        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize model record")?;
        println!("{}", content);
    } else {
        output.record(&record);
    }

    if download {
        let dir = registry.effective_download_dir(&options.download_path);
        output.note(&format!(
            "Artifact saved to {}",
            dir.join(&record.uploaded_artifact_name).display()
        ));
    }

    Ok(true)
}
