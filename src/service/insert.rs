use std::path::PathBuf;

use anyhow::Result;

use registry_types::NewModel;

use crate::cli::MetadataArgs;
use crate::config::AppConfig;
use crate::service::common::{apply_metadata, open_registry};
use crate::ui::Output;

pub async fn insert(
    name: String,
    version: String,
    artifact: PathBuf,
    labels: Option<Vec<String>>,
    metadata: MetadataArgs,
    force_local: bool,
    force_global: bool,
) -> Result<bool> {
    let output = Output::new();

    let config = AppConfig::load_with_scope(force_local, force_global)?;
    let scope = AppConfig::get_scope_name(force_local, force_global);
    let registry = open_registry(&config).await?;

    output.database_info(
        registry.db_path(),
        registry.count().await?,
        &config.resolve_storage().provider,
    );

    let mut model = NewModel::new(name, version, artifact);
    apply_metadata(&mut model, metadata);
    if let Some(labels) = labels {
        model.labels = labels;
    }

    output.status("Uploading", &model.artifact_name());
    let outcome = registry.insert(&model).await?;
    output.outcome(&outcome);

    if outcome.success {
        output.finish("insert", scope);
    }

    Ok(outcome.success)
}
