use anyhow::Result;

use registry_types::ModelUpdate;

use crate::cli::MetadataArgs;
use crate::config::AppConfig;
use crate::service::common::open_registry;
use crate::ui::Output;

pub async fn update(
    name: &str,
    version: &str,
    labels: Option<Vec<String>>,
    metadata: MetadataArgs,
    force_local: bool,
    force_global: bool,
) -> Result<bool> {
    let output = Output::new();

    let config = AppConfig::load_with_scope(force_local, force_global)?;
    let scope = AppConfig::get_scope_name(force_local, force_global);
    let registry = open_registry(&config).await?;

    let update = ModelUpdate::from(metadata);

    output.status("Updating", &format!("{} {}", name, version));
    let outcome = registry
        .update(name, version, &update, labels.as_deref())
        .await;
    output.outcome(&outcome);

    if outcome.success {
        output.finish("update", scope);
    }

    Ok(outcome.success)
}
