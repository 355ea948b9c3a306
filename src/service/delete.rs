use anyhow::Result;

use registry_local::FetchOptions;
use registry_types::artifact_name;

use crate::config::AppConfig;
use crate::service::common::open_registry;
use crate::ui::Output;

/// 删除模型及其制品（需要确认）
pub async fn delete(
    name: &str,
    version: &str,
    force_local: bool,
    force_global: bool,
    skip_confirm: bool,
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

    let fetched = registry.fetch(name, version, &FetchOptions::default()).await;
    let Some(record) = fetched.record else {
        output.error(&fetched.message);
        return Ok(false);
    };

    output.record(&record);
    output.warning("this will delete the model and its artifact");
    output.info(&format!("artifact: {}", artifact_name(name, version)));

    if !skip_confirm && !output.confirm("yes")? {
        output.info("Operation cancelled");
        return Ok(true);
    }

    output.begin_operation("Deleting", &format!("{} {}", name, version));
    let outcome = registry.delete(name, version).await;
    output.outcome(&outcome);

    if outcome.success {
        output.finish("deletion", scope);
    }

    Ok(outcome.success)
}
