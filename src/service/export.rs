use std::path::PathBuf;

use anyhow::Result;

use crate::config::AppConfig;
use crate::service::common::open_registry;
use crate::ui::Output;

pub async fn export(target: Option<PathBuf>, force_local: bool, force_global: bool) -> Result<bool> {
    let output = Output::new();

    let config = AppConfig::load_with_scope(force_local, force_global)?;
    let scope = AppConfig::get_scope_name(force_local, force_global);
    let registry = open_registry(&config).await?;
    let count = registry.count().await?;

    output.database_info(registry.db_path(), count, &config.resolve_storage().provider);

    let path = target.unwrap_or_else(|| config.export_path.clone());
    output.status("Exporting", &format!("{} models to {}", count, path.display()));

    let outcome = registry.export(&path).await;
    output.outcome(&outcome);

    if outcome.success {
        output.finish("export", scope);
    }

    Ok(outcome.success)
}
