use anyhow::Result;

use crate::config::AppConfig;
use crate::service::common::open_registry;
use crate::ui::Output;

/// 显式初始化：写入默认配置并创建数据表
/// local: true 表示在本地目录初始化，false 表示在全局目录初始化
pub async fn initialize(local: bool) -> Result<()> {
    let output = Output::new();
    let config_dir = AppConfig::get_registry_dir(local);
    let config_path = config_dir.join("config.toml");
    let scope = AppConfig::get_scope_name(local, !local);

    if config_path.exists() {
        output.resource_action("Found", "config", &config_path);
    } else {
        AppConfig::default().save_to(&config_dir)?;
        output.resource_action("Creating", "config", &config_path);
        output.note("Edit [storage] in the config to use a gcs bucket");
    }

    let config = AppConfig::load_with_scope(local, !local)?;
    let db_path = config.get_database_path();
    let existed = db_path.exists();

    let registry = open_registry(&config).await?;
    output.resource_action(
        if existed { "Found" } else { "Creating" },
        "database",
        &db_path,
    );
    output.database_info(&db_path, registry.count().await?, &config.resolve_storage().provider);

    output.finish("initialization", scope);

    Ok(())
}
