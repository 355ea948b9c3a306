use anyhow::{Context, Result};

use registry_local::{ModelRegistry, StatementCatalog};
use registry_storage::{create_backend, BlobStore};

use crate::cli::MetadataArgs;
use crate::config::AppConfig;
use registry_types::{ModelUpdate, NewModel};

/// 根据配置构建注册表（确保目录和表存在）
pub async fn open_registry(config: &AppConfig) -> Result<ModelRegistry> {
    config.ensure_dirs()?;

    let storage = config.resolve_storage();
    let backend = create_backend(&storage)
        .with_context(|| format!("Failed to create '{}' storage backend", storage.provider))?;

    let blobs = BlobStore::new(backend)
        .with_timeout(config.blob_timeout())
        .with_default_download_dir(&config.download_dir);

    let catalog = match &config.queries_path {
        Some(path) => StatementCatalog::from_file(path),
        None => StatementCatalog::embedded(),
    }
    .context("Failed to load SQL statements")?;

    let registry = ModelRegistry::new(config.get_database_path(), catalog, blobs);
    registry
        .create_tables()
        .await
        .with_context(|| format!("Failed to prepare {}", config.get_database_path().display()))?;

    Ok(registry)
}

/// 将命令行参数应用到插入请求（未提供的字段保留默认值）
pub fn apply_metadata(model: &mut NewModel, metadata: MetadataArgs) {
    let MetadataArgs {
        description,
        framework,
        framework_version,
        training_data,
        hyperparameters,
        evaluation_metrics,
        author,
        features,
        status,
    } = metadata;

    let targets = [
        (description, &mut model.description),
        (framework, &mut model.framework),
        (framework_version, &mut model.framework_version),
        (training_data, &mut model.training_data),
        (hyperparameters, &mut model.hyperparameters),
        (evaluation_metrics, &mut model.evaluation_metrics),
        (author, &mut model.author),
        (features, &mut model.features),
    ];
    for (value, target) in targets {
        if let Some(value) = value {
            *target = value;
        }
    }

    if let Some(status) = status {
        model.status = status;
    }
}

impl From<MetadataArgs> for ModelUpdate {
    fn from(metadata: MetadataArgs) -> Self {
        Self {
            description: metadata.description,
            framework: metadata.framework,
            framework_version: metadata.framework_version,
            training_data: metadata.training_data,
            hyperparameters: metadata.hyperparameters,
            evaluation_metrics: metadata.evaluation_metrics,
            author: metadata.author,
            features: metadata.features,
            status: metadata.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_types::ModelStatus;

    #[test]
    fn test_apply_metadata_keeps_defaults() {
        let mut model = NewModel::new("RF1", "1.0", "model.joblib");
        apply_metadata(
            &mut model,
            MetadataArgs {
                framework: Some("sklearn".to_string()),
                status: Some(ModelStatus::Deployed),
                ..Default::default()
            },
        );

        assert_eq!(model.framework, "sklearn");
        assert_eq!(model.status, ModelStatus::Deployed);
        assert_eq!(model.description, "No description.");
    }

    #[tokio::test]
    async fn test_open_registry_with_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            registry_path: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let registry = open_registry(&config).await.unwrap();
        assert_eq!(registry.count().await.unwrap(), 0);
        assert!(dir.path().join("model_registry.db").exists());
    }
}
