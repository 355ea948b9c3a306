use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rusqlite::params;
use tracing::{debug, error, info, warn};

use registry_storage::{BlobStore, DEFAULT_DOWNLOAD_DIR};
use registry_types::{
    artifact_name, FetchOutcome, ModelRecord, ModelStatus, ModelUpdate, NewModel, Outcome,
    UpdatableField, ValidationError,
};

use crate::db::{
    schema, LabelIndex, MetadataStore, Row, Statement, StatementCatalog, DEFAULT_BUSY_TIMEOUT,
};
use crate::error::{RegistryError, Result};
use crate::export;

/// 注册表数据库文件名
pub const DATABASE_FILE: &str = "model_registry.db";

/// 时间戳格式（本地时间）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// fetch 的下载选项
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub download: bool,
    pub download_path: PathBuf,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            download: false,
            download_path: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
        }
    }
}

impl FetchOptions {
    /// 获取元数据的同时下载制品
    pub fn download_to(path: impl Into<PathBuf>) -> Self {
        Self {
            download: true,
            download_path: path.into(),
        }
    }
}

/// 模型注册表
///
/// 协调元数据库与对象存储的写入：元数据在事务中暂存，
/// 由对象存储的结果决定提交还是回滚。每个操作打开自己的连接，
/// 所有 SQLite 调用都在阻塞线程池上执行，不占用异步执行器。
pub struct ModelRegistry {
    db_path: PathBuf,
    catalog: Arc<StatementCatalog>,
    blobs: BlobStore,
    busy_timeout: Duration,
}

impl ModelRegistry {
    pub fn new(db_path: impl Into<PathBuf>, catalog: StatementCatalog, blobs: BlobStore) -> Self {
        let db_path = db_path.into();
        info!(
            "Using database file {} with {} storage",
            db_path.display(),
            blobs.backend_name()
        );
        Self {
            db_path,
            catalog: Arc::new(catalog),
            blobs,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// 使用内置 SQL 语句创建注册表
    pub fn with_embedded_queries(db_path: impl Into<PathBuf>, blobs: BlobStore) -> Result<Self> {
        Ok(Self::new(db_path, StatementCatalog::embedded()?, blobs))
    }

    /// 等待其他写事务释放锁的最长时间
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// fetch 实际写入制品的目录（不可用时回退到默认下载目录）
    pub fn effective_download_dir(&self, requested: &Path) -> PathBuf {
        self.blobs.effective_download_dir(requested)
    }

    /// 在阻塞线程池上打开连接并执行 `f`
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(MetadataStore, &StatementCatalog) -> Result<T> + Send + 'static,
    {
        let path = self.db_path.clone();
        let catalog = Arc::clone(&self.catalog);
        let busy_timeout = self.busy_timeout;

        tokio::task::spawn_blocking(move || {
            let store = MetadataStore::open_with_timeout(&path, busy_timeout)?;
            f(store, &catalog)
        })
        .await?
    }

    pub async fn create_tables(&self) -> Result<()> {
        self.blocking(|store, catalog| {
            schema::create_tables(&store, catalog).inspect_err(|e| {
                error!("Error creating tables: {}", e);
            })?;
            store.close()
        })
        .await
    }

    pub async fn count(&self) -> Result<i64> {
        self.blocking(|store, catalog| {
            let rows = store.query(catalog.get(Statement::CountModels), [])?;
            rows.first().map(|row| row.integer("total")).unwrap_or(Ok(0))
        })
        .await
    }

    /// 注册新模型
    ///
    /// 身份字段为空时返回 `Err`，此时不会访问任何存储。其余失败都以
    /// `Outcome { success: false, .. }` 返回，元数据不会在上传失败后残留。
    pub async fn insert(&self, model: &NewModel) -> std::result::Result<Outcome, ValidationError> {
        if let Err(e) = model.validate_identity() {
            error!("{}", e);
            return Err(e);
        }

        let (name, version) = (model.name.as_str(), model.version.as_str());
        let artifact = model.artifact_name();

        let staged = {
            let model = model.clone();
            let artifact = artifact.clone();
            self.blocking(move |store, catalog| stage_insert(store, catalog, &model, &artifact))
                .await
        };
        let store = match staged {
            Ok(store) => store,
            Err(e) => {
                let message = format!("Error inserting data into the database: {}", e);
                error!("{}", message);
                return Ok(Outcome::failure(message));
            }
        };

        let upload_error = match self.blobs.upload(&model.artifact_path, &artifact).await {
            Ok(true) => None,
            Ok(false) => Some(format!("upload of {} failed", artifact)),
            Err(e) => Some(e.to_string()),
        };

        if let Some(upload_error) = upload_error {
            if let Err(e) = finish(store, MetadataStore::rollback).await {
                error!("Rollback after upload failure failed: {}", e);
            }
            let message_error =
                format!("Error while uploading file to cloud storage: {}", upload_error);
            let message_warning = format!(
                "Model '{}' version '{}' entry rolled back from the database due to upload failure.",
                name, version
            );
            error!("{}", message_error);
            warn!("{}", message_warning);
            return Ok(Outcome::failure(format!("{} {}", message_error, message_warning)));
        }

        if let Err(e) = finish(store, MetadataStore::commit).await {
            let message = format!("Error inserting data into the database: {}", e);
            error!("{}", message);
            // 上传已成功但提交失败：尽力删除已上传的制品
            if !self.blobs.delete(&artifact).await {
                warn!("Artifact {} is orphaned in {} storage", artifact, self.blobs.backend_name());
            }
            return Ok(Outcome::failure(message));
        }

        let message = format!(
            "Model '{}' version '{}' inserted and uploaded successfully with labels: [{}].",
            name,
            version,
            model.labels.join(", ")
        );
        info!("{}", message);
        Ok(Outcome::success(message))
    }

    /// 查询模型，可选下载制品
    pub async fn fetch(&self, name: &str, version: &str, options: &FetchOptions) -> FetchOutcome {
        let read = {
            let (name, version) = (name.to_string(), version.to_string());
            self.blocking(move |store, catalog| read_record(&store, catalog, &name, &version))
                .await
        };
        let record = match read {
            Ok(Some(record)) => record,
            Ok(None) => {
                let message = format!(
                    "No models found for name '{}' and version '{}'.",
                    name, version
                );
                error!("{}", message);
                return FetchOutcome::missing(message);
            }
            Err(e) => {
                let message = format!("Error fetching data: {}", e);
                error!("{}", message);
                return FetchOutcome::missing(message);
            }
        };

        let message = format!("Model '{}' and version '{}' has been found.", name, version);
        info!("{}", message);

        if options.download {
            let outcome = self
                .blobs
                .download(&record.uploaded_artifact_name, &options.download_path)
                .await;
            if !outcome.success {
                return FetchOutcome::missing(outcome.message);
            }
        }

        FetchOutcome::found(record, message)
    }

    /// 更新字段和/或替换标签
    pub async fn update(
        &self,
        name: &str,
        version: &str,
        update: &ModelUpdate,
        labels: Option<&[String]>,
    ) -> Outcome {
        let fields = update.fields();
        if fields.is_empty() && labels.is_none() {
            let message = "No fields provided for update.".to_string();
            warn!("{}", message);
            return Outcome::failure(message);
        }

        let applied = {
            let (name, version) = (name.to_string(), version.to_string());
            let labels = labels.map(<[String]>::to_vec);
            self.blocking(move |store, catalog| {
                apply_update(store, catalog, &name, &version, &fields, labels.as_deref())
            })
            .await
        };

        match applied {
            Ok(true) => {
                let message = format!("Model '{}' version '{}' updated successfully.", name, version);
                info!("{}", message);
                Outcome::success(message)
            }
            Ok(false) => {
                let message =
                    "Could not find any related model for given model name and version.".to_string();
                warn!("{}", message);
                Outcome::failure(message)
            }
            Err(e) => {
                let message = format!("Error updating data: {}", e);
                error!("{}", message);
                Outcome::failure(message)
            }
        }
    }

    /// 删除模型及其制品
    pub async fn delete(&self, name: &str, version: &str) -> Outcome {
        let staged = {
            let (name, version) = (name.to_string(), version.to_string());
            self.blocking(move |store, catalog| stage_delete(store, catalog, &name, &version))
                .await
        };
        let store = match staged {
            Ok(Some(store)) => store,
            Ok(None) => {
                let message = format!(
                    "Error: No model found with name '{}' and version '{}'.",
                    name, version
                );
                error!("{}", message);
                return Outcome::failure(message);
            }
            Err(e) => {
                let message = format!("Error deleting data: {}", e);
                error!("{}", message);
                return Outcome::failure(message);
            }
        };

        let artifact = artifact_name(name, version);
        if !self.blobs.delete(&artifact).await {
            if let Err(e) = finish(store, MetadataStore::rollback).await {
                error!("Rollback after delete failure failed: {}", e);
            }
            let message_error = format!(
                "Error: Failed to delete model file '{}' from cloud storage.",
                artifact
            );
            let message_warning = "Rolling back database changes.";
            error!("{}", message_error);
            warn!("{}", message_warning);
            return Outcome::failure(format!("{} {}", message_error, message_warning));
        }

        if let Err(e) = finish(store, MetadataStore::commit).await {
            let message = format!("Error deleting data: {}", e);
            error!("{}", message);
            return Outcome::failure(message);
        }

        let message = format!(
            "Model '{}' version '{}' deleted successfully from database and cloud storage.",
            name, version
        );
        info!("{}", message);
        Outcome::success(message)
    }

    /// 导出所有模型到 CSV
    pub async fn export(&self, output: &Path) -> Outcome {
        let result = {
            let output = output.to_path_buf();
            self.blocking(move |store, catalog| export::export_models(&store, catalog, &output))
                .await
        };

        match result {
            Ok(0) => {
                let message = "No data found in the 'model_metadata' table.".to_string();
                error!("{}", message);
                Outcome::failure(message)
            }
            Ok(_) => {
                let message = format!("Data exported successfully to {}", output.display());
                info!("{}", message);
                Outcome::success(message)
            }
            Err(e) => {
                let message = format!("Error exporting data to CSV: {}", e);
                error!("{}", message);
                Outcome::failure(message)
            }
        }
    }
}

/// 在阻塞线程池上结束暂存的事务；连接也在那里释放
async fn finish(
    mut store: MetadataStore,
    end: fn(&mut MetadataStore) -> Result<()>,
) -> Result<()> {
    tokio::task::spawn_blocking(move || end(&mut store)).await?
}

fn stage_insert(
    mut store: MetadataStore,
    catalog: &StatementCatalog,
    model: &NewModel,
    artifact: &str,
) -> Result<MetadataStore> {
    store.begin()?;

    let timestamp = now();
    let model_id = store
        .insert(
            catalog.get(Statement::InsertModel),
            params![
                model.name,
                model.version,
                model.artifact_path.display().to_string(),
                model.description,
                timestamp,
                model.framework,
                model.framework_version,
                model.training_data,
                model.hyperparameters,
                model.evaluation_metrics,
                model.author,
                timestamp,
                artifact,
                model.features,
                model.status.as_str(),
            ],
        )
        .map_err(|e| match e {
            RegistryError::Store(err) => RegistryError::from_insert(err, &model.name, &model.version),
            other => other,
        })?;

    LabelIndex::new(&store, catalog).attach(model_id, &model.labels)?;
    debug!("Staged model row {} for {}", model_id, artifact);

    Ok(store)
}

fn read_record(
    store: &MetadataStore,
    catalog: &StatementCatalog,
    name: &str,
    version: &str,
) -> Result<Option<ModelRecord>> {
    let rows = store.query(catalog.get(Statement::SelectModel), [name, version])?;

    // 按 id 升序取第一行
    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let mut record = record_from_row(row)?;
    record.labels = LabelIndex::new(store, catalog).labels_for(record.id)?;
    Ok(Some(record))
}

/// 返回 false 表示模型不存在（事务随连接释放回滚）
fn apply_update(
    mut store: MetadataStore,
    catalog: &StatementCatalog,
    name: &str,
    version: &str,
    fields: &[(UpdatableField, String)],
    labels: Option<&[String]>,
) -> Result<bool> {
    store.begin()?;

    if !fields.is_empty() {
        let sql = update_statement(fields);
        debug!("SQL query for update ==> {}", sql);

        let timestamp = now();
        let values = fields
            .iter()
            .map(|(_, value)| value.as_str())
            .chain([timestamp.as_str(), name, version]);

        let affected = store.execute(&sql, rusqlite::params_from_iter(values))?;
        if affected == 0 {
            return Ok(false);
        }
    }

    if let Some(labels) = labels {
        let Some(model_id) = find_model_id(&store, catalog, name, version)? else {
            return Ok(false);
        };
        let index = LabelIndex::new(&store, catalog);
        index.unlink_all(model_id)?;
        index.attach(model_id, labels)?;
    }

    store.commit()?;
    Ok(true)
}

fn stage_delete(
    mut store: MetadataStore,
    catalog: &StatementCatalog,
    name: &str,
    version: &str,
) -> Result<Option<MetadataStore>> {
    store.begin()?;

    let Some(model_id) = find_model_id(&store, catalog, name, version)? else {
        return Ok(None);
    };

    LabelIndex::new(&store, catalog).unlink_all(model_id)?;
    store.execute(catalog.get(Statement::DeleteModel), [name, version])?;

    Ok(Some(store))
}

fn find_model_id(
    store: &MetadataStore,
    catalog: &StatementCatalog,
    name: &str,
    version: &str,
) -> Result<Option<i64>> {
    let rows = store.query(catalog.get(Statement::SelectModelId), [name, version])?;
    rows.first().map(|row| row.integer("id")).transpose()
}

/// 列名只来自 `UpdatableField` 白名单，值全部走参数绑定
fn update_statement(fields: &[(UpdatableField, String)]) -> String {
    let set_clause = fields
        .iter()
        .map(|(field, _)| format!("{} = ?", field.column()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE model_metadata SET {}, last_updated = ? WHERE name = ? AND version = ?",
        set_clause
    )
}

fn record_from_row(row: &Row) -> Result<ModelRecord> {
    let status = row.text("status")?;
    let status = status
        .parse::<ModelStatus>()
        .map_err(|e| RegistryError::InvalidRecord(e.to_string()))?;

    Ok(ModelRecord {
        id: row.integer("id")?,
        name: row.text("name")?,
        version: row.text("version")?,
        artifact_path: row.text("file_path")?,
        description: row.text("description")?,
        created_at: row.text("created_at")?,
        framework: row.text("framework")?,
        framework_version: row.text("framework_version")?,
        training_data: row.text("training_data")?,
        hyperparameters: row.text("hyperparameters")?,
        evaluation_metrics: row.text("evaluation_metrics")?,
        author: row.text("model_author")?,
        last_updated: row.text("last_updated")?,
        uploaded_artifact_name: row.text("uploaded_file_name")?,
        features: row.text("features")?,
        status,
        labels: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_statement_uses_whitelisted_columns() {
        let sql = update_statement(&[
            (UpdatableField::Author, "me".to_string()),
            (UpdatableField::Status, "archived".to_string()),
        ]);
        assert_eq!(
            sql,
            "UPDATE model_metadata SET model_author = ?, status = ?, last_updated = ? WHERE name = ? AND version = ?"
        );
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now();
        assert_eq!(ts.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
