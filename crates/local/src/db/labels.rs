use rusqlite::params;

use super::catalog::{Statement, StatementCatalog};
use super::connection::MetadataStore;
use crate::error::{RegistryError, Result};

/// 标签与模型的多对多关联
pub struct LabelIndex<'a> {
    store: &'a MetadataStore,
    catalog: &'a StatementCatalog,
}

impl<'a> LabelIndex<'a> {
    pub fn new(store: &'a MetadataStore, catalog: &'a StatementCatalog) -> Self {
        Self { store, catalog }
    }

    /// 标签不存在时创建
    pub fn ensure(&self, label: &str) -> Result<()> {
        self.store
            .execute(self.catalog.get(Statement::InsertLabelIfAbsent), [label])?;
        Ok(())
    }

    pub fn resolve(&self, label: &str) -> Result<i64> {
        let rows = self
            .store
            .query(self.catalog.get(Statement::SelectLabelId), [label])?;
        match rows.first() {
            Some(row) => row.integer("id"),
            None => Err(RegistryError::InvalidRecord(format!(
                "label '{}' does not exist",
                label
            ))),
        }
    }

    pub fn link(&self, model_id: i64, label_id: i64) -> Result<()> {
        self.store.execute(
            self.catalog.get(Statement::InsertModelLabel),
            params![model_id, label_id],
        )?;
        Ok(())
    }

    /// 删除模型的全部关联，返回删除的数量
    pub fn unlink_all(&self, model_id: i64) -> Result<usize> {
        self.store
            .execute(self.catalog.get(Statement::DeleteModelLabels), [model_id])
    }

    /// 按关联写入顺序返回标签
    pub fn labels_for(&self, model_id: i64) -> Result<Vec<String>> {
        self.store
            .query(self.catalog.get(Statement::SelectModelLabels), [model_id])?
            .iter()
            .map(|row| row.text("label"))
            .collect()
    }

    pub fn attach(&self, model_id: i64, labels: &[String]) -> Result<()> {
        for label in labels {
            self.ensure(label)?;
            let label_id = self.resolve(label)?;
            self.link(model_id, label_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    fn setup() -> (tempfile::TempDir, MetadataStore, StatementCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(&dir.path().join("registry.db")).unwrap();
        let catalog = StatementCatalog::embedded().unwrap();
        schema::create_tables(&store, &catalog).unwrap();
        store
            .execute(
                "INSERT INTO model_metadata (name, version, file_path, created_at, last_updated, uploaded_file_name, status) \
                 VALUES ('m', '1', 'm.joblib', 'now', 'now', 'model__m__1.joblib', 'under review')",
                [],
            )
            .unwrap();
        (dir, store, catalog)
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_attach_keeps_insertion_order_and_collapses_duplicates() {
        let (_dir, store, catalog) = setup();
        let index = LabelIndex::new(&store, &catalog);

        index.attach(1, &labels(&["prod", "cv", "prod"])).unwrap();
        assert_eq!(index.labels_for(1).unwrap(), labels(&["prod", "cv"]));
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let (_dir, store, catalog) = setup();
        let index = LabelIndex::new(&store, &catalog);

        index.ensure("prod").unwrap();
        let first = index.resolve("prod").unwrap();
        index.ensure("prod").unwrap();
        assert_eq!(index.resolve("prod").unwrap(), first);
        assert!(index.resolve("unknown").is_err());
    }

    #[test]
    fn test_unlink_all_keeps_labels() {
        let (_dir, store, catalog) = setup();
        let index = LabelIndex::new(&store, &catalog);

        index.attach(1, &labels(&["a", "b"])).unwrap();
        assert_eq!(index.unlink_all(1).unwrap(), 2);
        assert!(index.labels_for(1).unwrap().is_empty());
        assert!(index.resolve("a").is_ok());
    }
}
