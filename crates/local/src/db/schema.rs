use super::catalog::{Statement, StatementCatalog};
use super::connection::MetadataStore;
use crate::error::Result;

/// 创建 model_metadata / labels / model_labels 三张表（幂等）
pub fn create_tables(store: &MetadataStore, catalog: &StatementCatalog) -> Result<()> {
    for statement in [
        Statement::CreateModelTable,
        Statement::CreateLabelTable,
        Statement::CreateModelLabelTable,
    ] {
        store.execute(catalog.get(statement), [])?;
    }
    Ok(())
}

/// model_metadata 的列名（按表定义顺序）
pub fn column_names(store: &MetadataStore, catalog: &StatementCatalog) -> Result<Vec<String>> {
    store
        .query(catalog.get(Statement::SelectModelColumns), [])?
        .iter()
        .map(|row| row.text("name"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_twice() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(&dir.path().join("registry.db")).unwrap();
        let catalog = StatementCatalog::embedded().unwrap();

        create_tables(&store, &catalog).unwrap();
        create_tables(&store, &catalog).unwrap();

        let columns = column_names(&store, &catalog).unwrap();
        assert_eq!(columns.first().map(String::as_str), Some("id"));
        assert_eq!(columns.len(), 16);
        assert!(columns.contains(&"uploaded_file_name".to_string()));
    }
}
