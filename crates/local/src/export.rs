use std::path::Path;

use tracing::debug;

use crate::db::{schema, LabelIndex, MetadataStore, Statement, StatementCatalog};
use crate::error::Result;

/// 标签列的列名
pub const LABELS_COLUMN: &str = "labels";

/// 标签合并时使用的分隔符
pub const LABEL_SEPARATOR: &str = ", ";

/// 将所有模型写入 CSV，返回写入的数据行数
///
/// 表为空时不创建文件并返回 0。
pub fn export_models(
    store: &MetadataStore,
    catalog: &StatementCatalog,
    output: &Path,
) -> Result<usize> {
    let rows = store.query(catalog.get(Statement::SelectAllModels), [])?;
    if rows.is_empty() {
        return Ok(0);
    }

    let columns = schema::column_names(store, catalog)?;
    let index = LabelIndex::new(store, catalog);

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(columns.iter().map(String::as_str).chain([LABELS_COLUMN]))?;

    for row in &rows {
        let mut record = columns
            .iter()
            .map(|column| row.text(column))
            .collect::<Result<Vec<_>>>()?;
        record.push(index.labels_for(row.integer("id")?)?.join(LABEL_SEPARATOR));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!("Exported {} rows to {}", rows.len(), output.display());

    Ok(rows.len())
}
