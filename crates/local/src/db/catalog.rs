//! Named SQL statement catalog.
//!
//! Statements live in a flat SQL resource, separated by `;`, each preceded by
//! a `-- <name>` comment line that serves as the lookup key. The bundled
//! resource is embedded at compile time; every expected key is checked when
//! the catalog is built so a missing statement fails at startup, not mid-call.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

const EMBEDDED_QUERIES: &str = include_str!("queries.sql");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("SQL statement '{0}' is missing from the query catalog")]
    MissingStatement(&'static str),

    #[error("Malformed SQL segment (expected a '-- <name>' comment line first): {0}")]
    Malformed(String),

    #[error("Failed to read query file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 注册表使用的全部语句
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    CreateModelTable,
    CreateLabelTable,
    CreateModelLabelTable,
    InsertModel,
    InsertLabelIfAbsent,
    SelectLabelId,
    InsertModelLabel,
    SelectModel,
    SelectModelId,
    SelectModelLabels,
    DeleteModelLabels,
    DeleteModel,
    SelectAllModels,
    CountModels,
    SelectModelColumns,
}

impl Statement {
    pub const ALL: [Statement; 15] = [
        Statement::CreateModelTable,
        Statement::CreateLabelTable,
        Statement::CreateModelLabelTable,
        Statement::InsertModel,
        Statement::InsertLabelIfAbsent,
        Statement::SelectLabelId,
        Statement::InsertModelLabel,
        Statement::SelectModel,
        Statement::SelectModelId,
        Statement::SelectModelLabels,
        Statement::DeleteModelLabels,
        Statement::DeleteModel,
        Statement::SelectAllModels,
        Statement::CountModels,
        Statement::SelectModelColumns,
    ];

    /// 语句在 SQL 资源中的注释键
    pub fn key(&self) -> &'static str {
        match self {
            Self::CreateModelTable => "Create the model_metadata table",
            Self::CreateLabelTable => "Create the labels table",
            Self::CreateModelLabelTable => "Create the model_labels table",
            Self::InsertModel => "Insert model metadata",
            Self::InsertLabelIfAbsent => "Insert label if it does not exist",
            Self::SelectLabelId => "Select label id by label name",
            Self::InsertModelLabel => "Insert model-label relationship",
            Self::SelectModel => "Select model by name and version",
            Self::SelectModelId => "Select model id by name and version",
            Self::SelectModelLabels => "Select labels for a given model",
            Self::DeleteModelLabels => "Delete labels for a given model",
            Self::DeleteModel => "Delete a model by name and version",
            Self::SelectAllModels => "Select all models",
            Self::CountModels => "Count models",
            Self::SelectModelColumns => "Select model_metadata column names",
        }
    }
}

/// 已校验的语句目录：所有 `Statement` 都保证存在
#[derive(Debug, Clone)]
pub struct StatementCatalog {
    texts: HashMap<Statement, String>,
}

impl StatementCatalog {
    /// 使用编译期嵌入的 queries.sql
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_source(EMBEDDED_QUERIES)
    }

    /// 从外部 SQL 文件加载（同样校验所有键）
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Using sql queries from {}", path.display());
        Self::from_source(&source)
    }

    /// 解析并校验 SQL 资源
    pub fn from_source(source: &str) -> Result<Self, CatalogError> {
        let parsed = parse_segments(source)?;

        let mut texts = HashMap::with_capacity(Statement::ALL.len());
        for statement in Statement::ALL {
            let text = parsed
                .get(statement.key())
                .ok_or(CatalogError::MissingStatement(statement.key()))?;
            texts.insert(statement, text.clone());
        }

        Ok(Self { texts })
    }

    /// 获取语句文本
    pub fn get(&self, statement: Statement) -> &str {
        // 构造时已校验所有键
        self.texts.get(&statement).map(String::as_str).unwrap_or_default()
    }
}

/// 按 `;` 切分，每段首行注释作为键，空段忽略
fn parse_segments(source: &str) -> Result<HashMap<String, String>, CatalogError> {
    let mut statements = HashMap::new();

    for segment in source.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let mut lines = segment.lines();
        let header = lines.next().unwrap_or_default().trim();
        let Some(name) = header.strip_prefix("--") else {
            return Err(CatalogError::Malformed(header.to_string()));
        };

        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        if body.is_empty() {
            return Err(CatalogError::Malformed(header.to_string()));
        }

        statements.insert(name.trim().to_string(), body);
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_has_every_statement() {
        let catalog = StatementCatalog::embedded().unwrap();
        for statement in Statement::ALL {
            assert!(!catalog.get(statement).is_empty(), "{:?}", statement);
        }
        assert!(catalog
            .get(Statement::InsertLabelIfAbsent)
            .starts_with("INSERT OR IGNORE INTO labels"));
    }

    #[test]
    fn test_blank_segments_are_tolerated() {
        let parsed = parse_segments("\n;\n  ;-- First\nSELECT 1;\n\n;-- Second\nSELECT 2\n;").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["First"], "SELECT 1");
        assert_eq!(parsed["Second"], "SELECT 2");
    }

    #[test]
    fn test_missing_key_fails_loudly() {
        let source = EMBEDDED_QUERIES.replace("-- Count models", "-- Count all the models");
        let err = StatementCatalog::from_source(&source).unwrap_err();
        assert!(matches!(err, CatalogError::MissingStatement("Count models")));
    }

    #[test]
    fn test_from_file_validates_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.sql");

        std::fs::write(&path, EMBEDDED_QUERIES).unwrap();
        assert!(StatementCatalog::from_file(&path).is_ok());

        std::fs::write(&path, "-- Count models\nSELECT COUNT(*) AS total FROM model_metadata;").unwrap();
        assert!(matches!(
            StatementCatalog::from_file(&path),
            Err(CatalogError::MissingStatement(_))
        ));

        assert!(matches!(
            StatementCatalog::from_file(&dir.path().join("absent.sql")),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn test_segment_without_comment_is_malformed() {
        let err = parse_segments("SELECT 1;").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }
}
