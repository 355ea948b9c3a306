use thiserror::Error;

use crate::db::CatalogError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Model '{name}' version '{version}' already exists")]
    AlreadyExists { name: String, version: String },

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RegistryError {
    /// 将 UNIQUE 约束冲突转换为 AlreadyExists，其他约束保持原样
    pub(crate) fn from_insert(err: rusqlite::Error, name: &str, version: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::AlreadyExists {
                    name: name.to_string(),
                    version: version.to_string(),
                }
            }
            _ => Self::Store(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn insert_error(conn: &Connection, sql: &str) -> RegistryError {
        let err = conn.execute(sql, []).unwrap_err();
        RegistryError::from_insert(err, "RF1", "1.0")
    }

    #[test]
    fn test_only_unique_violation_means_already_exists() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE models (
                name TEXT NOT NULL,
                version TEXT NOT NULL,
                score INTEGER CHECK (score >= 0),
                UNIQUE(name, version)
            );
            INSERT INTO models (name, version) VALUES ('RF1', '1.0');",
        )
        .unwrap();

        let duplicate = insert_error(&conn, "INSERT INTO models (name, version) VALUES ('RF1', '1.0')");
        assert!(matches!(duplicate, RegistryError::AlreadyExists { .. }));
        assert_eq!(duplicate.to_string(), "Model 'RF1' version '1.0' already exists");

        let not_null = insert_error(&conn, "INSERT INTO models (name, version) VALUES ('RF2', NULL)");
        assert!(matches!(not_null, RegistryError::Store(_)));

        let check = insert_error(
            &conn,
            "INSERT INTO models (name, version, score) VALUES ('RF3', '1.0', -1)",
        );
        assert!(matches!(check, RegistryError::Store(_)));
    }
}
