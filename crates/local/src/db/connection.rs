use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, Params};
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

/// 等待其他写事务释放锁的默认时长
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// 单次注册表操作使用的 SQLite 连接
///
/// 连接随值的生命周期释放；析构时若事务仍未提交则自动回滚，
/// 因此任何提前返回（包括 `?`）都不会留下半完成的写入。
pub struct MetadataStore {
    conn: Connection,
    path: PathBuf,
}

impl MetadataStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        debug!("Opened metadata store: {}", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// 开始写事务（立即获取写锁，等待中的连接不持有任何锁）
    pub fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK")?;
            debug!("Rolled back transaction on {}", self.path.display());
        }
        Ok(())
    }

    /// 执行语句，返回受影响的行数
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// 执行 INSERT，返回新行 id
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.conn.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 执行查询，结果按列名访问
    pub fn query<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = stmt.query_map(params, |row| {
            (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut result = Vec::new();
        for values in rows {
            result.push(Row {
                columns: Arc::clone(&columns),
                values: values?,
            });
        }
        Ok(result)
    }

    /// 显式关闭；未提交的事务会被回滚
    pub fn close(mut self) -> Result<()> {
        self.rollback()
    }
}

impl Drop for MetadataStore {
    fn drop(&mut self) {
        if self.in_transaction() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!("Failed to roll back open transaction: {}", e);
            } else {
                debug!("Open transaction rolled back on release");
            }
        }
    }
}

/// 查询结果中的一行
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// 以文本形式读取列值，NULL 视为空字符串
    pub fn text(&self, column: &str) -> Result<String> {
        match self.require(column)? {
            Value::Null => Ok(String::new()),
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Real(f) => Ok(f.to_string()),
            Value::Blob(b) => Ok(String::from_utf8_lossy(b).into_owned()),
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64> {
        match self.require(column)? {
            Value::Integer(i) => Ok(*i),
            other => Err(RegistryError::InvalidRecord(format!(
                "column '{}' is not an integer: {:?}",
                column, other
            ))),
        }
    }

    fn require(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| RegistryError::InvalidRecord(format!("missing column '{}'", column)))
    }
}
