//! Registry Local - SQLite-backed model registry engine
//!
//! 元数据存放在本地 SQLite，制品交给 `registry-storage` 的 `BlobStore`。

pub mod db;
pub mod error;
pub mod export;
pub mod registry;

pub use db::{CatalogError, LabelIndex, MetadataStore, Row, Statement, StatementCatalog};
pub use error::RegistryError;
pub use registry::{FetchOptions, ModelRegistry, DATABASE_FILE, TIMESTAMP_FORMAT};
