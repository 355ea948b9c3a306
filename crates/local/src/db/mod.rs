pub mod catalog;
pub mod connection;
pub mod labels;
pub mod schema;

pub use catalog::{CatalogError, Statement, StatementCatalog};
pub use connection::{MetadataStore, Row, DEFAULT_BUSY_TIMEOUT};
pub use labels::LabelIndex;
