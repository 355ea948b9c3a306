//! Registry Types - shared data model and trait definitions
//!
//! 零重型依赖：模型记录、请求类型、结果类型和对象存储 trait

pub mod error;
pub mod models;
pub mod outcome;
pub mod storage;

pub use error::{BlobError, ValidationError};
pub use models::{
    artifact_name, ModelRecord, ModelStatus, ModelUpdate, NewModel, UpdatableField,
    ARTIFACT_EXTENSION, DEFAULT_LABEL,
};
pub use outcome::{FetchOutcome, Outcome};
pub use storage::ObjectBackend;
