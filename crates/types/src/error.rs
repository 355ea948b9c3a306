use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 请求校验错误（在访问任何存储之前返回）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Model name and version must be given.")]
    MissingIdentity,

    #[error("Unknown model status '{0}', expected one of: deployed, archived, under review, special-use")]
    UnknownStatus(String),
}

/// 对象存储传输错误
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Model file '{}' does not exist! Please check the file location.", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Blob operation timed out after {0:?}")]
    Timeout(Duration),
}
