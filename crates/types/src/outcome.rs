use serde::Serialize;

use crate::models::ModelRecord;

/// 变更操作的结果：成功标志 + 可读消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// fetch 的结果：找到的记录（失败时为 None）+ 可读消息
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub record: Option<ModelRecord>,
    pub message: String,
}

impl FetchOutcome {
    pub fn found(record: ModelRecord, message: impl Into<String>) -> Self {
        Self {
            record: Some(record),
            message: message.into(),
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self {
            record: None,
            message: message.into(),
        }
    }
}
