use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 对象存储后端配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// 后端类型："local" 或 "gcs"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// 本地后端的根目录
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// GCS bucket 名称
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// GCS API 地址（可替换为模拟服务）
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// 存放 GCS access token 的环境变量名
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            root: None,
            bucket: None,
            endpoint: default_endpoint(),
            access_token_env: default_access_token_env(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_access_token_env() -> String {
    "GCS_ACCESS_TOKEN".to_string()
}
