//! Registry Storage - artifact storage backends
//!
//! `BlobStore` 封装任意 `ObjectBackend`，将传输失败统一转换为布尔结果；
//! 各后端通过 feature 开关启用。

mod blob;
mod config;

#[cfg(feature = "gcs")]
mod gcs;
#[cfg(feature = "local")]
mod localfs;

pub use blob::{BlobStore, DEFAULT_DOWNLOAD_DIR};
pub use config::BackendConfig;
#[cfg(feature = "gcs")]
pub use gcs::GcsBackend;
#[cfg(feature = "local")]
pub use localfs::LocalFsBackend;

use std::sync::Arc;

use registry_types::ObjectBackend;

/// 创建对象存储后端
pub fn create_backend(config: &BackendConfig) -> anyhow::Result<Arc<dyn ObjectBackend>> {
    match config.provider.as_str() {
        #[cfg(feature = "local")]
        "local" => {
            let root = config
                .root
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Missing 'root' for local storage backend"))?;
            Ok(Arc::new(LocalFsBackend::new(root)))
        }
        #[cfg(feature = "gcs")]
        "gcs" => Ok(Arc::new(GcsBackend::new(config)?)),
        other => anyhow::bail!("Unknown or disabled storage provider: {}", other),
    }
}
