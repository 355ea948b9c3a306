//! Artifact store: upload/download/delete with boolean outcomes.
//!
//! Wraps an `ObjectBackend` and never lets a transfer failure escape as an
//! error; the registry decides commit or rollback from the returned flag.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use registry_types::{BlobError, ObjectBackend, Outcome};

/// 未指定或指定了文件路径时使用的下载目录
pub const DEFAULT_DOWNLOAD_DIR: &str = "Downloads";

#[derive(Clone)]
pub struct BlobStore {
    backend: Arc<dyn ObjectBackend>,
    timeout: Option<Duration>,
    default_download_dir: PathBuf,
}

impl BlobStore {
    pub fn new(backend: Arc<dyn ObjectBackend>) -> Self {
        Self {
            backend,
            timeout: None,
            default_download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
        }
    }

    /// 为每次远端调用设置超时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_download_dir = dir.into();
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// 上传本地文件
    ///
    /// 本地文件不存在时返回 `BlobError::SourceNotFound`；传输失败返回 `Ok(false)`，
    /// 超时返回 `BlobError::Timeout`。
    pub async fn upload(&self, local_path: &Path, remote_name: &str) -> Result<bool, BlobError> {
        if !tokio::fs::try_exists(local_path).await.unwrap_or(false) {
            return Err(BlobError::SourceNotFound(local_path.to_path_buf()));
        }

        match self.bounded(self.backend.put_file(remote_name, local_path)).await? {
            Ok(()) => {
                info!(
                    "File {} successfully uploaded as {} ({})",
                    local_path.display(),
                    remote_name,
                    self.backend.name()
                );
                Ok(true)
            }
            Err(e) => {
                error!("Exception {:#}. File {} upload failed.", e, local_path.display());
                Ok(false)
            }
        }
    }

    /// 下载对象到本地目录
    ///
    /// `target_dir` 看起来像文件（有扩展名）或为空时，改用默认下载目录。
    pub async fn download(&self, remote_name: &str, target_dir: &Path) -> Outcome {
        let dir = self.effective_download_dir(target_dir);
        if dir != target_dir {
            warn!(
                "'{}' is likely intended to be a file, using {}",
                target_dir.display(),
                dir.display()
            );
        }

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            let message = format!(
                "Exception {}. File {} could not be downloaded to {}",
                e,
                remote_name,
                dir.display()
            );
            error!("{}", message);
            return Outcome::failure(message);
        }

        let destination = dir.join(remote_name);
        let result = match self.bounded(self.backend.get_file(remote_name, &destination)).await {
            Ok(inner) => inner,
            Err(timeout) => Err(timeout.into()),
        };

        match result {
            Ok(()) => {
                let message = format!("File {} downloaded to {}", remote_name, dir.display());
                info!("{}", message);
                Outcome::success(message)
            }
            Err(e) => {
                let message = format!(
                    "Exception {:#}. File {} could not be downloaded to {}",
                    e,
                    remote_name,
                    dir.display()
                );
                error!("{}", message);
                Outcome::failure(message)
            }
        }
    }

    /// 删除对象，失败时返回 false
    pub async fn delete(&self, remote_name: &str) -> bool {
        let result = match self.bounded(self.backend.delete_object(remote_name)).await {
            Ok(inner) => inner,
            Err(timeout) => Err(timeout.into()),
        };

        match result {
            Ok(()) => {
                info!("File {} removed successfully.", remote_name);
                true
            }
            Err(e) => {
                error!("File {} could not be removed. Exception {:#}", remote_name, e);
                false
            }
        }
    }

    /// 下载实际使用的目录：`target_dir` 为空或带扩展名时回退到默认目录
    pub fn effective_download_dir(&self, target_dir: &Path) -> PathBuf {
        if target_dir.as_os_str().is_empty() || target_dir.extension().is_some() {
            return self.default_download_dir.clone();
        }
        target_dir.to_path_buf()
    }

    async fn bounded<F, T>(&self, fut: F) -> Result<T, BlobError>
    where
        F: Future<Output = T>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| BlobError::Timeout(limit)),
            None => Ok(fut.await),
        }
    }
}
