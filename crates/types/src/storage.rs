use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// 对象存储后端的统一接口
///
/// 每个方法对应一次远端调用，不做重试；成功/失败语义由上层的 BlobStore 统一处理
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &str;

    /// 将本地文件上传为对象 `key`
    async fn put_file(&self, key: &str, source: &Path) -> Result<()>;

    /// 将对象 `key` 下载到本地文件 `destination`
    async fn get_file(&self, key: &str, destination: &Path) -> Result<()>;

    /// 删除对象 `key`（对象不存在视为失败）
    async fn delete_object(&self, key: &str) -> Result<()>;
}
