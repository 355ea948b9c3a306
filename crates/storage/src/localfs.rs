//! Local filesystem backend used as an object store (implements `ObjectBackend`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use registry_types::ObjectBackend;

#[derive(Debug, Clone)]
pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 键必须是 root 下的单个文件名
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !key.contains(['/', '\\']) => {
                Ok(self.root.join(key))
            }
            _ => anyhow::bail!("Invalid object key '{}'", key),
        }
    }
}

#[async_trait]
impl ObjectBackend for LocalFsBackend {
    fn name(&self) -> &str {
        "local"
    }

    #[tracing::instrument(level = "trace", skip(self), fields(root = %self.root.display()))]
    async fn put_file(&self, key: &str, source: &Path) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create object directory: {}", dir.display()))?;
        }
        fs::copy(source, &path)
            .await
            .with_context(|| format!("Failed to store object '{}'", key))?;
        Ok(())
    }

    async fn get_file(&self, key: &str, destination: &Path) -> Result<()> {
        let path = self.path_for(key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            anyhow::bail!("Object '{}' not found in {}", key, self.root.display());
        }
        fs::copy(&path, destination)
            .await
            .with_context(|| format!("Failed to copy object '{}' to {}", key, destination.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to remove object '{}'", key))?;
        Ok(())
    }
}
