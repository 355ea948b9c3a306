//! Google Cloud Storage backend (JSON API)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::path::Path;

use registry_types::ObjectBackend;

use crate::config::BackendConfig;

pub struct GcsBackend {
    client: Client,
    endpoint: Url,
    bucket: String,
    access_token: String,
}

impl GcsBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let bucket = config
            .bucket
            .clone()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing 'bucket' for gcs storage backend"))?;

        let access_token = std::env::var(&config.access_token_env).with_context(|| {
            format!(
                "GCS access token not found in environment variable {}",
                config.access_token_env
            )
        })?;

        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid GCS endpoint: {}", config.endpoint))?;

        // 单次调用不重试；超时由 BlobStore 控制
        let client = Client::builder().build()?;

        tracing::info!(
            "Created GcsBackend: bucket={}, endpoint={}",
            bucket,
            config.endpoint
        );

        Ok(Self {
            client,
            endpoint,
            bucket,
            access_token,
        })
    }

    /// 构建 URL：{endpoint}/{segments...}
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("GCS endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        self.url(&["storage", "v1", "b", &self.bucket, "o", key])
    }

    async fn check(response: Response, action: &str, key: &str) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("GCS {} '{}' failed ({}): {}", action, key, status, error_text);
            anyhow::bail!("GCS {} '{}' failed ({}): {}", action, key, status, error_text);
        }
        Ok(response)
    }
}

#[async_trait]
impl ObjectBackend for GcsBackend {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn put_file(&self, key: &str, source: &Path) -> Result<()> {
        let body = tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read {}", source.display()))?;

        let mut url = self.url(&["upload", "storage", "v1", "b", &self.bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await?;

        Self::check(response, "upload", key).await?;
        Ok(())
    }

    async fn get_file(&self, key: &str, destination: &Path) -> Result<()> {
        let mut url = self.object_url(key)?;
        url.query_pairs_mut().append_pair("alt", "media");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let bytes = Self::check(response, "download", key).await?.bytes().await?;
        tokio::fs::write(destination, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(key)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::check(response, "delete", key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(endpoint: &str) -> GcsBackend {
        GcsBackend {
            client: Client::new(),
            endpoint: Url::parse(endpoint).unwrap(),
            bucket: "models".to_string(),
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_object_url_encodes_key() {
        let gcs = backend("https://storage.googleapis.com");
        let url = gcs.object_url("model__my model__1.0.joblib").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/models/o/model__my%20model__1.0.joblib"
        );
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let config = BackendConfig {
            provider: "gcs".to_string(),
            ..Default::default()
        };
        assert!(GcsBackend::new(&config).is_err());
    }
}
