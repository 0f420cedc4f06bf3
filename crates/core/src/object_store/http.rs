//! Network-backed object store client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::HttpObjectStoreConfig;

use super::{ObjectStore, ObjectStoreError};

const ACCESS_KEY_HEADER: &str = "x-access-key";

/// Client for an HTTP blob store with path-style `{url}/{bucket}/{key}`
/// addressing and access-key header authentication.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    access_key: String,
}

impl HttpObjectStore {
    pub fn new(config: &HttpObjectStoreConfig, bucket: &str) -> Result<Self, ObjectStoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            access_key: config.access_key.clone(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let url = self.object_url(key);
        debug!(%url, size = bytes.len(), "uploading object");

        let response = self
            .client
            .put(&url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ObjectStoreError::Backend(format!(
                "put {} returned {}",
                key,
                response.status()
            )));
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let url = self.object_url(key);
        debug!(%url, "fetching object");

        let response = self
            .client
            .get(&url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }

        if !response.status().is_success() {
            return Err(ObjectStoreError::Backend(format!(
                "get {} returned {}",
                key,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
