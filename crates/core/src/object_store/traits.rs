use async_trait::async_trait;

use super::ObjectStoreError;

/// Put/get bytes by key in a bucket. No business logic lives here; keys
/// are decided by callers and each call is independently transactional.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under a key, overwriting any previous content.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    /// Fetch an object by key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
