mod s3;
mod ssm;

pub use s3::S3ObjectStore;
pub use ssm::SsmParameterStore;

use async_trait::async_trait;

/// Key/value parameter lookups: API tokens and per-service routing keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// `Ok(None)` when the key does not exist. Errors are reserved for real
    /// lookup failures such as auth or throttling.
    async fn get_value(&self, key: &str) -> crate::Result<Option<String>>;
}

/// Durable byte storage for rendered chart images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn write_bytes(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> crate::Result<()>;
}
