use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use super::ObjectStore;
use crate::{Error, Result};

/// Object writes backed by S3. The image bucket may live in another account
/// or region, so the client optionally pins a region and assumes a role.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub async fn new(region: Option<String>, role_arn: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        if let Some(role_arn) = role_arn {
            let provider = aws_config::sts::AssumeRoleProvider::builder(role_arn)
                .session_name("alarm-relay")
                .build()
                .await;
            loader = loader.credentials_provider(provider);
        }
        let aws_config = loader.load().await;
        Self {
            client: aws_sdk_s3::Client::new(&aws_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn write_bytes(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::Private)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| {
                Error::ObjectStore(format!(
                    "writing {} to bucket {}: ({}): {}",
                    key,
                    bucket,
                    err.code().unwrap_or("unknown"),
                    err.message().unwrap_or("no message")
                ))
            })?;
        Ok(())
    }
}
