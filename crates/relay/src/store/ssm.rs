use async_trait::async_trait;
use aws_sdk_ssm::error::ProvideErrorMetadata;
use tracing::debug;

use super::ConfigStore;
use crate::{Error, Result};

/// Parameter lookups backed by SSM Parameter Store. Secure strings are
/// decrypted transparently.
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_ssm::Client::new(&aws_config),
        }
    }
}

#[async_trait]
impl ConfigStore for SsmParameterStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(true)
            .send()
            .await;
        match response {
            Ok(output) => Ok(output.parameter().and_then(|p| p.value()).map(str::to_string)),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_parameter_not_found() {
                    debug!("parameter {} does not exist", key);
                    return Ok(None);
                }
                Err(Error::ConfigStore {
                    key: key.to_string(),
                    message: format!(
                        "({}): {}",
                        err.code().unwrap_or("unknown"),
                        err.message().unwrap_or("no message")
                    ),
                })
            }
        }
    }
}
