use serde::{Deserialize, Serialize};

/// Tag holding the team that owns the alarmed resource.
pub const DEFAULT_OWNER_TAG_KEY: &str = "owner";
/// Tag holding the service the alarmed resource belongs to.
pub const DEFAULT_SERVICE_NAME_TAG_KEY: &str = "service";
/// Tag that overrides the destination chat channel outright.
pub const CHANNEL_OVERRIDE_TAG_KEY: &str = "alerts:slack_channel";
/// Tag that, when set to "true", disables paging for the resource.
pub const SUPPRESS_PAGING_TAG_KEY: &str = "alerts:suppress_pagerduty";
/// Parameter-store prefix for per-service paging routing keys.
pub const ROUTING_KEY_PARAM_PREFIX: &str = "/service/cw_alert_router/pagerduty/routing_keys/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub routing: RoutingConfig,
    pub evidence: EvidenceConfig,
    /// Parameter-store key holding the chat API token.
    pub chat_token_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub default_channel: String,
    pub default_routing_key: String,
    pub owner_tag_key: String,
    pub service_name_tag_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    pub bucket: String,
    pub bucket_region: Option<String>,
    pub bucket_role_arn: Option<String>,
    pub prefix: String,
    pub image_host: String,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Config {
            routing: RoutingConfig {
                default_channel: std::env::var("DEFAULT_SLACK_CHANNEL")
                    .unwrap_or_else(|_| "".to_string()),
                default_routing_key: std::env::var("PAGERDUTY_DEFAULT_ROUTING_KEY")
                    .unwrap_or_else(|_| "".to_string()),
                // Empty overrides fall back to the stock tag keys
                owner_tag_key: env_or("OWNER_TAG_KEY", DEFAULT_OWNER_TAG_KEY),
                service_name_tag_key: env_or("SERVICE_NAME_TAG_KEY", DEFAULT_SERVICE_NAME_TAG_KEY),
            },
            evidence: EvidenceConfig {
                bucket: std::env::var("IMAGE_BUCKET").unwrap_or_else(|_| "".to_string()),
                bucket_region: std::env::var("IMAGE_BUCKET_REGION")
                    .ok()
                    .filter(|v| !v.is_empty()),
                bucket_role_arn: std::env::var("IMAGE_BUCKET_ROLE_ARN")
                    .ok()
                    .filter(|v| !v.is_empty()),
                prefix: std::env::var("IMAGE_BUCKET_PREFIX")
                    .unwrap_or_else(|_| "cw-alert-router".to_string()),
                image_host: std::env::var("IMAGE_HOST").unwrap_or_else(|_| "".to_string()),
            },
            chat_token_param: std::env::var("SLACK_TOKEN_SSM_KEY").unwrap_or_else(|_| "".to_string()),
        };

        if config.routing.default_channel.is_empty() {
            tracing::warn!("DEFAULT_SLACK_CHANNEL is not set. Alarms without routing tags have no destination.");
        }
        if config.routing.default_routing_key.is_empty() {
            tracing::warn!("PAGERDUTY_DEFAULT_ROUTING_KEY is not set. Paging fails for services without their own routing key.");
        }
        if config.evidence.bucket.is_empty() {
            tracing::warn!("IMAGE_BUCKET is not set. Chart uploads will fail and notifications go out without charts.");
        }

        Ok(config)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing: RoutingConfig {
                default_channel: "".to_string(),
                default_routing_key: "".to_string(),
                owner_tag_key: DEFAULT_OWNER_TAG_KEY.to_string(),
                service_name_tag_key: DEFAULT_SERVICE_NAME_TAG_KEY.to_string(),
            },
            evidence: EvidenceConfig {
                bucket: "".to_string(),
                bucket_region: None,
                bucket_role_arn: None,
                prefix: "cw-alert-router".to_string(),
                image_host: "".to_string(),
            },
            chat_token_param: "".to_string(),
        }
    }
}
