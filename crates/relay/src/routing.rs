use tracing::{debug, warn};

use crate::config::{RoutingConfig, CHANNEL_OVERRIDE_TAG_KEY, ROUTING_KEY_PARAM_PREFIX};
use crate::event::TagMap;
use crate::store::ConfigStore;
use crate::Result;

/// Owning team for the alarmed resource, or empty when untagged.
pub fn owner(tags: &TagMap, config: &RoutingConfig) -> String {
    tags.get(&config.owner_tag_key).cloned().unwrap_or_default()
}

/// Service the alarmed resource belongs to, or empty when untagged.
pub fn service_name(tags: &TagMap, config: &RoutingConfig) -> String {
    tags.get(&config.service_name_tag_key).cloned().unwrap_or_default()
}

/// Destination chat channel. Total: every tag set resolves to a channel.
///
/// Precedence: explicit override tag, then the owner team's `-alarms`
/// channel, then the configured default.
pub fn resolve_channel(tags: &TagMap, config: &RoutingConfig) -> String {
    if let Some(channel) = tags.get(CHANNEL_OVERRIDE_TAG_KEY) {
        if !channel.is_empty() {
            return channel.clone();
        }
    }
    let owner = owner(tags, config);
    if owner.is_empty() {
        return config.default_channel.clone();
    }
    format!("{}-alarms", owner.to_lowercase())
}

/// Paging routing key for a service. A missing or empty per-service
/// parameter falls back to the default key; only real lookup failures
/// propagate.
pub async fn resolve_paging_key(
    service_name: &str,
    config: &RoutingConfig,
    params: &dyn ConfigStore,
) -> Result<String> {
    if service_name.is_empty() {
        debug!("no service name tag; using the default paging routing key");
        return Ok(config.default_routing_key.clone());
    }
    let normalized = service_name.to_lowercase().replace('-', "_");
    let param = format!("{}{}", ROUTING_KEY_PARAM_PREFIX, normalized);
    match params.get_value(&param).await? {
        Some(value) if !value.is_empty() => {
            debug!("using the routing key from {}", param);
            Ok(value)
        }
        Some(_) => {
            warn!("parameter {} is empty; using the default paging routing key", param);
            Ok(config.default_routing_key.clone())
        }
        None => {
            warn!("no parameter at {}; using the default paging routing key", param);
            Ok(config.default_routing_key.clone())
        }
    }
}
