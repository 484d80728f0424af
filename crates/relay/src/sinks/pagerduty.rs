use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::PagingService;
use crate::classify::TransitionAction;
use crate::event::AlarmEvent;
use crate::{Error, Result};

const EVENTS_URL: &str = "https://events.pagerduty.com/v2/enqueue";
const EVENT_SEVERITY: &str = "critical";
const CLIENT_NAME: &str = "alarm-relay";

/// PagerDuty Events v2 client.
pub struct PagerDutyClient {
    http: reqwest::Client,
    events_url: String,
}

impl PagerDutyClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            events_url: EVENTS_URL.to_string(),
        }
    }
}

impl Default for PagerDutyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct EnqueueResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl PagingService for PagerDutyClient {
    async fn submit(
        &self,
        routing_key: &str,
        action: TransitionAction,
        dedup_key: &str,
        event: &AlarmEvent,
    ) -> Result<()> {
        let Some(event_action) = action.paging_action() else {
            warn!("paging action was empty, not submitting anything");
            return Ok(());
        };
        info!(
            "submitting {} to the pager with routing key {}",
            event_action,
            mask_routing_key(routing_key)
        );
        let body = json!({
            "routing_key": routing_key,
            "event_action": event_action,
            "dedup_key": dedup_key,
            "client": CLIENT_NAME,
            "payload": {
                "summary": event.detail.alarm_name,
                "source": dedup_key,
                "severity": EVENT_SEVERITY,
                "timestamp": event.detail.state.timestamp,
                "custom_details": {
                    "event": event,
                    "tags": event.detail.tags,
                },
            },
        });
        let response = self.http.post(&self.events_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Paging(format!("paging API returned {}: {}", status, text)));
        }
        let parsed: EnqueueResponse = response.json().await?;
        info!("paging API answered {}: {}", parsed.status, parsed.message);
        Ok(())
    }
}

/// Routing keys are credentials; logs only ever see the last four characters.
fn mask_routing_key(key: &str) -> String {
    let len = key.chars().count();
    key.chars()
        .enumerate()
        .map(|(i, c)| if i + 4 < len { 'X' } else { c })
        .collect()
}
