mod pagerduty;
mod slack;

pub use pagerduty::PagerDutyClient;
pub use slack::{resolved_blocks, triggered_blocks, SlackClient};

use async_trait::async_trait;
use serde_json::Value;

use crate::classify::TransitionAction;
use crate::event::AlarmEvent;

/// Identifiers the chat service hands back for a delivered message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageRef {
    pub channel_id: String,
    pub timestamp: String,
}

/// Rich-formatted chat notifications.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send_formatted(&self, channel: &str, blocks: Vec<Value>) -> crate::Result<MessageRef>;
}

/// Incident paging submissions.
#[async_trait]
pub trait PagingService: Send + Sync {
    async fn submit(
        &self,
        routing_key: &str,
        action: TransitionAction,
        dedup_key: &str,
        event: &AlarmEvent,
    ) -> crate::Result<()>;
}
