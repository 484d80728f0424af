use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{ChatService, MessageRef};
use crate::event::AlarmEvent;
use crate::{Error, Result};

const API_URL: &str = "https://slack.com/api/chat.postMessage";
const RESOLVED_PREFIX: &str = ":white_check_mark: (resolved)";
const TRIGGERED_PREFIX: &str = ":rotating_light: (triggered)";

/// Slack Web API client for posting block-formatted messages.
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl SlackClient {
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config("chat API token is empty".to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            token: token.to_string(),
            api_url: API_URL.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    ts: String,
    #[serde(default)]
    error: String,
}

#[async_trait]
impl ChatService for SlackClient {
    async fn send_formatted(&self, channel: &str, blocks: Vec<Value>) -> Result<MessageRef> {
        info!("sending chat message to channel {}", channel);
        let body = json!({
            "channel": channel,
            "blocks": blocks,
        });
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Chat(format!("chat API returned {}: {}", status, text)));
        }
        let parsed: PostMessageResponse = response.json().await?;
        if !parsed.ok {
            return Err(Error::Chat(format!("chat API rejected the message: {}", parsed.error)));
        }
        debug!("chat message accepted: channel {} ts {}", parsed.channel, parsed.ts);
        Ok(MessageRef {
            channel_id: parsed.channel,
            timestamp: parsed.ts,
        })
    }
}

/// Blocks for a newly firing alarm.
pub fn triggered_blocks(event: &AlarmEvent, evidence: Option<&str>) -> Vec<Value> {
    alarm_blocks(event, TRIGGERED_PREFIX, evidence)
}

/// Blocks for an alarm returning to normal.
pub fn resolved_blocks(event: &AlarmEvent, evidence: Option<&str>) -> Vec<Value> {
    alarm_blocks(event, RESOLVED_PREFIX, evidence)
}

fn alarm_blocks(event: &AlarmEvent, prefix: &str, evidence: Option<&str>) -> Vec<Value> {
    let mut blocks = vec![header_block(event, prefix), summary_block(event)];
    if let Some(url) = evidence {
        blocks.push(image_block(url));
    }
    blocks.push(link_block(event));
    blocks
}

fn header_block(event: &AlarmEvent, prefix: &str) -> Value {
    json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!("*{} Cloudwatch Alarm: {}*", prefix, event.detail.alarm_name),
        },
    })
}

fn summary_block(event: &AlarmEvent) -> Value {
    let summary = event.metric_summary();
    let text = if summary.is_empty() {
        "*Metrics*\n`None found`".to_string()
    } else {
        let mut parts = Vec::new();
        if !summary.names.is_empty() {
            parts.push(format!("Names: {}", summary.names.join(",")));
        }
        if !summary.namespaces.is_empty() {
            parts.push(format!("Namespaces: {}", summary.namespaces.join(",")));
        }
        if !summary.dimensions.is_empty() {
            parts.push(format!("Dimensions: {}", summary.dimensions.join(",")));
        }
        format!(
            "*Metrics*: `{}`\nReason: `{}`",
            parts.join(" - "),
            event.detail.state.reason
        )
    };
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text },
    })
}

fn image_block(url: &str) -> Value {
    json!({
        "type": "image",
        "image_url": url,
        "alt_text": "metricdata",
        "title": { "type": "plain_text", "text": "MetricData" },
    })
}

fn link_block(event: &AlarmEvent) -> Value {
    json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!("Link: <{}|AWS Console>", event.console_link()),
        },
    })
}
