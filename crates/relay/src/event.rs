use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SUPPRESS_PAGING_TAG_KEY;
use crate::{Error, Result};

pub type TagMap = HashMap<String, String>;

/// An alarm state-change notification as delivered by the event bus.
///
/// Decoding is tolerant: unknown keys are ignored and missing keys take
/// their default value, so envelope additions upstream do not break older
/// routers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmEvent {
    pub account: String,
    pub version: String,
    pub time: String,
    pub source: String,
    pub resources: Vec<String>,
    pub region: String,
    pub id: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    pub detail: AlarmDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmDetail {
    #[serde(rename = "alarmName")]
    pub alarm_name: String,
    pub state: StateSnapshot,
    #[serde(rename = "previousState")]
    pub previous_state: StateSnapshot,
    pub configuration: AlarmConfiguration,
    /// Resource tags. Not part of the wire payload; injected from a live
    /// lookup exactly once, before any routing decision.
    #[serde(skip)]
    pub tags: TagMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSnapshot {
    pub value: String,
    pub timestamp: String,
    #[serde(rename = "reasonData")]
    pub reason_data: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfiguration {
    pub metrics: Vec<MetricQuery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricQuery {
    pub id: String,
    #[serde(rename = "returnData")]
    pub return_data: bool,
    #[serde(rename = "metricStat")]
    pub metric_stat: MetricStatQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricStatQuery {
    pub stat: String,
    pub period: i64,
    pub metric: MetricIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricIdentity {
    pub namespace: String,
    pub name: String,
    pub dimensions: HashMap<String, String>,
}

/// Names, namespaces, and `key:value` dimensions across an alarm's metric
/// queries, for human-readable summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSummary {
    pub names: Vec<String>,
    pub namespaces: Vec<String>,
    pub dimensions: Vec<String>,
}

impl MetricSummary {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.namespaces.is_empty() && self.dimensions.is_empty()
    }
}

impl AlarmEvent {
    /// The one resource this alarm is about. An event referencing zero or
    /// several resources is malformed, not retryable.
    pub fn alarm_arn(&self) -> Result<&str> {
        if self.resources.len() != 1 {
            return Err(Error::MalformedEvent(format!(
                "resources in the alarm details must be exactly 1 (got {})",
                self.resources.len()
            )));
        }
        Ok(&self.resources[0])
    }

    /// Deep link to the alarm in the monitoring console.
    pub fn console_link(&self) -> String {
        format!(
            "https://console.aws.amazon.com/cloudwatch/home?region={}#alarmsV2:alarm/{}",
            self.region, self.detail.alarm_name
        )
    }

    /// The alarm's single metric query. Composite alarms carrying more than
    /// one query are explicitly unsupported.
    pub fn single_metric_query(&self) -> Result<&MetricQuery> {
        match self.detail.configuration.metrics.as_slice() {
            [query] => Ok(query),
            [] => Err(Error::MalformedEvent(
                "alarm configuration has no metric queries".to_string(),
            )),
            queries => Err(Error::Unsupported(format!(
                "multiple metric queries (got {})",
                queries.len()
            ))),
        }
    }

    pub fn metric_summary(&self) -> MetricSummary {
        let mut summary = MetricSummary::default();
        for query in &self.detail.configuration.metrics {
            summary.names.push(query.metric_stat.metric.name.clone());
            summary
                .namespaces
                .push(query.metric_stat.metric.namespace.clone());
            for (key, value) in &query.metric_stat.metric.dimensions {
                summary.dimensions.push(format!("{}:{}", key, value));
            }
        }
        // Dimension maps iterate in arbitrary order
        summary.dimensions.sort();
        summary
    }

    /// Whether the resource opted out of paging via the suppression tag.
    pub fn paging_suppressed(&self) -> bool {
        self.detail.tags.get(SUPPRESS_PAGING_TAG_KEY).map(String::as_str) == Some("true")
    }
}
