//! In-memory collaborator doubles and canned fixtures shared by the unit
//! and integration tests. Nothing here talks to a network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::classify::TransitionAction;
use crate::event::{
    AlarmConfiguration, AlarmDetail, AlarmEvent, MetricIdentity, MetricQuery, MetricStatQuery,
    StateSnapshot, TagMap,
};
use crate::metadata::{MetadataGateway, SampleSet};
use crate::sinks::{ChatService, MessageRef, PagingService};
use crate::store::{ConfigStore, ObjectStore};
use crate::{Error, Result};

pub const TEST_ALARM_ARN: &str =
    "arn:aws:cloudwatch:us-east-1:1234567890123:alarm:test-service-alarm-abcd";

/// A state-change notification the way the event bus delivers it.
pub const SAMPLE_EVENT_JSON: &str = r#"{
    "account": "1234567890123",
    "version": "0",
    "time": "2020-07-31T06:56:05Z",
    "source": "aws.cloudwatch",
    "resources": ["arn:aws:cloudwatch:us-east-1:1234567890123:alarm:test-service-alarm-abcd"],
    "region": "us-east-1",
    "id": "c4c1c1c9-6542-e61b-6ef0-8c4d36933a92",
    "detail-type": "CloudWatch Alarm State Change",
    "detail": {
        "alarmName": "test-service-alarm-abcd",
        "state": {
            "value": "OK",
            "timestamp": "2020-07-31T06:56:05.606+0000",
            "reasonData": "{\"version\":\"1.0\"}",
            "reason": "Threshold Crossed: 1 out of the last 1 datapoints was not greater than the threshold (90.0)."
        },
        "previousState": {
            "value": "INSUFFICIENT_DATA",
            "timestamp": "2020-07-31T06:51:05.606+0000",
            "reasonData": "{\"version\":\"1.0\"}",
            "reason": "Insufficient Data: 1 datapoint was unknown."
        },
        "configuration": {
            "description": "High CPU Utilization",
            "metrics": [
                {
                    "id": "c4c1c1c9-6542-e61b-6ef0-8c4d36933a92",
                    "metricStat": {
                        "metric": {
                            "namespace": "AWS/EC2",
                            "name": "CPUUtilization",
                            "dimensions": {
                                "AutoScalingGroupName": "test-service"
                            }
                        },
                        "period": 60,
                        "stat": "Average"
                    },
                    "returnData": true
                }
            ]
        }
    }
}"#;

/// An event for the canonical test alarm, with the given current and
/// previous state values.
pub fn alarm_event(current: &str, previous: &str) -> AlarmEvent {
    AlarmEvent {
        account: "1234567890123".to_string(),
        version: "0".to_string(),
        time: "2020-07-31T06:56:05Z".to_string(),
        source: "aws.cloudwatch".to_string(),
        resources: vec![TEST_ALARM_ARN.to_string()],
        region: "us-east-1".to_string(),
        id: "c4c1c1c9-6542-e61b-6ef0-8c4d36933a92".to_string(),
        detail_type: "CloudWatch Alarm State Change".to_string(),
        detail: AlarmDetail {
            alarm_name: "test-service-alarm-abcd".to_string(),
            state: StateSnapshot {
                value: current.to_string(),
                timestamp: "2020-07-31T06:56:05.606+0000".to_string(),
                reason_data: "{\"version\":\"1.0\"}".to_string(),
                reason: "Threshold Crossed: 1 out of the last 1 datapoints was greater than the threshold (90.0)."
                    .to_string(),
            },
            previous_state: StateSnapshot {
                value: previous.to_string(),
                timestamp: "2020-07-31T06:51:05.606+0000".to_string(),
                reason_data: "{\"version\":\"1.0\"}".to_string(),
                reason: "Insufficient Data: 1 datapoint was unknown.".to_string(),
            },
            configuration: AlarmConfiguration {
                metrics: vec![MetricQuery {
                    id: "c4c1c1c9-6542-e61b-6ef0-8c4d36933a92".to_string(),
                    return_data: true,
                    metric_stat: MetricStatQuery {
                        stat: "Average".to_string(),
                        period: 60,
                        metric: MetricIdentity {
                            namespace: "AWS/EC2".to_string(),
                            name: "CPUUtilization".to_string(),
                            dimensions: HashMap::from([(
                                "AutoScalingGroupName".to_string(),
                                "test-service".to_string(),
                            )]),
                        },
                    },
                }],
            },
            tags: TagMap::new(),
        },
    }
}

/// Six five-minute samples, enough to render a real chart.
pub fn sample_set() -> SampleSet {
    let base = Utc.with_ymd_and_hms(2020, 10, 30, 15, 0, 0).unwrap();
    let values = vec![15.0, 3.0, 11.0, 9.0, 17.0, 15.0];
    SampleSet {
        timestamps: (0..values.len())
            .map(|i| base + Duration::minutes(5 * i as i64))
            .collect(),
        values,
    }
}

/// Metadata gateway answering from fixed tables.
#[derive(Default)]
pub struct MemoryGateway {
    pub tags: HashMap<String, TagMap>,
    pub sample_data: Option<SampleSet>,
    pub fail_tags: bool,
    pub fail_samples: bool,
}

impl MemoryGateway {
    pub fn tags_for(mut self, arn: &str, entries: &[(&str, &str)]) -> Self {
        let tags = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.tags.insert(arn.to_string(), tags);
        self
    }

    pub fn samples(mut self, samples: SampleSet) -> Self {
        self.sample_data = Some(samples);
        self
    }

    pub fn failing_tags(mut self) -> Self {
        self.fail_tags = true;
        self
    }

    pub fn failing_samples(mut self) -> Self {
        self.fail_samples = true;
        self
    }
}

#[async_trait]
impl MetadataGateway for MemoryGateway {
    async fn get_tags(&self, resource_arn: &str) -> Result<TagMap> {
        if self.fail_tags {
            return Err(Error::Metadata("tag lookup refused".to_string()));
        }
        Ok(self.tags.get(resource_arn).cloned().unwrap_or_default())
    }

    async fn get_recent_samples(
        &self,
        _query: &MetricQuery,
        _window_hours: i64,
    ) -> Result<SampleSet> {
        if self.fail_samples {
            return Err(Error::Metadata("metric fetch refused".to_string()));
        }
        self.sample_data
            .clone()
            .ok_or_else(|| Error::Metadata("no samples configured".to_string()))
    }
}

/// Parameter store view over a fixed map.
#[derive(Default)]
pub struct MemoryParams {
    pub values: HashMap<String, String>,
}

impl MemoryParams {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            values: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryParams {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }
}

/// Object store that remembers every write.
#[derive(Default)]
pub struct MemoryObjectStore {
    pub writes: Mutex<Vec<(String, String, Vec<u8>)>>,
    pub fail: bool,
}

impl MemoryObjectStore {
    pub fn refusing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn write_bytes(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        if self.fail {
            return Err(Error::ObjectStore("write refused".to_string()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), bytes));
        Ok(())
    }
}

/// Chat service recording sends instead of talking to the network.
#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(String, Vec<Value>)>>,
    pub fail: bool,
}

impl RecordingChat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ChatService for RecordingChat {
    async fn send_formatted(&self, channel: &str, blocks: Vec<Value>) -> Result<MessageRef> {
        if self.fail {
            return Err(Error::Chat("chat send refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), blocks));
        Ok(MessageRef {
            channel_id: "XVB123123123".to_string(),
            timestamp: "123123123123123".to_string(),
        })
    }
}

/// Paging service recording submissions.
#[derive(Default)]
pub struct RecordingPager {
    pub submitted: Mutex<Vec<(String, TransitionAction, String)>>,
    pub fail: bool,
}

impl RecordingPager {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PagingService for RecordingPager {
    async fn submit(
        &self,
        routing_key: &str,
        action: TransitionAction,
        dedup_key: &str,
        _event: &AlarmEvent,
    ) -> Result<()> {
        if self.fail {
            return Err(Error::Paging("paging submit refused".to_string()));
        }
        self.submitted
            .lock()
            .unwrap()
            .push((routing_key.to_string(), action, dedup_key.to_string()));
        Ok(())
    }
}
