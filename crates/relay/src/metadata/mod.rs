mod cloudwatch;

pub use cloudwatch::CloudWatchGateway;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::event::{MetricQuery, TagMap};

/// One fetched series of aggregated metric samples, timestamp-aligned with
/// its values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read-side facade over the monitoring system: who owns an alarm and what
/// its metric has been doing lately. No decision logic lives here.
#[async_trait]
pub trait MetadataGateway: Send + Sync {
    async fn get_tags(&self, resource_arn: &str) -> crate::Result<TagMap>;

    async fn get_recent_samples(
        &self,
        query: &MetricQuery,
        window_hours: i64,
    ) -> crate::Result<SampleSet>;
}

/// Sampling window ending at `now` truncated to a whole multiple of the
/// query period. Sub-minute remainders of the period are dropped; a period
/// under a minute leaves `now` untouched.
pub fn sample_window(
    now: DateTime<Utc>,
    period_secs: i64,
    window_hours: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let step = (period_secs / 60) * 60;
    let end = if step > 0 {
        let secs = now.timestamp();
        DateTime::from_timestamp(secs - secs.rem_euclid(step), 0).unwrap_or(now)
    } else {
        now
    };
    (end - Duration::hours(window_hours), end)
}
