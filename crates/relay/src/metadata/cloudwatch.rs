use async_trait::async_trait;
use aws_sdk_cloudwatch::error::ProvideErrorMetadata;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricDataQuery, MetricStat};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{sample_window, MetadataGateway, SampleSet};
use crate::event::{MetricQuery, TagMap};
use crate::{Error, Result};

/// CloudWatch-backed metadata gateway.
pub struct CloudWatchGateway {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchGateway {
    pub async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_cloudwatch::Client::new(&aws_config),
        }
    }
}

/// Ids embedded in the inbound event are not trusted: the metric-data API
/// requires `^[a-z][a-zA-Z0-9_]*$` and alarm payloads routinely carry UUIDs.
fn query_id(index: usize) -> String {
    format!("m{}", index)
}

fn build_data_query(query: &MetricQuery, index: usize) -> Result<MetricDataQuery> {
    let mut dimensions = Vec::new();
    for (name, value) in &query.metric_stat.metric.dimensions {
        dimensions.push(
            Dimension::builder()
                .name(name.as_str())
                .value(value.as_str())
                .build(),
        );
    }
    let metric = Metric::builder()
        .metric_name(query.metric_stat.metric.name.as_str())
        .namespace(query.metric_stat.metric.namespace.as_str())
        .set_dimensions(Some(dimensions))
        .build();
    let stat = MetricStat::builder()
        .metric(metric)
        .period(query.metric_stat.period as i32)
        .stat(query.metric_stat.stat.as_str())
        .build();
    Ok(MetricDataQuery::builder()
        .id(query_id(index))
        .return_data(query.return_data)
        .metric_stat(stat)
        .build())
}

#[async_trait]
impl MetadataGateway for CloudWatchGateway {
    async fn get_tags(&self, resource_arn: &str) -> Result<TagMap> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_arn(resource_arn)
            .send()
            .await
            .map_err(|err| {
                Error::Metadata(format!(
                    "listing tags for {}: ({}): {}",
                    resource_arn,
                    err.code().unwrap_or("unknown"),
                    err.message().unwrap_or("no message")
                ))
            })?;
        let mut tags = TagMap::new();
        for tag in output.tags() {
            tags.insert(
                tag.key().unwrap_or_default().to_string(),
                tag.value().unwrap_or_default().to_string(),
            );
        }
        debug!("fetched {} tags for {}", tags.len(), resource_arn);
        Ok(tags)
    }

    async fn get_recent_samples(
        &self,
        query: &MetricQuery,
        window_hours: i64,
    ) -> Result<SampleSet> {
        let (start, end) = sample_window(Utc::now(), query.metric_stat.period, window_hours);
        let output = self
            .client
            .get_metric_data()
            .start_time(AwsDateTime::from_secs(start.timestamp()))
            .end_time(AwsDateTime::from_secs(end.timestamp()))
            .metric_data_queries(build_data_query(query, 0)?)
            .send()
            .await
            .map_err(|err| {
                Error::Metadata(format!(
                    "fetching metric data: ({}): {}",
                    err.code().unwrap_or("unknown"),
                    err.message().unwrap_or("no message")
                ))
            })?;

        let results = output.metric_data_results();
        if results.len() != 1 {
            return Err(Error::Metadata(format!(
                "number of metric data results must be exactly 1 (got {})",
                results.len()
            )));
        }
        let mut samples = SampleSet::default();
        for (stamp, value) in results[0].timestamps().iter().zip(results[0].values()) {
            if let Some(stamp) = DateTime::from_timestamp(stamp.secs(), stamp.subsec_nanos()) {
                samples.timestamps.push(stamp);
                samples.values.push(*value);
            }
        }
        debug!("fetched {} samples between {} and {}", samples.len(), start, end);
        Ok(samples)
    }
}
