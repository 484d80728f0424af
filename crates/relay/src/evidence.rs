use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EvidenceConfig;
use crate::event::AlarmEvent;
use crate::graph;
use crate::metadata::MetadataGateway;
use crate::metrics;
use crate::store::ObjectStore;
use crate::{Error, Result};

pub const DEFAULT_WINDOW_HOURS: i64 = 1;

/// Builds the optional chart link attached to notifications: fetch recent
/// samples, render, upload, link.
pub struct EvidenceBuilder {
    metadata: Arc<dyn MetadataGateway>,
    objects: Arc<dyn ObjectStore>,
    config: EvidenceConfig,
}

impl EvidenceBuilder {
    pub fn new(
        metadata: Arc<dyn MetadataGateway>,
        objects: Arc<dyn ObjectStore>,
        config: EvidenceConfig,
    ) -> Self {
        Self {
            metadata,
            objects,
            config,
        }
    }

    /// Nothing fails past this boundary. Whatever goes wrong is logged and
    /// the notification goes out without a chart.
    pub async fn build(&self, event: &AlarmEvent) -> Option<String> {
        match self.try_build(event).await {
            Ok(link) => Some(link),
            Err(Error::Unsupported(detail)) => {
                metrics::EVIDENCE_FAILURES_TOTAL.inc();
                warn!("alarm {} has no chart: {}", event.detail.alarm_name, detail);
                None
            }
            Err(err) => {
                metrics::EVIDENCE_FAILURES_TOTAL.inc();
                warn!("skipping chart evidence for {}: {}", event.detail.alarm_name, err);
                None
            }
        }
    }

    async fn try_build(&self, event: &AlarmEvent) -> Result<String> {
        let query = event.single_metric_query()?;
        let samples = self
            .metadata
            .get_recent_samples(query, DEFAULT_WINDOW_HOURS)
            .await?;
        debug!("rendering {} samples for {}", samples.len(), event.detail.alarm_name);
        let png = graph::render_samples(&samples)?;
        let key = self.object_key();
        info!("uploading {} byte chart to {}{}", png.len(), self.config.bucket, key);
        self.objects.write_bytes(&self.config.bucket, &key, png).await?;
        Ok(format!("{}{}", self.config.image_host, key))
    }

    fn object_key(&self) -> String {
        let now = Utc::now();
        format!(
            "/{}/{}/{}/{}/{}.png",
            self.config.prefix,
            now.year(),
            now.month(),
            now.day(),
            Uuid::new_v4()
        )
    }
}
