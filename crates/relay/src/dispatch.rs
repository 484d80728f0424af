use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::{classify, TransitionAction};
use crate::config::Config;
use crate::event::AlarmEvent;
use crate::evidence::EvidenceBuilder;
use crate::metadata::MetadataGateway;
use crate::metrics;
use crate::routing;
use crate::sinks::{resolved_blocks, triggered_blocks, ChatService, MessageRef, PagingService};
use crate::store::{ConfigStore, ObjectStore};
use crate::{Error, Result};

/// What one dispatched event amounted to.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub action: TransitionAction,
    pub message: Option<MessageRef>,
    pub evidence: Option<String>,
}

/// Routes one alarm transition through enrichment, chat, and paging.
///
/// Collaborators are trait objects so tests can swap in in-memory doubles;
/// configuration is taken by value and never consulted globally.
pub struct Dispatcher {
    config: Config,
    metadata: Arc<dyn MetadataGateway>,
    params: Arc<dyn ConfigStore>,
    chat: Arc<dyn ChatService>,
    pager: Arc<dyn PagingService>,
    evidence: EvidenceBuilder,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        metadata: Arc<dyn MetadataGateway>,
        params: Arc<dyn ConfigStore>,
        objects: Arc<dyn ObjectStore>,
        chat: Arc<dyn ChatService>,
        pager: Arc<dyn PagingService>,
    ) -> Self {
        let evidence = EvidenceBuilder::new(metadata.clone(), objects, config.evidence.clone());
        Self {
            config,
            metadata,
            params,
            chat,
            pager,
            evidence,
        }
    }

    /// Decodes and dispatches a batch strictly in order. The first fatal
    /// error aborts the remainder.
    pub async fn process_batch(&self, bodies: &[String]) -> Result<()> {
        if bodies.is_empty() {
            return Err(Error::MalformedEvent("no events to process".to_string()));
        }
        for (index, body) in bodies.iter().enumerate() {
            let mut event: AlarmEvent = serde_json::from_str(body).map_err(|err| {
                metrics::EVENTS_FAILED_TOTAL.inc();
                Error::MalformedEvent(format!("decoding event {}: {}", index, err))
            })?;
            match self.dispatch(&mut event).await {
                Ok(outcome) => {
                    metrics::EVENTS_PROCESSED_TOTAL.inc();
                    info!(
                        "dispatched {} for alarm {} ({})",
                        outcome.action, event.detail.alarm_name, index
                    );
                }
                Err(err) => {
                    metrics::EVENTS_FAILED_TOTAL.inc();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    pub async fn dispatch(&self, event: &mut AlarmEvent) -> Result<DispatchOutcome> {
        let arn = event.alarm_arn()?.to_string();

        // Tags drive routing and suppression, so this lookup is not optional.
        let tags = self.metadata.get_tags(&arn).await?;
        event.detail.tags = tags;

        let service = routing::service_name(&event.detail.tags, &self.config.routing);
        let routing_key = routing::resolve_paging_key(
            &service,
            &self.config.routing,
            self.params.as_ref(),
        )
        .await?;
        if routing_key.is_empty() {
            return Err(Error::Config(
                "no paging routing key resolved and no default configured".to_string(),
            ));
        }
        let channel = routing::resolve_channel(&event.detail.tags, &self.config.routing);
        debug!("alarm {} routes to channel {}", event.detail.alarm_name, channel);

        let suppressed = event.paging_suppressed();
        let action = classify(
            &event.detail.previous_state.value,
            &event.detail.state.value,
            false,
        );

        let evidence = self.evidence.build(event).await;

        let message = match action {
            TransitionAction::Resolve => {
                info!("alarm {} resolved, notifying {}", event.detail.alarm_name, channel);
                self.chat
                    .send_formatted(&channel, resolved_blocks(event, evidence.as_deref()))
                    .await?
            }
            TransitionAction::Trigger => {
                info!("alarm {} triggered, notifying {}", event.detail.alarm_name, channel);
                self.chat
                    .send_formatted(&channel, triggered_blocks(event, evidence.as_deref()))
                    .await?
            }
            TransitionAction::Ignore => {
                info!(
                    "ignoring transition {} -> {} for alarm {}",
                    event.detail.previous_state.value,
                    event.detail.state.value,
                    event.detail.alarm_name
                );
                return Ok(DispatchOutcome {
                    action,
                    message: None,
                    evidence,
                });
            }
        };
        metrics::CHAT_MESSAGES_TOTAL.inc();

        // Suppression only gates the pager. The chat message above already
        // went out on the unsuppressed classification.
        let paging_action = classify(
            &event.detail.previous_state.value,
            &event.detail.state.value,
            suppressed,
        );
        match paging_action {
            TransitionAction::Ignore => {
                warn!("paging for alarm {} suppressed by tag", event.detail.alarm_name);
                metrics::PAGES_SUPPRESSED_TOTAL.inc();
            }
            TransitionAction::Trigger | TransitionAction::Resolve => {
                self.pager
                    .submit(&routing_key, paging_action, &arn, event)
                    .await?;
                metrics::PAGES_SUBMITTED_TOTAL.inc();
            }
        }

        Ok(DispatchOutcome {
            action,
            message: Some(message),
            evidence,
        })
    }
}
