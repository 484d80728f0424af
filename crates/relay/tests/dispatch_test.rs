use std::sync::Arc;

use alarm_relay::classify::TransitionAction;
use alarm_relay::config::{Config, EvidenceConfig, RoutingConfig};
use alarm_relay::dispatch::Dispatcher;
use alarm_relay::testing::{
    alarm_event, sample_set, MemoryGateway, MemoryObjectStore, MemoryParams, RecordingChat,
    RecordingPager, TEST_ALARM_ARN,
};

fn test_config() -> Config {
    Config {
        routing: RoutingConfig {
            default_channel: "default-alarms".to_string(),
            default_routing_key: "default-routing-key".to_string(),
            owner_tag_key: "owner".to_string(),
            service_name_tag_key: "service".to_string(),
        },
        evidence: EvidenceConfig {
            bucket: "test-bucket-123".to_string(),
            bucket_region: Some("eu-west-1".to_string()),
            bucket_role_arn: None,
            prefix: "cw-alert-router".to_string(),
            image_host: "https://test.image.host.com".to_string(),
        },
        chat_token_param: "/service/cw_alert_router/slack/app/oauth/auth_token".to_string(),
    }
}

fn tagged_gateway() -> MemoryGateway {
    MemoryGateway::default()
        .tags_for(TEST_ALARM_ARN, &[("owner", "test"), ("service", "test-service")])
        .samples(sample_set())
}

fn routed_params() -> MemoryParams {
    MemoryParams::with(&[(
        "/service/cw_alert_router/pagerduty/routing_keys/test_service",
        "pagerduty-key-1",
    )])
}

fn dispatcher(
    config: Config,
    gateway: MemoryGateway,
    params: MemoryParams,
    objects: &Arc<MemoryObjectStore>,
    chat: &Arc<RecordingChat>,
    pager: &Arc<RecordingPager>,
) -> Dispatcher {
    Dispatcher::new(
        config,
        Arc::new(gateway),
        Arc::new(params),
        objects.clone(),
        chat.clone(),
        pager.clone(),
    )
}

fn first_block_text(chat: &RecordingChat) -> String {
    let sent = chat.sent.lock().unwrap();
    sent[0].1[0]["text"]["text"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn resolved_transition_notifies_chat_and_pages() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("OK", "ALARM");
    let outcome = relay.dispatch(&mut event).await.unwrap();

    assert_eq!(outcome.action, TransitionAction::Resolve);
    let message = outcome.message.unwrap();
    assert_eq!(message.channel_id, "XVB123123123");

    let sent = chat.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "test-alarms");
    drop(sent);
    assert!(first_block_text(&chat).contains("(resolved)"));

    let submitted = pager.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        *submitted,
        vec![(
            "pagerduty-key-1".to_string(),
            TransitionAction::Resolve,
            TEST_ALARM_ARN.to_string()
        )]
    );

    // The chart went to the bucket and the link points at it.
    let link = outcome.evidence.unwrap();
    let writes = objects.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(link, format!("https://test.image.host.com{}", writes[0].1));
}

#[tokio::test]
async fn triggered_transition_pages_with_the_trigger_action() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("ALARM", "OK");
    let outcome = relay.dispatch(&mut event).await.unwrap();

    assert_eq!(outcome.action, TransitionAction::Trigger);
    assert!(first_block_text(&chat).contains("(triggered)"));
    let submitted = pager.submitted.lock().unwrap();
    assert_eq!(submitted[0].1, TransitionAction::Trigger);
}

#[tokio::test]
async fn suppressed_alarms_still_chat_but_never_page() {
    let gateway = MemoryGateway::default()
        .tags_for(
            TEST_ALARM_ARN,
            &[
                ("owner", "test"),
                ("service", "test-service"),
                ("alerts:suppress_pagerduty", "true"),
            ],
        )
        .samples(sample_set());
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), gateway, routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("ALARM", "OK");
    let outcome = relay.dispatch(&mut event).await.unwrap();

    assert_eq!(outcome.action, TransitionAction::Trigger);
    assert_eq!(chat.sent.lock().unwrap().len(), 1);
    assert!(pager.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_data_recovery_is_ignored_entirely() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("OK", "INSUFFICIENT_DATA");
    let outcome = relay.dispatch(&mut event).await.unwrap();

    assert_eq!(outcome.action, TransitionAction::Ignore);
    assert!(outcome.message.is_none());
    assert!(chat.sent.lock().unwrap().is_empty());
    assert!(pager.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn channel_override_tag_redirects_the_notification() {
    let gateway = MemoryGateway::default()
        .tags_for(
            TEST_ALARM_ARN,
            &[
                ("owner", "test"),
                ("alerts:slack_channel", "war-room"),
            ],
        )
        .samples(sample_set());
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), gateway, MemoryParams::default(), &objects, &chat, &pager);

    let mut event = alarm_event("ALARM", "OK");
    relay.dispatch(&mut event).await.unwrap();

    assert_eq!(chat.sent.lock().unwrap()[0].0, "war-room");
}

#[tokio::test]
async fn untagged_services_fall_back_to_the_default_routing_key() {
    let gateway = MemoryGateway::default()
        .tags_for(TEST_ALARM_ARN, &[("service", "unlisted-service")])
        .samples(sample_set());
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), gateway, MemoryParams::default(), &objects, &chat, &pager);

    let mut event = alarm_event("ALARM", "OK");
    relay.dispatch(&mut event).await.unwrap();

    let submitted = pager.submitted.lock().unwrap();
    assert_eq!(submitted[0].0, "default-routing-key");
    // No owner tag either, so the chat went to the default channel.
    assert_eq!(chat.sent.lock().unwrap()[0].0, "default-alarms");
}

#[tokio::test]
async fn tag_lookup_failure_is_fatal_for_the_event() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(
        test_config(),
        MemoryGateway::default().failing_tags(),
        routed_params(),
        &objects,
        &chat,
        &pager,
    );

    let mut event = alarm_event("ALARM", "OK");
    let result = relay.dispatch(&mut event).await;

    assert!(matches!(result, Err(alarm_relay::Error::Metadata(_))));
    assert!(chat.sent.lock().unwrap().is_empty());
    assert!(pager.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chat_failure_short_circuits_paging() {
    let chat = Arc::new(RecordingChat::failing());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("OK", "ALARM");
    let result = relay.dispatch(&mut event).await;

    assert!(matches!(result, Err(alarm_relay::Error::Chat(_))));
    assert!(pager.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn evidence_failure_degrades_instead_of_blocking() {
    let gateway = MemoryGateway::default()
        .tags_for(TEST_ALARM_ARN, &[("owner", "test"), ("service", "test-service")])
        .failing_samples();
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), gateway, routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("ALARM", "OK");
    let outcome = relay.dispatch(&mut event).await.unwrap();

    assert!(outcome.evidence.is_none());
    let sent = chat.sent.lock().unwrap();
    // Header, summary, link; no image block.
    assert_eq!(sent[0].1.len(), 3);
    drop(sent);
    assert_eq!(pager.submitted.lock().unwrap().len(), 1);
    assert!(objects.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_missing_routing_key_with_no_default_is_fatal() {
    let mut config = test_config();
    config.routing.default_routing_key = "".to_string();
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(
        config,
        MemoryGateway::default().tags_for(TEST_ALARM_ARN, &[("owner", "test")]),
        MemoryParams::default(),
        &objects,
        &chat,
        &pager,
    );

    let mut event = alarm_event("ALARM", "OK");
    let result = relay.dispatch(&mut event).await;

    assert!(matches!(result, Err(alarm_relay::Error::Config(_))));
    assert!(chat.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn batches_process_in_order_and_stop_at_the_first_failure() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let good = serde_json::to_string(&alarm_event("OK", "ALARM")).unwrap();
    let bodies = vec![good, "{not json".to_string()];
    let result = relay.process_batch(&bodies).await;

    assert!(matches!(result, Err(alarm_relay::Error::MalformedEvent(_))));
    // The first event went through before the bad one aborted the batch.
    assert_eq!(chat.sent.lock().unwrap().len(), 1);
    assert_eq!(pager.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_batches_are_rejected() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let result = relay.process_batch(&[]).await;
    assert!(matches!(result, Err(alarm_relay::Error::MalformedEvent(_))));
}

#[tokio::test]
async fn zero_resource_events_are_malformed() {
    let chat = Arc::new(RecordingChat::default());
    let pager = Arc::new(RecordingPager::default());
    let objects = Arc::new(MemoryObjectStore::default());
    let relay = dispatcher(test_config(), tagged_gateway(), routed_params(), &objects, &chat, &pager);

    let mut event = alarm_event("ALARM", "OK");
    event.resources.clear();
    let result = relay.dispatch(&mut event).await;

    assert!(matches!(result, Err(alarm_relay::Error::MalformedEvent(_))));
    assert!(chat.sent.lock().unwrap().is_empty());
    assert!(pager.submitted.lock().unwrap().is_empty());
}
