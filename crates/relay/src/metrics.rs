use lazy_static::lazy_static;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

lazy_static! {
    pub static ref EVENTS_PROCESSED_TOTAL: IntCounter = register_int_counter!(
        "alarmrelay_events_processed_total",
        "Total number of alarm transition events dispatched to completion."
    )
    .unwrap();
    pub static ref EVENTS_FAILED_TOTAL: IntCounter = register_int_counter!(
        "alarmrelay_events_failed_total",
        "Total number of alarm transition events that ended in a fatal error."
    )
    .unwrap();
    pub static ref CHAT_MESSAGES_TOTAL: IntCounter = register_int_counter!(
        "alarmrelay_chat_messages_total",
        "Total number of chat notifications delivered."
    )
    .unwrap();
    pub static ref PAGES_SUBMITTED_TOTAL: IntCounter = register_int_counter!(
        "alarmrelay_pages_submitted_total",
        "Total number of paging events submitted."
    )
    .unwrap();
    pub static ref PAGES_SUPPRESSED_TOTAL: IntCounter = register_int_counter!(
        "alarmrelay_pages_suppressed_total",
        "Total number of paging submissions skipped by the suppression tag."
    )
    .unwrap();
    pub static ref EVIDENCE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "alarmrelay_evidence_failures_total",
        "Total number of notifications that went out without chart evidence."
    )
    .unwrap();
}

/// Gathers everything in the default registry in text exposition format.
pub fn gather_metrics() -> String {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics are not valid UTF-8")
}
