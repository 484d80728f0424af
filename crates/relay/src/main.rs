use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use alarm_relay::config::Config;
use alarm_relay::dispatch::Dispatcher;
use alarm_relay::metadata::CloudWatchGateway;
use alarm_relay::metrics;
use alarm_relay::sinks::{PagerDutyClient, SlackClient};
use alarm_relay::store::{ConfigStore, S3ObjectStore, SsmParameterStore};

/// Routes monitoring alarm transitions to chat and paging services.
#[derive(Parser, Debug)]
#[command(name = "alarm-relay", version, about)]
struct Args {
    /// File holding one alarm event or a JSON array of them; stdin when omitted
    #[arg(short, long)]
    input: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;

    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
    };
    let bodies = split_batch(&raw)?;

    let params: Arc<dyn ConfigStore> = Arc::new(SsmParameterStore::new().await);

    if config.chat_token_param.is_empty() {
        anyhow::bail!("SLACK_TOKEN_SSM_KEY must be set");
    }
    let token = params
        .get_value(&config.chat_token_param)
        .await?
        .filter(|token| !token.is_empty())
        .with_context(|| format!("chat token parameter {} is unset or empty", config.chat_token_param))?;

    let metadata = Arc::new(CloudWatchGateway::new().await);
    let objects = Arc::new(
        S3ObjectStore::new(
            config.evidence.bucket_region.clone(),
            config.evidence.bucket_role_arn.clone(),
        )
        .await,
    );
    let chat = Arc::new(SlackClient::new(&token)?);
    let pager = Arc::new(PagerDutyClient::new());

    let dispatcher = Dispatcher::new(config, metadata, params, objects, chat, pager);

    info!("processing a batch of {} event(s)", bodies.len());
    dispatcher.process_batch(&bodies).await?;

    debug!("{}", metrics::gather_metrics());
    Ok(())
}

/// Accepts either a single event object or an array of events.
fn split_batch(raw: &str) -> anyhow::Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("parsing input JSON")?;
    let bodies = match value {
        serde_json::Value::Array(items) => items.into_iter().map(|item| item.to_string()).collect(),
        object => vec![object.to_string()],
    };
    Ok(bodies)
}
