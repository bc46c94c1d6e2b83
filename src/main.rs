//! cluster-sentinel binary entry point.

use clap::Parser;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cluster_sentinel::backoff::BackoffConfig;
use cluster_sentinel::config::Config;

#[derive(Parser, Debug)]
#[command(name = "cluster-sentinel")]
#[command(about = "Recovery and rebalance agent for clustered storage membership")]
struct Args {
    /// Base URL of the cluster management API
    #[arg(long, env = "CB_URL")]
    url: String,

    /// Basic-auth username
    #[arg(long, env = "CB_USERNAME")]
    username: String,

    /// Basic-auth password
    #[arg(long, env = "CB_PASSWORD", hide_env_values = true)]
    password: String,

    /// Simulate mutating calls instead of sending them (true/false)
    #[arg(long, env = "DRY_RUN")]
    dry_run: Option<String>,

    /// Seconds between reconciliation ticks
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "60")]
    poll_interval_secs: u64,

    /// Management API request timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,

    /// Length of the thrash-budget window in seconds
    #[arg(long, default_value = "7200")]
    backoff_window_secs: u64,

    /// Cluster-wide intervention attempts tolerated per window
    #[arg(long, default_value = "3")]
    cluster_attempt_limit: u32,

    /// Per-member intervention attempts tolerated per window
    #[arg(long, default_value = "2")]
    node_attempt_limit: u32,

    /// Pause in seconds after a budget is exhausted
    #[arg(long, default_value = "14400")]
    penalty_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let dry_run = match args.dry_run.as_deref() {
        Some(raw) => raw.parse::<bool>().unwrap_or_else(|_| {
            warn!("DRY_RUN empty or not a boolean, defaulting to false");
            false
        }),
        None => false,
    };
    info!(dry_run, "Dry-run mode resolved");

    let window = Duration::from_secs(args.backoff_window_secs);
    let penalty = Duration::from_secs(args.penalty_secs);

    let config = Config {
        base_url: args.url,
        username: args.username,
        password: args.password,
        dry_run,
        poll_interval: Duration::from_secs(args.poll_interval_secs),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        cluster_backoff: BackoffConfig {
            window,
            limit: args.cluster_attempt_limit,
            penalty,
        },
        node_backoff: BackoffConfig {
            window,
            limit: args.node_attempt_limit,
            penalty,
        },
    };

    cluster_sentinel::run(config).await?;

    Ok(())
}
