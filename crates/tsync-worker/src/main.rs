//! Transcript sync worker binary.
//!
//! One invocation processes at most one run budget of the ingest queue and
//! exits; scheduling is left to cron or a CI schedule.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tsync_worker::{run_from_env, RunOutcome, WorkerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Another component may already have installed a provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tsync=info,transcript_sync=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let dry_run = std::env::args().skip(1).any(|a| a == "--dry-run");

    let config = WorkerConfig::from_env().with_dry_run(dry_run);
    info!(
        worksheet = %config.worksheet,
        budget = config.max_rows_per_run,
        max_retries = config.max_retries,
        dry_run,
        "Starting transcript-sync"
    );

    match run_from_env(config).await {
        Ok(RunOutcome::Completed(_)) => info!("transcript-sync finished"),
        Ok(RunOutcome::Locked) => info!("transcript-sync skipped, previous run still active"),
        Err(e) if e.is_config_error() => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
