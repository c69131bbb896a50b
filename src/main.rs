//! Achievement hub - one-shot aggregation runner

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use achievement_hub::{
    bus::spawn_logging_listener,
    config::{Args, RunMode},
    orchestrator::Aggregator,
    ConsoleSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("achievement_hub={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("======================================");
    info!("  Achievement Hub");
    info!("======================================");
    info!("Backend: {}", config.api_url);
    info!("Mode: {:?}", args.mode);
    info!(
        "Sources: {}",
        config
            .active_sources
            .iter()
            .map(ConsoleSource::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("Pacing: {:?}", config.pacing_delay);
    info!("======================================");

    let aggregator = Aggregator::with_default_adapters(&config)?;
    let ctx = aggregator.context().clone();
    let (games_listener, compare_listener) =
        spawn_logging_listener(ctx.registry_bus.clone(), ctx.compare_bus.clone());

    let outcome = match args.mode {
        RunMode::Full => aggregator.trigger_full_sync().await,
        RunMode::Existing => aggregator.trigger_existing_only_refresh().await,
        RunMode::Compare => aggregator.trigger_reconciliation().await,
    };
    if let Err(e) = &outcome {
        warn!("Run finished with failures: {}", e);
    }

    {
        let registry = aggregator.registry().read().await;
        info!(
            consoles = registry.console_count(),
            games = registry.game_count(),
            "Registry"
        );
        for source in &config.active_sources {
            let summary = registry.completion_summary(*source);
            if summary.games == 0 {
                continue;
            }
            info!(
                source = %source,
                games = summary.games,
                earned = summary.earned,
                possible = summary.possible,
                ratio = %format!("{:.1}%", summary.ratio() * 100.0),
                "Completion"
            );
        }
    }

    let compare = aggregator.compare_summary().await;
    if compare.total() > 0 {
        info!(
            ok = compare.ok_count,
            status_different = compare.status_different.len(),
            not_in_local = compare.not_in_local.len(),
            not_in_database = compare.not_in_database.len(),
            "Reconciliation"
        );
        for record in &compare.status_different {
            info!(
                "  {} [{}]: local {:?}, backend {:?}",
                record.name, record.console_name, record.local_status, record.remote_status
            );
        }
    }

    games_listener.abort();
    compare_listener.abort();

    outcome.map_err(Into::into)
}
