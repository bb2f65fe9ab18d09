use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flat_watch::config::{Config, NotificationKind, SourceKind, DEFAULT_CONFIG_PATH};
use flat_watch::models::{ApartmentRecord, Availability, Snapshot};
use flat_watch::monitor::Monitor;
use flat_watch::notify::{LogSink, NotificationSink, WebhookSink};
use flat_watch::scrapers::{BrowserSource, HttpSource, ListingSource};
use flat_watch::stats::aggregate;
use flat_watch::storage::{JsonFileStore, SnapshotStore};

#[derive(Parser)]
#[command(name = "flat-watch", about = "Watch an apartment listing page for openings")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check the page on the configured interval until interrupted (default)
    Watch,
    /// Run a single check and exit
    Once,
    /// Show the stored snapshot and its statistics
    Stats,
    /// Send a test message through the configured notification sink
    TestNotify,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid logging.level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏠 Flat Watch - Apartment Listing Monitor");
    info!("==========================================");
    if !cli.config.exists() {
        warn!("No configuration at {:?}, using defaults", cli.config);
    }

    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileStore::new(&config.storage.file_path));

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            let monitor = build_monitor(&config, store)?;
            monitor
                .run(config.check_interval(), async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                })
                .await;
        }
        Command::Once => {
            let monitor = build_monitor(&config, store)?;
            let report = monitor.run_once().await.context("Monitoring cycle failed")?;
            info!("✅ Done: {} changes detected", report.events.len());
            println!("{}", serde_json::to_string_pretty(&report.statistics)?);
        }
        Command::Stats => {
            let snapshot = store.load().await;
            print_snapshot(&snapshot);
        }
        Command::TestNotify => {
            let sink = build_sink(&config)?;
            sink.send_test()
                .await
                .context("Test notification failed")?;
            info!("✅ Test notification sent via {}", sink.sink_name());
        }
    }

    Ok(())
}

fn build_monitor(config: &Config, store: Arc<dyn SnapshotStore>) -> Result<Monitor> {
    let params = config.scrape_params();
    let source: Arc<dyn ListingSource> = match config.source.kind {
        SourceKind::Browser => Arc::new(BrowserSource::new(params)),
        SourceKind::Http => {
            Arc::new(HttpSource::new(params).context("Failed to create HTTP client")?)
        }
    };

    Ok(Monitor::new(
        source,
        store,
        build_sink(config)?,
        config.record_parser(),
    ))
}

fn build_sink(config: &Config) -> Result<Arc<dyn NotificationSink>> {
    Ok(match config.notification.kind {
        NotificationKind::Log => Arc::new(LogSink::new()),
        NotificationKind::Webhook => {
            let url = config
                .notification
                .webhook_url
                .clone()
                .context("notification.webhook_url is not set")?;
            Arc::new(WebhookSink::new(url).context("Failed to create webhook client")?)
        }
    })
}

fn print_snapshot(snapshot: &Snapshot) {
    let last_check = snapshot
        .last_check
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    println!("📅 Last check: {}", last_check);
    println!("📊 Total apartments: {}", snapshot.apartments.len());
    println!();

    if snapshot.is_empty() {
        println!("No apartment data available yet.");
        return;
    }

    let groups = [
        Some(Availability::Available),
        Some(Availability::Soon),
        Some(Availability::Taken),
        Some(Availability::Unknown),
        None,
    ];
    for status in groups {
        let listed: Vec<&ApartmentRecord> = snapshot
            .apartments
            .iter()
            .filter(|a| a.availability == status)
            .collect();
        if listed.is_empty() {
            continue;
        }

        let label = status.map(|s| s.as_str()).unwrap_or("no status");
        println!("📋 {} ({})", label.to_uppercase(), listed.len());
        for apartment in listed {
            println!(
                "   {} - {} | {} | {}",
                apartment.display_id(),
                apartment.unit_type.map(|t| t.as_str()).unwrap_or("N/A"),
                apartment.location.as_deref().unwrap_or("N/A"),
                apartment
                    .price
                    .map(|p| format!("€{:.2}", p))
                    .unwrap_or_else(|| "N/A".to_string()),
            );
            if let Some(date) = &apartment.available_date {
                println!("      Available from: {}", date);
            }
        }
        println!();
    }

    let stats = aggregate(&snapshot.apartments);
    for (title, counts) in [("By type", &stats.by_type), ("By location", &stats.by_location)] {
        let line: Vec<String> = counts.iter().map(|(k, n)| format!("{}: {}", k, n)).collect();
        println!("📊 {}: {}", title, line.join(", "));
    }
    if let Some(prices) = &stats.price_stats {
        println!(
            "💶 Price range: €{:.2} - €{:.2}, average €{:.2} over {} listings",
            prices.min, prices.max, prices.avg, prices.count
        );
    }
}
