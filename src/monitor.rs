//! Cycle coordinator.
//!
//! One cycle is fetch → parse → load previous → diff → notify → save →
//! aggregate. Cycles against the same store never overlap, and the stored
//! snapshot is only replaced once every step before it has succeeded.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::diff::SnapshotDiffer;
use crate::error::Result;
use crate::models::{ChangeEvent, Snapshot, Statistics};
use crate::notify::NotificationSink;
use crate::parser::RecordParser;
use crate::scrapers::ListingSource;
use crate::stats::StatisticsAggregator;
use crate::storage::SnapshotStore;

/// Outcome of a successful cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub events: Vec<ChangeEvent>,
    pub statistics: Statistics,
}

pub struct Monitor {
    source: Arc<dyn ListingSource>,
    store: Arc<dyn SnapshotStore>,
    sink: Arc<dyn NotificationSink>,
    parser: RecordParser,
    differ: SnapshotDiffer,
    aggregator: StatisticsAggregator,
    cycle_lock: Mutex<()>,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn ListingSource>,
        store: Arc<dyn SnapshotStore>,
        sink: Arc<dyn NotificationSink>,
        parser: RecordParser,
    ) -> Self {
        Self {
            source,
            store,
            sink,
            parser,
            differ: SnapshotDiffer::new(),
            aggregator: StatisticsAggregator::new(),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run a single cycle. Concurrent callers wait for the one in flight.
    pub async fn run_once(&self) -> Result<CycleReport> {
        let _guard = self.cycle_lock.lock().await;
        info!("Starting monitoring execution...");

        let blocks = self.source.fetch_blocks().await?;
        info!(
            source = self.source.source_name(),
            "Retrieved {} apartment listings",
            blocks.len()
        );

        let now = Utc::now();
        let records: Vec<_> = blocks
            .iter()
            .map(|block| self.parser.parse_at(block, now))
            .collect();

        let previous = self.store.load().await;
        let events = self.differ.diff(&records, &previous);

        if events.is_empty() {
            info!("No new apartments found");
        } else {
            info!(
                sink = self.sink.sink_name(),
                "Sending notification for {} changes",
                events.len()
            );
            self.sink.notify(&events).await?;
        }

        let snapshot = Snapshot::new(records, now);
        self.store.save(&snapshot).await?;
        let statistics = self.aggregator.aggregate(&snapshot.apartments);

        info!(
            total = statistics.total,
            available = statistics.by_status.get("available").copied().unwrap_or(0),
            soon = statistics.by_status.get("soon").copied().unwrap_or(0),
            "Monitoring execution completed"
        );

        Ok(CycleReport { events, statistics })
    }

    /// Run a cycle every `interval` until `shutdown` resolves. A failed cycle
    /// is logged and retried on the next tick.
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Monitoring every {} minutes",
            interval.as_secs_f64() / 60.0
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping monitor");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) if !report.events.is_empty() => {
                            info!("Cycle reported {} changes", report.events.len());
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Monitoring cycle failed: {}", e);
                            warn!("Previous snapshot kept, retrying at next interval");
                        }
                    }
                }
            }
        }
    }
}
