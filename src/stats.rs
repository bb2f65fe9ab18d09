//! Summary statistics over a record set.

use std::collections::BTreeMap;

use crate::models::{ApartmentRecord, PriceStats, Statistics};

/// Bucket used for records where the field was not extracted. Kept apart
/// from `Availability::Unknown`, which is an extracted status.
pub const UNSET_BUCKET: &str = "unset";

#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Every record counts, whether or not it has an id.
    pub fn aggregate(&self, records: &[ApartmentRecord]) -> Statistics {
        let mut stats = Statistics {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            bump(
                &mut stats.by_status,
                record.availability.map(|a| a.as_str()),
            );
            bump(&mut stats.by_type, record.unit_type.map(|t| t.as_str()));
            bump(&mut stats.by_location, record.location.as_deref());
        }

        stats.price_stats = price_stats(records);
        stats
    }
}

pub fn aggregate(records: &[ApartmentRecord]) -> Statistics {
    StatisticsAggregator::new().aggregate(records)
}

fn bump(counts: &mut BTreeMap<String, usize>, key: Option<&str>) {
    *counts
        .entry(key.unwrap_or(UNSET_BUCKET).to_string())
        .or_insert(0) += 1;
}

fn price_stats(records: &[ApartmentRecord]) -> Option<PriceStats> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    if prices.is_empty() {
        return None;
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = prices.iter().sum::<f64>() / prices.len() as f64;

    Some(PriceStats {
        min,
        max,
        avg: (avg * 100.0).round_ties_even() / 100.0,
        count: prices.len(),
    })
}
