//! Change detection between the current listing page and the stored snapshot.
//!
//! Records are keyed by their derived id. Rows without an id cannot be matched
//! across runs and never show up in the output.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::models::{ApartmentRecord, Availability, ChangeEvent, Snapshot};

/// Computes [`ChangeEvent`]s for one cycle.
///
/// Output order: every `NewListing` first, in the order ids first appear in
/// `current`, then status and date changes grouped by id in that same order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotDiffer;

impl SnapshotDiffer {
    pub fn new() -> Self {
        Self
    }

    pub fn diff(&self, current: &[ApartmentRecord], previous: &Snapshot) -> Vec<ChangeEvent> {
        let previous_by_id = index_by_id(&previous.apartments);
        let current_by_id = index_by_id(current);

        // An empty store means nothing has been seen yet; units that are
        // already taken on that first look are not news.
        let cold_start = previous.apartments.is_empty();

        let mut new_listings = Vec::new();
        let mut changes = Vec::new();

        for (id, record) in &current_by_id {
            let Some(old) = previous_by_id.get(id) else {
                let open = record.availability.is_some_and(|a| a.is_open());
                if open || !cold_start {
                    info!(id = %id, "New apartment found");
                    new_listings.push(ChangeEvent::NewListing {
                        record: (*record).clone(),
                    });
                } else {
                    debug!(id = %id, "Skipping taken apartment on initial load");
                }
                continue;
            };

            if let Some(event) = status_change(old, record) {
                info!(id = %id, "Status change: {:?} -> {:?}", old.availability, record.availability);
                changes.push(event);
            }

            if let Some(event) = date_change(old, record) {
                info!(id = %id, "Date change: {:?} -> {:?}", old.available_date, record.available_date);
                changes.push(event);
            }
        }

        if new_listings.is_empty() && changes.is_empty() {
            info!("No new apartments or changes detected");
        } else {
            info!(
                "Found {} new apartments and {} changes",
                new_listings.len(),
                changes.len()
            );
        }

        new_listings.extend(changes);
        new_listings
    }
}

/// Convenience function for a one-off diff.
pub fn detect_changes(current: &[ApartmentRecord], previous: &Snapshot) -> Vec<ChangeEvent> {
    SnapshotDiffer::new().diff(current, previous)
}

/// Later rows with a repeated id replace earlier ones but keep the position of
/// the first.
fn index_by_id(records: &[ApartmentRecord]) -> IndexMap<&str, &ApartmentRecord> {
    let mut by_id = IndexMap::with_capacity(records.len());
    for record in records {
        if let Some(id) = record.id.as_deref() {
            by_id.insert(id, record);
        }
    }
    by_id
}

/// Only `taken -> soon|available` is reported.
fn status_change(old: &ApartmentRecord, new: &ApartmentRecord) -> Option<ChangeEvent> {
    match (old.availability, new.availability) {
        (Some(Availability::Taken), Some(new_status)) if new_status.is_open() => {
            Some(ChangeEvent::StatusChanged {
                record: new.clone(),
                old_status: Availability::Taken,
                new_status,
            })
        }
        _ => None,
    }
}

fn date_change(old: &ApartmentRecord, new: &ApartmentRecord) -> Option<ChangeEvent> {
    let new_date = new.available_date.as_deref().filter(|d| !d.is_empty())?;
    if old.available_date.as_deref() == Some(new_date) {
        return None;
    }

    Some(ChangeEvent::DateChanged {
        record: new.clone(),
        old_date: old.available_date.clone(),
        new_date: new_date.to_string(),
    })
}
