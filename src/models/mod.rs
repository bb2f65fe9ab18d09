use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Room category advertised for a unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnitType {
    Single,
    Partner,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Single => "Single",
            UnitType::Partner => "Partner",
        }
    }
}

/// Whether the unit has a balcony
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Balcony {
    Yes,
    No,
}

impl Balcony {
    pub fn as_str(&self) -> &'static str {
        match self {
            Balcony::Yes => "yes",
            Balcony::No => "no",
        }
    }
}

/// Booking state shown on the status line of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Taken,
    Soon,
    Available,
    Unknown,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Taken => "taken",
            Availability::Soon => "soon",
            Availability::Available => "available",
            Availability::Unknown => "unknown",
        }
    }

    /// `soon` and `available` are the states worth telling someone about.
    pub fn is_open(&self) -> bool {
        matches!(self, Availability::Soon | Availability::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed listing row.
///
/// `id` is `"<floor>-<unit_number>"` and is only set when both parts were
/// parsed. `size_sqm` and `price` are likewise set together or not at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApartmentRecord {
    pub id: Option<String>,
    pub floor: Option<String>,
    pub unit_number: Option<String>,
    pub unit_type: Option<UnitType>,
    pub balcony: Option<Balcony>,
    #[serde(default)]
    pub barrier_free: bool,
    pub location: Option<String>,
    pub size_sqm: Option<f64>,
    pub price: Option<f64>,
    pub availability: Option<Availability>,
    pub available_date: Option<String>,
    #[serde(default)]
    pub raw_text: String,
    pub captured_at: DateTime<Utc>,
}

impl ApartmentRecord {
    /// A record with nothing extracted yet.
    pub fn blank(raw_text: &str, captured_at: DateTime<Utc>) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            captured_at,
            ..Default::default()
        }
    }

    /// Id for log lines, `"N/A"` when the row had no floor/unit.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("N/A")
    }
}

/// The persisted view of the listing page at one point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub apartments: Vec<ApartmentRecord>,
}

impl Snapshot {
    pub fn new(apartments: Vec<ApartmentRecord>, last_check: DateTime<Utc>) -> Self {
        Self {
            last_check: Some(last_check),
            apartments,
        }
    }

    /// The state of a store that has never been written.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.apartments.is_empty()
    }
}

/// A reported difference for one listing id between two snapshots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    #[serde(rename = "new")]
    NewListing { record: ApartmentRecord },
    #[serde(rename = "status_change")]
    StatusChanged {
        record: ApartmentRecord,
        old_status: Availability,
        new_status: Availability,
    },
    #[serde(rename = "date_change")]
    DateChanged {
        record: ApartmentRecord,
        old_date: Option<String>,
        new_date: String,
    },
}

impl ChangeEvent {
    pub fn record(&self) -> &ApartmentRecord {
        match self {
            ChangeEvent::NewListing { record }
            | ChangeEvent::StatusChanged { record, .. }
            | ChangeEvent::DateChanged { record, .. } => record,
        }
    }
}

/// Price aggregates over records that carry a price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: usize,
}

/// Summary counts over a record set
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_location: BTreeMap<String, usize>,
    pub price_stats: Option<PriceStats>,
}
