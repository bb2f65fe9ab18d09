//! Human-readable rendering of change events.
//!
//! Events are grouped into three sections (new apartments, availability
//! changes, date updates), each omitted when empty.

use crate::models::{ApartmentRecord, ChangeEvent};

const NOT_AVAILABLE: &str = "N/A";

pub fn render_subject(events: &[ChangeEvent]) -> String {
    match events.len() {
        1 => "🏠 1 apartment update".to_string(),
        n => format!("🏠 {} apartment updates", n),
    }
}

pub fn render_body(events: &[ChangeEvent]) -> String {
    let mut new_listings = Vec::new();
    let mut status_changes = Vec::new();
    let mut date_changes = Vec::new();

    for event in events {
        match event {
            ChangeEvent::NewListing { record } => new_listings.extend(new_listing(record)),
            ChangeEvent::StatusChanged {
                record,
                old_status,
                new_status,
            } => {
                status_changes.push(format!(
                    "  Apartment {}: {} → {}",
                    record.display_id(),
                    old_status,
                    new_status
                ));
                status_changes.push(format!(
                    "    Type: {} | Location: {} | Price: {}",
                    unit_type(record),
                    location(record),
                    price(record)
                ));
                if let Some(date) = &record.available_date {
                    status_changes.push(format!("    Available from: {}", date));
                }
            }
            ChangeEvent::DateChanged {
                record,
                old_date,
                new_date,
            } => {
                date_changes.push(format!(
                    "  Apartment {}: {} → {}",
                    record.display_id(),
                    old_date.as_deref().unwrap_or("not specified"),
                    new_date
                ));
                date_changes.push(format!(
                    "    Type: {} | Location: {}",
                    unit_type(record),
                    location(record)
                ));
            }
        }
    }

    let mut sections = Vec::new();
    push_section(
        &mut sections,
        "🆕 New apartments",
        count(events, |e| matches!(e, ChangeEvent::NewListing { .. })),
        new_listings,
    );
    push_section(
        &mut sections,
        "📈 Availability changes",
        count(events, |e| matches!(e, ChangeEvent::StatusChanged { .. })),
        status_changes,
    );
    push_section(
        &mut sections,
        "📅 Date updates",
        count(events, |e| matches!(e, ChangeEvent::DateChanged { .. })),
        date_changes,
    );

    sections.join("\n\n")
}

fn new_listing(record: &ApartmentRecord) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  Apartment {} - {}",
            record.display_id(),
            unit_type(record)
        ),
        format!(
            "    Floor: {} | Location: {} | Size: {} | Price: {}",
            record.floor.as_deref().unwrap_or(NOT_AVAILABLE),
            location(record),
            record
                .size_sqm
                .map(|s| format!("{:.2} m²", s))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            price(record)
        ),
        format!(
            "    Balcony: {} | Status: {}",
            record.balcony.map(|b| b.as_str()).unwrap_or(NOT_AVAILABLE),
            record
                .availability
                .map(|a| a.as_str())
                .unwrap_or(NOT_AVAILABLE)
        ),
    ];

    if let Some(date) = &record.available_date {
        lines.push(format!("    Available from: {}", date));
    }
    if record.barrier_free {
        lines.push("    Barrier-free accessible".to_string());
    }
    lines
}

fn push_section(sections: &mut Vec<String>, title: &str, n: usize, lines: Vec<String>) {
    if lines.is_empty() {
        return;
    }
    sections.push(format!("{} ({})\n{}", title, n, lines.join("\n")));
}

fn count(events: &[ChangeEvent], pred: impl Fn(&ChangeEvent) -> bool) -> usize {
    events.iter().filter(|&e| pred(e)).count()
}

fn unit_type(record: &ApartmentRecord) -> &'static str {
    record.unit_type.map(|t| t.as_str()).unwrap_or("Unknown")
}

fn location(record: &ApartmentRecord) -> &str {
    record.location.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn price(record: &ApartmentRecord) -> String {
    record
        .price
        .map(|p| format!("€{:.2}/month", p))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
