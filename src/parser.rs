//! Listing text parser.
//!
//! A listing row arrives as the visible text of one table row:
//!
//! ```text
//! 3/ 309 Single, balcony Inner courtyard 27.17 520.50
//! Soon available
//! 2025-03-01 ...
//! ```
//!
//! The first line is the header. It is run through an ordered list of
//! independent rules, each of which fills at most a couple of fields and
//! reports whether it matched, so a miss in one rule never blocks another.
//! The second line carries the booking status and, for `Soon available`,
//! the third line starts with the move-in date.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::models::{ApartmentRecord, Availability, Balcony, UnitType};

static FLOOR_UNIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)/\s*(\d+)").unwrap());
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+").unwrap());
static LEADING_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap());

/// Zone names as they appear on the listing page.
pub const DEFAULT_LOCATIONS: [&str; 3] = ["Inner courtyard", "Wilhelmstraße", "Südstraße"];

/// One header extraction step.
struct HeaderRule {
    field: &'static str,
    apply: fn(&RecordParser, &str, &mut ApartmentRecord) -> bool,
}

const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: "floor/unit",
        apply: floor_and_unit,
    },
    HeaderRule {
        field: "unit_type",
        apply: unit_type,
    },
    HeaderRule {
        field: "balcony",
        apply: balcony,
    },
    HeaderRule {
        field: "barrier_free",
        apply: barrier_free,
    },
    HeaderRule {
        field: "location",
        apply: location,
    },
    HeaderRule {
        field: "size/price",
        apply: size_and_price,
    },
];

/// Turns raw listing text into [`ApartmentRecord`]s.
///
/// Parsing is total: any input, including the empty string, yields a record.
/// Fields that cannot be extracted stay `None`.
#[derive(Debug, Clone)]
pub struct RecordParser {
    locations: Vec<String>,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    pub fn new() -> Self {
        Self::with_locations(DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect())
    }

    /// Use a custom ordered list of zone names. The first one found in the
    /// header wins.
    pub fn with_locations(locations: Vec<String>) -> Self {
        Self { locations }
    }

    pub fn parse(&self, raw_text: &str) -> ApartmentRecord {
        self.parse_at(raw_text, Utc::now())
    }

    /// Parse with an explicit capture time.
    pub fn parse_at(&self, raw_text: &str, captured_at: DateTime<Utc>) -> ApartmentRecord {
        let mut record = ApartmentRecord::blank(raw_text, captured_at);

        let lines: Vec<&str> = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(&header) = lines.first() else {
            return record;
        };

        for rule in HEADER_RULES {
            if !(rule.apply)(self, header, &mut record) {
                debug!(field = rule.field, "No match in header: {}", header);
            }
        }

        if let Some(status_line) = lines.get(1) {
            let availability = availability_from(status_line);
            record.availability = Some(availability);

            if availability == Availability::Soon {
                record.available_date = lines.get(2).and_then(|line| leading_date(line));
            }
        }

        record
    }
}

fn floor_and_unit(_: &RecordParser, header: &str, record: &mut ApartmentRecord) -> bool {
    let Some(caps) = FLOOR_UNIT.captures(header) else {
        return false;
    };

    let floor = caps[1].to_string();
    let unit = caps[2].to_string();
    record.id = Some(format!("{}-{}", floor, unit));
    record.floor = Some(floor);
    record.unit_number = Some(unit);
    true
}

fn unit_type(_: &RecordParser, header: &str, record: &mut ApartmentRecord) -> bool {
    record.unit_type = if header.contains("Single") {
        Some(UnitType::Single)
    } else if header.contains("Partner") {
        Some(UnitType::Partner)
    } else {
        None
    };
    record.unit_type.is_some()
}

fn balcony(_: &RecordParser, header: &str, record: &mut ApartmentRecord) -> bool {
    // "no balcony" also contains "balcony", test it first
    record.balcony = if header.contains("no balcony") {
        Some(Balcony::No)
    } else if header.contains("balcony") {
        Some(Balcony::Yes)
    } else {
        None
    };
    record.balcony.is_some()
}

fn barrier_free(_: &RecordParser, header: &str, record: &mut ApartmentRecord) -> bool {
    record.barrier_free = header.contains("barrier-free");
    record.barrier_free
}

fn location(parser: &RecordParser, header: &str, record: &mut ApartmentRecord) -> bool {
    record.location = parser
        .locations
        .iter()
        .find(|zone| header.contains(zone.as_str()))
        .map(|zone| normalize_zone(zone));
    record.location.is_some()
}

fn size_and_price(_: &RecordParser, header: &str, record: &mut ApartmentRecord) -> bool {
    let numbers: Vec<f64> = DECIMAL
        .find_iter(header)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect();

    // size is assumed to precede price
    if let [.., size, price] = numbers.as_slice() {
        record.size_sqm = Some(*size);
        record.price = Some(*price);
        true
    } else {
        false
    }
}

fn availability_from(status_line: &str) -> Availability {
    if status_line.contains("Already taken") {
        Availability::Taken
    } else if status_line.contains("Soon available") {
        Availability::Soon
    } else if status_line.contains("Apply now") {
        Availability::Available
    } else {
        Availability::Unknown
    }
}

fn leading_date(line: &str) -> Option<String> {
    LEADING_DATE
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Fold zone spellings so `Wilhelmstraße` is stored as `Wilhelmstrasse`.
pub fn normalize_zone(zone: &str) -> String {
    zone.replace('ß', "ss")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "3/ 309 Single, balcony Inner courtyard 27.17 520.50";

    fn parse(text: &str) -> ApartmentRecord {
        RecordParser::new().parse(text)
    }

    #[test]
    fn test_header_fields() {
        let record = parse(HEADER);

        assert_eq!(record.id.as_deref(), Some("3-309"));
        assert_eq!(record.floor.as_deref(), Some("3"));
        assert_eq!(record.unit_number.as_deref(), Some("309"));
        assert_eq!(record.unit_type, Some(UnitType::Single));
        assert_eq!(record.balcony, Some(Balcony::Yes));
        assert_eq!(record.location.as_deref(), Some("Inner courtyard"));
        assert_eq!(record.size_sqm, Some(27.17));
        assert_eq!(record.price, Some(520.50));
        assert!(!record.barrier_free);
    }

    #[test]
    fn test_header_only_leaves_availability_unset() {
        let record = parse(HEADER);
        assert_eq!(record.availability, None);
        assert_eq!(record.available_date, None);
    }

    #[test]
    fn test_no_balcony_wins_over_balcony() {
        let record = parse("3/ 309 Single, no balcony Inner courtyard 27.17 520.50");
        assert_eq!(record.balcony, Some(Balcony::No));
    }

    #[test]
    fn test_soon_available_with_date() {
        let text = format!("{}\nSoon available\n2025-03-01 further text", HEADER);
        let record = parse(&text);

        assert_eq!(record.availability, Some(Availability::Soon));
        assert_eq!(record.available_date.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_date_ignored_unless_soon() {
        let text = format!("{}\nApply now\n2025-03-01", HEADER);
        let record = parse(&text);

        assert_eq!(record.availability, Some(Availability::Available));
        assert_eq!(record.available_date, None);
    }

    #[test]
    fn test_date_must_lead_the_line() {
        let text = format!("{}\nSoon available\nfrom 2025-03-01", HEADER);
        let record = parse(&text);

        assert_eq!(record.availability, Some(Availability::Soon));
        assert_eq!(record.available_date, None);
    }

    #[test]
    fn test_status_keywords() {
        let cases = [
            ("Already taken", Availability::Taken),
            ("Soon available", Availability::Soon),
            ("Apply now", Availability::Available),
            ("Call us", Availability::Unknown),
        ];

        for (line, expected) in cases {
            let record = parse(&format!("{}\n{}", HEADER, line));
            assert_eq!(record.availability, Some(expected), "status line {:?}", line);
        }
    }

    #[test]
    fn test_empty_input() {
        let now = Utc::now();
        let record = RecordParser::new().parse_at("", now);

        assert_eq!(record, ApartmentRecord::blank("", now));
    }

    #[test]
    fn test_whitespace_only_input() {
        let record = parse("  \n\t\n   ");
        assert_eq!(record.id, None);
        assert_eq!(record.availability, None);
        assert_eq!(record.raw_text, "  \n\t\n   ");
    }

    #[test]
    fn test_unmatched_header_still_yields_record() {
        let record = parse("nothing useful here\nAlready taken");

        assert_eq!(record.id, None);
        assert_eq!(record.unit_type, None);
        assert_eq!(record.balcony, None);
        assert_eq!(record.location, None);
        assert_eq!(record.price, None);
        assert_eq!(record.availability, Some(Availability::Taken));
    }

    #[test]
    fn test_single_number_leaves_size_and_price_unset() {
        let record = parse("2/ 201 Partner Südstraße 41.00");

        assert_eq!(record.size_sqm, None);
        assert_eq!(record.price, None);
        assert_eq!(record.unit_type, Some(UnitType::Partner));
    }

    #[test]
    fn test_last_two_decimals_are_size_and_price() {
        let record = parse("1/ 105 Single 1.5 27.17 520.50");

        assert_eq!(record.size_sqm, Some(27.17));
        assert_eq!(record.price, Some(520.50));
    }

    #[test]
    fn test_location_is_normalized() {
        let record = parse("4/ 410 Partner, barrier-free Wilhelmstraße 35.10 640.00");

        assert_eq!(record.location.as_deref(), Some("Wilhelmstrasse"));
        assert!(record.barrier_free);
    }

    #[test]
    fn test_first_listed_location_wins() {
        let record = parse("1/ 1 Single Südstraße near Inner courtyard 20.00 400.00");
        assert_eq!(record.location.as_deref(), Some("Inner courtyard"));
    }

    #[test]
    fn test_custom_locations() {
        let parser = RecordParser::with_locations(vec!["Hafenstraße".into()]);
        let record = parser.parse("2/ 7 Single Hafenstraße 20.00 400.00");

        assert_eq!(record.location.as_deref(), Some("Hafenstrasse"));
    }

    #[test]
    fn test_floor_unit_must_lead_the_header() {
        let record = parse("Unit 3/ 309 Single 27.17 520.50");

        assert_eq!(record.id, None);
        assert_eq!(record.floor, None);
        assert_eq!(record.unit_number, None);
    }

    #[test]
    fn test_floor_unit_without_space() {
        let record = parse("12/1204 Single 27.17 520.50");
        assert_eq!(record.id.as_deref(), Some("12-1204"));
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let record = parse("3/ 309 Single 27.17 520.50\r\n\r\n  Already taken  \r\n");
        assert_eq!(record.availability, Some(Availability::Taken));
    }

    #[test]
    fn test_overflowing_number_is_not_a_price() {
        let header = format!("1/ 1 Single 27.17 {}.0", "9".repeat(400));
        let record = parse(&header);

        assert_eq!(record.id.as_deref(), Some("1-1"));
        assert_eq!(record.size_sqm, None);
        assert_eq!(record.price, None);
    }

    #[test]
    fn test_overflowing_number_is_skipped() {
        let header = format!("1/ 1 Single 27.17 {}.0 520.50", "9".repeat(400));
        let record = parse(&header);

        assert_eq!(record.size_sqm, Some(27.17));
        assert_eq!(record.price, Some(520.50));
    }

    #[test]
    fn test_any_input_yields_consistent_record() {
        let long_digits = format!("{}.0 {}.5", "9".repeat(400), "1".repeat(320));
        let inputs = [
            "",
            "\r",
            "3/ \r309 Single 27.17 520.50",
            "/ 309 Single 27.17 520.50",
            "3/ Single",
            "/",
            "1.2.3.4",
            "０１/ ２３ Single ２７.１７ ５２０.５０",
            "Wilhelmstraße 12.50 €/Monat\nBald verfügbar\n2025-13-45",
            "🏠🏠🏠\n\n\nApply now",
            "3/ 309\nSoon available",
            "3/ 309\nSoon available\n\n",
            long_digits.as_str(),
        ];

        for input in inputs {
            let record = parse(input);

            assert_eq!(record.raw_text, input);
            assert_eq!(
                record.id.is_some(),
                record.floor.is_some() && record.unit_number.is_some(),
                "id/floor/unit mismatch for {:?}",
                input
            );
            assert_eq!(
                record.size_sqm.is_some(),
                record.price.is_some(),
                "size/price mismatch for {:?}",
                input
            );
            assert!(record.price.map_or(true, f64::is_finite), "{:?}", input);
            assert!(record.size_sqm.map_or(true, f64::is_finite), "{:?}", input);
            if record.available_date.is_some() {
                assert_eq!(record.availability, Some(Availability::Soon));
            }
        }
    }
}
