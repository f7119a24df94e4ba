use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses an ISO-8601 string, accepting both plain dates (`2025-03-10`)
/// and full timestamps (`2025-03-10T14:00:00Z`).
pub fn parse_iso(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn is_iso_date(input: &str) -> bool {
    parse_iso(input).is_some()
}

/// ISO input rendered as `dd/MM/yyyy`. Unparseable input yields an empty
/// string so list views can show a blank cell instead of failing.
pub fn format_br_date(input: &str) -> String {
    parse_iso(input)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// ISO input rendered as `dd/MM/yyyy às HH:mm`, the appointment list format.
pub fn format_br_date_time(input: &str) -> String {
    parse_iso(input)
        .map(|dt| dt.format("%d/%m/%Y às %H:%M").to_string())
        .unwrap_or_default()
}

/// Zero-padded 24-hour label (`14:00`) used for slot selection keys.
pub fn hour_label(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_dates_and_timestamps() {
        assert!(is_iso_date("2025-03-10"));
        assert!(is_iso_date("2025-03-10T14:00:00Z"));
        assert!(is_iso_date("2025-03-10T14:00:00-03:00"));
        assert!(!is_iso_date("10/03/2025"));
        assert!(!is_iso_date("not a date"));
    }

    #[test]
    fn formats_brazilian_dates() {
        assert_eq!(format_br_date("2025-03-10T14:00:00Z"), "10/03/2025");
        assert_eq!(format_br_date_time("2025-03-10T14:00:00Z"), "10/03/2025 às 14:00");
        assert_eq!(format_br_date("garbage"), "");
    }

    #[test]
    fn hour_labels_are_zero_padded() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 8, 5, 0).unwrap();
        assert_eq!(hour_label(at), "08:05");
    }
}
