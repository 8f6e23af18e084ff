use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

pub fn parse_integer(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

pub fn parse_double(value: &str) -> Option<f64> {
    value.parse::<f64>().ok()
}

pub fn is_boolean_literal(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// Parses ISO-8601 timestamps (with or without offset) and plain `yyyy-MM-dd`
/// dates. Offsets are normalized to UTC.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

pub fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn normalize_column_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => c,
            _ => '_',
        })
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_column_name_replaces_non_alphanumeric() {
        assert_eq!(normalize_column_name("Order ID"), "order_id");
        assert_eq!(normalize_column_name("$Percent%"), "_percent_");
    }

    #[test]
    fn parse_date_supports_iso_and_plain_dates() {
        let plain = parse_date("2024-05-06").unwrap();
        assert_eq!(plain.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-05-06 00:00:00");

        let zoned = parse_date("2024-05-06T14:30:00+02:00").unwrap();
        assert_eq!(zoned.format("%H:%M").to_string(), "12:30");

        assert!(parse_date("2024-05-06T14:30:00").is_some());
        assert!(parse_date("06/05/2024").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn numeric_parsers_do_not_trim() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("4.2"), None);
        assert_eq!(parse_integer(" 42"), None);
        assert_eq!(parse_double("4.2"), Some(4.2));
        assert_eq!(parse_double("7"), Some(7.0));
        assert_eq!(parse_double("abc"), None);
    }

    #[test]
    fn boolean_literals_are_case_insensitive() {
        assert!(is_boolean_literal("TRUE"));
        assert!(is_boolean_literal("False"));
        assert!(!is_boolean_literal("yes"));
        assert!(!is_boolean_literal("1"));
    }

    #[test]
    fn format_double_keeps_fraction_marker() {
        assert_eq!(format_double(1.0), "1.0");
        assert_eq!(format_double(-3.0), "-3.0");
        assert_eq!(format_double(2.5), "2.5");
        assert_eq!(format_double(0.1 + 0.2), "0.30000000000000004");
    }
}
