use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Formats tried after commas and ordinal suffixes are stripped.
const HUMAN_DATETIME_FORMATS: &[&str] = &[
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%A %B %d %Y %H:%M",
];

const HUMAN_DATE_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A %B %d %Y",
    "%A %d %B %Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
];

/// Best-effort conversion of a source timestamp. `None` means "unknown".
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| parse_human(raw))
        .map(|naive| naive.and_utc())
}

/// "January 5th, 2024", "5 Jan 2024", "Friday, January 5, 2024 10:00".
fn parse_human(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw
        .split_whitespace()
        .map(|token| strip_ordinal(token.trim_end_matches(',')))
        .collect::<Vec<_>>()
        .join(" ");

    HUMAN_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
        .or_else(|| {
            HUMAN_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn strip_ordinal(token: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(digits) = token.strip_suffix(suffix) {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits;
            }
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339() {
        let dt = parse_published("2024-01-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T10:30:00+00:00");
    }

    #[test]
    fn test_rfc2822() {
        let dt = parse_published("Mon, 01 Jan 2024 00:00:00 GMT").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_naive_formats() {
        assert!(parse_published("2024-03-05 08:00:00").is_some());
        assert!(parse_published("2024-03-05T08:00:00").is_some());
        assert_eq!(
            parse_published("2024-03-05").unwrap().to_rfc3339(),
            "2024-03-05T00:00:00+00:00"
        );
    }

    #[test]
    fn test_unknown_yields_none() {
        assert!(parse_published("").is_none());
        assert!(parse_published("   ").is_none());
        assert!(parse_published("last tuesday").is_none());
        assert!(parse_published("August").is_none());
    }

    #[test]
    fn test_human_readable_dates() {
        let expected = "2024-01-05T00:00:00+00:00";
        assert_eq!(parse_published("January 5th, 2024").unwrap().to_rfc3339(), expected);
        assert_eq!(parse_published("Jan 5, 2024").unwrap().to_rfc3339(), expected);
        assert_eq!(parse_published("5 January 2024").unwrap().to_rfc3339(), expected);
        assert_eq!(parse_published("Friday, January 5, 2024").unwrap().to_rfc3339(), expected);
        assert_eq!(parse_published("2024/01/05").unwrap().to_rfc3339(), expected);
        assert_eq!(
            parse_published("January 5, 2024 14:30").unwrap().to_rfc3339(),
            "2024-01-05T14:30:00+00:00"
        );
    }

    #[test]
    fn test_ordinal_stripping_leaves_words_alone() {
        assert_eq!(strip_ordinal("21st"), "21");
        assert_eq!(strip_ordinal("2nd"), "2");
        assert_eq!(strip_ordinal("August"), "August");
        assert_eq!(strip_ordinal("th"), "th");
    }
}
