use super::fields::is_placeholder;
use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%d/%m/%Y"];

/// Result of reading an extracted date. Garbage degrades to `Unparseable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed(NaiveDate),
    Unparseable,
}

impl ParsedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Parsed(date) => Some(date),
            ParsedDate::Unparseable => None,
        }
    }
}

pub fn parse_date(raw: &str) -> ParsedDate {
    let trimmed = raw.trim();
    if is_placeholder(trimmed) {
        return ParsedDate::Unparseable;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(ParsedDate::Parsed)
        .unwrap_or(ParsedDate::Unparseable)
}

pub(crate) fn parse_optional(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|value| parse_date(value).date())
}

/// Absolute day distance, or `None` when either side does not parse.
pub fn days_between(left: &str, right: &str) -> Option<i64> {
    let left = parse_date(left).date()?;
    let right = parse_date(right).date()?;
    Some((left - right).num_days().abs())
}

pub(crate) fn within_days(left: &str, right: &str, days: i64) -> bool {
    days_between(left, right).is_some_and(|distance| distance <= days)
}

pub fn normalize_date_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// String-normalized equality; placeholders never match anything.
pub(crate) fn same_date_text(left: &str, right: &str) -> bool {
    !is_placeholder(left)
        && !is_placeholder(right)
        && normalize_date_text(left) == normalize_date_text(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    #[test]
    fn formats_are_tried_in_order() {
        assert_eq!(parse_date("03/04/2024").date(), ymd(2024, 3, 4));
        assert_eq!(parse_date(" 2024-03-04 ").date(), ymd(2024, 3, 4));
        assert_eq!(parse_date("03-04-2024").date(), ymd(2024, 3, 4));
        assert_eq!(parse_date("25/12/2024").date(), ymd(2024, 12, 25));
    }

    #[test]
    fn garbage_and_placeholders_are_unparseable() {
        for raw in ["", "N/A", "[DATE_REDACTED]", "next tuesday", "13/25/2024"] {
            assert_eq!(parse_date(raw), ParsedDate::Unparseable, "{raw}");
        }
        assert_eq!(parse_optional(None), None);
    }

    #[test]
    fn day_distance_is_absolute() {
        assert_eq!(days_between("01/31/2024", "2024-01-01"), Some(30));
        assert_eq!(days_between("2024-01-01", "01/31/2024"), Some(30));
        assert_eq!(days_between("01/31/2024", "unknown"), None);
        assert!(within_days("06/30/2024", "07/30/2024", 30));
        assert!(!within_days("06/30/2024", "07/31/2024", 30));
    }

    #[test]
    fn text_comparison_collapses_whitespace() {
        assert!(same_date_text("March  4,\t2024", "March 4, 2024"));
        assert!(!same_date_text("N/A", "N/A"));
    }
}
