//! Posted and expiry date parsing.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::models::ExpireDate;

/// Day-first formats accepted for the posted date.
const POSTED_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d"];

const TODAY_MARKER: &str = "Hôm nay";
const DAYS_MARKER: &str = "ngày";

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Parse a posted date, day first. Anything unparsable is `None`.
pub fn parse_posted_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    POSTED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Classify an expiry text relative to `today`.
///
/// `Hôm nay` is today, `N ngày` is N days from today, `DD-MM-YYYY` is taken
/// literally, and anything else is [`ExpireDate::Unknown`].
pub fn classify_expiry(text: &str, today: NaiveDate) -> ExpireDate {
    if text.contains(TODAY_MARKER) {
        return ExpireDate::On(today);
    }

    if text.contains(DAYS_MARKER) {
        return FIRST_NUMBER
            .captures(text)
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .and_then(|days| today.checked_add_days(Days::new(days)))
            .map(ExpireDate::On)
            .unwrap_or(ExpireDate::Unknown);
    }

    if text.contains('-') {
        return NaiveDate::parse_from_str(text.trim(), "%d-%m-%Y")
            .map(ExpireDate::On)
            .unwrap_or(ExpireDate::Unknown);
    }

    ExpireDate::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_posted_date_is_day_first() {
        assert_eq!(parse_posted_date("01-03-2025"), Some(date(2025, 3, 1)));
        assert_eq!(parse_posted_date("01/03/2025"), Some(date(2025, 3, 1)));
        assert_eq!(parse_posted_date("2025-03-01"), Some(date(2025, 3, 1)));
        assert_eq!(parse_posted_date("Update time not found"), None);
        assert_eq!(parse_posted_date("31-02-2025"), None);
    }

    #[test]
    fn test_expiry_classification() {
        let today = date(2025, 3, 10);
        assert_eq!(classify_expiry("Hôm nay", today), ExpireDate::On(today));
        assert_eq!(classify_expiry("3 ngày", today), ExpireDate::On(date(2025, 3, 13)));
        assert_eq!(classify_expiry("Còn 25 ngày", today), ExpireDate::On(date(2025, 4, 4)));
        assert_eq!(classify_expiry("31-03-2025", today), ExpireDate::On(date(2025, 3, 31)));
        assert_eq!(classify_expiry("vài ngày", today), ExpireDate::Unknown);
        assert_eq!(classify_expiry("31-13-2025", today), ExpireDate::Unknown);
        assert_eq!(classify_expiry("Expire date not found", today), ExpireDate::Unknown);
        assert_eq!(classify_expiry("", today), ExpireDate::Unknown);
    }
}
