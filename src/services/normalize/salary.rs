//! Salary range parsing and batch resolution.
//!
//! Salary text is expected title-cased (`15 - 20 Tr Vnd`, `800 - 1,200 Usd`,
//! `Lên Đến 30 Tr Vnd`, `Thỏa Thuận`).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{batch_mean, fill_missing};
use crate::models::NormalizedJobRecord;

const MILLION: f64 = 1_000_000.0;
const MILLION_UNIT: &str = "Tr";
const USD_MARKER: &str = "Usd";
const UP_TO_MARKER: &str = "Lên Đến";

/// Up to two numbers and the unit token following the second one.
static SALARY_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+)?[^\d]+([\d,]+)?\s*([A-Za-z]+)?").unwrap());
static UP_TO_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Lên Đến ([\d,]+)").unwrap());

fn parse_amount(digits: &str) -> Option<f64> {
    digits.replace(',', "").parse().ok()
}

/// Salary bounds parsed from a single row, before batch resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParsedSalary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Upper bound of an "up to X" salary. The lower bound is left to the batch.
    pub up_to: Option<f64>,
}

/// Parse one title-cased salary text into scaled bounds.
pub fn parse_salary(text: &str, usd_rate: f64) -> ParsedSalary {
    let Some(caps) = SALARY_RANGE.captures(text) else {
        return ParsedSalary::default();
    };

    let mut min = caps.get(1).and_then(|m| parse_amount(m.as_str()));
    let mut max = caps.get(2).and_then(|m| parse_amount(m.as_str()));

    let scale = if caps.get(3).map(|m| m.as_str()) == Some(MILLION_UNIT) {
        MILLION
    } else {
        1.0
    };
    let usd = text.contains(USD_MARKER);
    let rate = if usd { usd_rate } else { 1.0 };
    min = min.map(|v| v * scale * rate);
    max = max.map(|v| v * scale * rate);

    let up_to = if text.contains(UP_TO_MARKER) {
        min = None;
        let unit = if usd { usd_rate } else { MILLION };
        UP_TO_AMOUNT
            .captures(text)
            .and_then(|caps| parse_amount(&caps[1]))
            .map(|v| v * unit)
    } else {
        None
    };

    ParsedSalary { min, max, up_to }
}

/// Fill `min_salary`/`max_salary` for a whole batch.
///
/// "Up to" rows take the mean minimum of the other resolved rows as their
/// minimum. Anything still missing gets the rounded column mean.
pub fn resolve_salaries(records: &mut [NormalizedJobRecord], usd_rate: f64) {
    let parsed: Vec<ParsedSalary> = records
        .iter()
        .map(|r| parse_salary(&r.salary, usd_rate))
        .collect();

    let mean_min = batch_mean(
        records
            .iter()
            .zip(&parsed)
            .filter(|(record, _)| !record.salary.contains(UP_TO_MARKER))
            .filter_map(|(_, p)| p.min),
    );

    for (record, parsed) in records.iter_mut().zip(&parsed) {
        record.min_salary = parsed.min;
        record.max_salary = parsed.max;
        if record.salary.contains(UP_TO_MARKER) {
            record.min_salary = mean_min;
            record.max_salary = parsed.up_to;
        }
    }

    let min_fill = fill_missing(records, |r| &mut r.min_salary);
    let max_fill = fill_missing(records, |r| &mut r.max_salary);
    debug!(
        "Salary imputation: min={:?}, max={:?}, up-to mean={:?}",
        min_fill, max_fill, mean_min
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 25505.0;

    #[test]
    fn test_million_range() {
        let p = parse_salary("15 - 20 Tr Vnd", RATE);
        assert_eq!(p.min, Some(15_000_000.0));
        assert_eq!(p.max, Some(20_000_000.0));
        assert_eq!(p.up_to, None);

        let p = parse_salary("15 Tr - 20 Tr Vnd", RATE);
        assert_eq!(p.min, Some(15_000_000.0));
        assert_eq!(p.max, Some(20_000_000.0));
    }

    #[test]
    fn test_usd_range() {
        let p = parse_salary("800 - 1,200 Usd", RATE);
        assert_eq!(p.min, Some(800.0 * RATE));
        assert_eq!(p.max, Some(1200.0 * RATE));
    }

    #[test]
    fn test_up_to() {
        let p = parse_salary("Lên Đến 30 Tr Vnd", RATE);
        assert_eq!(p.min, None);
        assert_eq!(p.up_to, Some(30_000_000.0));

        let p = parse_salary("Lên Đến 2,000 Usd", RATE);
        assert_eq!(p.up_to, Some(2000.0 * RATE));
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_salary("Thỏa Thuận", RATE), ParsedSalary::default());
        assert_eq!(parse_salary("", RATE), ParsedSalary::default());
        assert_eq!(parse_salary("Cạnh Tranh", RATE).max, None);
    }
}
