//! Experience range parsing and batch resolution.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::fill_missing;
use crate::models::NormalizedJobRecord;

const NO_EXPERIENCE_MARKER: &str = "Chưa Có Kinh Nghiệm";
const MORE_THAN_MARKER: &str = "Trên";
const UP_TO_MARKER: &str = "Lên Đến";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").unwrap());

fn first_number(text: &str) -> Option<f64> {
    NUMBER
        .captures(text)
        .and_then(|caps| caps[1].trim().parse().ok())
}

/// Parse title-cased experience text into `(min, max)` years.
///
/// `None` is left for the batch to fill, except that "more than X" always
/// leaves the maximum open.
pub fn parse_experience(text: &str) -> (Option<f64>, Option<f64>) {
    let (low, high) = match text.split_once('-') {
        Some((low, high)) => (first_number(low), first_number(high)),
        None => (first_number(text), None),
    };

    if text.contains(NO_EXPERIENCE_MARKER) {
        return (Some(0.0), Some(0.0));
    }

    let high = if text.contains(MORE_THAN_MARKER) {
        None
    } else {
        high
    };
    let low = if text.contains(UP_TO_MARKER) {
        Some(0.0)
    } else {
        low
    };
    (low, high)
}

/// Fill `exp_min`/`exp_max` for a whole batch, imputing gaps with rounded column means.
pub fn resolve_experience(records: &mut [NormalizedJobRecord]) {
    for record in records.iter_mut() {
        let (min, max) = parse_experience(&record.experience);
        record.exp_min = min;
        record.exp_max = max;
    }

    let min_fill = fill_missing(records, |r| &mut r.exp_min);
    let max_fill = fill_missing(records, |r| &mut r.exp_max);
    debug!("Experience imputation: min={:?}, max={:?}", min_fill, max_fill);
}
