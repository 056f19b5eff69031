//! Field normalization for scraped job records.
//!
//! [`JobNormalizer::normalize`] is a single batch pass. Steps run in a fixed
//! order: dates, location, text casing, salary, experience, then exact
//! duplicate removal. Salary and experience gaps are filled with the mean of
//! the batch being normalized, so results depend on the batch.

mod dates;
mod experience;
mod filter;
mod salary;

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use tracing::info;

use crate::models::{NormalizedJobRecord, RawJobRecord};
use crate::utils::title_case;

pub use dates::{classify_expiry, parse_posted_date};
pub use experience::{parse_experience, resolve_experience};
pub use filter::TitleFilter;
pub use salary::{parse_salary, resolve_salaries, ParsedSalary};

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n|\n|\r").unwrap());

/// Arithmetic mean, or `None` for no values.
pub(crate) fn batch_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Replace missing values of one numeric column with its rounded mean.
///
/// Returns the fill value. A column with no values at all stays empty.
pub(crate) fn fill_missing<F>(records: &mut [NormalizedJobRecord], mut field: F) -> Option<f64>
where
    F: FnMut(&mut NormalizedJobRecord) -> &mut Option<f64>,
{
    let mean = batch_mean(records.iter_mut().filter_map(|r| *field(r)))?;
    let fill = mean.round_ties_even();
    for record in records.iter_mut() {
        let value = field(record);
        if value.is_none() {
            *value = Some(fill);
        }
    }
    Some(fill)
}

/// Converts raw scraped strings into typed fields.
#[derive(Debug, Clone)]
pub struct JobNormalizer {
    exchange_rate: f64,
    today: NaiveDate,
}

impl JobNormalizer {
    /// Normalizer using `exchange_rate` VND per USD and the local date as today.
    pub fn new(exchange_rate: f64) -> Self {
        Self {
            exchange_rate,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the reference date for relative expiry texts.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn normalize_fields(&self, raw: RawJobRecord) -> NormalizedJobRecord {
        let date = parse_posted_date(&raw.date);
        let expire_date = classify_expiry(&raw.expire_date, self.today);

        let mut record = NormalizedJobRecord::from_raw(raw);
        record.date = date;
        record.expire_date = expire_date;
        record.location = LINE_BREAKS.replace_all(&record.location, ",").into_owned();
        record.job_title = title_case(&record.job_title);
        record.company = title_case(&record.company);
        record.salary = title_case(&record.salary);
        record.experience = title_case(&record.experience).trim().to_string();
        record
    }

    /// Normalize a batch of raw records.
    pub fn normalize(&self, raw: Vec<RawJobRecord>) -> Vec<NormalizedJobRecord> {
        let total = raw.len();
        let mut records: Vec<NormalizedJobRecord> =
            raw.into_iter().map(|r| self.normalize_fields(r)).collect();

        resolve_salaries(&mut records, self.exchange_rate);
        resolve_experience(&mut records);

        let mut seen = HashSet::new();
        records.retain(|r| seen.insert(r.row_key()));

        info!(
            "Normalized {} records ({} exact duplicates removed)",
            records.len(),
            total - records.len()
        );
        records
    }
}
