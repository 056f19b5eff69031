//! Job listing models.
//!
//! A listing moves through three shapes:
//! - [`ListingItem`]: the condensed entry parsed from a search-results page
//! - [`RawJobRecord`]: the listing joined with its [`JobDetail`]
//! - [`NormalizedJobRecord`]: the raw record plus typed salary, experience and date fields

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::storage::list_cell;

/// Explicit absence markers written in place of fields that could not be extracted.
pub mod sentinel {
    pub const TITLE_NOT_FOUND: &str = "Title not found";
    pub const COMPANY_NOT_FOUND: &str = "Company not found";
    pub const LINK_NOT_FOUND: &str = "Link not found";
    pub const LOCATION_NOT_FOUND: &str = "Location not found";
    pub const SALARY_NOT_FOUND: &str = "Salary not found";
    pub const UPDATE_TIME_NOT_FOUND: &str = "Update time not found";
    pub const EXPIRE_DATE_NOT_FOUND: &str = "Expire date not found";

    pub const NOT_AVAILABLE: &str = "Not available";
    pub const DETAILS_NOT_LOADED: &str = "Could not load job details";
    pub const DESCRIPTION_UNAVAILABLE: &str =
        "Description unavailable or could not be extracted properly";
    pub const REQUIREMENTS_UNAVAILABLE: &str =
        "Requirements unavailable or could not be extracted properly";
    pub const REQUIREMENTS_IN_DESCRIPTION: &str = "Requirements included in job description";

    /// Literal written to `Expire Date` when the expiry text is not recognised.
    pub const UNKNOWN_DATE: &str = "unknown";
}

/// One condensed entry from a search-results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub posted: String,
    pub expires: String,
    /// Absolute link, or [`sentinel::LINK_NOT_FOUND`].
    pub link: String,
    pub welfare: Vec<String>,
}

impl ListingItem {
    /// Whether the item carries a usable detail-page link.
    pub fn has_link(&self) -> bool {
        !self.link.is_empty() && self.link != sentinel::LINK_NOT_FOUND
    }

    /// Join this listing with its detail-page fields.
    pub fn into_record(self, detail: JobDetail) -> RawJobRecord {
        RawJobRecord {
            job_title: self.title,
            company: self.company,
            location: self.location,
            salary: self.salary,
            date: self.posted,
            job_link: self.link,
            expire_date: self.expires,
            welfare: self.welfare,
            job_description: detail.description,
            job_requirements: detail.requirements,
            job_level: detail.level,
            job_type: detail.job_type,
            experience: detail.experience,
            industry: detail.industry,
        }
    }
}

/// Free-text fields taken from a job's detail page.
///
/// Every field is always populated; failures are recorded as sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDetail {
    pub description: String,
    pub requirements: String,
    pub level: String,
    pub job_type: String,
    pub experience: String,
    pub industry: String,
}

impl JobDetail {
    /// Detail fields for a page that could not be loaded at all.
    pub fn unavailable() -> Self {
        Self {
            description: sentinel::DETAILS_NOT_LOADED.to_string(),
            requirements: sentinel::DETAILS_NOT_LOADED.to_string(),
            level: sentinel::NOT_AVAILABLE.to_string(),
            job_type: sentinel::NOT_AVAILABLE.to_string(),
            experience: sentinel::NOT_AVAILABLE.to_string(),
            industry: sentinel::NOT_AVAILABLE.to_string(),
        }
    }
}

/// A scraped job listing, as written to the raw CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJobRecord {
    #[serde(rename = "Job Title")]
    pub job_title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Job Link")]
    pub job_link: String,
    #[serde(rename = "Expire Date")]
    pub expire_date: String,
    #[serde(rename = "Welfare", with = "list_cell")]
    pub welfare: Vec<String>,
    #[serde(rename = "Job Description")]
    pub job_description: String,
    #[serde(rename = "Job Requirements")]
    pub job_requirements: String,
    #[serde(rename = "Job Level")]
    pub job_level: String,
    #[serde(rename = "Job Type")]
    pub job_type: String,
    #[serde(rename = "Experience")]
    pub experience: String,
    #[serde(rename = "Industry")]
    pub industry: String,
}

impl RawJobRecord {
    /// A record is kept only when both free-text sections are non-empty.
    pub fn has_valid_text(&self) -> bool {
        !self.job_description.trim().is_empty() && !self.job_requirements.trim().is_empty()
    }
}

/// Expiry of a listing: a calendar date or the literal `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpireDate {
    On(NaiveDate),
    Unknown,
}

impl ExpireDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ExpireDate::On(d) => Some(*d),
            ExpireDate::Unknown => None,
        }
    }
}

impl fmt::Display for ExpireDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpireDate::On(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ExpireDate::Unknown => f.write_str(sentinel::UNKNOWN_DATE),
        }
    }
}

impl Serialize for ExpireDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExpireDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(ExpireDate::On)
            .unwrap_or(ExpireDate::Unknown))
    }
}

/// Column order of the normalized CSV.
pub const NORMALIZED_COLUMNS: [&str; 18] = [
    "Job Title",
    "Company",
    "Location",
    "Salary",
    "Date",
    "Job Link",
    "Expire Date",
    "Welfare",
    "Job Description",
    "Job Requirements",
    "Job Level",
    "Job Type",
    "Experience",
    "Industry",
    "Min_Salary",
    "Max_Salary",
    "exp_min",
    "exp_max",
];

/// A job listing with typed date, salary and experience fields.
///
/// `min_salary <= max_salary` is not enforced: malformed source text is parsed
/// as-is. Missing numeric fields are filled with the mean of the batch they were
/// normalized in, so values depend on the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJobRecord {
    #[serde(rename = "Job Title")]
    pub job_title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Job Link")]
    pub job_link: String,
    #[serde(rename = "Expire Date")]
    pub expire_date: ExpireDate,
    #[serde(rename = "Welfare", with = "list_cell")]
    pub welfare: Vec<String>,
    #[serde(rename = "Job Description")]
    pub job_description: String,
    #[serde(rename = "Job Requirements")]
    pub job_requirements: String,
    #[serde(rename = "Job Level")]
    pub job_level: String,
    #[serde(rename = "Job Type")]
    pub job_type: String,
    #[serde(rename = "Experience")]
    pub experience: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Min_Salary")]
    pub min_salary: Option<f64>,
    #[serde(rename = "Max_Salary")]
    pub max_salary: Option<f64>,
    #[serde(rename = "exp_min")]
    pub exp_min: Option<f64>,
    /// `None` means no upper bound could be established for the batch.
    #[serde(rename = "exp_max")]
    pub exp_max: Option<f64>,
}

impl NormalizedJobRecord {
    /// Carry the raw text over; typed fields start unresolved.
    pub fn from_raw(raw: RawJobRecord) -> Self {
        Self {
            job_title: raw.job_title,
            company: raw.company,
            location: raw.location,
            salary: raw.salary,
            date: None,
            job_link: raw.job_link,
            expire_date: ExpireDate::Unknown,
            welfare: raw.welfare,
            job_description: raw.job_description,
            job_requirements: raw.job_requirements,
            job_level: raw.job_level,
            job_type: raw.job_type,
            experience: raw.experience,
            industry: raw.industry,
            min_salary: None,
            max_salary: None,
            exp_min: None,
            exp_max: None,
        }
    }

    /// Cells in [`NORMALIZED_COLUMNS`] order.
    pub fn cells(&self) -> Vec<String> {
        let number = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
        vec![
            self.job_title.clone(),
            self.company.clone(),
            self.location.clone(),
            self.salary.clone(),
            self.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            self.job_link.clone(),
            self.expire_date.to_string(),
            list_cell::encode(&self.welfare),
            self.job_description.clone(),
            self.job_requirements.clone(),
            self.job_level.clone(),
            self.job_type.clone(),
            self.experience.clone(),
            self.industry.clone(),
            number(self.min_salary),
            number(self.max_salary),
            number(self.exp_min),
            number(self.exp_max),
        ]
    }

    /// Identity of the whole row, used for exact-duplicate removal.
    pub(crate) fn row_key(&self) -> String {
        self.cells().join("\u{1f}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(link: &str) -> ListingItem {
        ListingItem {
            title: "Data Analyst".to_string(),
            company: "Acme".to_string(),
            location: "Hà Nội".to_string(),
            salary: "15 - 20 Tr VND".to_string(),
            posted: "01-03-2025".to_string(),
            expires: "3 ngày".to_string(),
            link: link.to_string(),
            welfare: vec!["Thưởng".to_string()],
        }
    }

    #[test]
    fn test_listing_link_presence() {
        assert!(listing("https://careerviet.vn/vi/tim-viec-lam/a.1.html").has_link());
        assert!(!listing(sentinel::LINK_NOT_FOUND).has_link());
        assert!(!listing("").has_link());
    }

    #[test]
    fn test_into_record_joins_detail() {
        let record = listing("https://x/1").into_record(JobDetail::unavailable());
        assert_eq!(record.job_link, "https://x/1");
        assert_eq!(record.job_description, sentinel::DETAILS_NOT_LOADED);
        assert_eq!(record.job_level, sentinel::NOT_AVAILABLE);
        assert!(record.has_valid_text());
    }

    #[test]
    fn test_blank_text_is_invalid() {
        let mut record = listing("https://x/1").into_record(JobDetail::unavailable());
        record.job_requirements = "   ".to_string();
        assert!(!record.has_valid_text());
    }

    #[test]
    fn test_expire_date_display() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(ExpireDate::On(d).to_string(), "2025-03-31");
        assert_eq!(ExpireDate::Unknown.to_string(), "unknown");
        assert_eq!(ExpireDate::On(d).date(), Some(d));
    }

    #[test]
    fn test_cells_follow_column_order() {
        let mut record = NormalizedJobRecord::from_raw(
            listing("https://x/1").into_record(JobDetail::unavailable()),
        );
        record.min_salary = Some(15_000_000.0);
        record.exp_max = None;
        let cells = record.cells();
        assert_eq!(cells.len(), NORMALIZED_COLUMNS.len());
        assert_eq!(cells[0], "Data Analyst");
        assert_eq!(cells[6], "unknown");
        assert_eq!(cells[7], "['Thưởng']");
        assert_eq!(cells[14], "15000000");
        assert_eq!(cells[17], "");
    }
}
