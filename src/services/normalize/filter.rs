//! Whole-word job title filters.

use regex::Regex;

use crate::config::{ANALYST_KEYWORDS, DATA_KEYWORDS};
use crate::models::NormalizedJobRecord;

/// Selects jobs whose title contains any keyword as a whole word, ignoring case.
#[derive(Debug, Clone)]
pub struct TitleFilter {
    pattern: Regex,
}

impl TitleFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| regex::escape(k.as_ref()))
            .collect();
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))?;
        Ok(Self { pattern })
    }

    /// Filter on the built-in data-related keyword list.
    pub fn data_jobs() -> Self {
        Self::new(DATA_KEYWORDS).unwrap()
    }

    /// Filter on the built-in analyst keyword list.
    pub fn analyst_jobs() -> Self {
        Self::new(ANALYST_KEYWORDS).unwrap()
    }

    pub fn matches(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }

    /// Keep matching jobs, preserving order.
    pub fn apply(&self, jobs: &[NormalizedJobRecord]) -> Vec<NormalizedJobRecord> {
        jobs.iter()
            .filter(|job| self.matches(&job.job_title))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_matching() {
        let filter = TitleFilter::data_jobs();
        assert!(filter.matches("Senior Data Engineer"));
        assert!(filter.matches("chuyên viên phân tích dữ liệu"));
        assert!(filter.matches("AI Engineer"));
        assert!(filter.matches("Power BI Developer"));
        assert!(!filter.matches("Kế Toán Tổng Hợp"));
        // "Ai" must not match inside another word
        assert!(!filter.matches("Maintenance Technician"));
    }

    #[test]
    fn test_analyst_filter() {
        let filter = TitleFilter::analyst_jobs();
        assert!(filter.matches("Business Analyst"));
        assert!(filter.matches("Chuyên Viên Phân Tích Tín Dụng"));
        assert!(!filter.matches("Data Engineer"));
        assert!(!filter.matches("Analysts Lead"));
    }

    #[test]
    fn test_custom_keywords_are_escaped() {
        let filter = TitleFilter::new(&["A.I"]).unwrap();
        assert!(filter.matches("A.I Engineer"));
        assert!(!filter.matches("AxI Engineer"));
    }
}
