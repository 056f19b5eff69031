//! Skill tagging models.

use serde::{Deserialize, Serialize};

use super::job::{NormalizedJobRecord, NORMALIZED_COLUMNS};
use crate::storage::list_cell;

/// The three curated vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    Soft,
    Hard,
    Domain,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 3] = [
        SkillCategory::Soft,
        SkillCategory::Hard,
        SkillCategory::Domain,
    ];

    /// Column holding this category's matches in the skills CSV.
    pub fn column(&self) -> &'static str {
        match self {
            SkillCategory::Soft => "Soft Skills",
            SkillCategory::Hard => "Hard Skills",
            SkillCategory::Domain => "Domains",
        }
    }
}

/// Occurrences of one canonical skill across a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCount {
    #[serde(rename = "Skill")]
    pub skill: String,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// A normalized job with the skills matched in its requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct SkilledJobRecord {
    pub job: NormalizedJobRecord,
    pub soft_skills: Vec<String>,
    pub hard_skills: Vec<String>,
    pub domains: Vec<String>,
}

impl SkilledJobRecord {
    pub fn skills(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Soft => &self.soft_skills,
            SkillCategory::Hard => &self.hard_skills,
            SkillCategory::Domain => &self.domains,
        }
    }

    pub fn header() -> Vec<&'static str> {
        let mut header = NORMALIZED_COLUMNS.to_vec();
        header.extend(SkillCategory::ALL.iter().map(|c| c.column()));
        header
    }

    pub fn cells(&self) -> Vec<String> {
        let mut cells = self.job.cells();
        cells.push(list_cell::encode(&self.soft_skills));
        cells.push(list_cell::encode(&self.hard_skills));
        cells.push(list_cell::encode(&self.domains));
        cells
    }
}
