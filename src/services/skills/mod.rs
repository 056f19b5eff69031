//! Skill and domain tagging of job requirements.
//!
//! Matching is whole-word and case-insensitive. Every occurrence counts, so a
//! skill mentioned twice in one text appears twice in its tag list.

mod translate;
mod vocabulary;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::models::{NormalizedJobRecord, SkillCategory, SkillCount, SkilledJobRecord};

pub use translate::{
    is_vietnamese, translator_from_config, HttpTranslator, NoopTranslator, TranslateError,
    Translator,
};
pub use vocabulary::{DOMAINS, HARD_SKILLS, SOFT_SKILLS};

static BUILTIN: LazyLock<SkillVocabulary> =
    LazyLock::new(|| SkillVocabulary::new(SOFT_SKILLS, HARD_SKILLS, DOMAINS).unwrap());

/// One canonical skill and its whole-word pattern over lowercased text.
#[derive(Debug, Clone)]
struct VocabularyEntry {
    canonical: String,
    pattern: Regex,
}

fn compile(names: &[&str]) -> Result<Vec<VocabularyEntry>, regex::Error> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let lower = name.to_lowercase();
        if !seen.insert(lower.clone()) {
            continue;
        }
        entries.push(VocabularyEntry {
            canonical: name.to_string(),
            pattern: Regex::new(&format!(r"\b{}\b", regex::escape(&lower)))?,
        });
    }
    Ok(entries)
}

/// The soft skill, hard skill and domain lists with compiled matchers.
///
/// Entries that differ only in case are kept once, under the first spelling.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    soft: Vec<VocabularyEntry>,
    hard: Vec<VocabularyEntry>,
    domains: Vec<VocabularyEntry>,
}

impl SkillVocabulary {
    pub fn new(soft: &[&str], hard: &[&str], domains: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            soft: compile(soft)?,
            hard: compile(hard)?,
            domains: compile(domains)?,
        })
    }

    /// The built-in curated vocabulary, compiled once per process.
    pub fn builtin() -> &'static SkillVocabulary {
        &BUILTIN
    }

    fn entries(&self, category: SkillCategory) -> &[VocabularyEntry] {
        match category {
            SkillCategory::Soft => &self.soft,
            SkillCategory::Hard => &self.hard,
            SkillCategory::Domain => &self.domains,
        }
    }

    /// Canonical names of one category, in declaration order.
    pub fn names(&self, category: SkillCategory) -> impl Iterator<Item = &str> {
        self.entries(category).iter().map(|e| e.canonical.as_str())
    }
}

/// Canonical names of every `category` skill found in `text`, once per occurrence.
pub fn tag(text: &str, vocabulary: &SkillVocabulary, category: SkillCategory) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for entry in vocabulary.entries(category) {
        let hits = entry.pattern.find_iter(&lower).count();
        found.extend(std::iter::repeat_n(entry.canonical.clone(), hits));
    }
    found
}

/// Occurrences per skill across `jobs`, most frequent first.
///
/// Equal counts keep the order in which skills were first seen.
pub fn skill_counts(jobs: &[SkilledJobRecord], category: SkillCategory) -> Vec<SkillCount> {
    let mut counts: Vec<SkillCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for skill in jobs.iter().flat_map(|job| job.skills(category)) {
        match index.get(skill.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(skill.as_str(), counts.len());
                counts.push(SkillCount {
                    skill: skill.clone(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Tags the requirements of normalized jobs, translating them first when possible.
pub struct SkillExtractor<'a> {
    vocabulary: &'a SkillVocabulary,
    translator: Box<dyn Translator>,
}

impl<'a> SkillExtractor<'a> {
    pub fn new(vocabulary: &'a SkillVocabulary, translator: Box<dyn Translator>) -> Self {
        Self {
            vocabulary,
            translator,
        }
    }

    /// Tag one requirements text in all three categories.
    pub async fn tag_text(&self, text: &str) -> [Vec<String>; 3] {
        let text = self.translator.translate(text).await;
        SkillCategory::ALL.map(|category| tag(&text, self.vocabulary, category))
    }

    pub async fn extract(&self, jobs: Vec<NormalizedJobRecord>) -> Vec<SkilledJobRecord> {
        let mut tagged = Vec::with_capacity(jobs.len());
        for job in jobs {
            let [soft_skills, hard_skills, domains] = self.tag_text(&job.job_requirements).await;
            tagged.push(SkilledJobRecord {
                job,
                soft_skills,
                hard_skills,
                domains,
            });
        }
        info!("Tagged skills for {} jobs", tagged.len());
        tagged
    }
}
