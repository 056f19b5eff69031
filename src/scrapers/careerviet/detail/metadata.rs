//! Job metadata (level, type, experience, industry) from a detail page.
//!
//! Three tiers are tried in order, each only for fields still unresolved:
//! labelled items inside a known metadata container, two-cell table rows,
//! then inline labels (`strong`, `b`, `label`, `dt`) followed by their value.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::sentinel;
use crate::utils::html::{
    css, css_list, element_text, has_single_string, node_text, parent_element,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    Level,
    JobType,
    Experience,
    Industry,
}

impl MetaField {
    const ALL: [MetaField; 4] = [
        MetaField::Level,
        MetaField::JobType,
        MetaField::Experience,
        MetaField::Industry,
    ];

    /// Label terms recognised in tables and inline labels.
    fn label_terms(&self) -> &'static [&'static str] {
        match self {
            MetaField::Level => &["cấp bậc", "chức vụ", "level"],
            MetaField::JobType => &["hình thức", "job type"],
            MetaField::Experience => &["kinh nghiệm", "experience"],
            MetaField::Industry => &["ngành nghề", "industry"],
        }
    }

    fn matches_label(&self, label: &str) -> bool {
        self.label_terms().iter().any(|t| label.contains(t))
    }
}

const CONTAINER_SELECTORS: &[&str] = &[
    "div.job-info",
    "ul.job-meta",
    "div.job-metadata",
    "div.job-overview",
    "ul.overview-items",
    "div.job-details",
    "div.meta-job-detail",
    "div.detail-box",
    "div.detail-content",
    "div.job-detail-content",
];

static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| css_list(CONTAINER_SELECTORS));
static CONTAINER_ITEM: LazyLock<Selector> = LazyLock::new(|| css("li, div, span"));
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| css("table tr"));
static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| css("th, td"));
static INLINE_LABEL: LazyLock<Selector> = LazyLock::new(|| css("strong, b, label, dt"));

/// Value after a label, up to the next bullet, dash, comma or period.
static ITEM_PATTERNS: LazyLock<Vec<(MetaField, Regex)>> = LazyLock::new(|| {
    vec![
        (
            MetaField::Level,
            Regex::new(r"(?i)(?:cấp bậc|chức vụ|level|position level)[:\s]+([^•\-,.]*)").unwrap(),
        ),
        (
            MetaField::JobType,
            Regex::new(r"(?i)(?:hình thức|job type|employment type)[:\s]+([^•\-,.]*)").unwrap(),
        ),
        (
            MetaField::Experience,
            Regex::new(r"(?i)(?:kinh nghiệm|experience)[:\s]+([^•\-,.]*)").unwrap(),
        ),
        (
            MetaField::Industry,
            Regex::new(r"(?i)(?:ngành nghề|industry|field)[:\s]+([^•\-,.]*)").unwrap(),
        ),
    ]
});

/// Resolved metadata; `None` marks a field no tier has filled yet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobMetadata {
    pub level: Option<String>,
    pub job_type: Option<String>,
    pub experience: Option<String>,
    pub industry: Option<String>,
}

impl JobMetadata {
    fn slot(&mut self, field: MetaField) -> &mut Option<String> {
        match field {
            MetaField::Level => &mut self.level,
            MetaField::JobType => &mut self.job_type,
            MetaField::Experience => &mut self.experience,
            MetaField::Industry => &mut self.industry,
        }
    }

    fn is_resolved(&self, field: MetaField) -> bool {
        match field {
            MetaField::Level => self.level.is_some(),
            MetaField::JobType => self.job_type.is_some(),
            MetaField::Experience => self.experience.is_some(),
            MetaField::Industry => self.industry.is_some(),
        }
    }

    fn is_complete(&self) -> bool {
        MetaField::ALL.iter().all(|f| self.is_resolved(*f))
    }

    /// Fill `field` unless it is already resolved or `value` is empty.
    fn fill(&mut self, field: MetaField, value: String) {
        let slot = self.slot(field);
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value);
        }
    }

    /// Fields in (level, type, experience, industry) order, `Not available` when unresolved.
    pub fn into_fields(self) -> [String; 4] {
        let or_na = |v: Option<String>| v.unwrap_or_else(|| sentinel::NOT_AVAILABLE.to_string());
        [
            or_na(self.level),
            or_na(self.job_type),
            or_na(self.experience),
            or_na(self.industry),
        ]
    }
}

/// Tier 1: labelled items inside the first metadata container found.
///
/// Within this tier a later item overwrites an earlier match.
fn from_container(document: &Html, meta: &mut JobMetadata) {
    let Some(container) = CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).next())
    else {
        return;
    };

    for item in container.select(&CONTAINER_ITEM) {
        if item.id() == container.id() {
            continue;
        }
        let text = element_text(&item).to_lowercase();
        for (field, pattern) in ITEM_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&text) {
                let value = caps[1].trim().to_string();
                if !value.is_empty() {
                    *meta.slot(*field) = Some(value);
                }
            }
        }
    }
}

/// First unresolved field whose label terms appear in `label`.
fn field_for_label(meta: &JobMetadata, label: &str) -> Option<MetaField> {
    MetaField::ALL
        .into_iter()
        .find(|f| f.matches_label(label) && !meta.is_resolved(*f))
}

/// Tier 2: table rows with a label cell followed by a value cell.
fn from_tables(document: &Html, meta: &mut JobMetadata) {
    for row in document.select(&TABLE_ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&TABLE_CELL).collect();
        if cells.len() < 2 {
            continue;
        }
        let label = element_text(&cells[0]).to_lowercase();
        if let Some(field) = field_for_label(meta, &label) {
            meta.fill(field, element_text(&cells[1]));
        }
    }
}

/// Text of the value that follows an inline label.
fn inline_value(label: &ElementRef<'_>) -> Option<String> {
    let value_node = match label.next_sibling() {
        Some(node) if has_single_string(&node) => Some(node),
        _ => parent_element(label).and_then(|p| p.next_sibling()),
    }?;

    let mut value = node_text(&value_node);
    if value.is_empty() {
        if let Some(next) = value_node.next_siblings().find_map(ElementRef::wrap) {
            value = element_text(&next);
        }
    }
    Some(value)
}

/// Remove a label that bled into its captured value, then strip separators.
fn strip_label(value: &str, label: &str) -> String {
    let cleaned = if label.is_empty() {
        value.to_string()
    } else {
        match Regex::new(&format!("(?i){}", regex::escape(label))) {
            Ok(re) => re.replace_all(value, "").into_owned(),
            Err(_) => value.to_string(),
        }
    };
    cleaned
        .trim_matches(|c: char| matches!(c, ':' | ' ' | '\t' | '\n' | '-'))
        .to_string()
}

/// Tier 3: inline labels and their adjacent value.
fn from_inline_labels(document: &Html, meta: &mut JobMetadata) {
    for label_elem in document.select(&INLINE_LABEL) {
        let label = element_text(&label_elem).to_lowercase();
        let Some(field) = field_for_label(meta, &label) else {
            continue;
        };
        if let Some(value) = inline_value(&label_elem) {
            meta.fill(field, strip_label(&value, &label));
        }
    }
}

/// Run the three-tier cascade over a parsed detail page.
pub fn extract_metadata(document: &Html) -> JobMetadata {
    let mut meta = JobMetadata::default();
    from_container(document, &mut meta);
    if !meta.is_complete() {
        from_tables(document, &mut meta);
        from_inline_labels(document, &mut meta);
    }
    meta
}
