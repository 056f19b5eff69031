//! Description and requirements text from a detail page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::sentinel;
use crate::utils::html::{css, css_list, element_text, tag_name};
use crate::utils::{ascii_alpha_count, collapse_whitespace};

const DESCRIPTION_SELECTORS: &[&str] = &[
    "div.job-description",
    "div.job-detail-content",
    "div.content-tab",
    "div#job-description",
    ".job-content",
    ".detail-content",
    ".job-detail",
    "div.description",
    "div.job-info",
    ".job-overview",
    "div.job-data",
    ".job-details-content",
    "article.job-content",
    "section.job-detail",
];

const REQUIREMENT_SELECTORS: &[&str] = &[
    "div.job-requirements",
    "div#job-requirements",
    ".requirements",
    "div.qualifications",
    "div.candidate-profile",
    ".required-skills",
    "#qualifications",
    "div.skill-requirements",
    ".candidate-requirements",
];

const DESCRIPTION_HEADINGS: &[&str] = &[
    "mô tả công việc",
    "job description",
    "about the job",
    "job brief",
    "job details",
];
const DESCRIPTION_STOPS: &[&str] = &[
    "yêu cầu",
    "requirements",
    "qualifications",
    "benefits",
    "quyền lợi",
];

const REQUIREMENT_HEADINGS: &[&str] = &[
    "yêu cầu",
    "requirements",
    "qualifications",
    "skills",
    "experience required",
    "what we're looking for",
    "candidate requirements",
    "kỹ năng",
];
const REQUIREMENT_STOPS: &[&str] = &["benefits", "quyền lợi", "how to apply", "nộp hồ sơ"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "strong", "b"];

/// Minimum length for a selector match to be accepted outright.
const DESCRIPTION_MIN_CHARS: usize = 100;
const REQUIREMENTS_MIN_CHARS: usize = 50;
/// Blocks shorter than this are ignored by the longest-block fallback.
const BLOCK_MIN_CHARS: usize = 50;
/// Extracted text needs this many ASCII letters to count as real content.
const MIN_LETTERS: usize = 20;

static DESCRIPTION_CSS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| css_list(DESCRIPTION_SELECTORS));
static REQUIREMENT_CSS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| css_list(REQUIREMENT_SELECTORS));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| css("h1, h2, h3, h4, strong, b"));
static BLOCKS: LazyLock<Selector> = LazyLock::new(|| css("p, div, section"));

/// Requirement sections embedded in description text.
static EMBEDDED_REQUIREMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?s)(?:yêu cầu|requirements|qualifications|what we're looking for)[\s:]+(.*?)(?:quyền lợi|benefits|what we offer|how to apply|$)").unwrap(),
        Regex::new(r"(?s)(?:kỹ năng|skills required|experience needed)[\s:]+(.*?)(?:quyền lợi|benefits|what we offer|how to apply|$)").unwrap(),
    ]
});
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[•\-*]").unwrap());

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Text of the first matching selector, stopping early once one is long enough.
///
/// A shorter match from a later selector replaces an earlier one.
fn from_selectors(document: &Html, selectors: &[Selector], min_chars: usize) -> String {
    let mut content = String::new();
    for selector in selectors {
        if let Some(element) = document.select(selector).next() {
            content = element_text(&element);
            if char_len(&content) > min_chars {
                break;
            }
        }
    }
    content
}

fn mentions_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Sibling content following the first heading that mentions one of `headings`,
/// up to a heading that mentions one of `stops`.
fn from_headings(document: &Html, headings: &[&str], stops: &[&str]) -> String {
    for heading in document.select(&HEADINGS) {
        let heading_text = element_text(&heading).to_lowercase();
        if !mentions_any(&heading_text, headings) {
            continue;
        }

        let mut section = Vec::new();
        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            let content = element_text(&sibling);
            if HEADING_TAGS.contains(&tag_name(&sibling))
                && mentions_any(&content.to_lowercase(), stops)
            {
                break;
            }
            if !content.is_empty() {
                section.push(content);
            }
        }

        if !section.is_empty() {
            return section.join(" ");
        }
    }
    String::new()
}

/// The three longest substantial text blocks on the page.
fn longest_blocks(document: &Html) -> Option<String> {
    let mut blocks: Vec<String> = document
        .select(&BLOCKS)
        .map(|e| element_text(&e))
        .filter(|t| char_len(t) > BLOCK_MIN_CHARS)
        .collect();
    if blocks.is_empty() {
        return None;
    }
    blocks.sort_by_key(|b| std::cmp::Reverse(char_len(b)));
    blocks.truncate(3);
    Some(blocks.join("\n"))
}

/// Job description, or [`sentinel::DESCRIPTION_UNAVAILABLE`].
pub fn extract_description(document: &Html) -> String {
    let mut content = from_selectors(document, &DESCRIPTION_CSS, DESCRIPTION_MIN_CHARS);

    if char_len(&content) < DESCRIPTION_MIN_CHARS {
        let section = from_headings(document, DESCRIPTION_HEADINGS, DESCRIPTION_STOPS);
        if !section.is_empty() {
            content = section;
        }
    }

    if char_len(&content) < DESCRIPTION_MIN_CHARS {
        if let Some(blocks) = longest_blocks(document) {
            content = blocks;
        }
    }

    let content = collapse_whitespace(&content);
    if ascii_alpha_count(&content) < MIN_LETTERS {
        return sentinel::DESCRIPTION_UNAVAILABLE.to_string();
    }
    content
}

/// A bulleted requirements section inside the description text.
fn from_description(description: &str) -> Option<String> {
    let lower = description.to_lowercase();
    EMBEDDED_REQUIREMENTS.iter().find_map(|pattern| {
        let caps = pattern.captures(&lower)?;
        let text = caps[1].trim();
        BULLET.is_match(text).then(|| text.to_string())
    })
}

/// Job requirements, or one of the requirements sentinels.
pub fn extract_requirements(document: &Html, description: &str) -> String {
    let mut content = from_selectors(document, &REQUIREMENT_CSS, REQUIREMENTS_MIN_CHARS);

    if char_len(&content) < REQUIREMENTS_MIN_CHARS {
        let section = from_headings(document, REQUIREMENT_HEADINGS, REQUIREMENT_STOPS);
        if !section.is_empty() {
            content = section;
        }
    }

    if content.is_empty() && !description.is_empty() {
        if let Some(embedded) = from_description(description) {
            content = embedded;
        }
    }

    let content = collapse_whitespace(&content);
    if ascii_alpha_count(&content) < MIN_LETTERS {
        let lower = description.to_lowercase();
        if lower.contains("yêu cầu:") || lower.contains("requirements:") {
            return sentinel::REQUIREMENTS_IN_DESCRIPTION.to_string();
        }
        return sentinel::REQUIREMENTS_UNAVAILABLE.to_string();
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_DESCRIPTION: &str = "Phân tích dữ liệu bán hàng and build weekly dashboards for the \
        commercial team, working with stakeholders across marketing and finance.";

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_description_from_selector() {
        let page = doc(&format!(
            "<div class=\"job-description\"><p>{}</p></div>",
            LONG_DESCRIPTION
        ));
        assert_eq!(extract_description(&page), LONG_DESCRIPTION.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_description_from_heading_section() {
        let page = doc(
            "<h2>Mô tả công việc</h2>\
             <p>Build reporting pipelines in SQL and Python for the sales team.</p>\
             <ul><li>Maintain Power BI dashboards for regional managers</li></ul>\
             <h2>Yêu cầu</h2><p>Bachelor degree</p>",
        );
        let description = extract_description(&page);
        assert!(description.starts_with("Build reporting pipelines"));
        assert!(description.contains("Power BI dashboards"));
        assert!(!description.contains("Bachelor"));
    }

    #[test]
    fn test_description_unavailable() {
        let page = doc("<div>12-03-2025</div>");
        assert_eq!(extract_description(&page), sentinel::DESCRIPTION_UNAVAILABLE);
    }

    #[test]
    fn test_description_needs_twenty_ascii_letters() {
        let short = doc("<div class=\"job-description\">Phân tích dữ liệu bán hàng cho Sở</div>");
        assert_eq!(extract_description(&short), sentinel::DESCRIPTION_UNAVAILABLE);

        let enough = doc("<div class=\"job-description\">Phân tích dữ liệu bán hàng cho sếp</div>");
        assert_eq!(extract_description(&enough), "Phân tích dữ liệu bán hàng cho sếp");
    }

    #[test]
    fn test_requirements_from_heading_section() {
        let page = doc(
            "<h3>Requirements</h3>\
             <ul><li>3+ years of experience with SQL</li><li>Strong communication skills</li></ul>\
             <h3>Benefits</h3><p>Laptop and health insurance for the whole family</p>",
        );
        let requirements = extract_requirements(&page, LONG_DESCRIPTION);
        assert_eq!(
            requirements,
            "3+ years of experience with SQL Strong communication skills"
        );
    }

    #[test]
    fn test_requirements_embedded_in_description() {
        let description = "Job overview. Requirements: - SQL and Excel proficiency - Good English communication. Benefits: laptop";
        let requirements = extract_requirements(&doc("<p>short</p>"), description);
        assert_eq!(
            requirements,
            "- sql and excel proficiency - good english communication."
        );
    }

    #[test]
    fn test_requirements_pointing_at_description() {
        let description = "Mô tả và yêu cầu: liên hệ phòng nhân sự";
        let requirements = extract_requirements(&doc("<p>short</p>"), description);
        assert_eq!(requirements, sentinel::REQUIREMENTS_IN_DESCRIPTION);
    }

    #[test]
    fn test_requirements_unavailable() {
        let requirements = extract_requirements(&doc(""), sentinel::DESCRIPTION_UNAVAILABLE);
        assert_eq!(requirements, sentinel::REQUIREMENTS_UNAVAILABLE);
    }

    #[test]
    fn test_longest_blocks_fallback() {
        let long = "x".repeat(60);
        let longer = "y".repeat(80);
        let page = doc(&format!("<section><p>{}</p></section><p>{}</p><p>short</p>", long, longer));
        let blocks = longest_blocks(&page).unwrap();
        let parts: Vec<&str> = blocks.split('\n').collect();
        assert_eq!(parts[0], longer);
        assert_eq!(parts.len(), 3);
    }
}
