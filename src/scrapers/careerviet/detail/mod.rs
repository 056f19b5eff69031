//! Job detail page extraction.
//!
//! Extraction is total: every field of the returned [`JobDetail`] is
//! populated, with sentinel strings standing in for anything not found.

mod metadata;
mod sections;

use scraper::Html;

use crate::models::JobDetail;

pub use metadata::{extract_metadata, JobMetadata};
pub use sections::{extract_description, extract_requirements};

/// Extract description, requirements and metadata from a rendered detail page.
pub fn extract_detail(html: &str) -> JobDetail {
    let document = Html::parse_document(html);

    let [level, job_type, experience, industry] = extract_metadata(&document).into_fields();
    let description = extract_description(&document);
    let requirements = extract_requirements(&document, &description);

    JobDetail {
        description,
        requirements,
        level,
        job_type,
        experience,
        industry,
    }
}
