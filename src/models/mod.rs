//! Data models for scraped and normalized job listings.

mod job;
mod skill;

pub use job::{
    sentinel, ExpireDate, JobDetail, ListingItem, NormalizedJobRecord, RawJobRecord,
    NORMALIZED_COLUMNS,
};
pub use skill::{SkillCategory, SkillCount, SkilledJobRecord};
