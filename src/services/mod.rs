//! Service layer: crawling, normalization and skill tagging.
//!
//! Services hold the pipeline logic; the CLI only wires them to settings and files.

pub mod crawl;
pub mod normalize;
pub mod skills;

pub use crawl::{CrawlConfig, CrawlError, CrawlReport, CrawlService};
pub use normalize::{JobNormalizer, TitleFilter};
pub use skills::{skill_counts, tag, SkillExtractor, SkillVocabulary};
