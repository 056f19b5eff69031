//! Shared utility functions.
//!
//! - `html`: selector helpers and element text extraction
//! - `text`: casing and whitespace normalization

pub mod html;
pub mod text;

pub use text::{ascii_alpha_count, collapse_whitespace, title_case};
