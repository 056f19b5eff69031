//! jobmarket - job listing acquisition and skills analysis for the Vietnamese job market.
//!
//! Crawls CareerViet listing and detail pages with headless browser sessions,
//! normalizes salary, experience and date text into typed fields, and tags
//! curated soft skill, hard skill and domain vocabularies in job requirements.

pub mod cli;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod storage;
pub mod utils;
