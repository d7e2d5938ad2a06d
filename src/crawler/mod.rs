//! Crawler module for traversing a catalog source
//!
//! This module contains the core crawling logic: brand enumeration,
//! listing pagination, per-phone detail processing and the final
//! deduplicate-and-persist step.

mod coordinator;

pub use coordinator::{run_crawl, Coordinator, CrawlPhase};
