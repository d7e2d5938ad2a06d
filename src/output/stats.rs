//! Per-run crawl statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters collected while a crawl runs
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    /// Brands returned by enumeration (after the brand limit)
    pub brands_seen: u64,

    /// Brands whose listing failed at some page
    pub brands_failed: u64,

    /// Listing pages fetched successfully
    pub pages_fetched: u64,

    /// Brands cut short by the per-brand page guard
    pub page_limit_hits: u64,

    /// Listing entries seen
    pub stubs_seen: u64,

    /// Entries skipped because the detail fetch or mapping failed
    pub details_failed: u64,

    /// Canonical records produced before deduplication
    pub records_collected: u64,

    /// Records dropped by deduplication
    pub duplicates_dropped: u64,

    /// Records in the final dataset
    pub records_written: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStats {
    /// Starts a new set of counters stamped with the current time
    pub fn new() -> Self {
        Self {
            brands_seen: 0,
            brands_failed: 0,
            pages_fetched: 0,
            page_limit_hits: 0,
            stubs_seen: 0,
            details_failed: 0,
            records_collected: 0,
            duplicates_dropped: 0,
            records_written: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of listing entries that became canonical records, in percent
    pub fn success_rate(&self) -> f64 {
        if self.stubs_seen == 0 {
            return 0.0;
        }
        (self.records_collected as f64 / self.stubs_seen as f64) * 100.0
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!();

    println!("Traversal:");
    println!("  Brands: {} ({} failed)", stats.brands_seen, stats.brands_failed);
    println!("  Listing pages: {}", stats.pages_fetched);
    if stats.page_limit_hits > 0 {
        println!("  Brands stopped at page limit: {}", stats.page_limit_hits);
    }
    println!("  Phones listed: {}", stats.stubs_seen);
    println!("  Details failed: {}", stats.details_failed);
    println!();

    println!("Dataset:");
    println!("  Records collected: {}", stats.records_collected);
    println!("  Duplicates dropped: {}", stats.duplicates_dropped);
    println!("  Records written: {}", stats.records_written);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} phones normalized)",
        stats.success_rate(),
        stats.records_collected,
        stats.stubs_seen
    );
}
