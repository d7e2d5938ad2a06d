//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the traversal that drives a run:
//! - Enumerating brands and applying the brand limit
//! - Paging through each brand's listing until the source signals the end
//! - Fetching, parsing and canonicalizing each listed phone
//! - Isolating per-brand and per-phone failures
//! - Deduplicating and persisting the dataset

use crate::config::{Config, FlushMode};
use crate::dedup::dedup_by_id;
use crate::model::{BrandRef, CanonicalDevice, PageToken, PhoneStub};
use crate::normalize::{canonicalize, parse_sections};
use crate::output::{CrawlStats, JsonFilePersister, Persister};
use crate::source::{build_source, SourceAdapter};
use crate::CatalogError;
use std::fmt;

/// Where the coordinator currently is in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    EnumeratingBrands,
    Paging,
    FetchingDetail,
    Parsing,
    Canonicalizing,
    Accumulating,
    Deduping,
    Persisting,
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::EnumeratingBrands => "enumerating-brands",
            Self::Paging => "paging",
            Self::FetchingDetail => "fetching-detail",
            Self::Parsing => "parsing",
            Self::Canonicalizing => "canonicalizing",
            Self::Accumulating => "accumulating",
            Self::Deduping => "deduping",
            Self::Persisting => "persisting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    source: Box<dyn SourceAdapter>,
    persister: Box<dyn Persister>,
    brand_limit: Option<usize>,
    max_pages_per_brand: u32,
    flush: FlushMode,
    phase: CrawlPhase,
    collected: Vec<CanonicalDevice>,
    stats: CrawlStats,
}

impl Coordinator {
    /// Creates a coordinator with the configured source and a JSON file persister
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CatalogError)` - The source could not be built
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let source = build_source(config)?;
        let persister = Box::new(JsonFilePersister::new(&config.output.path));
        Ok(Self::with_parts(source, persister, config))
    }

    /// Creates a coordinator around an existing source and persister
    pub fn with_parts(
        source: Box<dyn SourceAdapter>,
        persister: Box<dyn Persister>,
        config: &Config,
    ) -> Self {
        Self {
            source,
            persister,
            brand_limit: config.source.brand_limit,
            max_pages_per_brand: config.crawler.max_pages_per_brand.max(1),
            flush: config.output.flush,
            phase: CrawlPhase::Idle,
            collected: Vec::new(),
            stats: CrawlStats::new(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn enter(&mut self, phase: CrawlPhase) {
        if self.phase != phase {
            tracing::trace!(from = %self.phase, to = %phase, "Phase transition");
            self.phase = phase;
        }
    }

    /// Runs the full traversal and writes the dataset
    ///
    /// Only two things abort a run: a failed brand enumeration (nothing is
    /// written) and a failed write. Listing and detail failures are logged
    /// and counted.
    pub async fn run(&mut self) -> Result<CrawlStats, CatalogError> {
        self.stats = CrawlStats::new();
        self.collected.clear();

        self.enter(CrawlPhase::EnumeratingBrands);
        let mut brands = self.source.list_brands().await.map_err(|e| {
            tracing::error!(source = self.source.name(), error = %e, "Brand enumeration failed");
            CatalogError::SourceUnreachable(e.to_string())
        })?;

        if let Some(limit) = self.brand_limit {
            if brands.len() > limit {
                tracing::info!("Brand limit {} applied to {} brands", limit, brands.len());
                brands.truncate(limit);
            }
        }

        self.stats.brands_seen = brands.len() as u64;
        tracing::info!(brands = brands.len(), source = self.source.name(), "Starting crawl");

        let total = brands.len();
        for (idx, brand) in brands.iter().enumerate() {
            tracing::info!("[{}/{}] Crawling brand {}", idx + 1, total, brand.name);
            self.crawl_brand(brand).await;

            if self.flush == FlushMode::PerBrand {
                let snapshot = dedup_by_id(self.collected.clone());
                self.enter(CrawlPhase::Persisting);
                let written = self.persister.persist(&snapshot)?;
                tracing::debug!(brand = %brand.name, records = written, "Flushed dataset");
            }
        }

        self.enter(CrawlPhase::Deduping);
        let collected = std::mem::take(&mut self.collected);
        let before = collected.len();
        let dataset = dedup_by_id(collected);
        self.stats.duplicates_dropped = (before - dataset.len()) as u64;

        self.enter(CrawlPhase::Persisting);
        let written = self.persister.persist(&dataset)?;
        self.stats.records_written = written as u64;

        self.enter(CrawlPhase::Done);
        self.stats.finish();

        tracing::info!(
            records = written,
            duplicates = self.stats.duplicates_dropped,
            failed_details = self.stats.details_failed,
            failed_brands = self.stats.brands_failed,
            "Crawl completed, dataset written to {}",
            self.persister.describe()
        );

        Ok(self.stats.clone())
    }

    /// Pages through one brand, then processes every stub collected
    ///
    /// A listing failure abandons the remaining pages only; stubs from
    /// earlier pages are still processed.
    async fn crawl_brand(&mut self, brand: &BrandRef) {
        self.enter(CrawlPhase::Paging);

        let mut stubs: Vec<PhoneStub> = Vec::new();
        let mut token: Option<PageToken> = None;
        let mut pages = 0u32;

        loop {
            if pages >= self.max_pages_per_brand {
                tracing::warn!(
                    brand = %brand.name,
                    max_pages = self.max_pages_per_brand,
                    "Page limit reached, stopping listing"
                );
                self.stats.page_limit_hits += 1;
                break;
            }

            match self.source.list_page(brand, token.as_ref()).await {
                Ok(page) => {
                    pages += 1;
                    self.stats.pages_fetched += 1;
                    tracing::debug!(
                        brand = %brand.name,
                        page = pages,
                        phones = page.stubs.len(),
                        "Listing page fetched"
                    );

                    let last = page.is_last();
                    stubs.extend(page.stubs);
                    if last {
                        break;
                    }
                    token = page.next;
                }
                Err(e) => {
                    tracing::warn!(
                        brand = %brand.name,
                        page = pages + 1,
                        error = %e,
                        "Listing failed, abandoning remaining pages"
                    );
                    self.stats.brands_failed += 1;
                    break;
                }
            }
        }

        self.stats.stubs_seen += stubs.len() as u64;

        let mut collected = 0usize;
        for stub in &stubs {
            match self.process_stub(stub).await {
                Ok(device) => {
                    self.enter(CrawlPhase::Accumulating);
                    self.collected.push(device);
                    self.stats.records_collected += 1;
                    collected += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        brand = %brand.name,
                        model = %stub.model,
                        url = %stub.detail_url,
                        error = %e,
                        "Skipping phone"
                    );
                    self.stats.details_failed += 1;
                }
            }
        }

        tracing::info!(
            brand = %brand.name,
            pages,
            phones = stubs.len(),
            records = collected,
            "Brand finished"
        );
    }

    async fn process_stub(&mut self, stub: &PhoneStub) -> Result<CanonicalDevice, CatalogError> {
        self.enter(CrawlPhase::FetchingDetail);
        let payload = self.source.fetch_detail(stub).await?;

        self.enter(CrawlPhase::Parsing);
        let sections = parse_sections(&payload.sections);

        self.enter(CrawlPhase::Canonicalizing);
        Ok(canonicalize(stub, &payload, &sections)?)
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the configured source adapter
/// 2. Enumerate brands
/// 3. Page through each brand's listing
/// 4. Fetch and canonicalize every listed phone
/// 5. Deduplicate and write the dataset
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed, possibly with skipped items
/// * `Err(CatalogError)` - The source was unreachable or the dataset could not be written
///
/// # Example
///
/// ```no_run
/// use handset_catalog::config::load_config;
/// use handset_catalog::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("catalog.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} records", stats.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlStats, CatalogError> {
    let mut coordinator = Coordinator::new(&config)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DetailPayload, ListingPage};
    use crate::output::OutputResult;
    use crate::{SourceError, SourceResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Scripted source: each brand has a list of pages, `None` marks a failing page
    #[derive(Default)]
    struct FakeSource {
        brands: Vec<&'static str>,
        fail_brands: bool,
        pages: HashMap<&'static str, Vec<Option<Vec<&'static str>>>>,
        endless: HashSet<&'static str>,
        failing_details: HashSet<&'static str>,
    }

    fn failure(what: &str) -> SourceError {
        SourceError::UnexpectedStatus {
            status: 500,
            url: format!("https://fake/{}", what),
        }
    }

    #[async_trait]
    impl SourceAdapter for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn list_brands(&self) -> SourceResult<Vec<BrandRef>> {
            if self.fail_brands {
                return Err(failure("brands"));
            }
            Ok(self
                .brands
                .iter()
                .map(|name| BrandRef {
                    name: name.to_string(),
                    slug: name.to_lowercase(),
                    source_url: format!("https://fake/{}", name),
                })
                .collect())
        }

        async fn list_page(
            &self,
            brand: &BrandRef,
            token: Option<&PageToken>,
        ) -> SourceResult<ListingPage> {
            let number = match token {
                None => 1,
                Some(PageToken::Page(n)) => *n,
                Some(PageToken::Link(_)) => unreachable!(),
            };

            let make_stub = |model: &str| PhoneStub {
                brand: brand.name.clone(),
                model: model.to_string(),
                detail_url: format!("https://fake/{}/{}", brand.slug, model),
                thumbnail_url: None,
            };

            if self.endless.contains(brand.name.as_str()) {
                return Ok(ListingPage {
                    stubs: vec![make_stub(&format!("p{}", number))],
                    next: Some(PageToken::Page(number + 1)),
                });
            }

            let pages = self.pages.get(brand.name.as_str()).cloned().unwrap_or_default();
            let Some(page) = pages.get(number as usize - 1) else {
                return Ok(ListingPage::default());
            };
            let Some(models) = page else {
                return Err(failure(&brand.slug));
            };

            let next = ((number as usize) < pages.len()).then(|| PageToken::Page(number + 1));
            Ok(ListingPage {
                stubs: models.iter().map(|m| make_stub(m)).collect(),
                next,
            })
        }

        async fn fetch_detail(&self, stub: &PhoneStub) -> SourceResult<DetailPayload> {
            if self.failing_details.contains(stub.model.as_str()) {
                return Err(failure(&stub.model));
            }
            Ok(DetailPayload {
                fields: json!({"id": stub.model, "brand": stub.brand})
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                sections: json!([{"title": "Display", "specs": [{"key": "Size", "value": "6.1 inches"}]}]),
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryPersister {
        writes: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl Persister for MemoryPersister {
        fn persist(&self, devices: &[CanonicalDevice]) -> OutputResult<usize> {
            let ids = devices.iter().map(|d| d.id.clone()).collect();
            self.writes.lock().unwrap().push(ids);
            Ok(devices.len())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn coordinator(source: FakeSource, config: &Config) -> (Coordinator, MemoryPersister) {
        let persister = MemoryPersister::default();
        let coordinator =
            Coordinator::with_parts(Box::new(source), Box::new(persister.clone()), config);
        (coordinator, persister)
    }

    fn last_write(persister: &MemoryPersister) -> Vec<String> {
        persister.writes.lock().unwrap().last().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_end_to_end_with_failed_detail() {
        let source = FakeSource {
            brands: vec!["Acme"],
            pages: HashMap::from([(
                "Acme",
                vec![Some(vec!["a1", "a2", "a3"]), Some(vec!["a4", "a5"])],
            )]),
            failing_details: HashSet::from(["a3"]),
            ..FakeSource::default()
        };
        let (mut coordinator, persister) = coordinator(source, &Config::default());

        let stats = coordinator.run().await.unwrap();

        assert_eq!(last_write(&persister), vec!["a1", "a2", "a4", "a5"]);
        assert_eq!(stats.pages_fetched, 2);
        assert_eq!(stats.stubs_seen, 5);
        assert_eq!(stats.details_failed, 1);
        assert_eq!(stats.records_written, 4);
        assert!(stats.finished_at.is_some());
        assert_eq!(coordinator.phase(), CrawlPhase::Done);
    }

    #[tokio::test]
    async fn test_listing_failure_isolated_to_brand() {
        let source = FakeSource {
            brands: vec!["One", "Two", "Three"],
            pages: HashMap::from([
                ("One", vec![Some(vec!["o1"])]),
                ("Two", vec![Some(vec!["t1"]), None, Some(vec!["t3"])]),
                ("Three", vec![Some(vec!["h1", "h2"])]),
            ]),
            ..FakeSource::default()
        };
        let (mut coordinator, persister) = coordinator(source, &Config::default());

        let stats = coordinator.run().await.unwrap();

        // Page one of brand Two was collected before its second page failed
        assert_eq!(last_write(&persister), vec!["o1", "t1", "h1", "h2"]);
        assert_eq!(stats.brands_failed, 1);
        assert_eq!(stats.brands_seen, 3);
    }

    #[tokio::test]
    async fn test_brand_enumeration_failure_is_fatal() {
        let source = FakeSource {
            fail_brands: true,
            ..FakeSource::default()
        };
        let (mut coordinator, persister) = coordinator(source, &Config::default());

        let result = coordinator.run().await;

        assert!(matches!(result, Err(CatalogError::SourceUnreachable(_))));
        assert!(persister.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_brand_limit_keeps_first_brands() {
        let source = FakeSource {
            brands: vec!["One", "Two", "Three"],
            pages: HashMap::from([
                ("One", vec![Some(vec!["o1"])]),
                ("Two", vec![Some(vec!["t1"])]),
                ("Three", vec![Some(vec!["h1"])]),
            ]),
            ..FakeSource::default()
        };
        let mut config = Config::default();
        config.source.brand_limit = Some(2);
        let (mut coordinator, persister) = coordinator(source, &config);

        let stats = coordinator.run().await.unwrap();

        assert_eq!(stats.brands_seen, 2);
        assert_eq!(last_write(&persister), vec!["o1", "t1"]);
    }

    #[tokio::test]
    async fn test_page_guard_stops_endless_listing() {
        let source = FakeSource {
            brands: vec!["Loop"],
            endless: HashSet::from(["Loop"]),
            ..FakeSource::default()
        };
        let mut config = Config::default();
        config.crawler.max_pages_per_brand = 3;
        let (mut coordinator, persister) = coordinator(source, &config);

        let stats = coordinator.run().await.unwrap();

        assert_eq!(stats.pages_fetched, 3);
        assert_eq!(stats.page_limit_hits, 1);
        assert_eq!(stats.brands_failed, 0);
        assert_eq!(last_write(&persister), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_duplicates_across_brands_dropped() {
        let source = FakeSource {
            brands: vec!["One", "Two"],
            pages: HashMap::from([
                ("One", vec![Some(vec!["shared", "o1"])]),
                ("Two", vec![Some(vec!["t1", "shared"])]),
            ]),
            ..FakeSource::default()
        };
        let (mut coordinator, persister) = coordinator(source, &Config::default());

        let stats = coordinator.run().await.unwrap();

        assert_eq!(last_write(&persister), vec!["shared", "o1", "t1"]);
        assert_eq!(stats.records_collected, 4);
        assert_eq!(stats.duplicates_dropped, 1);
    }

    #[tokio::test]
    async fn test_per_brand_flush_writes_cumulative_dataset() {
        let source = FakeSource {
            brands: vec!["One", "Two"],
            pages: HashMap::from([
                ("One", vec![Some(vec!["o1"])]),
                ("Two", vec![Some(vec!["t1", "o1"])]),
            ]),
            ..FakeSource::default()
        };
        let mut config = Config::default();
        config.output.flush = FlushMode::PerBrand;
        let (mut coordinator, persister) = coordinator(source, &config);

        coordinator.run().await.unwrap();

        let writes = persister.writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0], vec!["o1"]);
        assert_eq!(writes[1], vec!["o1", "t1"]);
        assert_eq!(writes[2], vec!["o1", "t1"]);
    }

    #[tokio::test]
    async fn test_empty_brand_list_writes_empty_dataset() {
        let (mut coordinator, persister) = coordinator(FakeSource::default(), &Config::default());

        let stats = coordinator.run().await.unwrap();

        assert_eq!(stats.records_written, 0);
        assert_eq!(persister.writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(CrawlPhase::EnumeratingBrands.to_string(), "enumerating-brands");
        assert_eq!(CrawlPhase::Done.to_string(), "done");
    }
}
