//! Source adapters
//!
//! A source exposes the three-level hierarchy the crawler walks: the brand
//! list, paginated phone listings per brand, and per-phone detail records.
//! Two variants exist: [`ApiSource`] for JSON endpoints and [`HtmlSource`]
//! for spec-sheet web pages.

mod api;
mod fetcher;
pub mod html;

pub use api::ApiSource;
pub use fetcher::{build_http_client, HttpFetcher};
pub use html::HtmlSource;

use crate::config::{Config, SourceKind};
use crate::model::{BrandRef, DetailPayload, ListingPage, PageToken, PhoneStub};
use crate::SourceResult;
use async_trait::async_trait;

/// Trait for upstream catalog sources
///
/// Every error is a [`SourceError`](crate::SourceError); whether it is
/// fatal, per-brand or per-item is decided by the caller.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Enumerates every brand the source knows about
    async fn list_brands(&self) -> SourceResult<Vec<BrandRef>>;

    /// Fetches one listing page for `brand`
    ///
    /// `token` is `None` for the first page and the previous page's `next`
    /// afterwards. A page with `next == None` is the last one.
    async fn list_page(
        &self,
        brand: &BrandRef,
        token: Option<&PageToken>,
    ) -> SourceResult<ListingPage>;

    /// Fetches the detail record behind a listing entry
    async fn fetch_detail(&self, stub: &PhoneStub) -> SourceResult<DetailPayload>;
}

/// Builds the adapter selected by `config.source.kind`
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the base URL does
/// not parse, or (for HTML sources) a configured selector is invalid.
pub fn build_source(config: &Config) -> SourceResult<Box<dyn SourceAdapter>> {
    let fetcher = HttpFetcher::from_config(config)?;

    let source: Box<dyn SourceAdapter> = match config.source.kind {
        SourceKind::Api => Box::new(ApiSource::new(
            fetcher,
            &config.source.base_url,
            config.source.api.clone(),
        )?),
        SourceKind::Html => Box::new(HtmlSource::new(
            fetcher,
            &config.source.base_url,
            &config.source.html,
        )?),
    };

    tracing::debug!(source = source.name(), base_url = %config.source.base_url, "Source ready");
    Ok(source)
}
