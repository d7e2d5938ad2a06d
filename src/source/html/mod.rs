//! HTML spec-sheet source
//!
//! Pages are fetched through the shared [`HttpFetcher`] and handed to the
//! pure functions in [`extract`] as strings. Parsed documents never live
//! across an `.await`.

pub mod extract;

pub use extract::{extract_brands, extract_detail, extract_listing, Selectors};

use super::{HttpFetcher, SourceAdapter};
use crate::config::HtmlSelectors;
use crate::model::{BrandRef, DetailPayload, ListingPage, PageToken, PhoneStub};
use crate::{SourceError, SourceResult};
use async_trait::async_trait;
use url::Url;

/// Source that scrapes a brand menu, listing pages and spec tables
#[derive(Debug, Clone)]
pub struct HtmlSource {
    fetcher: HttpFetcher,
    base_url: Url,
    selectors: Selectors,
}

impl HtmlSource {
    /// Creates an HTML source whose brand menu lives at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Url`] for an unparseable base URL and
    /// [`SourceError::Selector`] for an invalid selector.
    pub fn new(
        fetcher: HttpFetcher,
        base_url: &str,
        selectors: &HtmlSelectors,
    ) -> SourceResult<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(base_url)?,
            selectors: Selectors::compile(selectors)?,
        })
    }
}

#[async_trait]
impl SourceAdapter for HtmlSource {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn list_brands(&self) -> SourceResult<Vec<BrandRef>> {
        let body = self.fetcher.get_text(&self.base_url).await?;
        Ok(extract_brands(&body, &self.base_url, &self.selectors))
    }

    async fn list_page(
        &self,
        brand: &BrandRef,
        token: Option<&PageToken>,
    ) -> SourceResult<ListingPage> {
        let url = match token {
            None => Url::parse(&brand.source_url)?,
            Some(PageToken::Link(url)) => url.clone(),
            Some(PageToken::Page(page)) => {
                return Err(SourceError::shape(
                    brand.source_url.as_str(),
                    format!("numbered page {} requested from a link-paginated listing", page),
                ))
            }
        };

        let body = self.fetcher.get_text(&url).await?;
        Ok(extract_listing(&body, &url, brand, &self.selectors))
    }

    async fn fetch_detail(&self, stub: &PhoneStub) -> SourceResult<DetailPayload> {
        let url = Url::parse(&stub.detail_url)?;
        let body = self.fetcher.get_text(&url).await?;
        Ok(extract_detail(&body, &url, &self.selectors))
    }
}
