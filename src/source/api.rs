//! JSON API source
//!
//! Endpoints are configured as path templates under a base URL:
//! `brands-path`, `listing-path` (with `{brand}`) and `detail-path` (with
//! `{phone}`). Response envelopes vary between APIs, so collections are
//! accepted either bare or wrapped under one of a few common keys.

use super::{HttpFetcher, SourceAdapter};
use crate::config::ApiEndpoints;
use crate::model::{BrandRef, DetailPayload, ListingPage, PageToken, PhoneStub};
use crate::normalize::derived::slugify;
use crate::{SourceError, SourceResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

/// Envelope keys a collection may be wrapped under
const LIST_KEYS: [&str; 5] = ["data", "brands", "phones", "items", "results"];

/// Keys holding the section list in a detail record
const SECTION_KEYS: [&str; 3] = ["specifications", "specs", "sections"];

/// Source backed by a JSON REST API
#[derive(Debug, Clone)]
pub struct ApiSource {
    fetcher: HttpFetcher,
    base_url: String,
    endpoints: ApiEndpoints,
}

impl ApiSource {
    /// Creates an API source rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Url`] if `base_url` does not parse.
    pub fn new(
        fetcher: HttpFetcher,
        base_url: &str,
        endpoints: ApiEndpoints,
    ) -> SourceResult<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
        })
    }

    /// Appends `path` to the base URL, keeping any base path prefix
    fn endpoint(&self, path: &str) -> SourceResult<Url> {
        let path = path.trim();
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Ok(Url::parse(&url)?)
    }

    fn listing_url(&self, brand: &BrandRef, page: u32) -> SourceResult<Url> {
        let path = self.endpoints.listing_path.replace("{brand}", &brand.slug);
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut()
            .append_pair(&self.endpoints.page_param, &page.to_string());
        Ok(url)
    }

    fn detail_url(&self, phone: &str) -> SourceResult<Url> {
        self.endpoint(&self.endpoints.detail_path.replace("{phone}", phone))
    }

    fn parse_brand(&self, entry: &Value) -> Option<BrandRef> {
        let (name, slug) = match entry {
            Value::String(name) => (name.trim().to_string(), None),
            Value::Object(obj) => (
                first_text(obj, &["name", "brand_name", "brand", "title"]).unwrap_or_default(),
                first_text(obj, &["slug", "brand_slug", "id", "brand_id"]),
            ),
            _ => return None,
        };

        let slug = slug.unwrap_or_else(|| slugify(&name));
        if slug.is_empty() {
            return None;
        }

        let source_url = self
            .endpoint(&self.endpoints.listing_path.replace("{brand}", &slug))
            .ok()?
            .to_string();

        Some(BrandRef {
            name: if name.is_empty() { slug.clone() } else { name },
            slug,
            source_url,
        })
    }

    fn parse_stub(&self, brand: &BrandRef, entry: &Value) -> Option<PhoneStub> {
        let obj = entry.as_object()?;

        let detail_url = match first_text(obj, &["slug", "phone_slug", "id", "phone_id"]) {
            Some(phone) => self.detail_url(&phone).ok()?.to_string(),
            None => {
                let link = first_text(obj, &["detail", "detail_url", "url"])?;
                if link.starts_with("http://") || link.starts_with("https://") {
                    link
                } else {
                    self.endpoint(&link).ok()?.to_string()
                }
            }
        };

        Some(PhoneStub {
            brand: first_text(obj, &["brand", "brand_name"]).unwrap_or_else(|| brand.name.clone()),
            model: first_text(obj, &["model", "phone_name", "name"]).unwrap_or_default(),
            detail_url,
            thumbnail_url: first_text(obj, &["thumbnail", "thumb", "image"]),
        })
    }
}

#[async_trait]
impl SourceAdapter for ApiSource {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn list_brands(&self) -> SourceResult<Vec<BrandRef>> {
        let url = self.endpoint(&self.endpoints.brands_path)?;
        let body = self.fetcher.get_json(&url).await?;

        let entries = collection(&body)
            .ok_or_else(|| SourceError::shape(url.as_str(), "brand list is not an array"))?;

        let brands: Vec<BrandRef> = entries.iter().filter_map(|e| self.parse_brand(e)).collect();
        if brands.len() < entries.len() {
            tracing::debug!(
                skipped = entries.len() - brands.len(),
                "Skipped brand entries without a name or slug"
            );
        }

        Ok(brands)
    }

    async fn list_page(
        &self,
        brand: &BrandRef,
        token: Option<&PageToken>,
    ) -> SourceResult<ListingPage> {
        let (url, requested) = match token {
            None => (self.listing_url(brand, 1)?, Some(1)),
            Some(PageToken::Page(page)) => (self.listing_url(brand, *page)?, Some(*page)),
            Some(PageToken::Link(link)) => (link.clone(), None),
        };

        let body = self.fetcher.get_json(&url).await?;
        let entries = collection(&body)
            .ok_or_else(|| SourceError::shape(url.as_str(), "phone listing is not an array"))?;

        let stubs: Vec<PhoneStub> = entries
            .iter()
            .filter_map(|e| self.parse_stub(brand, e))
            .collect();

        let next = if stubs.is_empty() {
            None
        } else {
            next_token(&body, &url, requested)
        };

        Ok(ListingPage { stubs, next })
    }

    async fn fetch_detail(&self, stub: &PhoneStub) -> SourceResult<DetailPayload> {
        let url = Url::parse(&stub.detail_url)?;
        let body = self.fetcher.get_json(&url).await?;
        detail_payload(body, url.as_str())
    }
}

/// The array behind a possibly wrapped collection response
fn collection(body: &Value) -> Option<&Vec<Value>> {
    match body {
        Value::Array(list) => Some(list),
        Value::Object(obj) => LIST_KEYS.iter().find_map(|k| obj.get(*k)?.as_array()),
        _ => None,
    }
}

/// Works out the following page from pagination metadata
///
/// Order of precedence: an explicit `next_page` number (or null), a `next`
/// link, `last_page`/`total_pages` against the current page, and finally
/// plain `current + 1`.
///
/// `requested` is `None` when the page was reached through a `next` link.
/// Such a page without its own `next` ends the brand.
fn next_token(body: &Value, url: &Url, requested: Option<u32>) -> Option<PageToken> {
    let meta = pagination_meta(body);
    let number = |key: &str| {
        meta.iter()
            .find_map(|m| m.get(key))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };

    if let Some(next) = meta.iter().find_map(|m| m.get("next_page")) {
        return next
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(PageToken::Page);
    }

    if let Some(next) = meta.iter().find_map(|m| m.get("next")) {
        return next
            .as_str()
            .and_then(|link| url.join(link).ok())
            .map(PageToken::Link);
    }

    let requested = requested?;
    let current = number("current_page")
        .or_else(|| number("page"))
        .unwrap_or(requested.max(1));
    let following = current.checked_add(1).map(PageToken::Page);

    match number("last_page").or_else(|| number("total_pages")) {
        Some(last) if current >= last => None,
        _ => following,
    }
}

/// Objects that may carry pagination keys: the body and its `meta`,
/// `pagination` or `links` members
fn pagination_meta(body: &Value) -> Vec<&Map<String, Value>> {
    let Some(obj) = body.as_object() else {
        return Vec::new();
    };

    let mut meta = vec![obj];
    for key in ["meta", "pagination", "links"] {
        if let Some(inner) = obj.get(key).and_then(Value::as_object) {
            meta.push(inner);
        }
    }
    meta
}

/// Splits a detail response into flat fields and the raw section list
fn detail_payload(body: Value, context: &str) -> SourceResult<DetailPayload> {
    let mut record = match body {
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                obj.insert("data".to_string(), other);
                obj
            }
            None => obj,
        },
        _ => return Err(SourceError::shape(context, "detail record is not an object")),
    };

    let sections = SECTION_KEYS
        .iter()
        .find_map(|k| record.remove(*k))
        .unwrap_or(Value::Null);

    Ok(DetailPayload {
        fields: record,
        sections,
    })
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
