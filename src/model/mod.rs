//! Traversal and catalog data types
//!
//! [`BrandRef`], [`PhoneStub`] and [`ListingPage`] describe positions in the
//! upstream hierarchy. [`DetailPayload`] is the raw per-phone record handed to
//! normalization, and [`CanonicalDevice`] is what ends up in the dataset.

mod device;

pub use device::{Battery, Camera, CanonicalDevice, Display, Memory, Platform};

use serde_json::{Map, Value};
use url::Url;

/// A brand discovered during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRef {
    /// Display name, e.g. "Samsung"
    pub name: String,

    /// Source identifier used to request the brand's listing
    pub slug: String,

    /// Where the brand's first listing page lives
    pub source_url: String,
}

/// One phone entry from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneStub {
    pub brand: String,
    pub model: String,
    pub detail_url: String,
    pub thumbnail_url: Option<String>,
}

impl PhoneStub {
    /// Identifier of the phone at its source: the last path segment of the
    /// detail URL without its extension.
    ///
    /// ```
    /// use handset_catalog::PhoneStub;
    ///
    /// let stub = PhoneStub {
    ///     brand: "Samsung".into(),
    ///     model: "Galaxy S24".into(),
    ///     detail_url: "https://www.gsmarena.com/samsung_galaxy_s24-12773.php".into(),
    ///     thumbnail_url: None,
    /// };
    /// assert_eq!(stub.source_slug().as_deref(), Some("samsung_galaxy_s24-12773"));
    /// ```
    pub fn source_slug(&self) -> Option<String> {
        let path = match Url::parse(&self.detail_url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self.detail_url.clone(),
        };

        let segment = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        let stem = match segment.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => segment,
        };

        let stem = stem.trim();
        if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        }
    }
}

/// Cursor for the next listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// Explicit page number (API variant)
    Page(u32),
    /// "Next page" link discovered in the page itself (HTML variant)
    Link(Url),
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageToken::Page(n) => write!(f, "page {}", n),
            PageToken::Link(url) => write!(f, "{}", url),
        }
    }
}

/// One page of phone stubs plus the cursor to the following page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub stubs: Vec<PhoneStub>,

    /// `None` when the source signals the end of the listing
    pub next: Option<PageToken>,
}

impl ListingPage {
    /// Whether the listing stops after this page
    pub fn is_last(&self) -> bool {
        self.stubs.is_empty() || self.next.is_none()
    }
}

/// Raw per-device record as returned by a detail fetch
#[derive(Debug, Clone, Default)]
pub struct DetailPayload {
    /// Flat top-level fields
    pub fields: Map<String, Value>,

    /// Untyped list of specification sections (`Value::Null` when absent)
    pub sections: Value,
}
