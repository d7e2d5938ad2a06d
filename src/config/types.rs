use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Main configuration structure for the catalog crawler
///
/// Every section is optional in the TOML file; missing sections fall back to
/// their defaults, which target the public HTML source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Which source adapter variant drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Structured REST endpoints returning JSON
    Api,
    /// HTML pages scraped with CSS selectors
    Html,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "html" => Ok(Self::Html),
            other => Err(format!("expected \"api\" or \"html\", got \"{}\"", other)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// Upstream source selection and access
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Adapter variant
    pub kind: SourceKind,

    /// Root URL every request path is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Static credential sent as a bearer token (API variant)
    #[serde(rename = "api-token")]
    pub api_token: Option<String>,

    /// Refuse to start when no token is configured
    #[serde(rename = "token-required")]
    pub token_required: bool,

    /// Only crawl the first N brands returned by enumeration
    #[serde(rename = "brand-limit")]
    pub brand_limit: Option<usize>,

    pub api: ApiEndpoints,

    pub html: HtmlSelectors,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Html,
            base_url: "https://www.gsmarena.com/".to_string(),
            api_token: None,
            token_required: false,
            brand_limit: None,
            api: ApiEndpoints::default(),
            html: HtmlSelectors::default(),
        }
    }
}

/// Endpoint layout for the API variant
///
/// `{brand}` and `{phone}` are replaced with the brand slug and the phone
/// slug respectively.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    #[serde(rename = "brands-path")]
    pub brands_path: String,

    #[serde(rename = "listing-path")]
    pub listing_path: String,

    #[serde(rename = "detail-path")]
    pub detail_path: String,

    /// Query parameter carrying the page number
    #[serde(rename = "page-param")]
    pub page_param: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            brands_path: "/brands".to_string(),
            listing_path: "/brands/{brand}".to_string(),
            detail_path: "/phones/{phone}".to_string(),
            page_param: "page".to_string(),
        }
    }
}

/// CSS selectors for the HTML variant
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HtmlSelectors {
    /// Anchors in the brand menu
    #[serde(rename = "brand-link")]
    pub brand_link: String,

    /// Anchors for each phone on a listing page
    #[serde(rename = "phone-link")]
    pub phone_link: String,

    /// Element inside a phone anchor holding the model name
    #[serde(rename = "phone-model")]
    pub phone_model: String,

    /// Image inside a phone anchor
    #[serde(rename = "phone-thumbnail")]
    pub phone_thumbnail: String,

    /// Link to the next listing page
    #[serde(rename = "next-page")]
    pub next_page: String,

    /// One table per specification section
    #[serde(rename = "spec-table")]
    pub spec_table: String,

    #[serde(rename = "section-title")]
    pub section_title: String,

    #[serde(rename = "spec-row")]
    pub spec_row: String,

    #[serde(rename = "spec-key")]
    pub spec_key: String,

    #[serde(rename = "spec-value")]
    pub spec_value: String,

    #[serde(rename = "device-name")]
    pub device_name: String,

    #[serde(rename = "device-image")]
    pub device_image: String,
}

impl Default for HtmlSelectors {
    fn default() -> Self {
        Self {
            brand_link: ".brandmenu-v2 ul li a".to_string(),
            phone_link: ".makers ul li a".to_string(),
            phone_model: "strong".to_string(),
            phone_thumbnail: "img".to_string(),
            next_page: "a.pages-next".to_string(),
            spec_table: "#specs-list table".to_string(),
            section_title: "th".to_string(),
            spec_row: "tr".to_string(),
            spec_key: "td.ttl".to_string(),
            spec_value: "td.nfo".to_string(),
            device_name: "h1.specs-phone-name-title".to_string(),
            device_image: ".specs-photo-main img".to_string(),
        }
    }
}

impl HtmlSelectors {
    /// All selectors with their config key, for validation and compilation
    pub fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("brand-link", &self.brand_link),
            ("phone-link", &self.phone_link),
            ("phone-model", &self.phone_model),
            ("phone-thumbnail", &self.phone_thumbnail),
            ("next-page", &self.next_page),
            ("spec-table", &self.spec_table),
            ("section-title", &self.section_title),
            ("spec-row", &self.spec_row),
            ("spec-key", &self.spec_key),
            ("spec-value", &self.spec_value),
            ("device-name", &self.device_name),
            ("device-image", &self.device_image),
        ]
    }
}

/// Crawler pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Minimum time between two outbound requests (milliseconds)
    #[serde(rename = "throttle-ms")]
    pub throttle_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Upper bound on listing pages visited for a single brand
    #[serde(rename = "max-pages-per-brand")]
    pub max_pages_per_brand: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 1000,
            timeout_secs: 30,
            max_pages_per_brand: 200,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "handset-catalog".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// When the dataset is handed to the persister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushMode {
    /// Once, after the whole traversal
    #[default]
    End,
    /// After every brand, with the cumulative deduplicated dataset
    PerBrand,
}

impl FromStr for FlushMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "end" => Ok(Self::End),
            "per-brand" | "per_brand" => Ok(Self::PerBrand),
            other => Err(format!("expected \"end\" or \"per-brand\", got \"{}\"", other)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON dataset
    pub path: String,

    pub flush: FlushMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "data/phones.json".to_string(),
            flush: FlushMode::End,
        }
    }
}
