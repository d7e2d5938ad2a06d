//! Structured queries over spec-sheet HTML
//!
//! These functions take a document string and return plain data, so the
//! HTML source can be exercised against fixture pages without a server.
//! Relative links are resolved against the URL the page was fetched from.

use crate::config::HtmlSelectors;
use crate::model::{BrandRef, DetailPayload, ListingPage, PageToken, PhoneStub};
use crate::normalize::derived::slugify;
use crate::{SourceError, SourceResult};
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{json, Map, Value};
use url::Url;

/// Compiled form of [`HtmlSelectors`]
#[derive(Debug, Clone)]
pub struct Selectors {
    brand_link: Selector,
    phone_link: Selector,
    phone_model: Selector,
    phone_thumbnail: Selector,
    next_page: Selector,
    spec_table: Selector,
    section_title: Selector,
    spec_row: Selector,
    spec_key: Selector,
    spec_value: Selector,
    device_name: Selector,
    device_image: Selector,
}

impl Selectors {
    /// Compiles every configured selector
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Selector`] naming the first selector that fails
    /// to parse.
    pub fn compile(config: &HtmlSelectors) -> SourceResult<Self> {
        Ok(Self {
            brand_link: compile(&config.brand_link)?,
            phone_link: compile(&config.phone_link)?,
            phone_model: compile(&config.phone_model)?,
            phone_thumbnail: compile(&config.phone_thumbnail)?,
            next_page: compile(&config.next_page)?,
            spec_table: compile(&config.spec_table)?,
            section_title: compile(&config.section_title)?,
            spec_row: compile(&config.spec_row)?,
            spec_key: compile(&config.spec_key)?,
            spec_value: compile(&config.spec_value)?,
            device_name: compile(&config.device_name)?,
            device_image: compile(&config.device_image)?,
        })
    }
}

fn compile(selector: &str) -> SourceResult<Selector> {
    Selector::parse(selector).map_err(|e| SourceError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Extracts the brand menu
///
/// The brand slug is the last path segment of its listing link without the
/// extension (`samsung-phones-9.php` → `samsung-phones-9`).
pub fn extract_brands(html: &str, page_url: &Url, selectors: &Selectors) -> Vec<BrandRef> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.brand_link)
        .filter_map(|link| {
            let url = resolve(page_url, link.value().attr("href")?)?;
            let name = single_line(&element_text(link));
            let slug = path_stem(&url)
                .or_else(|| Some(slugify(&name)))
                .filter(|s| !s.is_empty())?;

            Some(BrandRef {
                name: if name.is_empty() { slug.clone() } else { name },
                slug,
                source_url: url.to_string(),
            })
        })
        .collect()
}

/// Extracts the phone entries of one listing page and the link to the next
pub fn extract_listing(
    html: &str,
    page_url: &Url,
    brand: &BrandRef,
    selectors: &Selectors,
) -> ListingPage {
    let document = Html::parse_document(html);

    let stubs: Vec<PhoneStub> = document
        .select(&selectors.phone_link)
        .filter_map(|link| {
            let detail_url = resolve(page_url, link.value().attr("href")?)?;

            let model = link
                .select(&selectors.phone_model)
                .next()
                .map(|el| single_line(&element_text(el)))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| single_line(&element_text(link)));

            let thumbnail_url = link
                .select(&selectors.phone_thumbnail)
                .next()
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| resolve(page_url, src))
                .map(String::from);

            Some(PhoneStub {
                brand: brand.name.clone(),
                model,
                detail_url: detail_url.to_string(),
                thumbnail_url,
            })
        })
        .collect();

    let next = document
        .select(&selectors.next_page)
        .find_map(|link| resolve(page_url, link.value().attr("href")?))
        .filter(|url| url != page_url)
        .map(PageToken::Link);

    ListingPage { stubs, next }
}

/// Extracts a detail page into flat fields and a section list
///
/// Spec tables become `[{"title": .., "specs": [{"key": .., "value": ..}]}]`,
/// the same shape JSON sources deliver. A row with an empty key continues
/// the previous key on a new line. Rows seen before any section title are
/// dropped.
pub fn extract_detail(html: &str, page_url: &Url, selectors: &Selectors) -> DetailPayload {
    let document = Html::parse_document(html);
    let mut fields = Map::new();

    if let Some(name) = document
        .select(&selectors.device_name)
        .next()
        .map(|el| single_line(&element_text(el)))
        .filter(|n| !n.is_empty())
    {
        fields.insert("name".to_string(), Value::String(name));
    }

    if let Some(image) = document
        .select(&selectors.device_image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve(page_url, src))
    {
        fields.insert("image".to_string(), Value::String(image.to_string()));
    }

    let mut sections: Vec<(String, Vec<(String, String)>)> = Vec::new();
    let mut current: Option<usize> = None;

    for table in document.select(&selectors.spec_table) {
        for row in table.select(&selectors.spec_row) {
            if let Some(title) = row
                .select(&selectors.section_title)
                .next()
                .map(|th| single_line(&element_text(th)))
                .filter(|t| !t.is_empty())
            {
                current = Some(match sections.iter().position(|(t, _)| *t == title) {
                    Some(idx) => idx,
                    None => {
                        sections.push((title, Vec::new()));
                        sections.len() - 1
                    }
                });
            }

            let Some(idx) = current else { continue };
            let Some(value_el) = row.select(&selectors.spec_value).next() else {
                continue;
            };

            let key = row
                .select(&selectors.spec_key)
                .next()
                .map(|el| single_line(&element_text(el)))
                .unwrap_or_default();
            let value = element_text(value_el);

            let items = &mut sections[idx].1;
            if !key.is_empty() {
                items.push((key, value));
            } else if let Some((_, previous)) = items.last_mut() {
                if !value.is_empty() {
                    if !previous.is_empty() {
                        previous.push('\n');
                    }
                    previous.push_str(&value);
                }
            }
        }
    }

    let sections = sections
        .into_iter()
        .map(|(title, items)| {
            let specs: Vec<Value> = items
                .into_iter()
                .map(|(key, value)| json!({"key": key, "value": value}))
                .collect();
            json!({"title": title, "specs": specs})
        })
        .collect();

    DetailPayload {
        fields,
        sections: Value::Array(sections),
    }
}

/// Text content with `<br>` kept as line breaks
///
/// Whitespace inside each line is collapsed and blank lines are removed.
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(&text.text),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves an href against the page URL, keeping only http(s) targets
fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Last path segment without its extension
fn path_stem(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
    (!stem.is_empty()).then(|| stem.to_string())
}
