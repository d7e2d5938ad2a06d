//! Specification section parsing
//!
//! Upstream detail payloads carry their specifications as a loosely-shaped
//! list of titled sections, each holding key/value items. This module folds
//! whatever arrives into a [`SectionMap`]. Malformed sections and items are
//! skipped one by one; a payload that is not section-shaped at all yields an
//! empty map. Parsing never fails.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys under which an object may wrap the section list
const SECTION_LIST_KEYS: [&str; 3] = ["sections", "specifications", "specs"];

/// Keys that may hold a section's title
const TITLE_KEYS: [&str; 4] = ["title", "category", "name", "section"];

/// Keys that may hold a section's items
const ITEM_LIST_KEYS: [&str; 5] = ["specs", "specifications", "items", "fields", "values"];

/// Keys that may hold an item's key
const ITEM_KEY_KEYS: [&str; 4] = ["key", "name", "label", "title"];

/// Keys that may hold an item's value
const ITEM_VALUE_KEYS: [&str; 3] = ["value", "val", "values"];

/// Section title → (key → value)
///
/// Values are `None` when the source listed a key without a value. Lookups
/// through [`SectionMap::get`] trim and ignore case on both title and key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    sections: BTreeMap<String, BTreeMap<String, Option<String>>>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `section[key] = value`, creating the section if needed
    pub fn insert(&mut self, section: &str, key: &str, value: Option<String>) {
        self.sections
            .entry(section.trim().to_string())
            .or_default()
            .insert(key.trim().to_string(), value);
    }

    /// Returns the present, non-null value for `section[key]`
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let items = self.section(section)?;
        let key = key.trim();

        let value = match items.get(key) {
            Some(value) => value,
            None => {
                items
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)?
            }
        };

        value.as_deref()
    }

    /// Returns all items of a section
    pub fn section(&self, title: &str) -> Option<&BTreeMap<String, Option<String>>> {
        let title = title.trim();
        self.sections.get(title).or_else(|| {
            self.sections
                .iter()
                .find(|(t, _)| t.eq_ignore_ascii_case(title))
                .map(|(_, items)| items)
        })
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Parses an untyped section list into a [`SectionMap`]
///
/// Accepted top-level shapes:
/// - an array of section objects
/// - an object wrapping that array under `sections`, `specifications` or `specs`
/// - a single section object
/// - an object mapping titles directly to items
///
/// Anything else produces an empty map.
///
/// # Example
///
/// ```
/// use handset_catalog::parse_sections;
/// use serde_json::json;
///
/// let raw = json!([
///     {"title": "Display", "specs": [{"key": "Type", "value": "OLED"}]},
///     {"title": "Battery", "specs": "not a list"}
/// ]);
/// let sections = parse_sections(&raw);
/// assert_eq!(sections.get("Display", "Type"), Some("OLED"));
/// assert!(sections.section("Battery").is_none());
/// ```
pub fn parse_sections(raw: &Value) -> SectionMap {
    let mut map = SectionMap::new();
    collect_sections(raw, &mut map, 0);
    map
}

fn collect_sections(raw: &Value, map: &mut SectionMap, depth: u8) {
    // Wrapper objects nest at most a couple of levels in practice
    if depth > 4 {
        return;
    }

    match raw {
        Value::Array(entries) => {
            for entry in entries {
                if let Value::Object(obj) = entry {
                    collect_section_entry(obj, map);
                }
            }
        }
        Value::Object(obj) => {
            let inner = SECTION_LIST_KEYS.iter().find_map(|k| obj.get(*k));

            if let Some(inner) = inner.filter(|v| looks_like_section_list(v)) {
                collect_sections(inner, map, depth + 1);
            } else if section_title(obj).is_some() {
                collect_section_entry(obj, map);
            } else if let Some(inner) = inner.filter(|v| v.is_object()) {
                collect_sections(inner, map, depth + 1);
            } else {
                for (title, items) in obj {
                    collect_items(title, items, map);
                }
            }
        }
        _ => {}
    }
}

fn collect_section_entry(entry: &Map<String, Value>, map: &mut SectionMap) {
    let Some(title) = section_title(entry) else {
        return;
    };
    let Some(items) = ITEM_LIST_KEYS.iter().find_map(|k| entry.get(*k)) else {
        return;
    };
    collect_items(title, items, map);
}

/// Whether `value` is an array holding at least one titled section with items
fn looks_like_section_list(value: &Value) -> bool {
    value.as_array().is_some_and(|entries| {
        entries.iter().filter_map(Value::as_object).any(|entry| {
            section_title(entry).is_some() && ITEM_LIST_KEYS.iter().any(|k| entry.contains_key(*k))
        })
    })
}

fn section_title(entry: &Map<String, Value>) -> Option<&str> {
    TITLE_KEYS
        .iter()
        .filter_map(|k| entry.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|t| !t.is_empty())
}

fn collect_items(title: &str, items: &Value, map: &mut SectionMap) {
    if title.trim().is_empty() {
        return;
    }

    match items {
        Value::Array(list) => {
            for item in list {
                if let Some((key, value)) = parse_item(item) {
                    map.insert(title, &key, value);
                }
            }
        }
        Value::Object(obj) => {
            for (key, value) in obj {
                if key.trim().is_empty() {
                    continue;
                }
                if let Some(value) = scalar_text(value) {
                    map.insert(title, key, value);
                }
            }
        }
        _ => {}
    }
}

/// Parses one key/value item; `None` means the item is malformed
fn parse_item(item: &Value) -> Option<(String, Option<String>)> {
    match item {
        Value::Object(obj) => {
            let key = ITEM_KEY_KEYS
                .iter()
                .filter_map(|k| obj.get(*k))
                .filter_map(Value::as_str)
                .map(str::trim)
                .find(|k| !k.is_empty())?;

            let value = match ITEM_VALUE_KEYS.iter().find_map(|k| obj.get(*k)) {
                Some(value) => scalar_text(value)?,
                None => None,
            };

            Some((key.to_string(), value))
        }
        Value::Array(pair) if pair.len() == 2 => {
            let key = pair[0].as_str().map(str::trim).filter(|k| !k.is_empty())?;
            let value = scalar_text(&pair[1])?;
            Some((key.to_string(), value))
        }
        _ => None,
    }
}

/// Renders a JSON value as item text
///
/// The outer `Option` is `None` for shapes that cannot be a value (objects,
/// arrays containing objects); the inner one is `None` for null or blank.
pub(crate) fn scalar_text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => {
            let s = s.trim();
            Some((!s.is_empty()).then(|| s.to_string()))
        }
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Array(parts) => {
            let mut lines = Vec::with_capacity(parts.len());
            for part in parts {
                match part {
                    Value::Array(_) | Value::Object(_) => return None,
                    other => {
                        if let Some(Some(text)) = scalar_text(other) {
                            lines.push(text);
                        }
                    }
                }
            }
            Some((!lines.is_empty()).then(|| lines.join("\n")))
        }
        Value::Object(_) => None,
    }
}
