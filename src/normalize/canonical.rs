//! Mapping of parsed detail data onto [`CanonicalDevice`]

use crate::model::{
    Battery, Camera, CanonicalDevice, DetailPayload, Display, Memory, PhoneStub, Platform,
};
use crate::normalize::aliases::{Alias, CanonicalField};
use crate::normalize::derived::{
    currency_from, os_version_from, ram_from, refresh_rate_from, slugify,
};
use crate::normalize::sections::{scalar_text, SectionMap};
use crate::normalize::NormalizeError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The two places a canonical value can be read from
#[derive(Debug, Clone, Copy)]
pub struct FieldSource<'a> {
    pub fields: &'a Map<String, Value>,
    pub sections: &'a SectionMap,
}

impl<'a> FieldSource<'a> {
    pub fn new(fields: &'a Map<String, Value>, sections: &'a SectionMap) -> Self {
        Self { fields, sections }
    }

    /// First present, non-null value among the field's aliases
    pub fn resolve(&self, field: CanonicalField) -> Option<String> {
        field.aliases().iter().find_map(|alias| self.alias_text(alias))
    }

    /// First non-empty list among the field's aliases
    ///
    /// Multi-line text is split into one entry per line.
    pub fn resolve_list(&self, field: CanonicalField) -> Vec<String> {
        field
            .aliases()
            .iter()
            .map(|alias| self.alias_list(alias))
            .find(|list| !list.is_empty())
            .unwrap_or_default()
    }

    fn alias_text(&self, alias: &Alias) -> Option<String> {
        match alias {
            Alias::Section { section, key } => {
                self.sections.get(section, key).map(str::to_string)
            }
            Alias::Field(path) => lookup_path(self.fields, path)
                .and_then(scalar_text)
                .flatten(),
        }
    }

    fn alias_list(&self, alias: &Alias) -> Vec<String> {
        match alias {
            Alias::Field(path) => match lookup_path(self.fields, path) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| scalar_text(item).flatten())
                    .collect(),
                Some(other) => scalar_text(other)
                    .flatten()
                    .map(|text| split_lines(&text))
                    .unwrap_or_default(),
                None => Vec::new(),
            },
            section => self
                .alias_text(section)
                .map(|text| split_lines(&text))
                .unwrap_or_default(),
        }
    }

    /// Plain string field, bypassing the alias table
    fn text(&self, path: &str) -> Option<String> {
        lookup_path(self.fields, path).and_then(scalar_text).flatten()
    }
}

/// Resolves `a.b.c` against nested objects; an exact top-level key wins
fn lookup_path<'v>(fields: &'v Map<String, Value>, path: &str) -> Option<&'v Value> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }

    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Maps a detail payload onto the canonical schema
///
/// `sections` is the parsed form of `payload.sections`. The stub supplies
/// fallbacks for brand, model and slug, and its thumbnail joins the images.
///
/// # Errors
///
/// [`NormalizeError::MissingIdentifier`] when neither the payload nor the
/// stub yields anything to build an id from.
pub fn canonicalize(
    stub: &PhoneStub,
    payload: &DetailPayload,
    sections: &SectionMap,
) -> Result<CanonicalDevice, NormalizeError> {
    let src = FieldSource::new(&payload.fields, sections);

    let brand = src.resolve(CanonicalField::Brand).or_else(|| non_empty(&stub.brand));
    let model = src
        .resolve(CanonicalField::Model)
        .or_else(|| non_empty(&stub.model))
        .or_else(|| src.text("name"));

    let slug = src
        .resolve(CanonicalField::Slug)
        .or_else(|| stub.source_slug())
        .or_else(|| {
            let joined = format!(
                "{} {}",
                brand.as_deref().unwrap_or_default(),
                model.as_deref().unwrap_or_default()
            );
            Some(slugify(&joined)).filter(|s| !s.is_empty())
        });

    let id = src
        .resolve(CanonicalField::Id)
        .or_else(|| slug.clone())
        .ok_or_else(|| NormalizeError::MissingIdentifier {
            detail_url: stub.detail_url.clone(),
        })?;

    let price = src.resolve(CanonicalField::Price);
    let currency = src
        .resolve(CanonicalField::Currency)
        .or_else(|| price.as_deref().and_then(currency_from));

    let display_type = src.resolve(CanonicalField::DisplayType);
    let display = Display {
        refresh_rate: src
            .resolve(CanonicalField::DisplayRefreshRate)
            .or_else(|| display_type.as_deref().and_then(refresh_rate_from)),
        kind: display_type,
        size: src.resolve(CanonicalField::DisplaySize),
        resolution: src.resolve(CanonicalField::DisplayResolution),
        protection: src.resolve(CanonicalField::DisplayProtection),
    };

    let os = src.resolve(CanonicalField::PlatformOs);
    let platform = Platform {
        os_version: src
            .resolve(CanonicalField::PlatformOsVersion)
            .or_else(|| os.as_deref().and_then(os_version_from)),
        os,
        chipset: src.resolve(CanonicalField::PlatformChipset),
        cpu: src.resolve(CanonicalField::PlatformCpu),
        gpu: src.resolve(CanonicalField::PlatformGpu),
    };

    let storage = src.resolve(CanonicalField::MemoryStorage);
    let memory = Memory {
        ram: src
            .resolve(CanonicalField::MemoryRam)
            .or_else(|| storage.as_deref().and_then(ram_from)),
        storage,
        card_slot: src.resolve(CanonicalField::MemoryCardSlot),
    };

    let camera = Camera {
        rear: src.resolve_list(CanonicalField::CameraRear),
        front: src.resolve_list(CanonicalField::CameraFront),
        video: src.resolve(CanonicalField::CameraVideo),
    };

    let battery = Battery {
        capacity: src.resolve(CanonicalField::BatteryCapacity),
        charging: src.resolve(CanonicalField::BatteryCharging),
        wireless_charging: src.resolve(CanonicalField::BatteryWirelessCharging),
    };

    Ok(CanonicalDevice {
        id,
        brand,
        model,
        slug,
        release_date: src.resolve(CanonicalField::ReleaseDate),
        status: src.resolve(CanonicalField::Status),
        price,
        currency,
        display,
        platform,
        memory,
        camera,
        battery,
        images: collect_images(stub, &payload.fields),
    })
}

/// Gathers image URLs: the payload's `images` (object or array), its single
/// `image`, and the listing thumbnail
fn collect_images(stub: &PhoneStub, fields: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut images = BTreeMap::new();

    match fields.get("images") {
        Some(Value::Object(obj)) => {
            for (name, value) in obj {
                if let Some(url) = value.as_str().and_then(non_empty) {
                    images.insert(name.clone(), url);
                }
            }
        }
        Some(Value::Array(list)) => {
            let urls = list.iter().filter_map(Value::as_str).filter_map(non_empty);
            for (idx, url) in urls.enumerate() {
                images.insert(format!("image_{}", idx), url);
            }
        }
        _ => {}
    }

    if let Some(url) = fields.get("image").and_then(Value::as_str).and_then(non_empty) {
        images.entry("main".to_string()).or_insert(url);
    }

    if let Some(url) = stub.thumbnail_url.as_deref().and_then(non_empty) {
        images.entry("thumbnail".to_string()).or_insert(url);
    }

    images
}
