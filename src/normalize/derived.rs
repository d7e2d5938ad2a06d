//! Values computed from other canonical values
//!
//! Only applied when no alias produced the field directly.

use regex::Regex;
use std::sync::OnceLock;

fn refresh_rate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{2,3})\s*hz\b").expect("valid regex"))
}

fn os_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[A-Za-z][A-Za-z]*(?:\s+[A-Za-z]+)*?\s*v?(\d+(?:\.\d+)*)")
            .expect("valid regex")
    })
}

fn ram_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(GB|MB)\s+RAM").expect("valid regex"))
}

fn currency_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(USD|EUR|GBP|INR|JPY|CNY)\b").expect("valid regex"))
}

/// `"LTPO OLED, 120Hz, HDR10"` → `"120Hz"`
pub fn refresh_rate_from(display_type: &str) -> Option<String> {
    refresh_rate_re()
        .captures(display_type)
        .map(|caps| format!("{}Hz", &caps[1]))
}

/// `"Android 14, up to 7 major upgrades"` → `"14"`
pub fn os_version_from(os: &str) -> Option<String> {
    os_version_re()
        .captures(os)
        .map(|caps| caps[1].to_string())
}

/// `"128GB 8GB RAM, 256GB 8GB RAM"` → `"8GB"`
pub fn ram_from(storage: &str) -> Option<String> {
    ram_re()
        .captures(storage)
        .map(|caps| format!("{}{}", &caps[1], caps[2].to_ascii_uppercase()))
}

/// `"$ 799.99 / € 699.00"` → `"USD"`
///
/// The earliest currency symbol wins; ISO codes written out in the price
/// text are the fallback.
pub fn currency_from(price: &str) -> Option<String> {
    const SYMBOLS: [(char, &str); 4] = [('$', "USD"), ('€', "EUR"), ('£', "GBP"), ('₹', "INR")];

    let by_symbol = price
        .char_indices()
        .find_map(|(_, c)| SYMBOLS.iter().find(|(s, _)| *s == c).map(|(_, code)| *code));

    by_symbol
        .map(str::to_string)
        .or_else(|| currency_code_re().captures(price).map(|caps| caps[1].to_string()))
}

/// Lowercase, ASCII alphanumerics separated by single hyphens
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
