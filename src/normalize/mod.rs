//! Section parsing and canonicalization
//!
//! Upstream detail data arrives in two loose forms: flat top-level fields
//! and titled specification sections. This module folds both into one
//! [`CanonicalDevice`](crate::model::CanonicalDevice) through a declared
//! alias table.

pub mod aliases;
pub mod canonical;
pub mod derived;
pub mod sections;

pub use aliases::{Alias, CanonicalField, FieldRule, FIELD_RULES};
pub use canonical::{canonicalize, FieldSource};
pub use sections::{parse_sections, SectionMap};

use thiserror::Error;

/// Reasons a detail payload cannot become a canonical record
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("No identifier could be derived for {detail_url}")]
    MissingIdentifier { detail_url: String },
}
