//! Deduplication of canonical records by id

use crate::model::CanonicalDevice;
use std::collections::HashSet;

/// Keeps the first record for every id, preserving input order
///
/// Records with a blank id are dropped; they cannot be told apart.
///
/// # Arguments
///
/// * `devices` - Records in crawl order
///
/// # Returns
///
/// The surviving records, in the order their ids were first seen
pub fn dedup_by_id(devices: Vec<CanonicalDevice>) -> Vec<CanonicalDevice> {
    let mut seen = HashSet::with_capacity(devices.len());

    devices
        .into_iter()
        .filter(|device| device.has_id() && seen.insert(device.id.clone()))
        .collect()
}
