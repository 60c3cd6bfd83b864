//! Per-issuer settings lookup with a wildcard default.

use std::collections::HashMap;

/// Key that matches any issuer without an explicit entry.
pub const WILDCARD: &str = "*";

/// Look up `key`, falling back to the [`WILDCARD`] entry.
///
/// The exact key always wins over the wildcard.
pub fn lookup_with_default<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key).or_else(|| map.get(WILDCARD))
}
