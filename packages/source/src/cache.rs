//! Session-lifetime memoization of upstream responses.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use strum_macros::{AsRefStr, Display};

/// Which upstream call a cached body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    /// ipapi lookup, keyed by IP (empty for the caller's own address).
    IpLookup,
    /// Reference catalog, keyed by catalog kind.
    Catalog,
    /// Event query, keyed by full URL.
    Events,
}

/// Response bodies keyed by `(Endpoint, argument)`.
///
/// Entries are never invalidated; the cache lives as long as the session
/// that owns it.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<BTreeMap<(Endpoint, String), serde_json::Value>>,
}

impl ResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached body for `(endpoint, argument)`.
    #[must_use]
    pub fn get(&self, endpoint: Endpoint, argument: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = entries.get(&(endpoint, argument.to_string())).cloned();
        if hit.is_some() {
            log::debug!("Cache hit: {endpoint} {argument:?}");
        }
        hit
    }

    /// Stores `body` for `(endpoint, argument)`, replacing any earlier body.
    pub fn insert(&self, endpoint: Endpoint, argument: &str, body: serde_json::Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((endpoint, argument.to_string()), body);
    }

    /// Number of cached bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
