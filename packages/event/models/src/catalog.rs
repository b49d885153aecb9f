//! Reference catalogs: the id → descriptor mappings EONET publishes for
//! sources, categories, and magnitude scales.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which reference catalog a value belongs to.
///
/// The string form is both the endpoint path segment and the key of the
/// record array in the response body.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CatalogKind {
    /// Data providers (e.g. `IRWIN`, `InciWeb`).
    Sources,
    /// Event types (e.g. `wildfires`, `severeStorms`).
    Categories,
    /// Magnitude scales (e.g. `mag_kts`, `ac`).
    Magnitudes,
}

impl CatalogKind {
    /// All catalog kinds.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Sources, Self::Categories, Self::Magnitudes]
    }
}

/// A catalog record with its `id` removed.
///
/// Sources and categories carry a `title`; magnitude scales carry a `name`
/// and `unit` instead. Any other fields are preserved in [`Self::fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display title (sources, categories).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display name (magnitude scales).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remaining descriptor fields (`description`, `link`, `unit`, ...).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl CatalogEntry {
    /// The best human-readable label for this entry, falling back to
    /// `fallback` (usually the id) when neither title nor name is present.
    #[must_use]
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(fallback)
    }
}

/// An immutable id → descriptor mapping for one [`CatalogKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ReferenceCatalog {
    /// Whether `id` is a known key.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Looks up the descriptor for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// All ids, in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All `(id, descriptor)` pairs, in sorted id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CatalogEntry)> for ReferenceCatalog {
    fn from_iter<T: IntoIterator<Item = (String, CatalogEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The three reference catalogs fetched once per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogs {
    /// Valid `source` ids.
    pub sources: ReferenceCatalog,
    /// Valid `category` ids.
    pub categories: ReferenceCatalog,
    /// Valid `magID` ids.
    pub magnitudes: ReferenceCatalog,
}

impl Catalogs {
    /// Returns the catalog for `kind`.
    #[must_use]
    pub const fn get(&self, kind: CatalogKind) -> &ReferenceCatalog {
        match kind {
            CatalogKind::Sources => &self.sources,
            CatalogKind::Categories => &self.categories,
            CatalogKind::Magnitudes => &self.magnitudes,
        }
    }
}
