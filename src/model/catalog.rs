//! Location catalog: selectable regions and colos.
//!
//! `/api/locations` has been seen in two shapes. The current one carries
//! `{key, display, isCommon}` entries per collection; the legacy one is a plain
//! mapping whose keys are the catalog keys. Both are normalized here, at the
//! boundary, into one [`LocationCatalog`].

use std::collections::BTreeMap;

use serde::Deserialize;

/// One selectable region or data-center code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: String,
    pub display: String,
    /// Only common entries are offered as interactive tags.
    pub is_common: bool,
}

impl CatalogEntry {
    pub fn new(key: impl Into<String>, display: impl Into<String>, is_common: bool) -> Self {
        Self {
            key: key.into(),
            display: display.into(),
            is_common,
        }
    }
}

/// Immutable snapshot of the regions and colos known to the remote engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationCatalog {
    pub regions: Vec<CatalogEntry>,
    pub colos: Vec<CatalogEntry>,
}

impl LocationCatalog {
    /// Normalize either wire shape into a catalog.
    pub fn from_wire(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let wire: WireCatalog = serde_json::from_value(value)?;
        Ok(Self {
            regions: wire.regions.map(WireCollection::into_entries).unwrap_or_default(),
            colos: wire.colos.map(WireCollection::into_entries).unwrap_or_default(),
        })
    }

    /// Selected keys that the catalog does not know about, as `(regions, colos)`.
    pub fn unknown_keys<'a>(
        &self,
        regions: impl IntoIterator<Item = &'a String>,
        colos: impl IntoIterator<Item = &'a String>,
    ) -> (Vec<String>, Vec<String>) {
        (
            missing(&self.regions, regions),
            missing(&self.colos, colos),
        )
    }
}

fn missing<'a>(entries: &[CatalogEntry], keys: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    keys.into_iter()
        .filter(|k| !entries.iter().any(|e| &e.key == *k))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WireCatalog {
    #[serde(rename = "Regions", alias = "regions", default)]
    regions: Option<WireCollection>,
    #[serde(rename = "Colos", alias = "colos", default)]
    colos: Option<WireCollection>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireCollection {
    Entries(Vec<WireEntry>),
    Legacy(BTreeMap<String, serde_json::Value>),
}

#[derive(Deserialize)]
struct WireEntry {
    key: String,
    #[serde(default)]
    display: Option<String>,
    #[serde(rename = "isCommon", alias = "is_common", default)]
    is_common: bool,
}

impl WireCollection {
    fn into_entries(self) -> Vec<CatalogEntry> {
        match self {
            Self::Entries(entries) => entries
                .into_iter()
                .map(|e| {
                    let display = e.display.unwrap_or_else(|| e.key.clone());
                    CatalogEntry::new(e.key, display, e.is_common)
                })
                .collect(),
            // Legacy mappings have no display/common distinction.
            Self::Legacy(map) => map
                .into_keys()
                .map(|key| CatalogEntry::new(key.clone(), key, true))
                .collect(),
        }
    }
}
