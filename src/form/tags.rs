//! Multi-select toggle widget over the common entries of a catalog collection.

use std::collections::BTreeSet;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use tracing::warn;

use crate::model::CatalogEntry;

/// A rendered tag: one common catalog entry and whether it is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub key: &'a str,
    pub display: &'a str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    offered: Vec<CatalogEntry>,
    selected: BTreeSet<String>,
}

impl TagSelector {
    /// Keep only common entries, ordered by display label under Chinese
    /// collation (the engine's labels are Chinese; Latin sorts as in root).
    ///
    /// Seeded keys that are not offered stay selected so a snapshot taken
    /// without edits reproduces the original selection.
    pub fn new(items: &[CatalogEntry], initially_selected: BTreeSet<String>) -> Self {
        let mut offered: Vec<CatalogEntry> =
            items.iter().filter(|e| e.is_common).cloned().collect();
        sort_by_label(&mut offered);
        Self {
            offered,
            selected: initially_selected,
        }
    }

    /// Flip membership of `key`; returns whether it is now selected.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.selected.remove(key) {
            false
        } else {
            self.selected.insert(key.to_string());
            true
        }
    }

    pub fn get_selected(&self) -> BTreeSet<String> {
        self.selected.clone()
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn is_offered(&self, key: &str) -> bool {
        self.offered.iter().any(|e| e.key == key)
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag<'_>> + '_ {
        self.offered.iter().map(|e| Tag {
            key: &e.key,
            display: &e.display,
            selected: self.selected.contains(&e.key),
        })
    }
}

fn sort_by_label(entries: &mut [CatalogEntry]) {
    match Collator::try_new(&locale!("zh").into(), CollatorOptions::new()) {
        Ok(collator) => entries.sort_by(|a, b| {
            collator
                .compare(&a.display, &b.display)
                .then_with(|| a.display.cmp(&b.display))
        }),
        Err(e) => {
            warn!(error = %e, "collation data unavailable, ordering tags by code point");
            entries.sort_by(|a, b| a.display.cmp(&b.display));
        }
    }
}
