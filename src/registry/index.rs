//! Per-species name lookup index.

use std::collections::HashMap;

use crate::ids::EntryId;
use crate::registry::entry::RegistryEntry;
use crate::species::Species;

/// Name → entries map for one species namespace.
///
/// Keys are primary symbols and synonyms. A name may map to several entries
/// (one mouse marker merged into two human genes, or a withdrawn symbol
/// backfilled onto several entries); lists are in entry order.
#[derive(Debug, Clone)]
pub struct SpeciesIndex {
    species: Species,
    names: HashMap<String, Vec<EntryId>>,
}

impl SpeciesIndex {
    /// Build the index for `species` from a slice of entries.
    pub fn build(species: Species, entries: &[RegistryEntry]) -> Self {
        let mut index = Self {
            species,
            names: HashMap::new(),
        };
        for entry in entries {
            for name in entry.lookup_names(species) {
                index.insert(name, entry.id);
            }
        }
        tracing::debug!(
            "Built {} index with {} names over {} entries",
            species,
            index.names.len(),
            entries.len()
        );
        index
    }

    /// Species this index was built for.
    pub fn species(&self) -> Species {
        self.species
    }

    /// Entries answering to `name`.
    pub fn get(&self, name: &str) -> Option<&[EntryId]> {
        self.names.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Add a name → entry link; repeated links to the same entry are ignored.
    pub fn insert(&mut self, name: &str, id: EntryId) {
        let ids = self.names.entry(name.to_string()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
