//! Central gene registry.
//!
//! The registry is an arena of [`RegistryEntry`] values addressed by dense
//! [`EntryId`]s. Every mutation goes through a `Registry` method so that the
//! human-symbol uniqueness map and the cached per-species indices stay
//! consistent:
//!
//! - structural changes (new entries from references, merged symbols,
//!   synonyms) drop the cached indices; they are rebuilt lazily on the next
//!   lookup
//! - stub entries added during dataset resolution are written straight into
//!   an already-built index, so later rows in the same run can hit them
//! - usage tracking never touches names and leaves the indices alone

pub mod builder;
pub mod entry;
pub mod index;

use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap};

use crate::error::GenemapError;
use crate::ids::{EnsemblGeneId, EntryId, HgncId};
use crate::nomenclature::{HumanGeneRecord, MouseMarkerRecord, ZebrafishOrthologRecord};
use crate::species::Species;

pub use builder::{BuildStats, ReferenceFiles, RegistryBuilder};
pub use entry::RegistryEntry;
pub use index::SpeciesIndex;

/// Arena of gene identity entries with lazily built lookup indices.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    human_symbols: HashMap<String, EntryId>,
    indices: [OnceCell<SpeciesIndex>; 3],
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in ID order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&RegistryEntry> {
        self.entries.get(id.index())
    }

    /// Entry owning a human primary symbol.
    pub fn by_human_symbol(&self, symbol: &str) -> Option<&RegistryEntry> {
        self.human_symbols.get(symbol).and_then(|id| self.get(*id))
    }

    /// Name index for a species, built on first use.
    pub fn species_index(&self, species: Species) -> &SpeciesIndex {
        self.indices[species.index()].get_or_init(|| SpeciesIndex::build(species, &self.entries))
    }

    /// Entries answering to `name` in a species namespace.
    pub fn lookup(&self, species: Species, name: &str) -> &[EntryId] {
        self.species_index(species).get(name).unwrap_or(&[])
    }

    /// Seed a human entry from a registry record.
    pub fn add_human_gene(&mut self, record: HumanGeneRecord) -> Result<EntryId, GenemapError> {
        if self.human_symbols.contains_key(&record.symbol) {
            return Err(GenemapError::DuplicateSymbol {
                species: Species::Human,
                symbol: record.symbol,
            });
        }
        let id = self.next_id();
        let mut entry = RegistryEntry::empty(id);
        entry.human_registry_id = record.hgnc_id;
        entry.human_entrez_id = record.entrez_id;
        entry.human_ensembl_id = record.ensembl_id;
        entry.human_synonyms = record.synonyms;
        self.human_symbols.insert(record.symbol.clone(), id);
        entry.human_symbol = Some(record.symbol);
        self.push(entry);
        Ok(id)
    }

    /// Merge a mouse marker into an existing entry.
    pub fn merge_mouse_marker(
        &mut self,
        id: EntryId,
        marker: &MouseMarkerRecord,
        ensembl_ids: Option<&BTreeSet<EnsemblGeneId>>,
    ) -> Result<(), GenemapError> {
        let entry = self.entry_mut(id)?;
        entry.mouse_symbols.insert(marker.symbol.clone());
        entry.mouse_accession_ids.insert(marker.accession.clone());
        entry
            .mouse_synonyms
            .extend(marker.synonyms.iter().cloned());
        if let Some(entrez) = marker.entrez_id {
            entry.mouse_entrez_ids.insert(entrez);
        }
        if let Some(ensembl) = ensembl_ids {
            entry.mouse_ensembl_ids.extend(ensembl.iter().cloned());
        }
        self.invalidate_indices();
        Ok(())
    }

    /// Create a mouse-only entry for a marker without a resolvable human ortholog.
    pub fn add_mouse_gene(
        &mut self,
        marker: &MouseMarkerRecord,
        ensembl_ids: Option<&BTreeSet<EnsemblGeneId>>,
    ) -> EntryId {
        let id = self.next_id();
        let mut entry = RegistryEntry::empty(id);
        entry.mouse_symbols.insert(marker.symbol.clone());
        entry.mouse_accession_ids.insert(marker.accession.clone());
        entry.mouse_synonyms = marker.synonyms.clone();
        entry.mouse_entrez_ids.extend(marker.entrez_id);
        if let Some(ensembl) = ensembl_ids {
            entry.mouse_ensembl_ids = ensembl.clone();
        }
        self.push(entry);
        id
    }

    /// Add a mouse synonym to an entry. Returns false if it was already present.
    pub fn add_mouse_synonym(&mut self, id: EntryId, synonym: &str) -> Result<bool, GenemapError> {
        let added = self.entry_mut(id)?.mouse_synonyms.insert(synonym.to_string());
        if added {
            self.invalidate_indices();
        }
        Ok(added)
    }

    /// Attach a zebrafish gene to an existing entry.
    pub fn add_zebrafish_ortholog(
        &mut self,
        id: EntryId,
        record: &ZebrafishOrthologRecord,
    ) -> Result<(), GenemapError> {
        let entry = self.entry_mut(id)?;
        entry.zebrafish_symbols.insert(record.symbol.clone());
        entry.zfin_ids.insert(record.zfin_id.clone());
        self.invalidate_indices();
        Ok(())
    }

    /// Create a zebrafish-only entry.
    pub fn add_zebrafish_gene(&mut self, record: &ZebrafishOrthologRecord) -> EntryId {
        let id = self.next_id();
        let mut entry = RegistryEntry::empty(id);
        entry.zebrafish_symbols.insert(record.symbol.clone());
        entry.zfin_ids.insert(record.zfin_id.clone());
        self.push(entry);
        id
    }

    /// Synthesize a stub entry for a symbol no reference knows about.
    ///
    /// The stub is marked used, carries the dataset name and the symbol as a
    /// used name, and never gets a registry ID. If the species index is
    /// already built the symbol is inserted into it directly.
    pub fn add_manual_entry(
        &mut self,
        species: Species,
        symbol: &str,
        dataset: &str,
    ) -> Result<EntryId, GenemapError> {
        if species == Species::Human && self.human_symbols.contains_key(symbol) {
            return Err(GenemapError::DuplicateSymbol {
                species,
                symbol: symbol.to_string(),
            });
        }
        let id = self.next_id();
        let mut entry = RegistryEntry::empty(id);
        match species {
            Species::Human => {
                entry.human_symbol = Some(symbol.to_string());
                self.human_symbols.insert(symbol.to_string(), id);
            }
            Species::Mouse => {
                entry.mouse_symbols.insert(symbol.to_string());
            }
            Species::Zebrafish => {
                entry.zebrafish_symbols.insert(symbol.to_string());
            }
        }
        entry.manually_added = true;
        entry.used = true;
        entry.dataset_names.insert(dataset.to_string());
        entry.used_names_mut(species).insert(symbol.to_string());
        self.entries.push(entry);

        if let Some(index) = self.indices[species.index()].get_mut() {
            index.insert(symbol, id);
        }
        Ok(id)
    }

    /// Record that `name` resolved to entry `id` in `dataset`.
    pub fn record_use(
        &mut self,
        id: EntryId,
        species: Species,
        name: &str,
        dataset: &str,
    ) -> Result<(), GenemapError> {
        let entry = self.entry_mut(id)?;
        entry.used = true;
        entry.dataset_names.insert(dataset.to_string());
        entry.used_names_mut(species).insert(name.to_string());
        Ok(())
    }

    /// HGNC ID → seeded entry, for entries that also carry a human Entrez ID.
    ///
    /// These are the only entries mouse markers may merge into. Entrez IDs are
    /// never used as a key, so two HGNC rows sharing one stay separate targets.
    pub fn mouse_merge_targets(&self) -> HashMap<HgncId, EntryId> {
        self.entries
            .iter()
            .filter(|e| e.human_entrez_id.is_some())
            .filter_map(|e| Some((e.human_registry_id.clone()?, e.id)))
            .collect()
    }

    /// HGNC ID → seeded entry.
    pub fn entries_by_registry_id(&self) -> HashMap<HgncId, EntryId> {
        self.entries
            .iter()
            .filter_map(|e| Some((e.human_registry_id.clone()?, e.id)))
            .collect()
    }

    /// Verify the structural invariants of the registry.
    ///
    /// - IDs are dense and match their position
    /// - human primary symbols are unique
    /// - no synonym equals a primary symbol of the same species
    /// - stub entries carry no registry ID
    pub fn check_invariants(&self) -> Result<(), GenemapError> {
        let mut human_symbols = HashMap::new();
        let mut mouse_symbols = BTreeSet::new();
        for (position, entry) in self.entries.iter().enumerate() {
            if entry.id.index() != position {
                return Err(GenemapError::InvariantViolation {
                    msg: format!("entry at position {} has id {}", position, entry.id),
                });
            }
            if let Some(symbol) = &entry.human_symbol {
                if let Some(other) = human_symbols.insert(symbol.as_str(), entry.id) {
                    return Err(GenemapError::InvariantViolation {
                        msg: format!(
                            "human symbol {} owned by entries {} and {}",
                            symbol, other, entry.id
                        ),
                    });
                }
            }
            if entry.manually_added && entry.human_registry_id.is_some() {
                return Err(GenemapError::InvariantViolation {
                    msg: format!("stub entry {} has a registry ID", entry.id),
                });
            }
            mouse_symbols.extend(entry.mouse_symbols.iter().map(String::as_str));
        }

        for entry in &self.entries {
            if let Some(s) = entry
                .human_synonyms
                .iter()
                .find(|s| human_symbols.contains_key(s.as_str()))
            {
                return Err(GenemapError::InvariantViolation {
                    msg: format!("human synonym {} of entry {} is a primary symbol", s, entry.id),
                });
            }
            if let Some(s) = entry
                .mouse_synonyms
                .iter()
                .find(|s| mouse_symbols.contains(s.as_str()))
            {
                return Err(GenemapError::InvariantViolation {
                    msg: format!("mouse synonym {} of entry {} is a primary symbol", s, entry.id),
                });
            }
        }
        Ok(())
    }

    fn next_id(&self) -> EntryId {
        EntryId(self.entries.len())
    }

    fn push(&mut self, entry: RegistryEntry) {
        self.entries.push(entry);
        self.invalidate_indices();
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut RegistryEntry, GenemapError> {
        self.entries
            .get_mut(id.index())
            .ok_or_else(|| GenemapError::InvariantViolation {
                msg: format!("unknown entry id {}", id),
            })
    }

    fn invalidate_indices(&mut self) {
        for cell in &mut self.indices {
            cell.take();
        }
    }
}
