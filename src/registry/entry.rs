//! Registry entry: one biological gene concept across species.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ids::{EnsemblGeneId, EntrezId, EntryId, HgncId, MgiAccession, ZfinId};
use crate::species::Species;

/// A gene identity record.
///
/// Human-anchored entries are seeded from HGNC; mouse markers and zebrafish
/// genes are merged into them through ortholog links, or get entries of their
/// own when no ortholog resolves. Entries are only mutated through
/// [`crate::registry::Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub id: EntryId,

    pub human_symbol: Option<String>,
    pub human_entrez_id: Option<EntrezId>,
    pub human_ensembl_id: Option<EnsemblGeneId>,
    /// HGNC ID; only set for entries seeded from HGNC.
    pub human_registry_id: Option<HgncId>,
    pub human_synonyms: BTreeSet<String>,

    pub mouse_symbols: BTreeSet<String>,
    pub mouse_accession_ids: BTreeSet<MgiAccession>,
    pub mouse_entrez_ids: BTreeSet<EntrezId>,
    pub mouse_ensembl_ids: BTreeSet<EnsemblGeneId>,
    pub mouse_synonyms: BTreeSet<String>,

    pub zebrafish_symbols: BTreeSet<String>,
    pub zfin_ids: BTreeSet<ZfinId>,

    /// Synthesized during dataset resolution rather than read from a reference.
    pub manually_added: bool,
    /// Datasets whose rows resolved to this entry.
    pub dataset_names: BTreeSet<String>,
    pub used_human_names: BTreeSet<String>,
    pub used_mouse_names: BTreeSet<String>,
    pub used_zebrafish_names: BTreeSet<String>,
    pub used: bool,
}

impl RegistryEntry {
    pub(crate) fn empty(id: EntryId) -> Self {
        Self {
            id,
            human_symbol: None,
            human_entrez_id: None,
            human_ensembl_id: None,
            human_registry_id: None,
            human_synonyms: BTreeSet::new(),
            mouse_symbols: BTreeSet::new(),
            mouse_accession_ids: BTreeSet::new(),
            mouse_entrez_ids: BTreeSet::new(),
            mouse_ensembl_ids: BTreeSet::new(),
            mouse_synonyms: BTreeSet::new(),
            zebrafish_symbols: BTreeSet::new(),
            zfin_ids: BTreeSet::new(),
            manually_added: false,
            dataset_names: BTreeSet::new(),
            used_human_names: BTreeSet::new(),
            used_mouse_names: BTreeSet::new(),
            used_zebrafish_names: BTreeSet::new(),
            used: false,
        }
    }

    /// Primary symbols of this entry in a species namespace.
    pub fn primary_symbols(&self, species: Species) -> Vec<&str> {
        match species {
            Species::Human => self.human_symbol.iter().map(String::as_str).collect(),
            Species::Mouse => self.mouse_symbols.iter().map(String::as_str).collect(),
            Species::Zebrafish => self.zebrafish_symbols.iter().map(String::as_str).collect(),
        }
    }

    /// Synonyms in a species namespace (zebrafish has none).
    pub fn synonyms(&self, species: Species) -> Option<&BTreeSet<String>> {
        match species {
            Species::Human => Some(&self.human_synonyms),
            Species::Mouse => Some(&self.mouse_synonyms),
            Species::Zebrafish => None,
        }
    }

    /// Every name this entry answers to in a species namespace:
    /// primary symbols first, then synonyms.
    pub fn lookup_names(&self, species: Species) -> impl Iterator<Item = &str> {
        self.primary_symbols(species).into_iter().chain(
            self.synonyms(species)
                .into_iter()
                .flatten()
                .map(String::as_str),
        )
    }

    /// Names observed in resolved data for a species.
    pub fn used_names(&self, species: Species) -> &BTreeSet<String> {
        match species {
            Species::Human => &self.used_human_names,
            Species::Mouse => &self.used_mouse_names,
            Species::Zebrafish => &self.used_zebrafish_names,
        }
    }

    /// Synonyms that were actually observed in resolved data.
    pub fn used_synonyms(&self, species: Species) -> BTreeSet<&str> {
        let used = self.used_names(species);
        self.synonyms(species)
            .into_iter()
            .flatten()
            .filter(|s| used.contains(*s))
            .map(String::as_str)
            .collect()
    }

    /// True if the entry has no human representation.
    pub fn is_human_less(&self) -> bool {
        self.human_symbol.is_none()
    }

    pub(crate) fn used_names_mut(&mut self, species: Species) -> &mut BTreeSet<String> {
        match species {
            Species::Human => &mut self.used_human_names,
            Species::Mouse => &mut self.used_mouse_names,
            Species::Zebrafish => &mut self.used_zebrafish_names,
        }
    }
}
