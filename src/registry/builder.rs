//! Registry construction from the reference files.
//!
//! Stages run in a fixed order: human registry, then mouse markers (merged
//! into human entries through ortholog links), then the withdrawn-symbol
//! backfill, then the optional zebrafish orthologs.
//!
//! Mouse merging resolves `MGI accession → HGNC IDs → entries`, where only
//! seeded entries with a human Entrez ID are eligible. Each claimed HGNC ID
//! reaches at most one entry; the union is the fan-out set. A marker that
//! reaches none gets a mouse-only entry.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::error::GenemapError;
use crate::ids::EntryId;
use crate::nomenclature::{
    default_feature_types, parse_hgnc, parse_homology, parse_mgi_markers, parse_zfin,
    HomologyMaps, HumanGeneRecord, MgiMarkers, WithdrawnSymbols, ZebrafishOrthologRecord,
};
use crate::registry::Registry;

/// Reference inputs for registry construction.
#[derive(Debug, Clone)]
pub struct ReferenceFiles {
    pub hgnc: PathBuf,
    pub mgi: PathBuf,
    pub homology: PathBuf,
    pub zfin: Option<PathBuf>,
    /// MGI marker types to keep.
    pub mouse_feature_types: BTreeSet<String>,
}

impl ReferenceFiles {
    pub fn new(hgnc: impl Into<PathBuf>, mgi: impl Into<PathBuf>, homology: impl Into<PathBuf>) -> Self {
        Self {
            hgnc: hgnc.into(),
            mgi: mgi.into(),
            homology: homology.into(),
            zfin: None,
            mouse_feature_types: default_feature_types(),
        }
    }

    pub fn with_zfin(mut self, zfin: impl Into<PathBuf>) -> Self {
        self.zfin = Some(zfin.into());
        self
    }
}

/// Counters collected during construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub human_entries: usize,
    pub mouse_markers: usize,
    /// Markers merged into at least one human entry.
    pub mouse_merged: usize,
    /// Marker → entry links created by merging (≥ `mouse_merged`).
    pub mouse_merge_links: usize,
    pub mouse_only_entries: usize,
    pub withdrawn_synonyms_added: usize,
    pub zebrafish_genes: usize,
    pub zebrafish_merged: usize,
    pub zebrafish_only_entries: usize,
}

/// Staged registry construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
    stats: BuildStats,
    human_loaded: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every reference file and build the registry.
    pub fn construct(files: &ReferenceFiles) -> Result<(Registry, BuildStats), GenemapError> {
        let human = parse_hgnc(&files.hgnc)?;
        let homology = parse_homology(&files.homology)?;
        let markers = parse_mgi_markers(&files.mgi, &files.mouse_feature_types)?;

        let mut builder = Self::new();
        builder.ingest_human(human)?;
        builder.ingest_mouse(&markers, &homology)?;
        if let Some(zfin) = &files.zfin {
            let zebrafish = parse_zfin(zfin)?;
            builder.ingest_zebrafish(&zebrafish)?;
        }
        builder.finish()
    }

    /// Seed one entry per human registry record.
    pub fn ingest_human(&mut self, records: Vec<HumanGeneRecord>) -> Result<&mut Self, GenemapError> {
        for record in records {
            self.registry.add_human_gene(record)?;
            self.stats.human_entries += 1;
        }
        self.human_loaded = true;
        tracing::info!("Seeded {} human entries", self.stats.human_entries);
        Ok(self)
    }

    /// Merge mouse markers into the registry, then backfill withdrawn symbols.
    pub fn ingest_mouse(
        &mut self,
        markers: &MgiMarkers,
        homology: &HomologyMaps,
    ) -> Result<&mut Self, GenemapError> {
        self.require_human("mouse")?;

        let merge_targets = self.registry.mouse_merge_targets();

        for marker in &markers.markers {
            let ensembl = homology.mouse_ensembl(&marker.accession);
            let targets: BTreeSet<EntryId> = homology
                .human_orthologs(&marker.accession)
                .into_iter()
                .flatten()
                .filter_map(|hgnc| merge_targets.get(hgnc))
                .copied()
                .collect();

            self.stats.mouse_markers += 1;
            if targets.is_empty() {
                self.registry.add_mouse_gene(marker, ensembl);
                self.stats.mouse_only_entries += 1;
                continue;
            }
            if targets.len() > 1 {
                tracing::debug!(
                    "Mouse marker {} ({}) merges into {} entries",
                    marker.symbol,
                    marker.accession,
                    targets.len()
                );
            }
            for id in &targets {
                self.registry.merge_mouse_marker(*id, marker, ensembl)?;
            }
            self.stats.mouse_merged += 1;
            self.stats.mouse_merge_links += targets.len();
        }

        tracing::info!(
            "Ingested {} mouse markers: {} merged ({} links), {} mouse-only",
            self.stats.mouse_markers,
            self.stats.mouse_merged,
            self.stats.mouse_merge_links,
            self.stats.mouse_only_entries
        );

        self.backfill_withdrawn(&markers.withdrawn)?;
        Ok(self)
    }

    /// Add withdrawn mouse symbols as synonyms of the entries owning their
    /// replacement symbol.
    ///
    /// An old name is skipped if it is already a mouse primary symbol or a
    /// mouse synonym anywhere in the registry. Both sets are snapshotted
    /// before any additions, so calling this twice adds nothing the second
    /// time. Returns the number of synonyms added.
    pub fn backfill_withdrawn(&mut self, withdrawn: &WithdrawnSymbols) -> Result<usize, GenemapError> {
        let mut primary: HashSet<String> = HashSet::new();
        let mut synonyms: HashSet<String> = HashSet::new();
        let mut owners: HashMap<String, Vec<EntryId>> = HashMap::new();
        for entry in self.registry.entries() {
            for symbol in &entry.mouse_symbols {
                primary.insert(symbol.clone());
                owners.entry(symbol.clone()).or_default().push(entry.id);
            }
            synonyms.extend(entry.mouse_synonyms.iter().cloned());
        }

        let mut added = 0usize;
        for (replacement, old_names) in withdrawn.iter() {
            let Some(ids) = owners.get(replacement) else {
                continue;
            };
            for old in old_names {
                if primary.contains(old) || synonyms.contains(old) {
                    continue;
                }
                for id in ids {
                    if self.registry.add_mouse_synonym(*id, old)? {
                        added += 1;
                    }
                }
            }
        }

        self.stats.withdrawn_synonyms_added += added;
        tracing::info!("Backfilled {} withdrawn mouse symbols as synonyms", added);
        Ok(added)
    }

    /// Attach zebrafish genes to human entries by HGNC ID.
    ///
    /// Rows without a resolvable HGNC ID join the entries their symbol is
    /// anchored to elsewhere in the file. Symbols with no resolvable ortholog
    /// on any row get one zebrafish-only entry each.
    pub fn ingest_zebrafish(
        &mut self,
        records: &[ZebrafishOrthologRecord],
    ) -> Result<&mut Self, GenemapError> {
        self.require_human("zebrafish")?;

        let by_registry_id = self.registry.entries_by_registry_id();
        let target = |rec: &ZebrafishOrthologRecord| {
            rec.hgnc_id
                .as_ref()
                .and_then(|hgnc| by_registry_id.get(hgnc))
                .copied()
        };
        let mut anchored: HashMap<&str, BTreeSet<EntryId>> = HashMap::new();
        for rec in records {
            if let Some(id) = target(rec) {
                anchored.entry(rec.symbol.as_str()).or_default().insert(id);
            }
        }

        let mut zebrafish_only: HashMap<&str, EntryId> = HashMap::new();
        let mut genes: HashSet<&str> = HashSet::new();
        for rec in records {
            genes.insert(rec.symbol.as_str());
            if let Some(id) = target(rec) {
                self.registry.add_zebrafish_ortholog(id, rec)?;
                self.stats.zebrafish_merged += 1;
            } else if let Some(ids) = anchored.get(rec.symbol.as_str()) {
                for id in ids {
                    self.registry.add_zebrafish_ortholog(*id, rec)?;
                }
            } else {
                match zebrafish_only.get(rec.symbol.as_str()) {
                    Some(id) => self.registry.add_zebrafish_ortholog(*id, rec)?,
                    None => {
                        let id = self.registry.add_zebrafish_gene(rec);
                        zebrafish_only.insert(rec.symbol.as_str(), id);
                    }
                }
            }
        }
        self.stats.zebrafish_genes = genes.len();
        self.stats.zebrafish_only_entries = zebrafish_only.len();

        tracing::info!(
            "Ingested {} zebrafish genes: {} ortholog links, {} zebrafish-only",
            self.stats.zebrafish_genes,
            self.stats.zebrafish_merged,
            self.stats.zebrafish_only_entries
        );
        Ok(self)
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Check invariants and hand over the registry.
    pub fn finish(self) -> Result<(Registry, BuildStats), GenemapError> {
        self.registry.check_invariants()?;
        tracing::info!("Registry constructed with {} entries", self.registry.len());
        Ok((self.registry, self.stats))
    }

    fn require_human(&self, stage: &str) -> Result<(), GenemapError> {
        if self.human_loaded {
            Ok(())
        } else {
            Err(GenemapError::InvariantViolation {
                msg: format!("{} references ingested before the human registry", stage),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EntrezId, HgncId, MgiAccession, ZfinId};
    use crate::nomenclature::MouseMarkerRecord;
    use crate::species::Species;

    fn human(symbol: &str, hgnc: &str, entrez: Option<u64>) -> HumanGeneRecord {
        HumanGeneRecord {
            symbol: symbol.to_string(),
            hgnc_id: Some(HgncId::new(hgnc).unwrap()),
            entrez_id: entrez.map(EntrezId),
            ensembl_id: None,
            synonyms: BTreeSet::new(),
        }
    }

    fn marker(symbol: &str, accession: &str, synonyms: &[&str]) -> MouseMarkerRecord {
        MouseMarkerRecord {
            accession: MgiAccession::new(accession).unwrap(),
            symbol: symbol.to_string(),
            feature_type: "Gene".to_string(),
            entrez_id: None,
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn homology(pairs: &[(&str, &str)]) -> HomologyMaps {
        let mut maps = HomologyMaps::default();
        for (acc, hgnc) in pairs {
            maps.add_ortholog(MgiAccession::new(acc).unwrap(), HgncId::new(hgnc).unwrap());
        }
        maps
    }

    fn markers(list: Vec<MouseMarkerRecord>) -> MgiMarkers {
        MgiMarkers {
            markers: list,
            ..Default::default()
        }
    }

    #[test]
    fn test_mouse_merges_into_human() {
        let mut builder = RegistryBuilder::new();
        builder
            .ingest_human(vec![human("BRCA1", "HGNC:1100", Some(672))])
            .unwrap();
        builder
            .ingest_mouse(
                &markers(vec![marker("Brca1", "MGI:104537", &["Brca1-a"])]),
                &homology(&[("MGI:104537", "HGNC:1100")]),
            )
            .unwrap();
        let (registry, stats) = builder.finish().unwrap();
        assert_eq!(registry.len(), 1);
        let entry = &registry.entries()[0];
        assert!(entry.mouse_symbols.contains("Brca1"));
        assert!(entry.mouse_synonyms.contains("Brca1-a"));
        assert_eq!(stats.mouse_merged, 1);
        assert_eq!(stats.mouse_only_entries, 0);
    }

    #[test]
    fn test_mouse_fan_out_to_two_entries() {
        let mut builder = RegistryBuilder::new();
        builder
            .ingest_human(vec![
                human("GENEA", "HGNC:1", Some(100)),
                human("GENEB", "HGNC:2", Some(200)),
            ])
            .unwrap();
        builder
            .ingest_mouse(
                &markers(vec![marker("Gene", "MGI:1", &[])]),
                &homology(&[("MGI:1", "HGNC:1"), ("MGI:1", "HGNC:2")]),
            )
            .unwrap();
        let (registry, stats) = builder.finish().unwrap();
        assert_eq!(registry.lookup(Species::Mouse, "Gene"), &[EntryId(0), EntryId(1)]);
        assert_eq!(stats.mouse_merge_links, 2);
    }

    #[test]
    fn test_human_without_entrez_gets_no_merge() {
        let mut builder = RegistryBuilder::new();
        builder
            .ingest_human(vec![human("GENEA", "HGNC:1", None)])
            .unwrap();
        builder
            .ingest_mouse(
                &markers(vec![marker("Genea", "MGI:1", &[])]),
                &homology(&[("MGI:1", "HGNC:1")]),
            )
            .unwrap();
        let (registry, stats) = builder.finish().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.entries()[1].is_human_less());
        assert_eq!(stats.mouse_only_entries, 1);
    }

    #[test]
    fn test_withdrawn_backfill_idempotent() {
        let mut builder = RegistryBuilder::new();
        builder.ingest_human(vec![]).unwrap();
        let mut mgi = markers(vec![
            marker("Brca1", "MGI:104537", &[]),
            marker("Tp53", "MGI:98834", &["Trp53"]),
        ]);
        mgi.withdrawn.insert("Brca1os", "Brca1");
        mgi.withdrawn.insert("Trp53", "Tp53");
        mgi.withdrawn.insert("Gone1", "Missing1");
        builder.ingest_mouse(&mgi, &HomologyMaps::default()).unwrap();

        assert_eq!(builder.stats().withdrawn_synonyms_added, 1);
        let again = builder.backfill_withdrawn(&mgi.withdrawn).unwrap();
        assert_eq!(again, 0);

        let (registry, _) = builder.finish().unwrap();
        assert_eq!(registry.lookup(Species::Mouse, "Brca1os"), &[EntryId(0)]);
        assert!(registry.lookup(Species::Mouse, "Gone1").is_empty());
    }

    #[test]
    fn test_mouse_before_human_rejected() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .ingest_mouse(&MgiMarkers::default(), &HomologyMaps::default())
            .unwrap_err();
        assert!(matches!(err, GenemapError::InvariantViolation { .. }));
    }

    #[test]
    fn test_zebrafish_merge_and_standalone() {
        let mut builder = RegistryBuilder::new();
        builder
            .ingest_human(vec![human("TP53", "HGNC:11998", Some(7157))])
            .unwrap();
        let zf = |sym: &str, id: &str, hgnc: Option<&str>| ZebrafishOrthologRecord {
            symbol: sym.to_string(),
            zfin_id: ZfinId::new(id).unwrap(),
            hgnc_id: hgnc.map(|h| HgncId::new(h).unwrap()),
        };
        builder
            .ingest_zebrafish(&[
                zf("tp53", "ZDB-GENE-1", Some("HGNC:11998")),
                zf("tp53", "ZDB-GENE-1", None),
                zf("novel", "ZDB-GENE-2", None),
                zf("novel", "ZDB-GENE-2", Some("HGNC:999999")),
            ])
            .unwrap();
        let (registry, stats) = builder.finish().unwrap();
        assert_eq!(registry.lookup(Species::Zebrafish, "tp53"), &[EntryId(0)]);
        assert_eq!(registry.lookup(Species::Zebrafish, "novel"), &[EntryId(1)]);
        assert_eq!(stats.zebrafish_genes, 2);
        assert_eq!(stats.zebrafish_only_entries, 1);
    }

    #[test]
    fn test_shared_entrez_does_not_widen_merge() {
        let mut builder = RegistryBuilder::new();
        builder
            .ingest_human(vec![
                human("GENEA", "HGNC:1", Some(100)),
                human("GENEA2", "HGNC:2", Some(100)),
            ])
            .unwrap();
        builder
            .ingest_mouse(
                &markers(vec![marker("Genea", "MGI:1", &[])]),
                &homology(&[("MGI:1", "HGNC:1")]),
            )
            .unwrap();
        let (registry, stats) = builder.finish().unwrap();
        assert_eq!(registry.lookup(Species::Mouse, "Genea"), &[EntryId(0)]);
        assert!(registry.entries()[1].mouse_symbols.is_empty());
        assert_eq!(stats.mouse_merge_links, 1);
    }

    #[test]
    fn test_zebrafish_unanchored_row_joins_anchored_entry() {
        let mut builder = RegistryBuilder::new();
        builder
            .ingest_human(vec![human("TP53", "HGNC:11998", Some(7157))])
            .unwrap();
        let zf = |id: &str, hgnc: Option<&str>| ZebrafishOrthologRecord {
            symbol: "tp53".to_string(),
            zfin_id: ZfinId::new(id).unwrap(),
            hgnc_id: hgnc.map(|h| HgncId::new(h).unwrap()),
        };
        builder
            .ingest_zebrafish(&[zf("ZDB-GENE-2", None), zf("ZDB-GENE-1", Some("HGNC:11998"))])
            .unwrap();
        let (registry, stats) = builder.finish().unwrap();
        assert_eq!(registry.len(), 1);
        let ids: Vec<&str> = registry.entries()[0].zfin_ids.iter().map(|z| z.as_str()).collect();
        assert_eq!(ids, vec!["ZDB-GENE-1", "ZDB-GENE-2"]);
        assert_eq!(stats.zebrafish_only_entries, 0);
    }
}
