//! MGI/HGNC ortholog homology reader (`MGI_HGNC_AllianceHomology.rpt`).

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use crate::error::GenemapError;
use crate::ids::{is_null, EnsemblGeneId, HgncId, MgiAccession};
use crate::nomenclature::tsv::{
    field, file_label, open_input, record_line, split_multi, tsv_reader, HeaderIndex,
};

const ACCESSION_COLUMN: &str = "MGI Accession ID";
const HGNC_COLUMN: &str = "HGNC ID";
const ENSEMBL_COLUMN: &str = "Ensembl Gene ID";

/// Mouse accession → human orthologs and mouse Ensembl genes.
///
/// One mouse accession may claim several human orthologs; all are kept.
#[derive(Debug, Clone, Default)]
pub struct HomologyMaps {
    pub accession_to_hgnc: HashMap<MgiAccession, BTreeSet<HgncId>>,
    pub accession_to_ensembl: HashMap<MgiAccession, BTreeSet<EnsemblGeneId>>,
}

impl HomologyMaps {
    /// Human registry IDs claimed as orthologs of a mouse accession.
    pub fn human_orthologs(&self, accession: &MgiAccession) -> Option<&BTreeSet<HgncId>> {
        self.accession_to_hgnc.get(accession)
    }

    /// Mouse Ensembl genes recorded for a mouse accession.
    pub fn mouse_ensembl(&self, accession: &MgiAccession) -> Option<&BTreeSet<EnsemblGeneId>> {
        self.accession_to_ensembl.get(accession)
    }

    /// Record an ortholog pair.
    pub fn add_ortholog(&mut self, accession: MgiAccession, hgnc_id: HgncId) {
        self.accession_to_hgnc
            .entry(accession)
            .or_default()
            .insert(hgnc_id);
    }

    /// Record a mouse Ensembl gene for an accession.
    pub fn add_ensembl(&mut self, accession: MgiAccession, ensembl_id: EnsemblGeneId) {
        self.accession_to_ensembl
            .entry(accession)
            .or_default()
            .insert(ensembl_id);
    }
}

/// Parse the ortholog homology file.
pub fn parse_homology(path: &Path) -> Result<HomologyMaps, GenemapError> {
    parse_homology_reader(open_input(path)?, &file_label(path))
}

/// Parse homology rows from any reader.
pub fn parse_homology_reader<R: Read>(reader: R, label: &str) -> Result<HomologyMaps, GenemapError> {
    let mut reader = tsv_reader(reader, true, true);
    let header = HeaderIndex::from_reader(&mut reader, label)?;
    let accession_idx = header.require(ACCESSION_COLUMN)?;
    let hgnc_idx = header.require(HGNC_COLUMN)?;
    let ensembl_idx = header.optional(ENSEMBL_COLUMN);

    let mut maps = HomologyMaps::default();
    let mut rows = 0usize;
    for result in reader.records() {
        let record = result?;
        let line = record_line(&record);
        let at_line = |e: GenemapError| GenemapError::malformed(label, line, e.to_string());

        let raw_accession = field(&record, accession_idx, label, ACCESSION_COLUMN)?;
        if is_null(raw_accession) {
            return Err(GenemapError::malformed(label, line, "empty MGI accession"));
        }
        let accession = MgiAccession::new(raw_accession).map_err(at_line)?;

        for raw in split_multi(field(&record, hgnc_idx, label, HGNC_COLUMN)?) {
            if let Some(hgnc_id) = HgncId::parse_optional(raw).map_err(at_line)? {
                maps.add_ortholog(accession.clone(), hgnc_id);
            }
        }
        if let Some(idx) = ensembl_idx {
            for raw in split_multi(field(&record, idx, label, ENSEMBL_COLUMN)?) {
                if let Some(ensembl_id) = EnsemblGeneId::parse_optional(raw).map_err(at_line)? {
                    maps.add_ensembl(accession.clone(), ensembl_id);
                }
            }
        }
        rows += 1;
    }

    tracing::info!(
        "Parsed {} homology rows from {} ({} mouse accessions with human orthologs)",
        rows,
        label,
        maps.accession_to_hgnc.len()
    );
    Ok(maps)
}
