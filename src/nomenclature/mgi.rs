//! MGI marker list reader (`MGI_EntrezGene.rpt`).
//!
//! The file has no header; columns are taken by position ([`MGI_MARKER_COLUMNS`]).
//! Withdrawn markers (status `W`) are not genes: when their marker name reads
//! `withdrawn, = <new symbol>` they are recorded in [`WithdrawnSymbols`] so the
//! retired name can later be attached to the replacement as a synonym.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use crate::error::GenemapError;
use crate::ids::{EntrezId, MgiAccession};
use crate::nomenclature::tsv::{
    field, file_label, open_input, record_line, split_multi, tsv_reader,
};

/// Column layout of the marker file.
pub const MGI_MARKER_COLUMNS: [&str; 15] = [
    "MGI Marker Accession ID",
    "Marker Symbol",
    "Status",
    "Marker Name",
    "cM Position",
    "Chromosome",
    "Type",
    "Secondary Accession IDs",
    "Entrez Gene ID",
    "Synonyms",
    "Feature Types",
    "Genome Coordinate Start",
    "Genome Coordinate End",
    "Strand",
    "BioTypes",
];

const ACCESSION_COL: usize = 0;
const SYMBOL_COL: usize = 1;
const STATUS_COL: usize = 2;
const NAME_COL: usize = 3;
const TYPE_COL: usize = 6;
const ENTREZ_COL: usize = 8;
const SYNONYMS_COL: usize = 9;

/// Every marker type the MGI report is known to contain.
pub const KNOWN_FEATURE_TYPES: [&str; 9] = [
    "Complex/Cluster/Region",
    "BAC/YAC end",
    "Cytogenetic Marker",
    "QTL",
    "Transgene",
    "Pseudogene",
    "DNA Segment",
    "Gene",
    "Other Genome Feature",
];

/// Marker types ingested as genes unless configured otherwise.
pub const DEFAULT_FEATURE_TYPES: [&str; 2] = ["Gene", "Pseudogene"];

/// Default allowed feature types as an owned set.
pub fn default_feature_types() -> BTreeSet<String> {
    DEFAULT_FEATURE_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Marker status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStatus {
    /// `O`
    Official,
    /// `W`
    Withdrawn,
}

impl MarkerStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "O" => Some(MarkerStatus::Official),
            "W" => Some(MarkerStatus::Withdrawn),
            _ => None,
        }
    }
}

/// One official marker row retained for registry construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseMarkerRecord {
    pub accession: MgiAccession,
    pub symbol: String,
    pub feature_type: String,
    pub entrez_id: Option<EntrezId>,
    /// Synonyms, minus every retained primary symbol.
    pub synonyms: BTreeSet<String>,
}

/// Withdrawn marker names keyed by their replacement symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawnSymbols {
    by_replacement: BTreeMap<String, BTreeSet<String>>,
}

impl WithdrawnSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `old` was withdrawn in favour of `new`.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.by_replacement
            .entry(new.into())
            .or_default()
            .insert(old.into());
    }

    /// `(replacement, withdrawn names)` pairs in replacement order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.by_replacement.iter()
    }

    /// Withdrawn names that point at `replacement`.
    pub fn withdrawn_for(&self, replacement: &str) -> Option<&BTreeSet<String>> {
        self.by_replacement.get(replacement)
    }

    /// Number of withdrawn names.
    pub fn len(&self) -> usize {
        self.by_replacement.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_replacement.is_empty()
    }
}

/// Result of reading the marker file.
#[derive(Debug, Clone, Default)]
pub struct MgiMarkers {
    /// Official markers of an allowed type, in file order.
    pub markers: Vec<MouseMarkerRecord>,
    /// Withdrawn-and-renamed markers.
    pub withdrawn: WithdrawnSymbols,
    /// Official markers skipped because of their type.
    pub skipped_by_type: usize,
}

impl MgiMarkers {
    /// Every retained primary symbol.
    pub fn symbols(&self) -> HashSet<&str> {
        self.markers.iter().map(|m| m.symbol.as_str()).collect()
    }
}

/// Extract the replacement symbol from a withdrawn marker name.
///
/// `"withdrawn, = Brca1"` → `Some("Brca1")`. Names without ` = ` describe a
/// plain withdrawal with no successor.
pub fn replacement_symbol(marker_name: &str) -> Option<&str> {
    if !marker_name.contains(" = ") {
        return None;
    }
    marker_name
        .split('=')
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse the marker file, keeping official markers whose type is in `allowed_types`.
pub fn parse_mgi_markers(
    path: &Path,
    allowed_types: &BTreeSet<String>,
) -> Result<MgiMarkers, GenemapError> {
    parse_mgi_markers_reader(open_input(path)?, &file_label(path), allowed_types)
}

/// Parse marker rows from any reader.
pub fn parse_mgi_markers_reader<R: Read>(
    reader: R,
    label: &str,
    allowed_types: &BTreeSet<String>,
) -> Result<MgiMarkers, GenemapError> {
    let mut reader = tsv_reader(reader, false, false);
    let mut out = MgiMarkers::default();
    let mut raw_synonyms: Vec<Vec<String>> = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record_line(&record);
        let col = |idx: usize| field(&record, idx, label, MGI_MARKER_COLUMNS[idx]);

        let raw_status = col(STATUS_COL)?;
        let status =
            MarkerStatus::parse(raw_status).ok_or_else(|| GenemapError::UnexpectedStatus {
                file: label.to_string(),
                line,
                status: raw_status.to_string(),
            })?;

        if status == MarkerStatus::Withdrawn {
            if let Some(new_symbol) = replacement_symbol(col(NAME_COL)?) {
                out.withdrawn.insert(col(SYMBOL_COL)?.trim(), new_symbol);
            }
            continue;
        }

        let feature_type = col(TYPE_COL)?.trim();
        if !KNOWN_FEATURE_TYPES.contains(&feature_type) {
            return Err(GenemapError::UnexpectedFeatureType {
                file: label.to_string(),
                line,
                feature_type: feature_type.to_string(),
            });
        }
        if !allowed_types.contains(feature_type) {
            out.skipped_by_type += 1;
            continue;
        }

        let symbol = col(SYMBOL_COL)?.trim();
        if symbol.is_empty() {
            return Err(GenemapError::malformed(label, line, "empty marker symbol"));
        }
        let at_line = |e: GenemapError| GenemapError::malformed(label, line, e.to_string());
        let accession = MgiAccession::new(col(ACCESSION_COL)?).map_err(at_line)?;
        let entrez_id = EntrezId::parse_optional(col(ENTREZ_COL)?).map_err(at_line)?;

        raw_synonyms.push(
            split_multi(col(SYNONYMS_COL)?)
                .map(str::to_string)
                .collect(),
        );
        out.markers.push(MouseMarkerRecord {
            accession,
            symbol: symbol.to_string(),
            feature_type: feature_type.to_string(),
            entrez_id,
            synonyms: BTreeSet::new(),
        });
    }

    let symbols: HashSet<String> = out.markers.iter().map(|m| m.symbol.clone()).collect();
    for (marker, synonyms) in out.markers.iter_mut().zip(raw_synonyms) {
        marker.synonyms = synonyms
            .into_iter()
            .filter(|s| !symbols.contains(s))
            .collect();
    }

    tracing::info!(
        "Parsed {} MGI markers from {} ({} withdrawn redirects, {} skipped by type)",
        out.markers.len(),
        label,
        out.withdrawn.len(),
        out.skipped_by_type
    );
    Ok(out)
}
