//! ZFIN human ortholog reader (`human_orthos.txt`).
//!
//! Columns are positional: ZFIN ID (0), zebrafish symbol (1), HGNC ID (7).
//! The file repeats a gene pair once per evidence code; pairs are deduplicated.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::error::GenemapError;
use crate::ids::{HgncId, ZfinId};
use crate::nomenclature::tsv::{field, file_label, open_input, record_line, tsv_reader};

const ZFIN_ID_COL: usize = 0;
const SYMBOL_COL: usize = 1;
const HGNC_COL: usize = 7;

/// One zebrafish gene and (optionally) its human ortholog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZebrafishOrthologRecord {
    pub symbol: String,
    pub zfin_id: ZfinId,
    pub hgnc_id: Option<HgncId>,
}

/// Parse the ZFIN ortholog table.
pub fn parse_zfin(path: &Path) -> Result<Vec<ZebrafishOrthologRecord>, GenemapError> {
    parse_zfin_reader(open_input(path)?, &file_label(path))
}

/// Parse ZFIN rows from any reader.
pub fn parse_zfin_reader<R: Read>(
    reader: R,
    label: &str,
) -> Result<Vec<ZebrafishOrthologRecord>, GenemapError> {
    let mut reader = tsv_reader(reader, false, false);
    let mut seen = BTreeSet::new();
    let mut records = Vec::new();
    let mut without_hgnc = 0usize;

    for result in reader.records() {
        let record = result?;
        let line = record_line(&record);
        let raw_id = field(&record, ZFIN_ID_COL, label, "ZFIN ID")?.trim();
        if raw_id == "ZFIN ID" {
            continue;
        }
        let at_line = |e: GenemapError| GenemapError::malformed(label, line, e.to_string());
        let zfin_id = ZfinId::new(raw_id).map_err(at_line)?;
        let symbol = field(&record, SYMBOL_COL, label, "ZFIN Symbol")?.trim();
        if symbol.is_empty() {
            return Err(GenemapError::malformed(label, line, "empty zebrafish symbol"));
        }
        let hgnc_id =
            HgncId::parse_lenient(field(&record, HGNC_COL, label, "HGNC ID")?).map_err(at_line)?;
        if hgnc_id.is_none() {
            without_hgnc += 1;
        }

        let rec = ZebrafishOrthologRecord {
            symbol: symbol.to_string(),
            zfin_id,
            hgnc_id,
        };
        if seen.insert(rec.clone()) {
            records.push(rec);
        }
    }

    tracing::info!(
        "Parsed {} zebrafish ortholog pairs from {} ({} rows without HGNC ID)",
        records.len(),
        label,
        without_hgnc
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, sym: &str, hgnc: &str, evidence: &str) -> String {
        format!("{id}\t{sym}\tname\tHSYM\thuman name\t113705\t672\t{hgnc}\t{evidence}\tZDB-PUB-1\n")
    }

    #[test]
    fn test_parse_and_dedup() {
        let mut data = row("ZDB-GENE-030131-1", "brca1", "1100", "AA");
        data.push_str(&row("ZDB-GENE-030131-1", "brca1", "1100", "CE"));
        data.push_str(&row("ZDB-GENE-040426-2", "novel1", "", "AA"));
        let records = parse_zfin_reader(data.as_bytes(), "human_orthos.txt").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol, "brca1");
        assert_eq!(records[0].hgnc_id.as_ref().unwrap().as_str(), "HGNC:1100");
        assert!(records[1].hgnc_id.is_none());
    }

    #[test]
    fn test_header_row_skipped() {
        let mut data = String::from(
            "ZFIN ID\tZFIN Symbol\tZFIN Name\tHuman Symbol\tHuman Name\tOMIM ID\tGene ID\tHGNC ID\tEvidence\tPub ID\n",
        );
        data.push_str(&row("ZDB-GENE-1", "tp53", "HGNC:11998", "AA"));
        let records = parse_zfin_reader(data.as_bytes(), "human_orthos.txt").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_bad_zfin_id() {
        let data = row("GENE-1", "tp53", "11998", "AA");
        let err = parse_zfin_reader(data.as_bytes(), "human_orthos.txt").unwrap_err();
        assert!(matches!(err, GenemapError::MalformedRow { .. }));
    }
}
