//! HGNC complete-set reader.
//!
//! Reads the tab-delimited `hgnc_complete_set.txt` export. Only the columns
//! needed for the registry are used:
//!
//! | column | use |
//! |---|---|
//! | `symbol` | primary human symbol |
//! | `hgnc_id` | registry ID (`HGNC:1100`) |
//! | `entrez_id` | NCBI gene ID |
//! | `ensembl_gene_id` | Ensembl gene ID |
//! | `prev_symbol` | `\|`-delimited previous symbols, kept as synonyms |

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use crate::error::GenemapError;
use crate::ids::{EnsemblGeneId, EntrezId, HgncId};
use crate::nomenclature::tsv::{
    field, file_label, open_input, record_line, split_multi, tsv_reader, HeaderIndex,
};
use crate::species::Species;

/// One parsed HGNC row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanGeneRecord {
    pub symbol: String,
    pub hgnc_id: Option<HgncId>,
    pub entrez_id: Option<EntrezId>,
    pub ensembl_id: Option<EnsemblGeneId>,
    /// Previous symbols, minus every primary symbol in the file.
    pub synonyms: BTreeSet<String>,
}

/// Parse an HGNC complete-set file.
pub fn parse_hgnc(path: &Path) -> Result<Vec<HumanGeneRecord>, GenemapError> {
    parse_hgnc_reader(open_input(path)?, &file_label(path))
}

/// Parse HGNC rows from any reader.
pub fn parse_hgnc_reader<R: Read>(
    reader: R,
    label: &str,
) -> Result<Vec<HumanGeneRecord>, GenemapError> {
    let mut reader = tsv_reader(reader, true, true);
    let header = HeaderIndex::from_reader(&mut reader, label)?;
    let symbol_idx = header.require("symbol")?;
    let hgnc_idx = header.require("hgnc_id")?;
    let entrez_idx = header.require("entrez_id")?;
    let ensembl_idx = header.require("ensembl_gene_id")?;
    let prev_idx = header.require("prev_symbol")?;

    let mut records = Vec::new();
    let mut raw_synonyms: Vec<Vec<String>> = Vec::new();
    let mut symbols: HashSet<String> = HashSet::new();

    for result in reader.records() {
        let record = result?;
        let line = record_line(&record);
        let symbol = field(&record, symbol_idx, label, "symbol")?.trim();
        if symbol.is_empty() {
            return Err(GenemapError::malformed(label, line, "empty symbol"));
        }
        if !symbols.insert(symbol.to_string()) {
            return Err(GenemapError::DuplicateSymbol {
                species: Species::Human,
                symbol: symbol.to_string(),
            });
        }

        let at_line = |e: GenemapError| GenemapError::malformed(label, line, e.to_string());
        let hgnc_id =
            HgncId::parse_optional(field(&record, hgnc_idx, label, "hgnc_id")?).map_err(at_line)?;
        let entrez_id = EntrezId::parse_optional(field(&record, entrez_idx, label, "entrez_id")?)
            .map_err(at_line)?;
        let ensembl_id =
            EnsemblGeneId::parse_optional(field(&record, ensembl_idx, label, "ensembl_gene_id")?)
                .map_err(at_line)?;

        raw_synonyms.push(
            split_multi(field(&record, prev_idx, label, "prev_symbol")?)
                .map(str::to_string)
                .collect(),
        );
        records.push(HumanGeneRecord {
            symbol: symbol.to_string(),
            hgnc_id,
            entrez_id,
            ensembl_id,
            synonyms: BTreeSet::new(),
        });
    }

    // A previous symbol that is another gene's primary symbol would shadow it.
    for (record, synonyms) in records.iter_mut().zip(raw_synonyms) {
        record.synonyms = synonyms
            .into_iter()
            .filter(|s| !symbols.contains(s))
            .collect();
    }

    tracing::info!("Parsed {} HGNC genes from {}", records.len(), label);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "hgnc_id\tsymbol\tname\tentrez_id\tensembl_gene_id\tprev_symbol\n";

    fn parse(body: &str) -> Result<Vec<HumanGeneRecord>, GenemapError> {
        let data = format!("{}{}", HEADER, body);
        parse_hgnc_reader(data.as_bytes(), "hgnc_complete_set.txt")
    }

    #[test]
    fn test_parse_basic_row() {
        let records = parse(
            "HGNC:1100\tBRCA1\tBRCA1 DNA repair associated\t672\tENSG00000012048\tRNF53|PSCP\n",
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.symbol, "BRCA1");
        assert_eq!(rec.hgnc_id.as_ref().unwrap().as_str(), "HGNC:1100");
        assert_eq!(rec.entrez_id, Some(EntrezId(672)));
        assert_eq!(rec.ensembl_id.as_ref().unwrap().as_str(), "ENSG00000012048");
        assert!(rec.synonyms.contains("RNF53"));
        assert!(rec.synonyms.contains("PSCP"));
    }

    #[test]
    fn test_null_fields() {
        let records = parse("null\tFOO\tfoo\tnull\t\t\n").unwrap();
        let rec = &records[0];
        assert!(rec.hgnc_id.is_none());
        assert!(rec.entrez_id.is_none());
        assert!(rec.ensembl_id.is_none());
        assert!(rec.synonyms.is_empty());
    }

    #[test]
    fn test_quoted_prev_symbols() {
        let records = parse("HGNC:5\tA1BG\talpha\t1\tENSG00000121410\t\"OLD1|OLD2\"\n").unwrap();
        assert_eq!(records[0].synonyms.len(), 2);
    }

    #[test]
    fn test_synonym_equal_to_primary_is_dropped() {
        let records = parse(
            "HGNC:1\tAAA\ta\t1\t\tBBB|CCC\n\
             HGNC:2\tBBB\tb\t2\t\t\n",
        )
        .unwrap();
        let aaa = &records[0];
        assert!(!aaa.synonyms.contains("BBB"));
        assert!(aaa.synonyms.contains("CCC"));
    }

    #[test]
    fn test_duplicate_symbol_fails() {
        let err = parse(
            "HGNC:1\tAAA\ta\t1\t\t\n\
             HGNC:2\tAAA\tb\t2\t\t\n",
        )
        .unwrap_err();
        assert!(matches!(err, GenemapError::DuplicateSymbol { .. }));
    }

    #[test]
    fn test_bad_entrez_is_malformed() {
        let err = parse("HGNC:1\tAAA\ta\tnotanumber\t\t\n").unwrap_err();
        assert!(matches!(err, GenemapError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_missing_column() {
        let data = "hgnc_id\tsymbol\n";
        let err = parse_hgnc_reader(data.as_bytes(), "hgnc.txt").unwrap_err();
        assert!(matches!(err, GenemapError::MissingColumn { .. }));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let err = parse("HGNC:1\tAAA\n").unwrap_err();
        assert!(matches!(err, GenemapError::MalformedRow { .. }));
    }
}
