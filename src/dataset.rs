//! Dataset table reader.
//!
//! Dataset tables are tab-delimited with a header row. Rows are identified
//! by their position (0-based) in the file, which is what link tables refer to.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::GenemapError;
use crate::nomenclature::tsv::{open_input, tsv_reader};

/// Cell values read as "no value".
pub const NA_TOKENS: [&str; 9] = ["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "<NA>"];

/// Whether a dataset cell is blank or an NA token.
pub fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// Lowercase a header and squash anything outside `[a-z0-9_]` into single `_`.
pub fn sql_friendly_name(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    for c in header.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// A dataset table held in memory.
#[derive(Debug, Clone)]
pub struct DatasetTable {
    name: String,
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl DatasetTable {
    /// Read a dataset table from disk (`.gz` aware).
    pub fn from_path(name: impl Into<String>, path: &Path) -> Result<Self, GenemapError> {
        Self::from_reader(name, path, open_input(path)?)
    }

    /// Read a dataset table from any reader; `path` is only used for messages.
    pub fn from_reader<R: Read>(
        name: impl Into<String>,
        path: &Path,
        reader: R,
    ) -> Result<Self, GenemapError> {
        let name = name.into();
        let mut reader = tsv_reader(reader, true, true);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        tracing::info!("Read {} rows from {} ({})", rows.len(), path.display(), name);
        Ok(Self {
            name,
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of a named column paired with their row IDs. Short rows yield
    /// empty cells.
    pub fn column(&self, column: &str) -> Result<Vec<(u64, &str)>, GenemapError> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| GenemapError::MissingGeneColumn {
                table: self.name.clone(),
                column: column.to_string(),
                available: self.headers.join(", "),
            })?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(row_id, record)| (row_id as u64, record.get(idx).unwrap_or("")))
            .collect())
    }

    /// Headers rewritten for use as relational column names.
    pub fn sql_friendly_columns(&self) -> Vec<String> {
        self.headers.iter().map(|h| sql_friendly_name(h)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table(data: &str) -> DatasetTable {
        DatasetTable::from_reader("screen", Path::new("screen.tsv"), data.as_bytes()).unwrap()
    }

    #[test]
    fn test_column_with_row_ids() {
        let t = table("gene\tscore\nBrca1\t0.5\nTp53\t1.2\n");
        assert_eq!(t.len(), 2);
        let col = t.column("gene").unwrap();
        assert_eq!(col, vec![(0, "Brca1"), (1, "Tp53")]);
    }

    #[test]
    fn test_missing_column() {
        let t = table("gene\tscore\nBrca1\t0.5\n");
        let err = t.column("target").unwrap_err();
        match err {
            GenemapError::MissingGeneColumn { table, available, .. } => {
                assert_eq!(table, "screen");
                assert_eq!(available, "gene, score");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_row_reads_empty() {
        let t = table("score\tgene\n0.5\n1.0\tTp53\n");
        assert_eq!(t.column("gene").unwrap(), vec![(0, ""), (1, "Tp53")]);
    }

    #[rstest]
    #[case("Gene Symbol", "gene_symbol")]
    #[case("log2(FC)", "log2_fc_")]
    #[case("p--value", "p_value")]
    #[case("already_ok_1", "already_ok_1")]
    #[case("Δscore", "_score")]
    fn test_sql_friendly_name(#[case] header: &str, #[case] expected: &str) {
        assert_eq!(sql_friendly_name(header), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case("  ", true)]
    #[case("NA", true)]
    #[case("nan", true)]
    #[case("Brca1", false)]
    #[case("na", false)]
    fn test_is_na(#[case] cell: &str, #[case] expected: bool) {
        assert_eq!(is_na(cell), expected);
    }
}
