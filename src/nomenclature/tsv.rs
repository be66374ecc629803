//! Shared helpers for reading tab-delimited reference files.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::GenemapError;

/// Delimiter between values in multi-valued reference cells.
pub const MULTI_VALUE_DELIMITER: char = '|';

/// Open a file for reading, decompressing `.gz` files transparently.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>, GenemapError> {
    let file = File::open(path).map_err(|e| GenemapError::Io {
        msg: format!("{}: {}", path.display(), e),
    })?;
    let is_gz = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Build a tab-delimited reader.
///
/// `quoting` should be off for files with fixed column positions, where a
/// stray `"` inside a marker name must not swallow the rest of the line.
pub fn tsv_reader<R: Read>(reader: R, has_headers: bool, quoting: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .quoting(quoting)
        .flexible(true)
        .comment(if has_headers { None } else { Some(b'#') })
        .from_reader(reader)
}

/// Split a multi-valued cell, dropping empty pieces.
pub fn split_multi(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(MULTI_VALUE_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Display name of a file for error messages.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Line number of a record (1-based, header included).
pub fn record_line(record: &csv::StringRecord) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or_default()
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    file: String,
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Index the header of `reader`.
    pub fn from_reader<R: Read>(
        reader: &mut csv::Reader<R>,
        file: impl Into<String>,
    ) -> Result<Self, GenemapError> {
        let headers = reader.headers()?;
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().trim_matches('"').to_string(), idx))
            .collect();
        Ok(Self {
            file: file.into(),
            columns,
        })
    }

    /// Position of a column that must be present.
    pub fn require(&self, column: &str) -> Result<usize, GenemapError> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| GenemapError::MissingColumn {
                file: self.file.clone(),
                column: column.to_string(),
            })
    }

    /// Position of an optional column.
    pub fn optional(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }
}

/// Fetch a required cell from a record.
pub fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    file: &str,
    name: &str,
) -> Result<&'r str, GenemapError> {
    record.get(idx).ok_or_else(|| {
        GenemapError::malformed(
            file,
            record_line(record),
            format!("missing field '{}' (column {})", name, idx + 1),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_split_multi() {
        let parts: Vec<&str> = split_multi("RNF53|PSCP").collect();
        assert_eq!(parts, vec!["RNF53", "PSCP"]);
        assert_eq!(split_multi("").count(), 0);
        let parts: Vec<&str> = split_multi("A||B|").collect();
        assert_eq!(parts, vec!["A", "B"]);
    }

    #[test]
    fn test_header_index() {
        let data = "symbol\thgnc_id\nBRCA1\tHGNC:1100\n";
        let mut reader = tsv_reader(data.as_bytes(), true, true);
        let header = HeaderIndex::from_reader(&mut reader, "hgnc.txt").unwrap();
        assert_eq!(header.require("hgnc_id").unwrap(), 1);
        assert!(header.optional("entrez_id").is_none());
        let err = header.require("entrez_id").unwrap_err();
        assert!(err.to_string().contains("entrez_id"));
    }

    #[test]
    fn test_open_gz_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"a\tb\n1\t2\n").unwrap();
        enc.finish().unwrap();

        let mut reader = tsv_reader(open_input(&path).unwrap(), true, true);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "2");
    }

    #[test]
    fn test_field_missing() {
        let mut reader = tsv_reader("a\tb\n".as_bytes(), false, false);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(field(&record, 1, "f", "b").unwrap(), "b");
        assert!(field(&record, 5, "f", "z").is_err());
    }
}
