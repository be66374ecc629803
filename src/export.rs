//! Writers for build artifacts.
//!
//! A build directory holds:
//! - `central_gene_table.tsv`: one row per registry entry
//! - `<link_table>.tsv`: `id`, `central_gene_id` per link table
//! - `link_tables.tsv`: dataset table → link table metadata entries
//! - `unresolved.tsv`: dataset values that needed a stub entry
//! - `build_manifest.json`: counts and the list of files written
//!
//! Multi-valued cells are `|`-joined. Synonym columns only list synonyms
//! seen in resolved data unless [`ExportOptions::keep_unused_synonyms`] is set.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::GenemapError;
use crate::mapping::{LinkTable, ResolutionStats, UnresolvedSymbol};
use crate::nomenclature::tsv::MULTI_VALUE_DELIMITER;
use crate::pipeline::BuildOutput;
use crate::registry::{BuildStats, Registry, RegistryEntry};
use crate::species::Species;

pub const CENTRAL_GENE_TABLE_FILE: &str = "central_gene_table.tsv";
pub const LINK_TABLE_INDEX_FILE: &str = "link_tables.tsv";
pub const UNRESOLVED_FILE: &str = "unresolved.tsv";
pub const MANIFEST_FILE: &str = "build_manifest.json";

const CENTRAL_GENE_COLUMNS: [&str; 19] = [
    "id",
    "human_symbol",
    "human_entrez_id",
    "human_ensembl_id",
    "hgnc_id",
    "human_synonyms",
    "mouse_symbols",
    "mouse_accession_ids",
    "mouse_entrez_ids",
    "mouse_ensembl_ids",
    "mouse_synonyms",
    "zebrafish_symbols",
    "zfin_ids",
    "manually_added",
    "used",
    "dataset_names",
    "used_human_names",
    "used_mouse_names",
    "used_zebrafish_names",
];

/// Export switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Write every synonym, not just the ones seen in resolved data.
    pub keep_unused_synonyms: bool,
}

/// Per-link-table manifest record.
#[derive(Debug, Clone, Serialize)]
pub struct LinkTableManifest {
    pub name: String,
    pub meta_entry: String,
    pub links: usize,
    pub stats: ResolutionStats,
}

/// Per-dataset-table manifest record.
#[derive(Debug, Clone, Serialize)]
pub struct TableManifest {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
    pub sql_columns: Vec<String>,
    pub link_tables: Vec<LinkTableManifest>,
}

/// Summary written to `build_manifest.json`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildManifest {
    pub entries: usize,
    pub stub_entries: usize,
    pub used_entries: usize,
    pub registry: BuildStats,
    pub tables: Vec<TableManifest>,
    pub unresolved: usize,
    pub contig_pattern: String,
    pub keep_unused_synonyms: bool,
    pub duration_secs: f64,
    pub files: Vec<String>,
}

/// Write every artifact of a build into `dir`.
pub fn export(
    output: &BuildOutput,
    dir: &Path,
    options: ExportOptions,
) -> Result<BuildManifest, GenemapError> {
    fs::create_dir_all(dir).map_err(|e| GenemapError::Io {
        msg: format!("Failed to create directory {}: {}", dir.display(), e),
    })?;
    let mut files = Vec::new();

    write_file(dir, CENTRAL_GENE_TABLE_FILE, &mut files, |w| {
        write_central_gene_table(&output.registry, w, options)
    })?;
    for link_table in output.link_tables() {
        let name = format!("{}.tsv", link_table.link_table_name);
        write_file(dir, &name, &mut files, |w| write_link_table(link_table, w))?;
    }
    write_file(dir, LINK_TABLE_INDEX_FILE, &mut files, |w| {
        write_link_table_index(output, w)
    })?;
    write_file(dir, UNRESOLVED_FILE, &mut files, |w| {
        write_unresolved(&output.unresolved, w)
    })?;

    files.push(MANIFEST_FILE.to_string());
    let manifest = build_manifest(output, options, files);
    let path = dir.join(MANIFEST_FILE);
    let file = File::create(&path).map_err(|e| GenemapError::Io {
        msg: format!("Failed to create {}: {}", path.display(), e),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &manifest)?;

    tracing::info!("Wrote {} files to {}", manifest.files.len(), dir.display());
    Ok(manifest)
}

/// Write the registry as a TSV table.
pub fn write_central_gene_table<W: Write>(
    registry: &Registry,
    writer: W,
    options: ExportOptions,
) -> Result<(), GenemapError> {
    let mut out = tsv_writer(writer);
    out.write_record(CENTRAL_GENE_COLUMNS)?;
    for entry in registry.entries() {
        out.write_record(central_gene_row(entry, options))?;
    }
    out.flush()?;
    Ok(())
}

fn central_gene_row(entry: &RegistryEntry, options: ExportOptions) -> Vec<String> {
    let synonyms = |species: Species| {
        if options.keep_unused_synonyms {
            join(entry.synonyms(species).into_iter().flatten())
        } else {
            join(entry.used_synonyms(species))
        }
    };
    vec![
        entry.id.to_string(),
        optional(entry.human_symbol.as_ref()),
        optional(entry.human_entrez_id.as_ref()),
        optional(entry.human_ensembl_id.as_ref()),
        optional(entry.human_registry_id.as_ref()),
        synonyms(Species::Human),
        join(&entry.mouse_symbols),
        join(&entry.mouse_accession_ids),
        join(&entry.mouse_entrez_ids),
        join(&entry.mouse_ensembl_ids),
        synonyms(Species::Mouse),
        join(&entry.zebrafish_symbols),
        join(&entry.zfin_ids),
        flag(entry.manually_added),
        flag(entry.used),
        join(&entry.dataset_names),
        join(&entry.used_human_names),
        join(&entry.used_mouse_names),
        join(&entry.used_zebrafish_names),
    ]
}

/// Write one link table (`id`, `central_gene_id`; null links are empty).
pub fn write_link_table<W: Write>(link_table: &LinkTable, writer: W) -> Result<(), GenemapError> {
    let mut out = tsv_writer(writer);
    out.write_record(["id", "central_gene_id"])?;
    for link in &link_table.links {
        out.write_record([link.row_id.to_string(), optional(link.entry_id.as_ref())])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the dataset table → link table metadata index.
pub fn write_link_table_index<W: Write>(
    output: &BuildOutput,
    writer: W,
) -> Result<(), GenemapError> {
    let mut out = tsv_writer(writer);
    out.write_record(["table", "link_tables"])?;
    for table in &output.tables {
        let meta: Vec<String> = table
            .link_tables
            .iter()
            .map(|o| o.link_table.meta_entry())
            .collect();
        out.write_record([table.table.clone(), meta.join(",")])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the unresolved value audit trail.
pub fn write_unresolved<W: Write>(
    unresolved: &[UnresolvedSymbol],
    writer: W,
) -> Result<(), GenemapError> {
    let mut out = tsv_writer(writer);
    out.write_record([
        "dataset",
        "column",
        "path",
        "species",
        "value",
        "contig_like",
        "central_gene_id",
    ])?;
    for miss in unresolved {
        out.write_record([
            miss.dataset.clone(),
            miss.column.clone(),
            miss.path.clone(),
            miss.species.to_string(),
            miss.value.clone(),
            flag(miss.contig_like),
            optional(miss.entry_id.as_ref()),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Summarize a build.
pub fn build_manifest(
    output: &BuildOutput,
    options: ExportOptions,
    files: Vec<String>,
) -> BuildManifest {
    let tables = output
        .tables
        .iter()
        .map(|t| TableManifest {
            table: t.table.clone(),
            path: t.path.clone(),
            rows: t.rows,
            sql_columns: t.sql_columns.clone(),
            link_tables: t
                .link_tables
                .iter()
                .map(|o| LinkTableManifest {
                    name: o.link_table.link_table_name.clone(),
                    meta_entry: o.link_table.meta_entry(),
                    links: o.link_table.len(),
                    stats: o.stats.clone(),
                })
                .collect(),
        })
        .collect();
    BuildManifest {
        entries: output.registry.len(),
        stub_entries: output.stub_count(),
        used_entries: output.registry.entries().iter().filter(|e| e.used).count(),
        registry: output.build_stats.clone(),
        tables,
        unresolved: output.unresolved.len(),
        contig_pattern: output.classifier_version.clone(),
        keep_unused_synonyms: options.keep_unused_synonyms,
        duration_secs: output.duration.as_secs_f64(),
        files,
    }
}

fn write_file<F>(dir: &Path, name: &str, files: &mut Vec<String>, write: F) -> Result<(), GenemapError>
where
    F: FnOnce(BufWriter<File>) -> Result<(), GenemapError>,
{
    let path = dir.join(name);
    let file = File::create(&path).map_err(|e| GenemapError::Io {
        msg: format!("Failed to create {}: {}", path.display(), e),
    })?;
    write(BufWriter::new(file))?;
    files.push(name.to_string());
    Ok(())
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer)
}

fn join<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(MULTI_VALUE_DELIMITER);
        }
        out.push_str(&value.to_string());
    }
    out
}

fn optional<T: Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

fn flag(value: bool) -> String {
    u8::from(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EntrezId, EntryId, HgncId};
    use crate::nomenclature::HumanGeneRecord;
    use std::collections::BTreeSet;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        let id = registry
            .add_human_gene(HumanGeneRecord {
                symbol: "BRCA1".to_string(),
                hgnc_id: Some(HgncId::new("HGNC:1100").unwrap()),
                entrez_id: Some(EntrezId(672)),
                ensembl_id: None,
                synonyms: ["RNF53", "PSCP"].iter().map(|s| s.to_string()).collect(),
            })
            .unwrap();
        registry.record_use(id, Species::Human, "RNF53", "screen").unwrap();
        registry
    }

    fn rows(buf: &[u8]) -> Vec<Vec<String>> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(|l| l.split('\t').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_central_gene_table_prunes_synonyms() {
        let mut buf = Vec::new();
        write_central_gene_table(&registry(), &mut buf, ExportOptions::default()).unwrap();
        let rows = rows(&buf);
        assert_eq!(rows[0].len(), CENTRAL_GENE_COLUMNS.len());
        assert_eq!(rows[1][1], "BRCA1");
        assert_eq!(rows[1][4], "HGNC:1100");
        assert_eq!(rows[1][5], "RNF53");
        assert_eq!(rows[1][14], "1");
        assert_eq!(rows[1][15], "screen");
    }

    #[test]
    fn test_central_gene_table_keeps_synonyms() {
        let mut buf = Vec::new();
        let options = ExportOptions {
            keep_unused_synonyms: true,
        };
        write_central_gene_table(&registry(), &mut buf, options).unwrap();
        assert_eq!(rows(&buf)[1][5], "PSCP|RNF53");
    }

    #[test]
    fn test_link_table_null_is_empty() {
        let mut table = LinkTable::new("gene", "screen__gene", true, false);
        table.push(0, Some(EntryId(3)));
        table.push(1, None);
        let mut buf = Vec::new();
        write_link_table(&table, &mut buf).unwrap();
        let rows = rows(&buf);
        assert_eq!(rows[0], vec!["id", "central_gene_id"]);
        assert_eq!(rows[1], vec!["0", "3"]);
        assert_eq!(rows[2], vec!["1", ""]);
    }

    #[test]
    fn test_join() {
        let set: BTreeSet<&str> = ["b", "a"].into_iter().collect();
        assert_eq!(join(&set), "a|b");
        assert_eq!(join(Vec::<String>::new()), "");
    }
}
