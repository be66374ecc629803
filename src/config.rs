//! Pipeline configuration.
//!
//! Configuration is loaded once from a `.toml` or `.json` file and passed by
//! reference to every stage.
//!
//! # Example Configuration
//!
//! ```toml
//! base_dir = "/data"
//!
//! [gene_map_files]
//! hgnc = "homology/hgnc_complete_set.txt"
//! mgi = "homology/MGI_EntrezGene.rpt"
//! homology = "homology/MGI_HGNC_AllianceHomology.rpt"
//! zfin = "homology/human_orthos.txt"
//!
//! [[tables]]
//! table = "perturb_screen"
//! in_path = "datasets/screen.tsv"
//!
//! [[tables.gene_mappings]]
//! column_name = "gene"
//! species = "mouse"
//! link_table_name = "gene"
//! is_perturbed = true
//! is_target = false
//! ```
//!
//! Relative paths resolve against `base_dir`, or against the config file's
//! directory when `base_dir` is absent.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GenemapError;
use crate::mapping::{GeneMapping, LINK_TABLE_SEPARATOR};
use crate::nomenclature::{default_feature_types, KNOWN_FEATURE_TYPES};
use crate::registry::ReferenceFiles;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenemapConfig {
    /// Directory relative paths are resolved against.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    pub gene_map_files: GeneMapFiles,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// Reference file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneMapFiles {
    /// HGNC complete set
    pub hgnc: PathBuf,
    /// MGI marker list
    pub mgi: PathBuf,
    /// MGI/HGNC homology report
    pub homology: PathBuf,
    /// ZFIN human orthologs (optional)
    #[serde(default)]
    pub zfin: Option<PathBuf>,
    /// MGI marker types kept as genes (default: Gene, Pseudogene)
    #[serde(default = "default_feature_types")]
    pub mouse_feature_types: BTreeSet<String>,
}

/// One dataset table and its gene columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub table: String,
    pub in_path: PathBuf,
    #[serde(default)]
    pub gene_mappings: Vec<GeneMapping>,
}

impl GenemapConfig {
    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// A missing `base_dir` defaults to the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self, GenemapError> {
        let content = fs::read_to_string(path).map_err(|e| GenemapError::Io {
            msg: format!("{}: {}", path.display(), e),
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        if config.base_dir.is_none() {
            config.base_dir = path.parent().map(Path::to_path_buf);
        }
        Ok(config)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, GenemapError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from JSON content.
    pub fn from_json_str(content: &str) -> Result<Self, GenemapError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolve a configured path against `base_dir`.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Reference inputs with resolved paths.
    pub fn reference_files(&self) -> ReferenceFiles {
        let files = &self.gene_map_files;
        ReferenceFiles {
            hgnc: self.resolve_path(&files.hgnc),
            mgi: self.resolve_path(&files.mgi),
            homology: self.resolve_path(&files.homology),
            zfin: files.zfin.as_deref().map(|p| self.resolve_path(p)),
            mouse_feature_types: files.mouse_feature_types.clone(),
        }
    }

    /// Validate the pipeline definition. Performs no file I/O.
    pub fn validate(&self) -> Result<(), GenemapError> {
        for feature_type in &self.gene_map_files.mouse_feature_types {
            if !KNOWN_FEATURE_TYPES.contains(&feature_type.as_str()) {
                return Err(GenemapError::config(format!(
                    "unknown mouse feature type '{}' (known: {})",
                    feature_type,
                    KNOWN_FEATURE_TYPES.join(", ")
                )));
            }
        }

        let mut names = HashSet::new();
        for table in &self.tables {
            if table.table.trim().is_empty() {
                return Err(GenemapError::config("table name must not be empty"));
            }
            if table.table.contains(LINK_TABLE_SEPARATOR) {
                return Err(GenemapError::config(format!(
                    "table name '{}' must not contain '{}'",
                    table.table, LINK_TABLE_SEPARATOR
                )));
            }
            if !names.insert(table.table.as_str()) {
                return Err(GenemapError::config(format!(
                    "table '{}' is declared more than once",
                    table.table
                )));
            }
            table.validate()?;
        }
        Ok(())
    }
}

impl TableConfig {
    /// Validate the gene columns of one table.
    pub fn validate(&self) -> Result<(), GenemapError> {
        let table = &self.table;
        let mut link_names = HashSet::new();
        let mut perturbed = 0usize;
        let mut target = 0usize;

        for mapping in &self.gene_mappings {
            if mapping.link_table_name.trim().is_empty() {
                return Err(GenemapError::config(format!(
                    "table '{}': column '{}' has an empty link table name",
                    table, mapping.column_name
                )));
            }
            if mapping.link_table_name.contains(LINK_TABLE_SEPARATOR) {
                return Err(GenemapError::config(format!(
                    "table '{}': link table name '{}' must not contain '{}'",
                    table, mapping.link_table_name, LINK_TABLE_SEPARATOR
                )));
            }
            if !link_names.insert(mapping.link_table_name.as_str()) {
                return Err(GenemapError::config(format!(
                    "table '{}': link table name '{}' is used more than once",
                    table, mapping.link_table_name
                )));
            }
            if mapping.is_perturbed && mapping.is_target {
                return Err(GenemapError::config(format!(
                    "table '{}': column '{}' cannot be both perturbed and target",
                    table, mapping.column_name
                )));
            }
            perturbed += usize::from(mapping.is_perturbed);
            target += usize::from(mapping.is_target);
        }

        if perturbed > 1 {
            return Err(GenemapError::config(format!(
                "table '{}' declares {} perturbed gene columns",
                table, perturbed
            )));
        }
        if target > 1 {
            return Err(GenemapError::config(format!(
                "table '{}' declares {} target gene columns",
                table, target
            )));
        }

        let species: BTreeSet<_> = self.gene_mappings.iter().map(|m| m.species).collect();
        if species.len() > 1 {
            let names: Vec<&str> = species.iter().map(|s| s.as_str()).collect();
            return Err(GenemapError::config(format!(
                "table '{}' mixes species: {}",
                table,
                names.join(", ")
            )));
        }
        Ok(())
    }
}
