//! Build pipeline: registry construction followed by per-table gene mapping.
//!
//! [`BuildContext`] carries everything a build needs (configuration and the
//! contig classifier) and is created once by the caller. Tables are mapped
//! one at a time, in configuration order, against a single registry.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{GenemapConfig, TableConfig};
use crate::dataset::DatasetTable;
use crate::error::GenemapError;
use crate::mapping::{
    AccessionClassifier, ContigPattern, LinkTable, ResolutionStats, UnresolvedSymbol,
};
use crate::registry::{BuildStats, Registry, RegistryBuilder};

/// One resolved gene column.
#[derive(Debug, Clone)]
pub struct LinkTableOutput {
    pub link_table: LinkTable,
    pub stats: ResolutionStats,
}

/// Mapping results for one dataset table.
#[derive(Debug, Clone)]
pub struct TableOutput {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
    /// Dataset headers rewritten for the relational loader.
    pub sql_columns: Vec<String>,
    pub link_tables: Vec<LinkTableOutput>,
}

/// Everything a finished build hands to the exporter.
#[derive(Debug)]
pub struct BuildOutput {
    pub registry: Registry,
    pub build_stats: BuildStats,
    pub tables: Vec<TableOutput>,
    pub unresolved: Vec<UnresolvedSymbol>,
    pub classifier_version: String,
    pub duration: Duration,
}

impl BuildOutput {
    /// All link tables in configuration order.
    pub fn link_tables(&self) -> impl Iterator<Item = &LinkTable> {
        self.tables
            .iter()
            .flat_map(|t| t.link_tables.iter().map(|o| &o.link_table))
    }

    /// Number of stub entries created while mapping tables.
    pub fn stub_count(&self) -> usize {
        self.registry
            .entries()
            .iter()
            .filter(|e| e.manually_added)
            .count()
    }
}

/// Explicit build context.
pub struct BuildContext<'c, C: AccessionClassifier = ContigPattern> {
    config: &'c GenemapConfig,
    classifier: C,
}

impl<'c> BuildContext<'c, ContigPattern> {
    /// Context using the current contig accession pattern.
    pub fn new(config: &'c GenemapConfig) -> Self {
        Self::with_classifier(config, ContigPattern::v1())
    }
}

impl<'c, C: AccessionClassifier> BuildContext<'c, C> {
    pub fn with_classifier(config: &'c GenemapConfig, classifier: C) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &GenemapConfig {
        self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Validate the configuration and construct the registry.
    pub fn build_registry(&self) -> Result<(Registry, BuildStats), GenemapError> {
        self.config.validate()?;
        RegistryBuilder::construct(&self.config.reference_files())
    }

    /// Read a dataset table and resolve all of its gene columns.
    pub fn map_table(
        &self,
        registry: &mut Registry,
        table: &TableConfig,
        unresolved: &mut Vec<UnresolvedSymbol>,
    ) -> Result<TableOutput, GenemapError> {
        let path = self.config.resolve_path(&table.in_path);
        let dataset = DatasetTable::from_path(&table.table, &path)?;
        self.map_dataset(registry, table, &dataset, unresolved)
    }

    /// Resolve the gene columns of an already loaded dataset table.
    pub fn map_dataset(
        &self,
        registry: &mut Registry,
        table: &TableConfig,
        dataset: &DatasetTable,
        unresolved: &mut Vec<UnresolvedSymbol>,
    ) -> Result<TableOutput, GenemapError> {
        let mut link_tables = Vec::with_capacity(table.gene_mappings.len());
        for mapping in &table.gene_mappings {
            let outcome = mapping.resolve(registry, dataset, &self.classifier)?;
            if !outcome.link_table.covers_rows(dataset.len() as u64) {
                return Err(GenemapError::InvariantViolation {
                    msg: format!(
                        "link table {} does not cover all {} rows",
                        outcome.link_table.link_table_name,
                        dataset.len()
                    ),
                });
            }
            unresolved.extend(outcome.unresolved);
            link_tables.push(LinkTableOutput {
                link_table: outcome.link_table,
                stats: outcome.stats,
            });
        }
        Ok(TableOutput {
            table: table.table.clone(),
            path: dataset.path().to_path_buf(),
            rows: dataset.len(),
            sql_columns: dataset.sql_friendly_columns(),
            link_tables,
        })
    }

    /// Run the full build.
    pub fn run(&self) -> Result<BuildOutput, GenemapError> {
        let start = Instant::now();
        let (mut registry, build_stats) = self.build_registry()?;

        let mut tables = Vec::with_capacity(self.config.tables.len());
        let mut unresolved = Vec::new();
        for table in &self.config.tables {
            tables.push(self.map_table(&mut registry, table, &mut unresolved)?);
        }
        registry.check_invariants()?;

        let output = BuildOutput {
            registry,
            build_stats,
            tables,
            unresolved,
            classifier_version: self.classifier.version().to_string(),
            duration: start.elapsed(),
        };
        tracing::info!(
            "Build finished in {:.2?}: {} entries ({} stubs), {} link tables, {} unresolved values",
            output.duration,
            output.registry.len(),
            output.stub_count(),
            output.link_tables().count(),
            output.unresolved.len()
        );
        Ok(output)
    }
}

/// Run a full build with the default classifier.
pub fn run(config: &GenemapConfig) -> Result<BuildOutput, GenemapError> {
    BuildContext::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneMapFiles;
    use crate::ids::{EntrezId, HgncId};
    use crate::mapping::GeneMapping;
    use crate::nomenclature::{default_feature_types, HumanGeneRecord};
    use crate::species::Species;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;

    struct NeverContig;

    impl AccessionClassifier for NeverContig {
        fn is_contig_accession(&self, _symbol: &str) -> bool {
            false
        }

        fn version(&self) -> &str {
            "never"
        }
    }

    fn config() -> GenemapConfig {
        GenemapConfig {
            base_dir: None,
            gene_map_files: GeneMapFiles {
                hgnc: "hgnc.txt".into(),
                mgi: "mgi.rpt".into(),
                homology: "homology.rpt".into(),
                zfin: None,
                mouse_feature_types: default_feature_types(),
            },
            tables: vec![],
        }
    }

    fn table_config(columns: &[(&str, bool, bool)]) -> TableConfig {
        TableConfig {
            table: "screen".to_string(),
            in_path: "screen.tsv".into(),
            gene_mappings: columns
                .iter()
                .map(|(col, perturbed, target)| GeneMapping {
                    column_name: col.to_string(),
                    species: Species::Human,
                    link_table_name: col.to_string(),
                    is_perturbed: *perturbed,
                    is_target: *target,
                    to_upper: false,
                    ignore_empty: true,
                    ignore_missing: BTreeSet::new(),
                    replace: BTreeMap::new(),
                })
                .collect(),
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        for (i, symbol) in ["TP53", "MDM2"].iter().enumerate() {
            registry
                .add_human_gene(HumanGeneRecord {
                    symbol: symbol.to_string(),
                    hgnc_id: Some(HgncId::new(&format!("HGNC:{}", i + 1)).unwrap()),
                    entrez_id: Some(EntrezId(i as u64 + 1)),
                    ensembl_id: None,
                    synonyms: BTreeSet::new(),
                })
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_map_dataset_two_columns() {
        let config = config();
        let ctx = BuildContext::with_classifier(&config, NeverContig);
        assert_eq!(ctx.classifier().version(), "never");

        let dataset = DatasetTable::from_reader(
            "screen",
            Path::new("screen.tsv"),
            "perturbed\ttarget\nTP53\tMDM2\nTP53\tNOVEL1\n".as_bytes(),
        )
        .unwrap();
        let mut registry = registry();
        let mut unresolved = Vec::new();
        let output = ctx
            .map_dataset(
                &mut registry,
                &table_config(&[("perturbed", true, false), ("target", false, true)]),
                &dataset,
                &mut unresolved,
            )
            .unwrap();

        assert_eq!(output.rows, 2);
        assert_eq!(output.link_tables.len(), 2);
        assert_eq!(
            output.link_tables[0].link_table.meta_entry(),
            "perturbed:screen__perturbed:1:0"
        );
        assert_eq!(output.link_tables[1].stats.stubs_created, 1);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].value, "NOVEL1");
        registry.check_invariants().unwrap();
    }

    #[test]
    fn test_invalid_config_fails_before_io() {
        let mut config = config();
        let mut table = table_config(&[("a", true, false), ("b", true, false)]);
        table.in_path = "/nonexistent/screen.tsv".into();
        config.tables.push(table);
        let err = run(&config).unwrap_err();
        assert!(matches!(err, GenemapError::InvalidConfig { .. }));
    }
}
