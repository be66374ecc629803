//! Resolution of dataset gene columns against the registry.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::dataset::{is_na, DatasetTable};
use crate::error::GenemapError;
use crate::ids::EntryId;
use crate::mapping::classify::AccessionClassifier;
use crate::mapping::link_table::LinkTable;
use crate::registry::Registry;
use crate::species::Species;

/// Joins a table name and a link table suffix into the full link table name.
pub const LINK_TABLE_SEPARATOR: &str = "__";

/// Gene column declaration for a dataset table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneMapping {
    /// Dataset column holding gene identifiers.
    pub column_name: String,
    pub species: Species,
    /// Suffix of the link table name (`<table>__<link_table_name>`).
    pub link_table_name: String,
    pub is_perturbed: bool,
    pub is_target: bool,
    /// Uppercase values before lookup.
    #[serde(default)]
    pub to_upper: bool,
    /// Link blank/NA cells to no gene without warning.
    #[serde(default)]
    pub ignore_empty: bool,
    /// Values that link to no gene without warning when not found.
    #[serde(default)]
    pub ignore_missing: BTreeSet<String>,
    /// Whole-value substitutions applied after `to_upper`.
    #[serde(default)]
    pub replace: BTreeMap<String, String>,
}

/// A dataset value that no registry entry answered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedSymbol {
    pub dataset: String,
    pub column: String,
    pub path: String,
    pub value: String,
    pub species: Species,
    /// Value is shaped like a clone-based contig accession.
    pub contig_like: bool,
    /// Stub entry created for the value (`None` for blank cells).
    pub entry_id: Option<EntryId>,
}

/// Per-link-table resolution counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub rows: usize,
    /// Rows linked to at least one reference or stub entry.
    pub resolved: usize,
    /// Rows linked to more than one entry.
    pub fanned_out: usize,
    /// Rows linked to no gene.
    pub ignored: usize,
    pub stubs_created: usize,
}

/// Result of resolving one gene column.
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub link_table: LinkTable,
    pub unresolved: Vec<UnresolvedSymbol>,
    pub stats: ResolutionStats,
}

impl GeneMapping {
    /// Full link table name for a dataset table.
    pub fn full_link_table_name(&self, table: &str) -> String {
        format!("{}{}{}", table, LINK_TABLE_SEPARATOR, self.link_table_name)
    }

    /// Apply `to_upper` then `replace` to a raw cell.
    pub fn normalize<'a>(&'a self, raw: &'a str) -> Cow<'a, str> {
        let value: Cow<'a, str> = if self.to_upper {
            Cow::Owned(raw.to_uppercase())
        } else {
            Cow::Borrowed(raw)
        };
        match self.replace.get(&*value) {
            Some(replacement) => Cow::Borrowed(replacement.as_str()),
            None => value,
        }
    }

    /// Resolve this column of `table` against the registry.
    ///
    /// Every row yields at least one link. Values found in the species index
    /// link to every matching entry and record provenance on them. Misses
    /// either link to nothing (ignorable) or get a stub entry that later rows
    /// of the same run resolve to.
    ///
    /// Blank and NA cells always link to nothing. Without `ignore_empty` they
    /// are also logged and audited in `unresolved` with no entry, so a null
    /// link alone does not mean the value was declared ignorable.
    pub fn resolve(
        &self,
        registry: &mut Registry,
        table: &DatasetTable,
        classifier: &dyn AccessionClassifier,
    ) -> Result<MappingOutcome, GenemapError> {
        let dataset = table.name();
        let path = table.path().display().to_string();
        let cells = table.column(&self.column_name)?;

        let mut link_table = LinkTable::new(
            &self.column_name,
            self.full_link_table_name(dataset),
            self.is_perturbed,
            self.is_target,
        );
        let mut unresolved = Vec::new();
        let mut stats = ResolutionStats::default();

        for (row_id, raw) in cells {
            stats.rows += 1;
            let raw = raw.trim();

            if is_na(raw) {
                if !self.ignore_empty {
                    tracing::warn!(
                        "{}: empty {} value in column {} at row {} of {}",
                        dataset,
                        self.species,
                        self.column_name,
                        row_id,
                        path
                    );
                    unresolved.push(self.miss(dataset, &path, raw, false, None));
                }
                link_table.push(row_id, None);
                stats.ignored += 1;
                continue;
            }

            let value = self.normalize(raw);
            let hits: Vec<EntryId> = registry.lookup(self.species, &value).to_vec();
            if !hits.is_empty() {
                for id in &hits {
                    link_table.push(row_id, Some(*id));
                    registry.record_use(*id, self.species, &value, dataset)?;
                }
                stats.resolved += 1;
                if hits.len() > 1 {
                    stats.fanned_out += 1;
                }
                continue;
            }

            if self.ignore_missing.contains(&*value) {
                link_table.push(row_id, None);
                stats.ignored += 1;
                continue;
            }

            let contig_like = classifier.is_contig_accession(&value);
            if contig_like {
                tracing::debug!(
                    "{}: contig accession {} in column {} of {} not in {} references; adding stub entry",
                    dataset,
                    value,
                    self.column_name,
                    path,
                    self.species
                );
            } else {
                tracing::warn!(
                    "{}: {} gene {} in column {} of {} not found; adding stub entry",
                    dataset,
                    self.species,
                    value,
                    self.column_name,
                    path
                );
            }
            let id = registry.add_manual_entry(self.species, &value, dataset)?;
            link_table.push(row_id, Some(id));
            stats.resolved += 1;
            stats.stubs_created += 1;
            unresolved.push(self.miss(dataset, &path, &value, contig_like, Some(id)));
        }

        tracing::info!(
            "{}: {} rows, {} resolved ({} fanned out), {} ignored, {} stub entries",
            link_table.link_table_name,
            stats.rows,
            stats.resolved,
            stats.fanned_out,
            stats.ignored,
            stats.stubs_created
        );

        Ok(MappingOutcome {
            link_table,
            unresolved,
            stats,
        })
    }

    fn miss(
        &self,
        dataset: &str,
        path: &str,
        value: &str,
        contig_like: bool,
        entry_id: Option<EntryId>,
    ) -> UnresolvedSymbol {
        UnresolvedSymbol {
            dataset: dataset.to_string(),
            column: self.column_name.clone(),
            path: path.to_string(),
            value: value.to_string(),
            species: self.species,
            contig_like,
            entry_id,
        }
    }
}
