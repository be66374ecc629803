//! Row → registry entry link tables.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ids::EntryId;

/// One link: a dataset row and the entry it resolved to (`None` when the
/// value was ignorable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkRow {
    #[serde(rename = "id")]
    pub row_id: u64,
    #[serde(rename = "central_gene_id")]
    pub entry_id: Option<EntryId>,
}

/// Links for one gene column of one dataset table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTable {
    pub links: Vec<LinkRow>,
    pub gene_column_name: String,
    /// `<table>__<link_table_name>`
    pub link_table_name: String,
    pub is_perturbed: bool,
    pub is_target: bool,
}

impl LinkTable {
    pub fn new(
        gene_column_name: impl Into<String>,
        link_table_name: impl Into<String>,
        is_perturbed: bool,
        is_target: bool,
    ) -> Self {
        Self {
            links: Vec::new(),
            gene_column_name: gene_column_name.into(),
            link_table_name: link_table_name.into(),
            is_perturbed,
            is_target,
        }
    }

    pub fn push(&mut self, row_id: u64, entry_id: Option<EntryId>) {
        self.links.push(LinkRow { row_id, entry_id });
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Distinct source rows present in the table.
    pub fn row_ids(&self) -> BTreeSet<u64> {
        self.links.iter().map(|l| l.row_id).collect()
    }

    /// Whether every row in `0..rows` has at least one link.
    pub fn covers_rows(&self, rows: u64) -> bool {
        let seen = self.row_ids();
        (0..rows).all(|r| seen.contains(&r))
    }

    /// Metadata string `column:link_table:perturbed:target` with 0/1 flags.
    pub fn meta_entry(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.gene_column_name,
            self.link_table_name,
            u8::from(self.is_perturbed),
            u8::from(self.is_target)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_entry() {
        let table = LinkTable::new("gene", "screen__gene", true, false);
        assert_eq!(table.meta_entry(), "gene:screen__gene:1:0");
        let table = LinkTable::new("target_gene", "screen__target", false, true);
        assert_eq!(table.meta_entry(), "target_gene:screen__target:0:1");
    }

    #[test]
    fn test_covers_rows() {
        let mut table = LinkTable::new("gene", "t__gene", false, false);
        table.push(0, Some(EntryId(4)));
        table.push(0, Some(EntryId(5)));
        table.push(2, None);
        assert!(!table.covers_rows(3));
        table.push(1, Some(EntryId(1)));
        assert!(table.covers_rows(3));
        assert_eq!(table.len(), 4);
        assert_eq!(table.row_ids().len(), 3);
    }

    #[test]
    fn test_link_row_serializes_with_export_names() {
        let row = LinkRow {
            row_id: 7,
            entry_id: None,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":7,"central_gene_id":null}"#);
    }
}
