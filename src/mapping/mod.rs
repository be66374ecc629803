//! Dataset gene column resolution.
//!
//! A [`GeneMapping`] names a dataset column and its species. Resolving it
//! produces a [`LinkTable`] joining each dataset row to registry entries, and
//! records which names each entry was seen under.

pub mod classify;
pub mod gene_mapping;
pub mod link_table;

pub use classify::{AccessionClassifier, ContigPattern, CONTIG_PATTERN_V1};
pub use gene_mapping::{
    GeneMapping, MappingOutcome, ResolutionStats, UnresolvedSymbol, LINK_TABLE_SEPARATOR,
};
pub use link_table::{LinkRow, LinkTable};
