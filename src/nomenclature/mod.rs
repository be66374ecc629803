//! Readers for the gene nomenclature reference files.
//!
//! - [`hgnc`]: human registry (HGNC complete set)
//! - [`homology`]: MGI/HGNC ortholog table
//! - [`mgi`]: mouse marker list
//! - [`zfin`]: zebrafish/human ortholog table
//!
//! Readers return plain records; merging them into a registry happens in
//! [`crate::registry::builder`].

pub mod hgnc;
pub mod homology;
pub mod mgi;
pub mod tsv;
pub mod zfin;

pub use hgnc::{parse_hgnc, parse_hgnc_reader, HumanGeneRecord};
pub use homology::{parse_homology, HomologyMaps};
pub use mgi::{
    default_feature_types, parse_mgi_markers, parse_mgi_markers_reader, MgiMarkers, MouseMarkerRecord, WithdrawnSymbols,
    KNOWN_FEATURE_TYPES,
};
pub use zfin::{parse_zfin, ZebrafishOrthologRecord};
