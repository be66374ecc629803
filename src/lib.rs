// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-genemap: cross-species gene identity registry
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Builds one deduplicated gene registry from the HGNC, MGI and ZFIN
//! nomenclature references, then resolves the gene columns of dataset tables
//! against it, producing row → gene link tables.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ferro_genemap::{export, ExportOptions, GenemapConfig, BuildContext};
//!
//! let config = GenemapConfig::from_file(Path::new("genemap.toml"))?;
//! let output = BuildContext::new(&config).run()?;
//! export(&output, Path::new("out"), ExportOptions::default())?;
//! # Ok::<(), ferro_genemap::GenemapError>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod ids;
pub mod mapping;
pub mod nomenclature;
pub mod pipeline;
pub mod registry;
pub mod species;

// Re-export commonly used types
pub use config::{GeneMapFiles, GenemapConfig, TableConfig};
pub use dataset::DatasetTable;
pub use error::{ErrorCode, GenemapError};
pub use export::{export, BuildManifest, ExportOptions};
pub use ids::{EnsemblGeneId, EntrezId, EntryId, HgncId, MgiAccession, ZfinId};
pub use mapping::{
    AccessionClassifier, ContigPattern, GeneMapping, LinkTable, ResolutionStats, UnresolvedSymbol,
};
pub use pipeline::{run, BuildContext, BuildOutput};
pub use registry::{Registry, RegistryBuilder, RegistryEntry, ReferenceFiles, SpeciesIndex};
pub use species::Species;

/// Result type alias for ferro-genemap operations
pub type Result<T> = std::result::Result<T, GenemapError>;
