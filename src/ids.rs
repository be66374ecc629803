//! Identifier types used by the reference sources and the registry.
//!
//! Reference files spell "no value" as either an empty cell or the literal
//! `null`; [`is_null`] captures that convention in one place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GenemapError;

/// Whether a raw reference cell denotes a missing value.
pub fn is_null(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "null"
}

/// Registry entry identifier: dense, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub usize);

impl EntryId {
    /// Position of the entry in the registry arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NCBI (Entrez) gene identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntrezId(pub u64);

impl EntrezId {
    /// Parse an optional Entrez ID cell (`""`/`null` → `None`).
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, GenemapError> {
        if is_null(raw) {
            return Ok(None);
        }
        raw.trim()
            .parse::<u64>()
            .map(|id| Some(EntrezId(id)))
            .map_err(|_| GenemapError::InvalidIdentifier {
                kind: "Entrez",
                value: raw.to_string(),
            })
    }
}

impl fmt::Display for EntrezId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            pub fn new(raw: &str) -> Result<Self, GenemapError> {
                let raw = raw.trim();
                if raw.len() > $prefix.len() && raw.starts_with($prefix) {
                    Ok(Self(raw.to_string()))
                } else {
                    Err(GenemapError::InvalidIdentifier {
                        kind: $kind,
                        value: raw.to_string(),
                    })
                }
            }

            /// Parse an optional cell (`""`/`null` → `None`).
            pub fn parse_optional(raw: &str) -> Result<Option<Self>, GenemapError> {
                if is_null(raw) {
                    Ok(None)
                } else {
                    Self::new(raw).map(Some)
                }
            }

            /// The identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

prefixed_id!(
    /// Ensembl gene identifier (`ENSG…`, `ENSMUSG…`, `ENSDARG…`).
    EnsemblGeneId,
    "Ensembl",
    "ENS"
);

prefixed_id!(
    /// MGI marker accession (`MGI:104537`).
    MgiAccession,
    "MGI accession",
    "MGI:"
);

prefixed_id!(
    /// HGNC registry identifier (`HGNC:1100`).
    HgncId,
    "HGNC",
    "HGNC:"
);

prefixed_id!(
    /// ZFIN gene identifier (`ZDB-GENE-…`).
    ZfinId,
    "ZFIN",
    "ZDB-"
);

impl HgncId {
    /// Parse an HGNC ID that may be written without its `HGNC:` prefix,
    /// as ZFIN ortholog tables do.
    pub fn parse_lenient(raw: &str) -> Result<Option<Self>, GenemapError> {
        if is_null(raw) {
            return Ok(None);
        }
        let raw = raw.trim();
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            return Self::new(&format!("HGNC:{}", raw)).map(Some);
        }
        Self::new(raw).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null() {
        assert!(is_null(""));
        assert!(is_null("null"));
        assert!(is_null("  "));
        assert!(!is_null("0"));
        assert!(!is_null("NULL1"));
    }

    #[test]
    fn test_entrez_parse() {
        assert_eq!(EntrezId::parse_optional("672").unwrap(), Some(EntrezId(672)));
        assert_eq!(EntrezId::parse_optional("null").unwrap(), None);
        assert_eq!(EntrezId::parse_optional("").unwrap(), None);
        assert!(EntrezId::parse_optional("abc").is_err());
    }

    #[test]
    fn test_prefixed_ids() {
        assert_eq!(HgncId::new("HGNC:1100").unwrap().as_str(), "HGNC:1100");
        assert!(HgncId::new("1100").is_err());
        assert!(HgncId::new("HGNC:").is_err());
        assert!(MgiAccession::new("MGI:104537").is_ok());
        assert!(MgiAccession::new("104537").is_err());
        assert!(EnsemblGeneId::new("ENSMUSG00000017146").is_ok());
        assert!(EnsemblGeneId::new("NM_000088").is_err());
        assert_eq!(EnsemblGeneId::parse_optional("null").unwrap(), None);
    }

    #[test]
    fn test_hgnc_lenient() {
        assert_eq!(
            HgncId::parse_lenient("1100").unwrap().unwrap().as_str(),
            "HGNC:1100"
        );
        assert_eq!(
            HgncId::parse_lenient("HGNC:1100").unwrap().unwrap().as_str(),
            "HGNC:1100"
        );
        assert_eq!(HgncId::parse_lenient("").unwrap(), None);
        assert!(HgncId::parse_lenient("ABC").is_err());
    }

    #[test]
    fn test_entry_id_display() {
        assert_eq!(EntryId(7).to_string(), "7");
        assert_eq!(EntryId(7).index(), 7);
    }
}
