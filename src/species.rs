//! Species namespaces known to the gene registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenemapError;

/// A species namespace for gene symbols.
///
/// Every symbol lookup, stub entry and provenance update is scoped to one of
/// these namespaces. The set is closed: adding a species means handling it at
/// every `match` in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Homo sapiens (HGNC nomenclature)
    Human,
    /// Mus musculus (MGI nomenclature)
    Mouse,
    /// Danio rerio (ZFIN nomenclature)
    Zebrafish,
}

impl Species {
    /// All species, in index order.
    pub const ALL: [Species; 3] = [Species::Human, Species::Mouse, Species::Zebrafish];

    /// Lowercase name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Human => "human",
            Species::Mouse => "mouse",
            Species::Zebrafish => "zebrafish",
        }
    }

    /// Dense index, used for per-species tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            Species::Human => 0,
            Species::Mouse => 1,
            Species::Zebrafish => 2,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = GenemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "hgnc" => Ok(Species::Human),
            "mouse" | "mgi" => Ok(Species::Mouse),
            "zebrafish" | "zfin" => Ok(Species::Zebrafish),
            _ => Err(GenemapError::InvalidConfig {
                msg: format!("unknown species '{}'", s),
            }),
        }
    }
}
