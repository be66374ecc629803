//! Classification of unresolved symbols.
//!
//! Datasets routinely carry clone-based contig accessions (`AC118555.1`,
//! `CR123456.2`) in their gene columns. These never appear in a nomenclature
//! reference, so a miss on one is expected and only logged at debug level.

use once_cell::sync::Lazy;
use regex::Regex;

/// Versioned contig accession pattern.
pub const CONTIG_PATTERN_V1: &str =
    r"^(((C[RU]|F[OP]|AUXG|BX|A[CDFJLP])\d{6}\.\d{1,2})|([UZ]\d{5}\.\d))$";

static CONTIG_V1: Lazy<Regex> = Lazy::new(|| Regex::new(CONTIG_PATTERN_V1).unwrap());

/// Decides whether an unresolved symbol looks like a contig accession.
pub trait AccessionClassifier {
    fn is_contig_accession(&self, symbol: &str) -> bool;

    /// Version tag recorded in build outputs.
    fn version(&self) -> &str;
}

/// Regex-backed classifier.
#[derive(Debug, Clone)]
pub struct ContigPattern {
    version: &'static str,
    regex: &'static Regex,
}

impl ContigPattern {
    pub fn v1() -> Self {
        Self {
            version: "v1",
            regex: &CONTIG_V1,
        }
    }
}

impl Default for ContigPattern {
    fn default() -> Self {
        Self::v1()
    }
}

impl AccessionClassifier for ContigPattern {
    fn is_contig_accession(&self, symbol: &str) -> bool {
        self.regex.is_match(symbol)
    }

    fn version(&self) -> &str {
        self.version
    }
}
