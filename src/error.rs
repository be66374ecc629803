//! Error types for ferro-genemap
//!
//! Errors fall into three groups:
//! - reference-format errors (duplicate symbols, unknown status/type codes,
//!   malformed rows) that abort a registry build
//! - configuration errors detected before any file is opened
//! - I/O and decoding errors
//!
//! Resolution misses during gene mapping are not errors; they are reported as
//! [`crate::mapping::UnresolvedSymbol`] records.

use std::fmt;
use thiserror::Error;

use crate::species::Species;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Reference format errors (E1xxx)
    /// Two reference rows share a primary symbol
    DuplicateSymbol = 1001,
    /// Marker status code outside the known set
    UnexpectedStatus = 1002,
    /// Marker feature type outside the known set
    UnexpectedFeatureType = 1003,
    /// Row is missing a field or has an unparseable value
    MalformedRow = 1004,
    /// Required header column is absent
    MissingColumn = 1005,
    /// Identifier does not have the expected shape
    InvalidIdentifier = 1006,

    // Dataset errors (E2xxx)
    /// Configured gene column is not present in the dataset table
    MissingGeneColumn = 2001,

    // Configuration errors (E3xxx)
    /// Pipeline configuration violates its contract
    InvalidConfig = 3001,

    // Registry errors (E4xxx)
    /// A registry invariant does not hold
    InvariantViolation = 4001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
    /// Delimited text error
    CsvError = 9003,
    /// TOML parsing error
    TomlError = 9004,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::DuplicateSymbol => "duplicate primary symbol",
            ErrorCode::UnexpectedStatus => "unexpected marker status",
            ErrorCode::UnexpectedFeatureType => "unexpected marker feature type",
            ErrorCode::MalformedRow => "malformed reference row",
            ErrorCode::MissingColumn => "missing required column",
            ErrorCode::InvalidIdentifier => "invalid identifier",
            ErrorCode::MissingGeneColumn => "gene column not found in dataset",
            ErrorCode::InvalidConfig => "invalid configuration",
            ErrorCode::InvariantViolation => "registry invariant violated",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
            ErrorCode::CsvError => "delimited text error",
            ErrorCode::TomlError => "TOML parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-genemap operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenemapError {
    /// Two reference rows share the same primary symbol
    #[error("Duplicate {species} symbol in reference: {symbol}")]
    DuplicateSymbol { species: Species, symbol: String },

    /// Marker status is neither official nor withdrawn
    #[error("Unexpected marker status '{status}' at {file}:{line}")]
    UnexpectedStatus {
        file: String,
        line: usize,
        status: String,
    },

    /// Marker type is not one of the known MGI feature types
    #[error("Unexpected marker type '{feature_type}' at {file}:{line}")]
    UnexpectedFeatureType {
        file: String,
        line: usize,
        feature_type: String,
    },

    /// Row is structurally broken
    #[error("Malformed row at {file}:{line}: {msg}")]
    MalformedRow {
        file: String,
        line: usize,
        msg: String,
    },

    /// Header lacks a required column
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Identifier does not match its expected prefix/shape
    #[error("Invalid {kind} identifier: {value}")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// Dataset table does not contain a configured gene column
    #[error("Table {table}: gene column '{column}' not found (columns: {available})")]
    MissingGeneColumn {
        table: String,
        column: String,
        available: String,
    },

    /// Configuration contract violation
    #[error("Invalid configuration: {msg}")]
    InvalidConfig { msg: String },

    /// Registry invariant does not hold
    #[error("Registry invariant violated: {msg}")]
    InvariantViolation { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },

    /// Delimited text error
    #[error("CSV error: {msg}")]
    Csv { msg: String },

    /// TOML parsing error
    #[error("TOML error: {msg}")]
    Toml { msg: String },
}

impl GenemapError {
    /// Create a malformed-row error
    pub fn malformed(file: impl Into<String>, line: usize, msg: impl Into<String>) -> Self {
        GenemapError::MalformedRow {
            file: file.into(),
            line,
            msg: msg.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        GenemapError::InvalidConfig { msg: msg.into() }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            GenemapError::DuplicateSymbol { .. } => ErrorCode::DuplicateSymbol,
            GenemapError::UnexpectedStatus { .. } => ErrorCode::UnexpectedStatus,
            GenemapError::UnexpectedFeatureType { .. } => ErrorCode::UnexpectedFeatureType,
            GenemapError::MalformedRow { .. } => ErrorCode::MalformedRow,
            GenemapError::MissingColumn { .. } => ErrorCode::MissingColumn,
            GenemapError::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            GenemapError::MissingGeneColumn { .. } => ErrorCode::MissingGeneColumn,
            GenemapError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            GenemapError::InvariantViolation { .. } => ErrorCode::InvariantViolation,
            GenemapError::Io { .. } => ErrorCode::IoError,
            GenemapError::Json { .. } => ErrorCode::JsonError,
            GenemapError::Csv { .. } => ErrorCode::CsvError,
            GenemapError::Toml { .. } => ErrorCode::TomlError,
        }
    }

    /// Whether the error stems from reference data that changed format.
    pub fn is_reference_format(&self) -> bool {
        (self.code() as u16) / 1000 == 1
    }

    /// Format the error prefixed with its code, e.g. `[E1001] Duplicate ...`
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for GenemapError {
    fn from(err: std::io::Error) -> Self {
        GenemapError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GenemapError {
    fn from(err: serde_json::Error) -> Self {
        GenemapError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<csv::Error> for GenemapError {
    fn from(err: csv::Error) -> Self {
        GenemapError::Csv {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GenemapError {
    fn from(err: toml::de::Error) -> Self {
        GenemapError::Toml {
            msg: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::DuplicateSymbol.as_str(), "E1001");
        assert_eq!(ErrorCode::MissingGeneColumn.as_str(), "E2001");
        assert_eq!(ErrorCode::InvalidConfig.as_str(), "E3001");
        assert_eq!(ErrorCode::InvariantViolation.as_str(), "E4001");
        assert_eq!(ErrorCode::IoError.as_str(), "E9001");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(
            ErrorCode::DuplicateSymbol.description(),
            "duplicate primary symbol"
        );
        assert_eq!(
            ErrorCode::UnexpectedStatus.description(),
            "unexpected marker status"
        );
        assert_eq!(ErrorCode::CsvError.description(), "delimited text error");
    }

    #[test]
    fn test_error_code_mapping() {
        let err = GenemapError::DuplicateSymbol {
            species: Species::Human,
            symbol: "BRCA1".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::DuplicateSymbol);
        assert!(err.is_reference_format());

        let err = GenemapError::config("two perturbed columns");
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
        assert!(!err.is_reference_format());

        let err = GenemapError::malformed("mgi.rpt", 3, "too few columns");
        assert_eq!(err.code(), ErrorCode::MalformedRow);
        assert!(err.is_reference_format());
    }

    #[test]
    fn test_error_display() {
        let err = GenemapError::DuplicateSymbol {
            species: Species::Human,
            symbol: "BRCA1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate human symbol in reference: BRCA1"
        );

        let err = GenemapError::UnexpectedStatus {
            file: "MGI_EntrezGene.rpt".to_string(),
            line: 12,
            status: "X".to_string(),
        };
        assert!(err.to_string().contains("MGI_EntrezGene.rpt:12"));
    }

    #[test]
    fn test_detailed_message() {
        let err = GenemapError::InvalidIdentifier {
            kind: "Ensembl",
            value: "XYZ1".to_string(),
        };
        let msg = err.detailed_message();
        assert!(msg.starts_with("[E1006]"));
        assert!(msg.contains("XYZ1"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GenemapError = io_err.into();
        assert!(matches!(err, GenemapError::Io { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GenemapError = json_err.into();
        assert_eq!(err.code(), ErrorCode::JsonError);
    }

    #[test]
    fn test_error_code_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ErrorCode::DuplicateSymbol);
        set.insert(ErrorCode::MalformedRow);
        assert!(set.contains(&ErrorCode::DuplicateSymbol));
        assert!(!set.contains(&ErrorCode::IoError));
    }
}
