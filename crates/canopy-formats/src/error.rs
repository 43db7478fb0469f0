//! Error types for scene text formats.

use std::fmt;

use thiserror::Error;

/// The text format being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Triangulated scene (`*.can`).
    Can,
    /// Light sources (`*.light`).
    Light,
    /// Bounding domain (`*.8`).
    Pattern,
    /// Optical properties (`*.opt`).
    Opt,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Can => "can",
            Format::Light => "light",
            Format::Pattern => "pattern",
            Format::Opt => "opt",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while reading scene text formats.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A field could not be parsed or has an unexpected value.
    #[error("{format} parse error at line {line}: {message}")]
    Parse {
        /// Format being read.
        format: Format,
        /// Line number (1-indexed).
        line: usize,
        /// Error message.
        message: String,
    },

    /// A record has the wrong number of fields.
    #[error("{format} line {line}: expected {expected} fields, got {actual}")]
    FieldCount {
        /// Format being read.
        format: Format,
        /// Line number (1-indexed).
        line: usize,
        /// Minimum number of fields required.
        expected: usize,
        /// Number of fields found.
        actual: usize,
    },

    /// The text ended before a required record.
    #[error("{format} text is missing {what}")]
    Missing {
        /// Format being read.
        format: Format,
        /// Description of the missing record.
        what: String,
    },
}

impl FormatError {
    /// Create a parse error.
    pub fn parse(format: Format, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            message: message.into(),
        }
    }

    /// Create a missing-record error.
    pub fn missing(format: Format, what: impl Into<String>) -> Self {
        Self::Missing {
            format,
            what: what.into(),
        }
    }
}

/// Result type for format operations.
pub type Result<T> = std::result::Result<T, FormatError>;
