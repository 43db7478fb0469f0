//! Error types for scene assembly and output aggregation.

use canopy_formats::FormatError;
use thiserror::Error;

use crate::engine::EngineError;

/// Errors that can occur while building a scene or interpreting its outputs.
#[derive(Error, Debug)]
pub enum SceneError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed can, light, pattern or opt text.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An input could not be resolved to one of the accepted forms.
    #[error("unsupported {what} input '{input}': expected {expected}")]
    UnsupportedInput {
        /// Kind of input (scene, sources, pattern).
        what: &'static str,
        /// The offending input, possibly shortened.
        input: String,
        /// The accepted alternatives.
        expected: &'static str,
    },

    /// A light source has no vertical component.
    #[error("light source {index} is horizontal: its flux cannot be expressed on a horizontal plane")]
    DegenerateSource {
        /// Position of the source (0-indexed).
        index: usize,
    },

    /// Output rows do not line up with the scene's triangles.
    #[error("output has {rows} rows but the scene has {triangles} triangles")]
    LengthMismatch {
        /// Number of output rows.
        rows: usize,
        /// Number of triangles (ids) in the scene.
        triangles: usize,
    },

    /// A column of a raw result table has the wrong length.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLength {
        /// Column name.
        column: &'static str,
        /// Length of the `Eabs` column.
        expected: usize,
        /// Length of this column.
        actual: usize,
    },

    /// The radiative transfer engine or periodiser failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
