#![warn(missing_docs)]

//! Readers and writers for the plain-text scene formats consumed by the
//! radiative transfer engine.
//!
//! | format  | extension | content |
//! |---------|-----------|---------|
//! | can     | `.can`    | labelled triangles |
//! | light   | `.light`  | directional sources |
//! | pattern | `.8`      | rectangular domain |
//! | opt     | `.opt`    | optical properties per species |
//!
//! Parsers reject malformed numeric fields with the 1-indexed line number
//! rather than skipping the record.
//!
//! # Example
//!
//! ```
//! use canopy_formats::{parse_light, write_light_line};
//!
//! let sources = parse_light("1 0 0 -1\n").unwrap();
//! assert_eq!(write_light_line(&sources[0]), "1 0 0 -1\n");
//! ```

mod can;
mod error;
mod lexer;
mod light;
mod opt;
mod pattern;

pub use can::{parse_can, read_can, write_can_line, CanRecord};
pub use error::{Format, FormatError, Result};
pub use light::{parse_light, read_light, write_light_line, LightSource};
pub use opt::{parse_opt, read_opt, OptFile, SpeciesOptics};
pub use pattern::{parse_pattern, read_pattern, write_pattern};
