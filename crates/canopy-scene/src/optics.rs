//! Optical property tables and the wavelength band they describe.

use std::path::Path;

use canopy_formats::{parse_opt, OptFile};

use crate::error::Result;

/// Wavelength tag of the built-in table.
pub const DEFAULT_WAVELENGTH: &str = "defaultPO";

/// Built-in table: PAR, one green species over a 0.15 albedo soil.
const DEFAULT_OPT: &str = "\
# default optical properties (PAR, green material)
# e: stem, upper face, lower face
n 1
# soil
s d 0.15
# species 1
e d 0.10   d 0.10 0.05  d 0.10 0.05
";

/// Opt text together with the wavelength band it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct Optics {
    text: String,
    wavelength: String,
}

impl Optics {
    /// Validate `text` as an opt table and tag it with `wavelength`.
    pub fn new(text: impl Into<String>, wavelength: impl Into<String>) -> Result<Self> {
        let text = text.into();
        parse_opt(&text)?;
        Ok(Self {
            text,
            wavelength: wavelength.into(),
        })
    }

    /// Read an opt file; the band is named after the file (`par.opt` -> `par`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let wavelength = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .unwrap_or(DEFAULT_WAVELENGTH)
            .to_string();
        Self::new(text, wavelength)
    }

    /// Opt text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Wavelength tag.
    pub fn wavelength(&self) -> &str {
        &self.wavelength
    }

    /// Whether this is still the built-in fallback table.
    pub fn is_default(&self) -> bool {
        self.wavelength == DEFAULT_WAVELENGTH
    }

    /// Parsed table.
    pub fn properties(&self) -> Result<OptFile> {
        Ok(parse_opt(&self.text)?)
    }
}

impl Default for Optics {
    fn default() -> Self {
        Self {
            text: DEFAULT_OPT.to_string(),
            wavelength: DEFAULT_WAVELENGTH.to_string(),
        }
    }
}
