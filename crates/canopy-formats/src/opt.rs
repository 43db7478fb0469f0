//! Optical properties format (`*.opt`).
//!
//! ```text
//! # comment
//! n 1                     number of species
//! s d 0.15                soil reflectance
//! e d 0.10 d 0.10 0.05 d 0.10 0.05
//! ```
//!
//! Each `e` line describes one species: stem reflectance, then reflectance
//! and transmittance of the upper and lower leaf faces. Species are numbered
//! from 1 in order of appearance.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Format, Result};
use crate::lexer::records;

/// Optical properties of one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesOptics {
    /// Reflectance of stems (opaque organs).
    pub stem_reflectance: f64,
    /// Reflectance of the upper leaf face.
    pub sup_reflectance: f64,
    /// Transmittance of the upper leaf face.
    pub sup_transmittance: f64,
    /// Reflectance of the lower leaf face.
    pub inf_reflectance: f64,
    /// Transmittance of the lower leaf face.
    pub inf_transmittance: f64,
}

/// Contents of an opt file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptFile {
    /// Declared number of species (`n` line), if present.
    pub species_count: Option<u32>,
    /// Soil reflectance (`s` line), if present.
    pub soil_reflectance: Option<f64>,
    /// Species optics keyed by 1-based species id.
    pub species: BTreeMap<u32, SpeciesOptics>,
}

/// Parse opt text.
///
/// Lines starting with anything other than `n`, `s` or `e` are ignored.
pub fn parse_opt(text: &str) -> Result<OptFile> {
    let mut opt = OptFile::default();
    let mut next_species = 1;
    for rec in records(text, Format::Opt, true) {
        match rec.fields[0] {
            "n" => opt.species_count = Some(rec.integer(1)?),
            "s" => opt.soil_reflectance = Some(rec.real(2)?),
            "e" => {
                rec.expect_fields(9)?;
                opt.species.insert(
                    next_species,
                    SpeciesOptics {
                        stem_reflectance: rec.real(2)?,
                        sup_reflectance: rec.real(4)?,
                        sup_transmittance: rec.real(5)?,
                        inf_reflectance: rec.real(7)?,
                        inf_transmittance: rec.real(8)?,
                    },
                );
                next_species += 1;
            }
            _ => continue,
        }
    }
    Ok(opt)
}

/// Read an opt file from a path.
pub fn read_opt(path: impl AsRef<Path>) -> Result<OptFile> {
    let text = std::fs::read_to_string(path)?;
    parse_opt(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TWO_SPECIES: &str = "\
# PAR
n 2
s d 0.15
e d 0.10   d 0.10 0.05  d 0.10 0.05
e d 0.20   d 0.30 0.01  d 0.25 0.02
";

    #[test]
    fn test_parse_two_species() {
        let opt = parse_opt(TWO_SPECIES).unwrap();
        assert_eq!(opt.species_count, Some(2));
        assert_relative_eq!(opt.soil_reflectance.unwrap(), 0.15);
        assert_eq!(opt.species.len(), 2);
        let second = opt.species[&2];
        assert_relative_eq!(second.stem_reflectance, 0.20);
        assert_relative_eq!(second.sup_reflectance, 0.30);
        assert_relative_eq!(second.sup_transmittance, 0.01);
        assert_relative_eq!(second.inf_reflectance, 0.25);
        assert_relative_eq!(second.inf_transmittance, 0.02);
    }

    #[test]
    fn test_rejects_short_species_line() {
        assert!(parse_opt("e d 0.1 d 0.1\n").is_err());
    }

    #[test]
    fn test_rejects_bad_count() {
        assert!(parse_opt("n one\n").is_err());
    }
}
