//! Light source format (`*.light`).
//!
//! One source per line: `energy vx vy vz`. The energy is the flux measured on
//! a horizontal plane; the direction points from the source into the scene
//! and need not be normalized.

use std::path::Path;

use canopy_math::Vec3;

use crate::error::{Format, Result};
use crate::lexer::records;

/// A directional light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    /// Flux on a horizontal reference plane.
    pub energy: f64,
    /// Direction of emission.
    pub direction: Vec3,
}

impl LightSource {
    /// Create a source from an energy and direction components.
    pub fn new(energy: f64, vx: f64, vy: f64, vz: f64) -> Self {
        Self {
            energy,
            direction: Vec3::new(vx, vy, vz),
        }
    }
}

/// Parse light text into sources, in file order.
pub fn parse_light(text: &str) -> Result<Vec<LightSource>> {
    records(text, Format::Light, false)
        .map(|rec| {
            rec.expect_fields(4)?;
            if rec.fields.len() > 4 {
                return Err(rec.error(format!("expected 4 fields, got {}", rec.fields.len())));
            }
            Ok(LightSource::new(
                rec.real(0)?,
                rec.real(1)?,
                rec.real(2)?,
                rec.real(3)?,
            ))
        })
        .collect()
}

/// Read a light file from a path.
pub fn read_light(path: impl AsRef<Path>) -> Result<Vec<LightSource>> {
    let text = std::fs::read_to_string(path)?;
    parse_light(&text)
}

/// Format one source as a light line (newline-terminated).
pub fn write_light_line(source: &LightSource) -> String {
    let d = &source.direction;
    format!("{} {} {} {}\n", source.energy, d.x, d.y, d.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_sources() {
        let sources = parse_light("1 0 0 -1\n\n0.5 0.2 0.1 -0.9\n").unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], LightSource::new(1.0, 0.0, 0.0, -1.0));
        assert_eq!(sources[1].direction.z, -0.9);
    }

    #[test]
    fn test_rejects_extra_field() {
        assert!(parse_light("1 0 0 -1 7\n").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_light("1 0 zero -1\n").is_err());
        assert!(parse_light("1 0 -1\n").is_err());
    }

    #[test]
    fn test_write_line_uses_shortest_form() {
        let line = write_light_line(&LightSource::new(1.0, 0.0, 0.5, -1.0));
        assert_eq!(line, "1 0 0.5 -1\n");
        assert_eq!(parse_light(&line).unwrap()[0], LightSource::new(1.0, 0.0, 0.5, -1.0));
    }
}
