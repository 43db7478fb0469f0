//! Triangulated scene format (`*.can`).
//!
//! Each triangle is one line:
//!
//! ```text
//! p 1 <label> 3 x1 y1 z1 x2 y2 z2 x3 y3 z3
//! ```
//!
//! The label (barcode) is the third field and the last nine fields are the
//! vertex coordinates. `#` comment lines and blank lines are ignored.

use std::path::Path;

use canopy_math::Point3;

use crate::error::{Format, Result};
use crate::lexer::records;

/// Minimum field count of a triangle line.
const TRIANGLE_FIELDS: usize = 13;

/// One triangle read from can text.
#[derive(Debug, Clone, PartialEq)]
pub struct CanRecord {
    /// Line number the triangle was read from (1-indexed).
    pub line: usize,
    /// Barcode as written in the file, not canonicalized.
    pub label: String,
    /// Vertex coordinates in file order.
    pub triangle: [Point3; 3],
}

/// Parse can text into triangle records, in file order.
///
/// Any malformed line fails the whole parse; no partial result is returned.
pub fn parse_can(text: &str) -> Result<Vec<CanRecord>> {
    let mut triangles = Vec::new();
    for rec in records(text, Format::Can, true) {
        rec.expect_fields(TRIANGLE_FIELDS)?;
        if rec.fields[0] != "p" {
            return Err(rec.error(format!(
                "expected primitive marker 'p', got '{}'",
                rec.fields[0]
            )));
        }
        let nvert = rec.integer(3)?;
        if nvert != 3 {
            return Err(rec.error(format!("only triangles are supported, got {nvert} vertices")));
        }

        let first = rec.fields.len() - 9;
        let mut coords = [0.0; 9];
        for (k, c) in coords.iter_mut().enumerate() {
            *c = rec.real(first + k)?;
        }
        triangles.push(CanRecord {
            line: rec.line,
            label: rec.fields[2].to_string(),
            triangle: [
                Point3::new(coords[0], coords[1], coords[2]),
                Point3::new(coords[3], coords[4], coords[5]),
                Point3::new(coords[6], coords[7], coords[8]),
            ],
        });
    }
    Ok(triangles)
}

/// Read a can file from a path.
pub fn read_can(path: impl AsRef<Path>) -> Result<Vec<CanRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse_can(&text)
}

/// Format one triangle as a can line (newline-terminated), coordinates at six decimals.
pub fn write_can_line(label: &str, triangle: &[Point3; 3]) -> String {
    let coords: Vec<String> = triangle
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .map(|x| format!("{x:.6}"))
        .collect();
    format!("p 1 {} 3 {}\n", label, coords.join(" "))
}
