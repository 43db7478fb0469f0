//! Bounding domain format (`*.8`).
//!
//! Two lines of `x y`, the corners of the rectangular footprint of the scene.

use std::path::Path;

use canopy_math::Point2;

use crate::error::{Format, FormatError, Result};
use crate::lexer::records;

/// Parse pattern text into its two corners, as written (not reordered).
pub fn parse_pattern(text: &str) -> Result<[Point2; 2]> {
    let mut corners = Vec::with_capacity(2);
    for rec in records(text, Format::Pattern, false) {
        if corners.len() == 2 {
            return Err(rec.error("pattern has more than two corners"));
        }
        rec.expect_fields(2)?;
        if rec.fields.len() > 2 {
            return Err(rec.error(format!("expected 2 fields, got {}", rec.fields.len())));
        }
        corners.push(Point2::new(rec.real(0)?, rec.real(1)?));
    }
    match corners[..] {
        [a, b] => Ok([a, b]),
        _ => Err(FormatError::missing(
            Format::Pattern,
            format!("two corners (found {})", corners.len()),
        )),
    }
}

/// Read a pattern file from a path.
pub fn read_pattern(path: impl AsRef<Path>) -> Result<[Point2; 2]> {
    let text = std::fs::read_to_string(path)?;
    parse_pattern(&text)
}

/// Format two corners as pattern text, followed by a blank line.
pub fn write_pattern(first: &Point2, second: &Point2) -> String {
    format!("{} {}\n{} {}\n\n", first.x, first.y, second.x, second.y)
}
