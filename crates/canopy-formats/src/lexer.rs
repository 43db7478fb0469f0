//! Line-oriented tokenizer shared by all scene formats.
//!
//! Every format is a sequence of whitespace-separated records, one per line.
//! Blank lines are skipped everywhere; `#` comment lines are skipped for the
//! formats that allow them.

use crate::error::{Format, FormatError, Result};

/// One non-empty line split into fields.
#[derive(Debug, Clone)]
pub(crate) struct Record<'a> {
    /// Line number (1-indexed).
    pub line: usize,
    /// Whitespace-separated fields.
    pub fields: Vec<&'a str>,
    format: Format,
}

impl<'a> Record<'a> {
    /// Fail unless the record has at least `n` fields.
    pub fn expect_fields(&self, n: usize) -> Result<()> {
        if self.fields.len() < n {
            return Err(FormatError::FieldCount {
                format: self.format,
                line: self.line,
                expected: n,
                actual: self.fields.len(),
            });
        }
        Ok(())
    }

    /// Parse field `idx` as a real number.
    pub fn real(&self, idx: usize) -> Result<f64> {
        let field = self.field(idx)?;
        field.parse::<f64>().map_err(|_| {
            FormatError::parse(
                self.format,
                self.line,
                format!("field {} is not a number: '{}'", idx + 1, field),
            )
        })
    }

    /// Parse field `idx` as a non-negative integer.
    pub fn integer(&self, idx: usize) -> Result<u32> {
        let field = self.field(idx)?;
        field.parse::<u32>().map_err(|_| {
            FormatError::parse(
                self.format,
                self.line,
                format!("field {} is not an integer: '{}'", idx + 1, field),
            )
        })
    }

    /// Raw text of field `idx`.
    pub fn field(&self, idx: usize) -> Result<&'a str> {
        self.expect_fields(idx + 1)?;
        Ok(self.fields[idx])
    }

    /// Build an error located at this record.
    pub fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError::parse(self.format, self.line, message)
    }
}

/// Split `text` into records, skipping blank lines and, if `comments` is set,
/// lines starting with `#`.
pub(crate) fn records(text: &str, format: Format, comments: bool) -> impl Iterator<Item = Record<'_>> {
    text.lines().enumerate().filter_map(move |(idx, raw)| {
        let trimmed = raw.trim();
        if trimmed.is_empty() || (comments && trimmed.starts_with('#')) {
            return None;
        }
        Some(Record {
            line: idx + 1,
            fields: trimmed.split_whitespace().collect(),
            format,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let text = "# header\n\n  1 2 3\n\t\n# trailing\n4 5\n";
        let recs: Vec<_> = records(text, Format::Can, true).collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].line, 3);
        assert_eq!(recs[0].fields, vec!["1", "2", "3"]);
        assert_eq!(recs[1].line, 6);
    }

    #[test]
    fn test_comments_kept_when_disabled() {
        let recs: Vec<_> = records("#1 2\n", Format::Light, false).collect();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].fields[0], "#1");
    }

    #[test]
    fn test_real_reports_line() {
        let recs: Vec<_> = records("\n1.5 abc\n", Format::Light, false).collect();
        assert_eq!(recs[0].real(0).unwrap(), 1.5);
        let err = recs[0].real(1).unwrap_err();
        match err {
            FormatError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_field_is_field_count() {
        let recs: Vec<_> = records("1 2", Format::Pattern, false).collect();
        assert!(matches!(
            recs[0].real(2),
            Err(FormatError::FieldCount { expected: 3, actual: 2, .. })
        ));
    }
}
