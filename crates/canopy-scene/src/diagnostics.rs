//! Non-fatal conditions reported while assembling or writing a scene.

use std::fmt;

/// A recoverable condition: the operation went ahead, possibly as a no-op
/// or with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An operation needed a pattern and none was set.
    MissingPattern {
        /// The operation that was skipped or degraded.
        operation: &'static str,
    },
    /// No optical table was set, the built-in default was used.
    DefaultOptics,
    /// The scene has no triangles.
    EmptyScene,
    /// No light sources were added.
    NoSources,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingPattern { operation } => {
                write!(f, "{operation} needs a pattern to be set")
            }
            Diagnostic::DefaultOptics => {
                f.write_str("no optical properties specified, using the default table")
            }
            Diagnostic::EmptyScene => f.write_str("scene has no triangles"),
            Diagnostic::NoSources => f.write_str("scene has no light sources"),
        }
    }
}

/// Ordered collection of diagnostics, each also forwarded to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    /// Diagnostics recorded so far, oldest first.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Remove and return every recorded diagnostic.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
