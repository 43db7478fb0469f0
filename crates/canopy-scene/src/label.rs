//! Triangle barcodes and internal primitive identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of a canonical label.
pub const LABEL_WIDTH: usize = 12;

/// Labels shorter than this are zero-padded to [`LABEL_WIDTH`].
const PAD_BELOW: usize = 11;

/// Sentinel labels of the two soil triangles.
const SOIL_LABELS: [&str; 2] = ["000000000000", "000000000001"];

/// Canonical triangle barcode.
///
/// The barcode is opaque: no character set is enforced. Construction always
/// goes through [`Label::canonicalize`], deserialization included.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Left-pad `raw` with zeros to 12 characters if it is shorter than 11,
    /// otherwise keep it unchanged.
    pub fn canonicalize(raw: &str) -> Self {
        if raw.chars().count() < PAD_BELOW {
            Label(format!("{raw:0>width$}", width = LABEL_WIDTH))
        } else {
            Label(raw.to_string())
        }
    }

    /// Sentinel label of soil triangle `index` (0 or 1).
    pub fn soil(index: usize) -> Self {
        Label(SOIL_LABELS[index % SOIL_LABELS.len()].to_string())
    }

    /// Default label of the `index`-th shape of a batch: species 1, plant 1,
    /// element `index + 1`.
    pub fn for_shape(index: usize) -> Self {
        Label::canonicalize(&format!("100001{:06}", index + 1))
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a raw barcode. See [`Label::canonicalize`].
pub fn canonicalize(raw: &str) -> Label {
    Label::canonicalize(raw)
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        Label::canonicalize(&raw)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a primitive, allocated by the scene builder.
///
/// Ids start at 1 and grow strictly in allocation order; they are never
/// reused until the builder is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalId(u32);

impl InternalId {
    /// The first id handed out by a fresh builder.
    pub const FIRST: InternalId = InternalId(1);

    /// Wrap a raw id value.
    pub fn new(value: u32) -> Self {
        InternalId(value)
    }

    /// The raw id value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// The id allocated right after this one.
    pub fn next(self) -> Self {
        InternalId(self.0 + 1)
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
