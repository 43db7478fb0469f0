//! Tagged inputs accepted by a [`Session`](crate::Session).
//!
//! Callers decide up front what kind of input they hold. The `from_arg`
//! helpers resolve a free-form argument (a command line value, a config
//! entry) into one of the variants, failing with
//! [`SceneError::UnsupportedInput`] when it is neither a readable file nor
//! well-formed text.

use std::path::{Path, PathBuf};

use canopy_formats::{parse_can, parse_light, parse_pattern, read_light, LightSource};
use canopy_mesh::Tessellate;

use crate::error::{Result, SceneError};
use crate::pattern::Pattern;

/// Capability of rendering a scene description as can text.
pub trait ToSceneText {
    /// Can text, one `p 1 <label> 3 …` line per triangle.
    fn to_scene_text(&self) -> String;
}

/// Geometry to add to a scene.
pub enum SceneInput {
    /// Path to a can file.
    FilePath(PathBuf),
    /// Can text.
    RawText(String),
    /// Any value that renders itself as can text.
    Convertible(Box<dyn ToSceneText>),
    /// Shapes keyed by their own id; each shape becomes one primitive.
    Shapes(Vec<(u64, Box<dyn Tessellate>)>),
}

impl SceneInput {
    /// Resolve a path or inline can text.
    pub fn from_arg(arg: &str) -> Result<Self> {
        if Path::new(arg).is_file() {
            return Ok(SceneInput::FilePath(PathBuf::from(arg)));
        }
        match parse_can(arg) {
            Ok(tris) if !tris.is_empty() => Ok(SceneInput::RawText(arg.to_string())),
            _ => Err(unsupported(
                "scene",
                arg,
                "a can file path, can text, a ToSceneText value or tessellable shapes",
            )),
        }
    }
}

/// Light sources to add to a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceInput {
    /// Path to a light file.
    FilePath(PathBuf),
    /// Light text.
    RawText(String),
    /// Structured `(energy, direction)` sources.
    Sources(Vec<LightSource>),
}

impl SourceInput {
    /// Resolve a path or inline light text.
    pub fn from_arg(arg: &str) -> Result<Self> {
        if Path::new(arg).is_file() {
            return Ok(SourceInput::FilePath(PathBuf::from(arg)));
        }
        match parse_light(arg) {
            Ok(sources) if !sources.is_empty() => Ok(SourceInput::RawText(arg.to_string())),
            _ => Err(unsupported(
                "sources",
                arg,
                "a light file path, light text or (energy, (vx, vy, vz)) tuples",
            )),
        }
    }

    pub(crate) fn resolve(self) -> Result<Vec<LightSource>> {
        Ok(match self {
            SourceInput::FilePath(path) => read_light(path)?,
            SourceInput::RawText(text) => parse_light(&text)?,
            SourceInput::Sources(sources) => sources,
        })
    }
}

impl From<LightSource> for SourceInput {
    fn from(source: LightSource) -> Self {
        SourceInput::Sources(vec![source])
    }
}

impl From<Vec<LightSource>> for SourceInput {
    fn from(sources: Vec<LightSource>) -> Self {
        SourceInput::Sources(sources)
    }
}

impl From<(f64, (f64, f64, f64))> for SourceInput {
    fn from((energy, (vx, vy, vz)): (f64, (f64, f64, f64))) -> Self {
        SourceInput::Sources(vec![LightSource::new(energy, vx, vy, vz)])
    }
}

/// Scene domain.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternInput {
    /// Path to a pattern file.
    FilePath(PathBuf),
    /// Pattern text.
    RawText(String),
    /// Two opposite corners, in any order.
    Corners((f64, f64), (f64, f64)),
}

impl PatternInput {
    /// Resolve a path or inline pattern text.
    pub fn from_arg(arg: &str) -> Result<Self> {
        if Path::new(arg).is_file() {
            return Ok(PatternInput::FilePath(PathBuf::from(arg)));
        }
        match parse_pattern(arg) {
            Ok(_) => Ok(PatternInput::RawText(arg.to_string())),
            Err(_) => Err(unsupported(
                "pattern",
                arg,
                "a pattern file path, pattern text or ((xmin, ymin), (xmax, ymax))",
            )),
        }
    }

    pub(crate) fn resolve(self) -> Result<Pattern> {
        match self {
            PatternInput::FilePath(path) => Pattern::from_text(&std::fs::read_to_string(path)?),
            PatternInput::RawText(text) => Pattern::from_text(&text),
            PatternInput::Corners(a, b) => Ok(Pattern::from_corners(a, b)),
        }
    }
}

fn unsupported(what: &'static str, arg: &str, expected: &'static str) -> SceneError {
    let mut input: String = arg.chars().take(40).collect();
    if input.len() < arg.len() {
        input.push('…');
    }
    SceneError::UnsupportedInput {
        what,
        input,
        expected,
    }
}
