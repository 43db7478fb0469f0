//! Contracts with the external radiative transfer engine.
//!
//! The engine itself lives outside this crate. A [`Session`](crate::Session)
//! hands it the scene, light, pattern and optical texts through
//! [`RadiativeEngine::simulate`] and reads back one [`RawTable`] per band.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::RawTable;

/// Errors reported by an engine or periodiser.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine ran but reported a failure.
    #[error("engine failed: {0}")]
    Failed(String),

    /// The engine returned no band at all.
    #[error("engine returned no band")]
    NoBands,

    /// The engine result is not valid JSON of the expected shape.
    #[error("malformed engine result: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Texts describing one simulation, borrowed from the session.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    /// Can text of the scene.
    pub scene: &'a str,
    /// Light text, if any source was added.
    pub sources: Option<&'a str>,
    /// Opt text.
    pub optics: &'a str,
    /// Pattern text, if a domain was set.
    pub pattern: Option<&'a str>,
    /// Band tag under which the engine should report results.
    pub wavelength: &'a str,
}

/// Engine settings. Every field has a default, so a partial TOML table loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Direct light only, no scattering.
    pub direct: bool,
    /// Number of layers of the turbid medium.
    pub nz: u32,
    /// Height of the turbid medium.
    pub dz: f64,
    /// Leaf size used for the diffuse approximation.
    pub ds: f64,
    /// Simulate an infinitely repeated canopy.
    pub infinity: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            direct: true,
            nz: 10,
            dz: 5.0,
            ds: 0.5,
            infinity: true,
        }
    }
}

/// Result of one band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Per-triangle table.
    pub data: RawTable,
}

/// Everything an engine run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput {
    /// Results keyed by band tag.
    pub bands: BTreeMap<String, Band>,
    /// Free-form status reported by the engine.
    #[serde(default)]
    pub status: String,
}

impl EngineOutput {
    /// Parse an engine result document.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Band tagged `wavelength`, or the first band when no band carries that tag.
    pub fn band(&self, wavelength: &str) -> Result<&Band, EngineError> {
        self.bands
            .get(wavelength)
            .or_else(|| self.bands.values().next())
            .ok_or(EngineError::NoBands)
    }
}

/// A radiative transfer engine.
pub trait RadiativeEngine {
    /// Run one simulation.
    fn simulate(
        &self,
        input: &EngineInput<'_>,
        options: &SimulationOptions,
    ) -> Result<EngineOutput, EngineError>;
}

/// Folds triangles that stick out of the pattern back into it.
pub trait Periodiser {
    /// Periodised can text. Triangle count and order are preserved.
    fn periodise(&self, scene: &str, pattern: Option<&str>) -> Result<String, EngineError>;
}
