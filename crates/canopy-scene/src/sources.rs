//! Light sources and the incident energy balance of a scene.

use canopy_formats::{write_light_line, LightSource};
use canopy_math::cos_zenith;
use serde::Serialize;

use crate::error::{Result, SceneError};
use crate::input::SourceInput;
use crate::pattern::Pattern;

/// Energy entering the scene for the current sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncidentEnergy {
    /// Flux received on a horizontal surface, per unit scene area.
    pub qi: f64,
    /// Sum of source fluxes measured perpendicular to each source direction.
    pub qem: f64,
    /// Total energy on the domain (`qi * area`), when a pattern is set.
    pub einc: Option<f64>,
}

/// Compute the energy balance of `sources` over an optional domain.
///
/// Returns `None` when there are no sources. Fails on a source with no
/// vertical component, whose horizontal flux cannot be converted.
pub fn incident_energy(
    sources: &[LightSource],
    pattern: Option<&Pattern>,
) -> Result<Option<IncidentEnergy>> {
    if sources.is_empty() {
        return Ok(None);
    }

    let mut qi = 0.0;
    let mut qem = 0.0;
    for (index, source) in sources.iter().enumerate() {
        let costheta =
            cos_zenith(&source.direction).ok_or(SceneError::DegenerateSource { index })?;
        qi += source.energy;
        qem += source.energy / costheta;
    }

    Ok(Some(IncidentEnergy {
        qi,
        qem,
        einc: pattern.map(|p| qi * p.area()),
    }))
}

/// Accumulates light sources in their canonical `energy vx vy vz` form.
#[derive(Debug, Clone, Default)]
pub struct SourceManager {
    sources: Vec<LightSource>,
}

impl SourceManager {
    /// Create a manager without sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append sources; earlier ones are kept.
    ///
    /// Text and file inputs are fully parsed first, so a malformed line
    /// leaves the manager unchanged. Returns the number of sources added.
    pub fn add_sources(&mut self, input: impl Into<SourceInput>) -> Result<usize> {
        let added = input.into().resolve()?;
        log::debug!("adding {} light source(s)", added.len());
        let count = added.len();
        self.sources.extend(added);
        Ok(count)
    }

    /// Registered sources, in insertion order.
    pub fn sources(&self) -> &[LightSource] {
        &self.sources
    }

    /// Whether any source was added.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Light text, one line per source.
    pub fn text(&self) -> String {
        self.sources.iter().map(write_light_line).collect()
    }

    /// Energy balance of the registered sources. See [`incident_energy`].
    pub fn incident_energy(&self, pattern: Option<&Pattern>) -> Result<Option<IncidentEnergy>> {
        incident_energy(&self.sources, pattern)
    }
}
