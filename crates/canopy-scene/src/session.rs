//! A simulation session: scene, sources, domain and optics in one place.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;

use canopy_formats::parse_can;
use canopy_math::Point3;
use canopy_mesh::Tessellate;
use rayon::prelude::*;

use crate::builder::{Scene, SceneBuilder};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::{EngineInput, EngineOutput, Periodiser, RadiativeEngine, SimulationOptions};
use crate::error::{Result, SceneError};
use crate::input::{PatternInput, SceneInput, SourceInput};
use crate::label::{InternalId, Label};
use crate::optics::Optics;
use crate::output::{output_by_external_id, output_by_id, Grouped, TriangleOutput};
use crate::pattern::Pattern;
use crate::sources::{IncidentEnergy, SourceManager};

/// Ids assigned by one [`Session::add_scene`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Can input: one id per distinct label.
    Labels(BTreeMap<Label, InternalId>),
    /// Shape input: one id per shape key.
    Shapes(BTreeMap<u64, InternalId>),
}

impl Assignment {
    /// Number of primitives created.
    pub fn len(&self) -> usize {
        match self {
            Assignment::Labels(map) => map.len(),
            Assignment::Shapes(map) => map.len(),
        }
    }

    /// Whether nothing was added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scene under construction, with everything needed to run the engine on it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    builder: SceneBuilder,
    sources: SourceManager,
    pattern: Option<Pattern>,
    optics: Optics,
    diagnostics: Diagnostics,
}

impl Session {
    /// Empty session with the default optical table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session initialised from optional inputs, in the order scene,
    /// sources, pattern, optics.
    pub fn from_parts(
        scene: Option<SceneInput>,
        sources: Option<SourceInput>,
        pattern: Option<PatternInput>,
        optics: Option<Optics>,
    ) -> Result<Self> {
        let mut session = Self::new();
        if let Some(scene) = scene {
            session.add_scene(scene)?;
        }
        if let Some(sources) = sources {
            session.add_sources(sources)?;
        }
        if let Some(pattern) = pattern {
            session.set_pattern(pattern)?;
        }
        if let Some(optics) = optics {
            session.set_optical(optics);
        }
        Ok(session)
    }

    /// Add geometry of any accepted kind.
    pub fn add_scene(&mut self, input: SceneInput) -> Result<Assignment> {
        Ok(match input {
            SceneInput::FilePath(path) => {
                let text = std::fs::read_to_string(path)?;
                Assignment::Labels(self.builder.add_can(&text)?)
            }
            SceneInput::RawText(text) => Assignment::Labels(self.builder.add_can(&text)?),
            SceneInput::Convertible(value) => {
                Assignment::Labels(self.builder.add_can(&value.to_scene_text())?)
            }
            SceneInput::Shapes(shapes) => {
                Assignment::Shapes(self.builder.add_shapes(shapes, Label::for_shape))
            }
        })
    }

    /// Append can text; one id per distinct label.
    pub fn add_can(&mut self, text: &str) -> Result<BTreeMap<Label, InternalId>> {
        self.builder.add_can(text)
    }

    /// Append already parsed triangles; one id per distinct label.
    pub fn add_triangles<S: AsRef<str>>(
        &mut self,
        batch: &[(S, [Point3; 3])],
    ) -> BTreeMap<Label, InternalId> {
        self.builder.add_parsed_triangles(batch)
    }

    /// Append shapes; one id per shape, labelled by position.
    pub fn add_shapes<K, S, I>(&mut self, shapes: I) -> BTreeMap<K, InternalId>
    where
        K: Ord,
        S: Tessellate,
        I: IntoIterator<Item = (K, S)>,
    {
        self.builder.add_shapes(shapes, Label::for_shape)
    }

    /// Add a flat soil at height `zsoil` over the current pattern.
    pub fn add_soil(&mut self, zsoil: f64) -> BTreeMap<Label, InternalId> {
        self.builder
            .add_soil(self.pattern.as_ref(), zsoil, &mut self.diagnostics)
    }

    /// Remove all geometry and restart ids at 1. Sources, pattern and
    /// optics are kept.
    pub fn reset_scene(&mut self) {
        self.builder.reset();
    }

    /// Set the domain, replacing any previous one.
    pub fn set_pattern(&mut self, input: impl Into<PatternInput>) -> Result<()> {
        self.pattern = Some(input.into().resolve()?);
        Ok(())
    }

    /// Current domain.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Append light sources. Returns how many were added.
    pub fn add_sources(&mut self, input: impl Into<SourceInput>) -> Result<usize> {
        self.sources.add_sources(input)
    }

    /// Registered light sources.
    pub fn sources(&self) -> &SourceManager {
        &self.sources
    }

    /// Replace the optical table.
    pub fn set_optical(&mut self, optics: Optics) {
        self.optics = optics;
    }

    /// Load the optical table from an opt file, tagged with its file stem.
    pub fn set_optical_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.optics = Optics::from_file(path)?;
        Ok(())
    }

    /// Current optical table.
    pub fn optics(&self) -> &Optics {
        &self.optics
    }

    /// Energy balance of the current sources over the current pattern.
    pub fn incident_energy(&self) -> Result<Option<IncidentEnergy>> {
        self.sources.incident_energy(self.pattern.as_ref())
    }

    /// Immutable copy of the current scene.
    pub fn scene(&self) -> Scene {
        self.builder.snapshot()
    }

    /// The underlying builder.
    pub fn builder(&self) -> &SceneBuilder {
        &self.builder
    }

    /// Write the can text.
    pub fn write_can<W: Write>(&mut self, mut out: W) -> Result<()> {
        if self.builder.is_empty() {
            self.diagnostics.emit(Diagnostic::EmptyScene);
        }
        out.write_all(self.builder.text().as_bytes())?;
        Ok(())
    }

    /// Write the pattern text; nothing is written without a pattern.
    pub fn write_pattern<W: Write>(&mut self, mut out: W) -> Result<()> {
        match &self.pattern {
            Some(pattern) => out.write_all(pattern.to_text().as_bytes())?,
            None => self.diagnostics.emit(Diagnostic::MissingPattern {
                operation: "write_pattern",
            }),
        }
        Ok(())
    }

    /// Write the light text.
    pub fn write_light<W: Write>(&mut self, mut out: W) -> Result<()> {
        if !self.sources.has_sources() {
            self.diagnostics.emit(Diagnostic::NoSources);
        }
        out.write_all(self.sources.text().as_bytes())?;
        Ok(())
    }

    /// Write the opt text.
    pub fn write_optical<W: Write>(&mut self, mut out: W) -> Result<()> {
        if self.optics.is_default() {
            self.diagnostics.emit(Diagnostic::DefaultOptics);
        }
        out.write_all(self.optics.text().as_bytes())?;
        Ok(())
    }

    /// Run `engine` on the session and derive per-triangle outputs for the
    /// session's band.
    ///
    /// An empty scene yields an empty output and the engine is not called.
    pub fn run<E: RadiativeEngine + ?Sized>(
        &mut self,
        engine: &E,
        options: &SimulationOptions,
    ) -> Result<TriangleOutput> {
        let Some(output) = self.simulate(engine, options)? else {
            return Ok(TriangleOutput::default());
        };
        let band = output.band(self.optics.wavelength())?;
        TriangleOutput::from_raw(&band.data)
    }

    /// Like [`run`](Self::run) but derives every band the engine returned.
    pub fn run_all_bands<E: RadiativeEngine + ?Sized>(
        &mut self,
        engine: &E,
        options: &SimulationOptions,
    ) -> Result<BTreeMap<String, TriangleOutput>> {
        let Some(output) = self.simulate(engine, options)? else {
            return Ok(BTreeMap::new());
        };
        output
            .bands
            .par_iter()
            .map(|(tag, band)| TriangleOutput::from_raw(&band.data).map(|out| (tag.clone(), out)))
            .collect()
    }

    fn simulate<E: RadiativeEngine + ?Sized>(
        &mut self,
        engine: &E,
        options: &SimulationOptions,
    ) -> Result<Option<EngineOutput>> {
        if self.builder.is_empty() {
            self.diagnostics.emit(Diagnostic::EmptyScene);
            return Ok(None);
        }
        if !self.sources.has_sources() {
            self.diagnostics.emit(Diagnostic::NoSources);
        }
        if self.optics.is_default() {
            self.diagnostics.emit(Diagnostic::DefaultOptics);
        }

        let sources = self.sources.has_sources().then(|| self.sources.text());
        let pattern = self.pattern.map(|p| p.to_text());
        let input = EngineInput {
            scene: self.builder.text(),
            sources: sources.as_deref(),
            optics: self.optics.text(),
            pattern: pattern.as_deref(),
            wavelength: self.optics.wavelength(),
        };
        log::info!(
            "simulating {} triangles, band {}",
            self.builder.len(),
            input.wavelength
        );
        let output = engine.simulate(&input, options)?;
        if !output.status.is_empty() {
            log::debug!("engine status: {}", output.status);
        }
        Ok(Some(output))
    }

    /// Fold the scene into the pattern with `periodiser`.
    ///
    /// Only the can text changes; labels and ids are kept. An empty scene
    /// is left alone. The returned text must hold exactly one triangle per
    /// id, otherwise the scene is not modified and
    /// [`SceneError::LengthMismatch`] is returned.
    pub fn periodise<P: Periodiser + ?Sized>(&mut self, periodiser: &P) -> Result<()> {
        if self.builder.is_empty() {
            return Ok(());
        }
        let pattern = self.pattern.map(|p| p.to_text());
        let text = periodiser.periodise(self.builder.text(), pattern.as_deref())?;
        let rows = parse_can(&text)?.len();
        if rows != self.builder.len() {
            return Err(SceneError::LengthMismatch {
                rows,
                triangles: self.builder.len(),
            });
        }
        self.builder.replace_text(text);
        Ok(())
    }

    /// Group `output` by internal id, against the current id sequence.
    pub fn output_by_id(&self, output: &TriangleOutput, aggregate: bool) -> Result<Grouped<InternalId>> {
        output_by_id(output, self.builder.ids(), aggregate)
    }

    /// Group `output` by caller ids mapped onto internal ids.
    pub fn output_by_external_id<K: Ord + Clone>(
        &self,
        output: &TriangleOutput,
        map: &BTreeMap<K, InternalId>,
        aggregate: bool,
    ) -> Result<Grouped<K>> {
        output_by_external_id(output, self.builder.ids(), map, aggregate)
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    /// Drain the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

fn head(text: &str, lines: usize) -> String {
    let mut head = text.lines().take(lines).collect::<Vec<_>>().join("\n");
    head.push_str("...");
    head
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = self.pattern.map(|p| p.to_text()).unwrap_or_default();
        writeln!(f, "Pattern:")?;
        writeln!(f, "{pattern}")?;
        writeln!(f, "Current wavelength: {}", self.optics.wavelength())?;
        writeln!(f, "Optics:")?;
        writeln!(f, "{}", self.optics.text())?;
        writeln!(f, "Light sources:")?;
        writeln!(f, "{}", head(&self.sources.text(), 5))?;
        writeln!(f, "Scene:")?;
        writeln!(f, "{}", head(self.builder.text(), 7))
    }
}
