//! Project files: a TOML description of a scene and its simulation settings.
//!
//! ```toml
//! [scene]
//! can = ["plant.can"]
//! sources = [[1.0, 0.0, 0.0, -1.0]]
//! domain = [[0.0, 0.0], [1.0, 1.0]]
//! optics = "par.opt"
//! soil = 0.0
//!
//! [[scene.shapes]]
//! id = 10
//! shape = { kind = "quad", width = 0.1, length = 0.4 }
//! position = [0.5, 0.5, 0.3]
//! azimuth = 90.0
//! inclination = 30.0
//!
//! [simulation]
//! direct = false
//! nz = 12
//! ```
//!
//! Paths are relative to the project file. `can`, `light` and `pattern`
//! entries that are not files are read as inline text.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use canopy_math::{Point3, Transform, Vec3};
use canopy_mesh::{Cuboid, Disc, Placed, Quad, Tessellate};
use canopy_scene::{
    LightSource, PatternInput, SceneInput, Session, SimulationOptions, SourceInput,
};
use serde::Deserialize;

/// Top level of a project file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub scene: SceneConfig,
    pub simulation: SimulationOptions,
}

/// The `[scene]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Can files or inline can text, inserted in order.
    pub can: Vec<String>,
    /// Light files or inline light text.
    pub light: Vec<String>,
    /// Sources as `[energy, vx, vy, vz]`.
    pub sources: Vec<[f64; 4]>,
    /// Pattern file or inline pattern text.
    pub pattern: Option<String>,
    /// Pattern as two opposite corners.
    pub domain: Option<[[f64; 2]; 2]>,
    /// Opt file; the built-in table is used when absent.
    pub optics: Option<PathBuf>,
    /// Height of a soil covering the pattern.
    pub soil: Option<f64>,
    /// Procedural organs, one primitive each.
    pub shapes: Vec<ShapeConfig>,
}

/// Local geometry of a procedural organ.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeKind {
    /// Flat rectangle with a corner at the local origin.
    Quad { width: f64, length: f64 },
    /// Flat disc centred on the local origin.
    Disc {
        radius: f64,
        #[serde(default = "default_segments")]
        segments: u32,
    },
    /// Box with its minimum corner at the local origin.
    Cuboid { size: [f64; 3] },
}

fn default_segments() -> u32 {
    16
}

/// One `[[scene.shapes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeConfig {
    /// Caller id of the organ.
    pub id: u64,
    pub shape: ShapeKind,
    #[serde(default)]
    pub position: [f64; 3],
    /// Degrees about the vertical axis.
    #[serde(default)]
    pub azimuth: f64,
    /// Degrees about the local x axis.
    #[serde(default)]
    pub inclination: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl ShapeConfig {
    /// The organ tessellated in its local frame and placed in the scene.
    pub fn placed(&self) -> Placed<Box<dyn Tessellate>> {
        let local: Box<dyn Tessellate> = match self.shape {
            ShapeKind::Quad { width, length } => {
                Box::new(Quad::horizontal(Point3::origin(), width, length))
            }
            ShapeKind::Disc { radius, segments } => Box::new(Disc {
                center: Point3::origin(),
                radius,
                segments,
            }),
            ShapeKind::Cuboid { size } => Box::new(Cuboid {
                origin: Point3::origin(),
                size: Vec3::from(size),
            }),
        };
        let [x, y, z] = self.position;
        let transform = Transform::placement(
            Point3::new(x, y, z),
            self.azimuth.to_radians(),
            self.inclination.to_radians(),
            self.scale,
        );
        Placed::new(local, transform)
    }
}

impl Project {
    /// Parse project TOML.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid project file")
    }

    /// Read and parse a project file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Assemble a session, resolving relative paths against `base`.
    pub fn session(&self, base: &Path) -> Result<Session> {
        let scene = &self.scene;
        let mut session = Session::new();

        match (&scene.pattern, scene.domain) {
            (Some(_), Some(_)) => bail!("set either `pattern` or `domain`, not both"),
            (Some(pattern), None) => {
                let input = match existing(base, pattern) {
                    Some(path) => PatternInput::FilePath(path),
                    None => PatternInput::from_arg(pattern)?,
                };
                session.set_pattern(input)?;
            }
            (None, Some([a, b])) => {
                session.set_pattern(PatternInput::Corners((a[0], a[1]), (b[0], b[1])))?;
            }
            (None, None) => {}
        }

        for can in &scene.can {
            let input = match existing(base, can) {
                Some(path) => SceneInput::FilePath(path),
                None => SceneInput::from_arg(can)?,
            };
            let assigned = session.add_scene(input)?;
            log::debug!("{} primitive(s) from {}", assigned.len(), short(can));
        }

        if !scene.shapes.is_empty() {
            let shapes = scene
                .shapes
                .iter()
                .map(|config| {
                    let placed: Box<dyn Tessellate> = Box::new(config.placed());
                    (config.id, placed)
                })
                .collect();
            session.add_scene(SceneInput::Shapes(shapes))?;
        }

        if let Some(zsoil) = scene.soil {
            session.add_soil(zsoil);
        }

        for light in &scene.light {
            let input = match existing(base, light) {
                Some(path) => SourceInput::FilePath(path),
                None => SourceInput::from_arg(light)?,
            };
            session.add_sources(input)?;
        }
        if !scene.sources.is_empty() {
            let sources: Vec<LightSource> = scene
                .sources
                .iter()
                .map(|&[e, vx, vy, vz]| LightSource::new(e, vx, vy, vz))
                .collect();
            session.add_sources(sources)?;
        }

        if let Some(optics) = &scene.optics {
            let path = base.join(optics);
            session
                .set_optical_file(&path)
                .with_context(|| format!("failed to load optics from {}", path.display()))?;
        }

        Ok(session)
    }
}

fn existing(base: &Path, entry: &str) -> Option<PathBuf> {
    if entry.contains('\n') {
        return None;
    }
    let path = base.join(entry);
    path.is_file().then_some(path)
}

fn short(entry: &str) -> &str {
    entry.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PROJECT: &str = r#"
[scene]
can = ["p 1 1 3 0 0 1 1 0 1 0 1 1\np 1 2 3 0 0 2 1 0 2 0 1 2\n"]
sources = [[1.0, 0.0, 0.0, -1.0], [0.5, 0.0, 0.0, -1.0]]
domain = [[1.0, 1.0], [0.0, 0.0]]
soil = 0.0

[simulation]
direct = false
nz = 12
"#;

    #[test]
    fn test_defaults() {
        let project = Project::from_toml("").unwrap();
        assert!(project.scene.can.is_empty());
        assert_eq!(project.simulation, SimulationOptions::default());
    }

    #[test]
    fn test_inline_project() {
        let project = Project::from_toml(PROJECT).unwrap();
        assert!(!project.simulation.direct);
        assert_eq!(project.simulation.nz, 12);
        assert_eq!(project.simulation.dz, 5.0);

        let session = project.session(Path::new(".")).unwrap();
        assert_eq!(session.scene().len(), 4);
        assert_eq!(session.sources().sources().len(), 2);
        let energy = session.incident_energy().unwrap().unwrap();
        assert_relative_eq!(energy.qi, 1.5);
        assert_relative_eq!(energy.einc.unwrap(), 1.5);
        assert!(session.diagnostics().is_empty());
    }

    #[test]
    fn test_placed_shapes() {
        let text = r#"
[scene]
domain = [[0.0, 0.0], [2.0, 2.0]]

[[scene.shapes]]
id = 7
shape = { kind = "quad", width = 1.0, length = 0.5 }
position = [1.0, 1.0, 2.0]
inclination = 90.0

[[scene.shapes]]
id = 8
shape = { kind = "disc", radius = 0.5 }
scale = 2.0
"#;
        let project = Project::from_toml(text).unwrap();
        let leaf = project.scene.shapes[0].placed().tessellate();
        assert_relative_eq!(leaf.area(), 0.5, epsilon = 1e-9);
        // upright: spans z from 2.0 to 2.5
        let top = leaf.points.iter().map(|p| p.z).fold(f64::MIN, f64::max);
        assert_relative_eq!(top, 2.5, epsilon = 1e-9);

        let disc = project.scene.shapes[1].placed().tessellate();
        assert_eq!(disc.num_triangles(), 16);

        let session = project.session(Path::new(".")).unwrap();
        assert_eq!(session.scene().len(), 2 + 16);
        assert_eq!(session.scene().ids()[0].get(), 1);
        assert_eq!(session.scene().ids()[17].get(), 2);
    }

    #[test]
    fn test_pattern_and_domain_conflict() {
        let text = "[scene]\npattern = \"0 0\\n1 1\\n\"\ndomain = [[0.0, 0.0], [1.0, 1.0]]\n";
        let project = Project::from_toml(text).unwrap();
        assert!(project.session(Path::new(".")).is_err());
    }

    #[test]
    fn test_unknown_scene_entry() {
        let project = Project::from_toml("[scene]\ncan = [\"no-such-file.can\"]\n").unwrap();
        let err = project.session(Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("unsupported scene input"));
    }
}
