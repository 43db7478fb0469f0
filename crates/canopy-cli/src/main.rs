//! canopy CLI - prepare radiative transfer scenes and aggregate their results
//!
//! `build` writes the engine inputs for a project file, `aggregate` folds an
//! engine result back onto primitives.

use anyhow::{Context, Result};
use canopy_scene::{
    output_by_external_id, output_by_id, EngineOutput, InternalId, Label, PatternInput, Session,
    SourceInput, TriangleOutput, DEFAULT_WAVELENGTH,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

mod project;

use project::Project;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Radiative transfer scene preparation and output aggregation", long_about = None)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the incident energy of a set of light sources
    Energy {
        /// Light file or inline light text
        #[arg(short, long)]
        light: String,
        /// Pattern file or inline pattern text
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Write the engine inputs described by a project file
    Build {
        /// Project file (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Aggregate an engine result by primitive
    Aggregate {
        /// Scene index written by `build`
        #[arg(short, long)]
        ids: PathBuf,
        /// Engine result (JSON)
        #[arg(short, long)]
        result: PathBuf,
        /// Band to read (default: the band recorded by `build`)
        #[arg(short, long)]
        band: Option<String>,
        /// JSON object mapping caller ids to internal ids
        #[arg(short, long)]
        map: Option<PathBuf>,
        /// Keep every triangle value instead of summing per primitive
        #[arg(long)]
        per_triangle: bool,
    },
    /// Summarise a project file
    Info {
        /// Project file (TOML)
        config: PathBuf,
    },
}

/// Labels and ids of every triangle, in scene order, and the band the
/// optics were written for.
#[derive(Debug, Serialize, Deserialize)]
struct SceneIndex {
    #[serde(default = "default_wavelength")]
    wavelength: String,
    labels: Vec<Label>,
    ids: Vec<InternalId>,
}

fn default_wavelength() -> String {
    DEFAULT_WAVELENGTH.to_string()
}

impl SceneIndex {
    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Band to aggregate: `requested`, else the band recorded at build time.
    fn band<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.wavelength)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Energy { light, pattern } => show_energy(&light, pattern.as_deref()),
        Commands::Build { config, out } => build(&config, &out),
        Commands::Aggregate {
            ids,
            result,
            band,
            map,
            per_triangle,
        } => aggregate(&ids, &result, band.as_deref(), map.as_deref(), !per_triangle),
        Commands::Info { config } => show_info(&config),
    }
}

fn show_energy(light: &str, pattern: Option<&str>) -> Result<()> {
    let mut session = Session::new();
    session.add_sources(SourceInput::from_arg(light)?)?;
    if let Some(pattern) = pattern {
        session.set_pattern(PatternInput::from_arg(pattern)?)?;
    }

    match session.incident_energy()? {
        Some(energy) => {
            println!("Qi:   {}", energy.qi);
            println!("Qem:  {}", energy.qem);
            match energy.einc {
                Some(einc) => println!("Einc: {}", einc),
                None => println!("Einc: n/a (no pattern)"),
            }
        }
        None => println!("No light sources"),
    }
    Ok(())
}

fn load_session(config: &Path) -> Result<(Project, Session)> {
    let project = Project::load(config)?;
    let base = config.parent().unwrap_or(Path::new("."));
    let session = project.session(base)?;
    Ok((project, session))
}

fn build(config: &Path, out: &Path) -> Result<()> {
    let (project, mut session) = load_session(config)?;
    fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;

    write_file(out, "scene.can", |w| session.write_can(w))?;
    write_file(out, "sky.light", |w| session.write_light(w))?;
    if session.pattern().is_some() {
        write_file(out, "domain.8", |w| session.write_pattern(w))?;
    }
    let opt_name = format!("{}.opt", session.optics().wavelength());
    write_file(out, &opt_name, |w| session.write_optical(w))?;

    let scene = session.scene();
    let index = SceneIndex {
        wavelength: session.optics().wavelength().to_string(),
        labels: scene.labels().to_vec(),
        ids: scene.ids().to_vec(),
    };
    fs::write(out.join("ids.json"), serde_json::to_string_pretty(&index)?)?;
    fs::write(
        out.join("options.toml"),
        toml::to_string_pretty(&project.simulation)?,
    )?;

    for diagnostic in session.take_diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }
    println!(
        "Wrote {} triangles ({} primitives) to {}",
        scene.len(),
        index.ids.iter().collect::<BTreeSet<_>>().len(),
        out.display()
    );
    Ok(())
}

fn write_file<F>(dir: &Path, name: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> canopy_scene::Result<()>,
{
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

fn aggregate(
    ids: &Path,
    result: &Path,
    band: Option<&str>,
    map: Option<&Path>,
    aggregate: bool,
) -> Result<()> {
    let index = SceneIndex::from_json(
        &fs::read_to_string(ids).with_context(|| format!("failed to read {}", ids.display()))?,
    )
    .with_context(|| format!("invalid scene index {}", ids.display()))?;

    let engine_output = EngineOutput::from_json(
        &fs::read_to_string(result)
            .with_context(|| format!("failed to read {}", result.display()))?,
    )?;
    // an unknown tag falls back to the first band
    let band = engine_output.band(index.band(band))?;
    let output = TriangleOutput::from_raw(&band.data)?;

    let json = match map {
        Some(map) => {
            let map: BTreeMap<String, InternalId> = serde_json::from_str(
                &fs::read_to_string(map)
                    .with_context(|| format!("failed to read {}", map.display()))?,
            )?;
            let grouped = output_by_external_id(&output, &index.ids, &map, aggregate)?;
            if grouped.is_empty() {
                log::warn!("no entry of the id map has output");
            }
            serde_json::to_string_pretty(&grouped)?
        }
        None => serde_json::to_string_pretty(&output_by_id(&output, &index.ids, aggregate)?)?,
    };
    println!("{}", json);
    Ok(())
}

fn show_info(config: &Path) -> Result<()> {
    let (project, session) = load_session(config)?;
    let scene = session.scene();

    println!("canopy project: {}", config.display());
    println!("  Triangles: {}", scene.len());
    println!(
        "  Primitives: {}",
        scene.ids().iter().collect::<BTreeSet<_>>().len()
    );
    println!("  Light sources: {}", session.sources().sources().len());
    if let Some(energy) = session.incident_energy()? {
        println!("  Qi: {}  Qem: {}", energy.qi, energy.qem);
    }
    println!("  Options: {:?}", project.simulation);
    println!("{}", session);
    Ok(())
}
