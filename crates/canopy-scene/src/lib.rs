#![warn(missing_docs)]

//! Scene bookkeeping for radiative transfer simulations.
//!
//! A [`Session`] assembles a scene of labelled triangles, light sources, a
//! rectangular domain and optical properties, hands them to an external
//! [`RadiativeEngine`], and folds the per-triangle results back onto the
//! primitives the caller inserted.
//!
//! Every triangle carries a canonical [`Label`] and an [`InternalId`].
//! Triangles inserted together under the same label, or coming from the
//! same shape, share an id; outputs are aggregated by that id and can then
//! be re-keyed by the caller's own ids.
//!
//! # Example
//!
//! ```
//! use canopy_scene::{output_by_id, Grouped, PatternInput, RawTable, Session, TriangleOutput, Variable};
//!
//! let mut session = Session::new();
//! session.add_can("p 1 7 3 0 0 0 1 0 0 0 1 0\np 1 7 3 0 0 1 1 0 1 0 1 1\n")?;
//! session.set_pattern(PatternInput::Corners((0.0, 0.0), (1.0, 1.0)))?;
//! session.add_sources((1.0, (0.0, 0.0, -1.0)))?;
//!
//! // rows as an engine would report them
//! let raw = RawTable {
//!     eabs: vec![0.5, 0.5],
//!     ei_inf: vec![0.0, 0.0],
//!     ei_sup: vec![1.0, 1.0],
//!     area: vec![0.5, 0.5],
//!     label: vec!["7".into(), "7".into()],
//! };
//! let output = TriangleOutput::from_raw(&raw)?;
//! let scene = session.scene();
//! if let Grouped::Aggregated(table) = output_by_id(&output, scene.ids(), true)? {
//!     let id = scene.ids()[0];
//!     assert_eq!(table.get(Variable::Area, &id), Some(&1.0));
//! }
//! # Ok::<(), canopy_scene::SceneError>(())
//! ```

pub mod builder;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod input;
pub mod label;
pub mod optics;
pub mod output;
pub mod pattern;
pub mod session;
pub mod sources;

pub use builder::{Scene, SceneBuilder};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use engine::{
    Band, EngineError, EngineInput, EngineOutput, Periodiser, RadiativeEngine, SimulationOptions,
};
pub use error::{Result, SceneError};
pub use input::{PatternInput, SceneInput, SourceInput, ToSceneText};
pub use label::{canonicalize, InternalId, Label, LABEL_WIDTH};
pub use optics::{Optics, DEFAULT_WAVELENGTH};
pub use output::{
    aggregate, group, output_by_external_id, output_by_id, Aggregated, Grouped, PerTriangle,
    PrimitiveTable, RawTable, TriangleOutput, Variable,
};
pub use pattern::Pattern;
pub use session::{Assignment, Session};
pub use sources::{incident_energy, IncidentEnergy, SourceManager};

pub use canopy_formats::LightSource;
