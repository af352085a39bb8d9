//! Sitereport turns a snapshot of field inspection records into a shareable
//! PDF report.
//!
//! The pipeline has three stages:
//!
//! - [`compose_plan`] overlays numbered priority pins onto floor-plan rasters
//!   at their native resolution,
//! - the layout engine measures wrapped text and photo grids ahead of
//!   placement so finding blocks are never split across pages,
//! - [`export_report`] assembles cover, map, and detail pages into a single
//!   artifact, guarded against concurrent runs by an [`ExportGate`].
#![forbid(unsafe_code)]

pub mod foundation;
pub mod layout;
pub mod model;
pub mod render;
pub mod report;
pub mod session;

pub use crate::foundation::error::{ReportError, ReportResult};
pub use crate::foundation::style::{PriorityPalette, ReportStyle, Rgba};

pub use crate::model::project::{FloorPlan, Observation, PinCoord, Priority, Project, Weather};
pub use crate::model::snapshot::{NumberedObservation, ProjectSnapshot};

pub use crate::render::mapper::map_pin;
pub use crate::render::plan::{ComposedPlan, compose_plan};

pub use crate::report::assembler::{ReportArtifact, assemble_report};
pub use crate::session::export::{ExportGate, ExportOutcome, export_report};
