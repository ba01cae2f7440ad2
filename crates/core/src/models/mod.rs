//! Entity models mirrored from the hosted backend's tables.
//!
//! Each module defines the row struct plus its `CreateX` / `UpdateX`
//! DTOs. Rows carry server-assigned ids and timestamps; the DTOs carry
//! `validator` annotations checked before any network call.

pub mod indicator;
pub mod measurement;
pub mod project;
pub mod project_indicator;
pub mod sdg_alignment;

pub use indicator::{CreateIndicator, Frequency, Indicator, IndicatorKind, UpdateIndicator};
pub use measurement::{CreateMeasurement, Measurement, UpdateMeasurement};
pub use project::{CreateProject, Project, ProjectCategory, ProjectStatus, UpdateProject};
pub use project_indicator::{CreateProjectIndicator, ProjectIndicator, UpdateProjectIndicator};
pub use sdg_alignment::{ContributionLevel, CreateSdgAlignment, SdgAlignment, UpdateSdgAlignment};
