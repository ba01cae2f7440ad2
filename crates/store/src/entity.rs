//! The [`Entity`] trait binds a domain model to its backend table.
//!
//! One implementation per model; the generic [`EntityStore`] does the
//! rest. The associated `Create`/`Patch` DTO types carry the
//! `validator` checks run before any network call.
//!
//! [`EntityStore`]: crate::store::EntityStore

use impact_core::models::{
    CreateIndicator, CreateMeasurement, CreateProject, CreateProjectIndicator, CreateSdgAlignment,
    Indicator, Measurement, Project, ProjectIndicator, SdgAlignment, UpdateIndicator,
    UpdateMeasurement, UpdateProject, UpdateProjectIndicator, UpdateSdgAlignment,
};
use impact_core::types::RowId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// A domain model mirrored from one backend table.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Backend table name.
    const TABLE: &'static str;

    /// Human-readable entity name for error messages.
    const NAME: &'static str;

    /// Column holding the parent id, used by parent-scoped fetches.
    /// `None` for root entities, which reject `fetch_by_parent`.
    const PARENT_COLUMN: Option<&'static str> = None;

    /// Whether create payloads are stamped with the session's user id.
    /// Tables without a `created_by` column opt out.
    const STAMP_CREATED_BY: bool = true;

    /// Insert payload.
    type Create: Validate + Serialize + Send + Sync;

    /// Partial update payload; `None` fields are omitted from the
    /// serialized patch.
    type Patch: Validate + Serialize + Send + Sync;

    fn id(&self) -> RowId;

    /// Parent row id, for entities that belong to one.
    fn parent_id(&self) -> Option<RowId>;
}

impl Entity for Project {
    const TABLE: &'static str = "projects";
    const NAME: &'static str = "Project";

    type Create = CreateProject;
    type Patch = UpdateProject;

    fn id(&self) -> RowId {
        self.id
    }

    fn parent_id(&self) -> Option<RowId> {
        None
    }
}

impl Entity for Indicator {
    const TABLE: &'static str = "indicators";
    const NAME: &'static str = "Indicator";
    const PARENT_COLUMN: Option<&'static str> = Some("project_id");

    type Create = CreateIndicator;
    type Patch = UpdateIndicator;

    fn id(&self) -> RowId {
        self.id
    }

    fn parent_id(&self) -> Option<RowId> {
        self.project_id
    }
}

impl Entity for Measurement {
    const TABLE: &'static str = "measurements";
    const NAME: &'static str = "Measurement";
    const PARENT_COLUMN: Option<&'static str> = Some("indicator_id");

    type Create = CreateMeasurement;
    type Patch = UpdateMeasurement;

    fn id(&self) -> RowId {
        self.id
    }

    fn parent_id(&self) -> Option<RowId> {
        Some(self.indicator_id)
    }
}

impl Entity for ProjectIndicator {
    const TABLE: &'static str = "project_indicators";
    const NAME: &'static str = "ProjectIndicator";
    const PARENT_COLUMN: Option<&'static str> = Some("project_id");
    const STAMP_CREATED_BY: bool = false;

    type Create = CreateProjectIndicator;
    type Patch = UpdateProjectIndicator;

    fn id(&self) -> RowId {
        self.id
    }

    fn parent_id(&self) -> Option<RowId> {
        Some(self.project_id)
    }
}

impl Entity for SdgAlignment {
    const TABLE: &'static str = "project_sdg_alignments";
    const NAME: &'static str = "SdgAlignment";
    const PARENT_COLUMN: Option<&'static str> = Some("project_id");
    const STAMP_CREATED_BY: bool = false;

    type Create = CreateSdgAlignment;
    type Patch = UpdateSdgAlignment;

    fn id(&self) -> RowId {
        self.id
    }

    fn parent_id(&self) -> Option<RowId> {
        Some(self.project_id)
    }
}
