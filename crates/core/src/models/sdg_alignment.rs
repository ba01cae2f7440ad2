//! SDG alignment entity model and DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RowId, Timestamp};

/// How directly a project contributes to an SDG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionLevel {
    Direct,
    Indirect,
}

/// A row from the `project_sdg_alignments` table: one project's claimed
/// contribution to one SDG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdgAlignment {
    pub id: RowId,
    pub project_id: RowId,
    /// SDG goal number, 1-17.
    pub sdg_number: i16,
    pub contribution_level: ContributionLevel,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an SDG alignment entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSdgAlignment {
    pub project_id: RowId,
    #[validate(range(min = 1, max = 17, message = "sdg_number must be between 1 and 17"))]
    pub sdg_number: i16,
    pub contribution_level: ContributionLevel,
    pub description: Option<String>,
}

/// DTO for updating an SDG alignment entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSdgAlignment {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 17, message = "sdg_number must be between 1 and 17"))]
    pub sdg_number: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contribution_level: Option<ContributionLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
