//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RowId, Timestamp};

/// Thematic category of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCategory {
    Environmental,
    Social,
    Governance,
}

impl ProjectCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Environmental => "Environmental",
            Self::Social => "Social",
            Self::Governance => "Governance",
        }
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// A project row from the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: RowId,
    pub name: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub status: ProjectStatus,
    /// Total budget in the organisation's reporting currency.
    pub budget: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// SDG goal numbers (1-17) this project contributes to.
    pub sdg_goals: Vec<i16>,
    /// User that created the row; stamped by the store from the session.
    pub created_by: RowId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
///
/// `created_by`, id, and timestamps are stamped server-side / by the
/// store; callers never supply them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub status: ProjectStatus,
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[validate(custom(function = crate::validation::validate_sdg_goals))]
    pub sdg_goals: Vec<i16>,
}

/// DTO for updating an existing project. All fields are optional;
/// `None` fields are omitted from the patch entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProjectCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = crate::validation::validate_sdg_goals))]
    pub sdg_goals: Option<Vec<i16>>,
}
