//! Lightweight per-project indicator model and DTOs.
//!
//! This is a deliberately separate type from [`Indicator`]: the backend
//! keeps a second, schema-divergent `project_indicators` table with a
//! single value and a free-text category. Keeping the two as distinct
//! entities avoids runtime field-presence probing to tell them apart.
//!
//! [`Indicator`]: crate::models::Indicator

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RowId, Timestamp};

/// A row from the `project_indicators` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIndicator {
    pub id: RowId,
    pub project_id: RowId,
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Free-text category, not the [`ProjectCategory`] enum.
    ///
    /// [`ProjectCategory`]: crate::models::ProjectCategory
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lightweight project indicator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectIndicator {
    pub project_id: RowId,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub category: String,
}

/// DTO for updating a lightweight project indicator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProjectIndicator {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
