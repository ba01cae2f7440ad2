//! Indicator (KPI) entity model and DTOs.
//!
//! An indicator tracks a single metric from `start_value` toward
//! `target_value`. Its `current_value` is never edited directly by
//! users — it is overwritten when a measurement is recorded.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RowId, Timestamp};

/// Whether the indicator tracks a number or a scored qualitative scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Quantitative,
    Qualitative,
}

/// How often the indicator is expected to be measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

/// An indicator row from the `indicators` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: RowId,
    /// Owning project, if any. Unattached indicators are allowed.
    pub project_id: Option<RowId>,
    pub name: String,
    pub kind: IndicatorKind,
    /// Unit of measure, e.g. `"tonnes CO2"` or `"people reached"`.
    pub unit: String,
    pub start_value: f64,
    /// Latest measured value. Overwritten by the measurement recorder.
    pub current_value: f64,
    pub target_value: f64,
    pub sdg_goals: Vec<i16>,
    pub frequency: Frequency,
    pub created_by: RowId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new indicator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIndicator {
    pub project_id: Option<RowId>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub kind: IndicatorKind,
    pub unit: String,
    pub start_value: f64,
    /// Initial current value; usually equal to `start_value`.
    pub current_value: f64,
    pub target_value: f64,
    #[validate(custom(function = crate::validation::validate_sdg_goals))]
    pub sdg_goals: Vec<i16>,
    pub frequency: Frequency,
}

/// DTO for updating an existing indicator. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateIndicator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<RowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<IndicatorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = crate::validation::validate_sdg_goals))]
    pub sdg_goals: Option<Vec<i16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

impl UpdateIndicator {
    /// Patch that overwrites only `current_value`, used by the
    /// measurement recorder.
    pub fn current_value(value: f64) -> Self {
        Self {
            current_value: Some(value),
            ..Self::default()
        }
    }
}
