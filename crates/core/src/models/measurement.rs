//! Measurement entity model and DTOs.
//!
//! Measurements are append-only observations against an indicator.
//! Recording one also overwrites the parent indicator's
//! `current_value` (see the store crate's measurement recorder).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RowId, Timestamp};

/// A measurement row from the `measurements` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub id: RowId,
    pub indicator_id: RowId,
    /// Date the observation was taken (not when it was entered).
    pub measured_on: NaiveDate,
    pub value: f64,
    pub notes: Option<String>,
    pub created_by: RowId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a new measurement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMeasurement {
    pub indicator_id: RowId,
    pub measured_on: NaiveDate,
    pub value: f64,
    pub notes: Option<String>,
}

/// DTO for amending a measurement. Rows are append-only; only the
/// free-text notes may be corrected after the fact.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMeasurement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
