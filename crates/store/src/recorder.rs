//! Two-step measurement recording.
//!
//! Recording a measurement is the system's only cross-entity
//! invariant: the measurement row is inserted, then the parent
//! indicator's `current_value` is overwritten with the measured value.
//! The two writes are sequential gateway calls with no transaction and
//! no rollback — when the second step fails, the measurement is
//! already persisted, and the error carries it so callers can surface
//! the partial state honestly.

use impact_core::models::{CreateMeasurement, Indicator, Measurement, UpdateIndicator};

use crate::error::StoreError;
use crate::store::EntityStore;

/// Outcome of a failed [`MeasurementRecorder::record`] call.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The measurement insert itself failed; nothing was written.
    #[error("Failed to record measurement: {0}")]
    Measurement(#[source] StoreError),

    /// The measurement was persisted but the indicator's
    /// `current_value` was not updated.
    #[error("Measurement recorded, but updating the indicator failed: {source}")]
    IndicatorUpdate {
        /// The already-persisted measurement row.
        measurement: Measurement,
        #[source]
        source: StoreError,
    },
}

/// Records measurements and keeps the parent indicator's
/// `current_value` in step.
pub struct MeasurementRecorder {
    measurements: EntityStore<Measurement>,
    indicators: EntityStore<Indicator>,
}

impl MeasurementRecorder {
    pub fn new(
        measurements: EntityStore<Measurement>,
        indicators: EntityStore<Indicator>,
    ) -> Self {
        Self {
            measurements,
            indicators,
        }
    }

    /// Insert the measurement, then overwrite the parent indicator's
    /// `current_value` with the measured value. `start_value` and
    /// `target_value` are never touched.
    pub async fn record(&self, input: CreateMeasurement) -> Result<Measurement, RecordError> {
        let measurement = self
            .measurements
            .create(input)
            .await
            .map_err(RecordError::Measurement)?;

        let patch = UpdateIndicator::current_value(measurement.value);
        match self
            .indicators
            .update(measurement.indicator_id, patch)
            .await
        {
            Ok(indicator) => {
                tracing::debug!(
                    measurement_id = %measurement.id,
                    indicator_id = %indicator.id,
                    value = measurement.value,
                    "Measurement recorded",
                );
                Ok(measurement)
            }
            Err(source) => {
                tracing::warn!(
                    measurement_id = %measurement.id,
                    indicator_id = %measurement.indicator_id,
                    error = %source,
                    "Measurement persisted but indicator update failed",
                );
                Err(RecordError::IndicatorUpdate {
                    measurement,
                    source,
                })
            }
        }
    }
}
