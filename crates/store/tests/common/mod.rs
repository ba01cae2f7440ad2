//! Shared fixtures for the store integration tests.
//!
//! Everything runs against [`MemoryGateway`] / [`MemoryAuth`] — no
//! network, no hosted backend.

use std::sync::Arc;

use chrono::NaiveDate;
use impact_core::models::{
    CreateIndicator, CreateMeasurement, CreateProject, Frequency, Indicator, IndicatorKind,
    Measurement, Project, ProjectCategory, ProjectStatus,
};
use impact_core::types::RowId;
use impact_gateway::{MemoryAuth, MemoryGateway};
use impact_store::EntityStore;

/// A gateway/auth pair plus typed stores over them.
pub struct Fixture {
    pub gateway: Arc<MemoryGateway>,
    pub auth: Arc<MemoryAuth>,
    pub projects: EntityStore<Project>,
    pub indicators: EntityStore<Indicator>,
    pub measurements: EntityStore<Measurement>,
}

/// Fixture with an authenticated session.
pub fn logged_in() -> Fixture {
    build(Arc::new(MemoryAuth::logged_in(RowId::new_v4())))
}

/// Fixture with no session; writes must fail with AuthRequired.
pub fn anonymous() -> Fixture {
    build(Arc::new(MemoryAuth::anonymous()))
}

fn build(auth: Arc<MemoryAuth>) -> Fixture {
    let gateway = Arc::new(MemoryGateway::new());
    let data: Arc<dyn impact_gateway::DataGateway> = gateway.clone();
    let auth_dyn: Arc<dyn impact_gateway::AuthProvider> = auth.clone();

    Fixture {
        projects: EntityStore::new(data.clone(), auth_dyn.clone()),
        indicators: EntityStore::new(data.clone(), auth_dyn.clone()),
        measurements: EntityStore::new(data, auth_dyn),
        gateway,
        auth,
    }
}

/// A valid project payload.
pub fn create_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.into(),
        description: None,
        category: ProjectCategory::Environmental,
        status: ProjectStatus::Active,
        budget: 10_000.0,
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: None,
        sdg_goals: vec![13],
    }
}

/// A valid indicator payload attached to no project.
pub fn create_indicator(name: &str, start: f64, current: f64, target: f64) -> CreateIndicator {
    CreateIndicator {
        project_id: None,
        name: name.into(),
        kind: IndicatorKind::Quantitative,
        unit: "units".into(),
        start_value: start,
        current_value: current,
        target_value: target,
        sdg_goals: vec![],
        frequency: Frequency::Monthly,
    }
}

/// A measurement payload for one indicator.
pub fn create_measurement(indicator_id: RowId, value: f64) -> CreateMeasurement {
    CreateMeasurement {
        indicator_id,
        measured_on: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        value,
        notes: None,
    }
}
