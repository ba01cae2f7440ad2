//! Caller-side validation helpers.
//!
//! DTOs validate before any network call; a failed check surfaces as
//! [`CoreError::Validation`] and the gateway is never touched.

use validator::{Validate, ValidationError};

use crate::error::CoreError;

/// Lowest valid SDG goal number.
pub const SDG_MIN: i16 = 1;
/// Highest valid SDG goal number (there are 17 goals).
pub const SDG_MAX: i16 = 17;

/// Custom `validator` function for SDG goal lists.
///
/// Every entry must be within 1-17. An empty list is valid — not every
/// project or indicator claims SDG alignment.
pub fn validate_sdg_goals(goals: &[i16]) -> Result<(), ValidationError> {
    for &goal in goals {
        if !(SDG_MIN..=SDG_MAX).contains(&goal) {
            let mut err = ValidationError::new("sdg_goal_out_of_range");
            err.message = Some(format!("SDG goal {goal} is outside 1-17").into());
            return Err(err);
        }
    }
    Ok(())
}

/// Run a DTO's `validator` checks, flattening failures into a single
/// human-readable [`CoreError::Validation`] message.
pub fn ensure_valid<T: Validate>(value: &T) -> Result<(), CoreError> {
    value.validate().map_err(|errors| {
        let mut parts: Vec<String> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                match &err.message {
                    Some(msg) => parts.push(format!("{field}: {msg}")),
                    None => parts.push(format!("{field}: {}", err.code)),
                }
            }
        }
        parts.sort();
        CoreError::Validation(parts.join("; "))
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{CreateProject, CreateSdgAlignment, ProjectCategory, ProjectStatus};
    use crate::models::ContributionLevel;

    fn valid_project() -> CreateProject {
        CreateProject {
            name: "Reforestation pilot".into(),
            description: None,
            category: ProjectCategory::Environmental,
            status: ProjectStatus::Planning,
            budget: 50_000.0,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
            sdg_goals: vec![13, 15],
        }
    }

    #[test]
    fn valid_project_passes() {
        assert!(ensure_valid(&valid_project()).is_ok());
    }

    #[test]
    fn sdg_goal_zero_is_rejected() {
        let mut input = valid_project();
        input.sdg_goals = vec![0];
        let err = ensure_valid(&input).unwrap_err();
        assert!(err.to_string().contains("outside 1-17"), "{err}");
    }

    #[test]
    fn sdg_goal_eighteen_is_rejected() {
        let mut input = valid_project();
        input.sdg_goals = vec![13, 18];
        assert!(ensure_valid(&input).is_err());
    }

    #[test]
    fn empty_sdg_list_is_valid() {
        let mut input = valid_project();
        input.sdg_goals = vec![];
        assert!(ensure_valid(&input).is_ok());
    }

    #[test]
    fn negative_budget_is_rejected() {
        let mut input = valid_project();
        input.budget = -1.0;
        let err = ensure_valid(&input).unwrap_err();
        assert!(err.to_string().contains("budget"), "{err}");
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut input = valid_project();
        input.name.clear();
        assert!(ensure_valid(&input).is_err());
    }

    #[test]
    fn alignment_sdg_number_range_is_enforced() {
        let input = CreateSdgAlignment {
            project_id: uuid::Uuid::new_v4(),
            sdg_number: 18,
            contribution_level: ContributionLevel::Direct,
            description: None,
        };
        assert!(ensure_valid(&input).is_err());
    }
}
