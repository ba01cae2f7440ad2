//! Chart-ready rollups computed over in-memory entity lists.
//!
//! Everything here is pure and synchronous: callers hand in the current
//! list snapshot and get back plain rows for rendering. Nothing is
//! memoized — recomputing on every refresh is cheap at dashboard sizes.

use std::collections::BTreeMap;

use crate::models::{Indicator, Project, ProjectCategory, ProjectStatus};
use crate::types::RowId;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Percentage progress of `current` from `start` toward `target`,
/// clamped to `[0, 100]`.
///
/// When `target == start` there is nothing left to move, so the result
/// is defined as `100.0` (this also avoids dividing by zero).
pub fn progress_percent(start: f64, current: f64, target: f64) -> f64 {
    if target == start {
        return 100.0;
    }
    let raw = ((current - start) / (target - start)) * 100.0;
    raw.clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Rollup rows
// ---------------------------------------------------------------------------

/// Budget total for one project category.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CategoryBudget {
    pub category: ProjectCategory,
    pub total_budget: f64,
    pub project_count: usize,
}

/// Project count for one lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatusCount {
    pub status: ProjectStatus,
    pub count: usize,
}

/// Progress row for one indicator.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IndicatorProgress {
    pub indicator_id: RowId,
    pub name: String,
    pub percent: f64,
}

// ---------------------------------------------------------------------------
// Rollup functions
// ---------------------------------------------------------------------------

/// Sum project budgets grouped by category.
///
/// Categories with no projects are omitted; output is ordered by the
/// category's enum order for stable chart legends.
pub fn budget_by_category(projects: &[Project]) -> Vec<CategoryBudget> {
    let mut totals: BTreeMap<ProjectCategory, (f64, usize)> = BTreeMap::new();
    for project in projects {
        let entry = totals.entry(project.category).or_insert((0.0, 0));
        entry.0 += project.budget;
        entry.1 += 1;
    }
    totals
        .into_iter()
        .map(|(category, (total_budget, project_count))| CategoryBudget {
            category,
            total_budget,
            project_count,
        })
        .collect()
}

/// Count projects per lifecycle status, in enum order.
pub fn status_counts(projects: &[Project]) -> Vec<StatusCount> {
    let mut counts: BTreeMap<ProjectStatus, usize> = BTreeMap::new();
    for project in projects {
        *counts.entry(project.status).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// Per-indicator progress rows, in input order.
pub fn indicator_progress(indicators: &[Indicator]) -> Vec<IndicatorProgress> {
    indicators
        .iter()
        .map(|indicator| IndicatorProgress {
            indicator_id: indicator.id,
            name: indicator.name.clone(),
            percent: progress_percent(
                indicator.start_value,
                indicator.current_value,
                indicator.target_value,
            ),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
