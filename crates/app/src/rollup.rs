//! Periodic portfolio rollups, logged for operators.
//!
//! Everything here reads the already-cached store state; a report
//! never touches the network.

use impact_core::alignment;
use impact_core::metrics;
use impact_core::models::{Indicator, Measurement, Project, ProjectIndicator, SdgAlignment};
use impact_store::EntityStore;

/// Log one portfolio snapshot from the cached store state.
pub async fn report(
    projects: &EntityStore<Project>,
    indicators: &EntityStore<Indicator>,
    measurements: &EntityStore<Measurement>,
    links: &EntityStore<ProjectIndicator>,
    alignments: &EntityStore<SdgAlignment>,
) {
    let projects = projects.rows().await;
    let indicators = indicators.rows().await;
    let measurement_count = measurements.rows().await.len();
    let link_count = links.rows().await.len();
    let alignments = alignments.rows().await;

    for row in metrics::budget_by_category(&projects) {
        tracing::debug!(
            category = row.category.label(),
            total_budget = row.total_budget,
            project_count = row.project_count,
            "Budget by category",
        );
    }
    for row in metrics::status_counts(&projects) {
        tracing::debug!(status = row.status.label(), count = row.count, "Status count");
    }
    for row in metrics::indicator_progress(&indicators) {
        tracing::debug!(
            indicator_id = %row.indicator_id,
            name = %row.name,
            percent = row.percent,
            "Indicator progress",
        );
    }

    let summary = alignment::alignment_summary(&alignments);
    tracing::info!(
        projects = projects.len(),
        indicators = indicators.len(),
        measurements = measurement_count,
        indicator_links = link_count,
        sdg_total_score = summary.total_score,
        sdg_coverage_percent = summary.coverage_percent,
        "Portfolio rollup",
    );
}
