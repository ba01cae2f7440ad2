//! Aggregate SDG alignment scoring.
//!
//! Dashboards show how a portfolio of projects covers the 17 SDGs.
//! The rollup here weighs direct contributions higher than indirect
//! ones and reports coverage as the share of distinct goals touched.

use std::collections::BTreeMap;

use crate::models::{ContributionLevel, SdgAlignment};

/// Weight of a direct contribution toward a goal's score.
pub const DIRECT_WEIGHT: f64 = 1.0;
/// Weight of an indirect contribution toward a goal's score.
pub const INDIRECT_WEIGHT: f64 = 0.5;
/// Number of Sustainable Development Goals.
pub const SDG_GOAL_COUNT: usize = 17;

/// Alignment rollup for one SDG.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GoalAlignment {
    pub sdg_number: i16,
    pub direct: usize,
    pub indirect: usize,
    /// `direct * 1.0 + indirect * 0.5`.
    pub score: f64,
}

/// Portfolio-wide alignment summary.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlignmentSummary {
    /// Per-goal rollups, ordered by SDG number. Goals with no entries
    /// are omitted.
    pub goals: Vec<GoalAlignment>,
    /// Sum of all per-goal scores.
    pub total_score: f64,
    /// Distinct goals touched, as a percentage of all 17.
    pub coverage_percent: f64,
}

/// Fold a list of alignment rows into a portfolio summary.
pub fn alignment_summary(alignments: &[SdgAlignment]) -> AlignmentSummary {
    let mut per_goal: BTreeMap<i16, (usize, usize)> = BTreeMap::new();
    for alignment in alignments {
        let entry = per_goal.entry(alignment.sdg_number).or_insert((0, 0));
        match alignment.contribution_level {
            ContributionLevel::Direct => entry.0 += 1,
            ContributionLevel::Indirect => entry.1 += 1,
        }
    }

    let goals: Vec<GoalAlignment> = per_goal
        .into_iter()
        .map(|(sdg_number, (direct, indirect))| GoalAlignment {
            sdg_number,
            direct,
            indirect,
            score: direct as f64 * DIRECT_WEIGHT + indirect as f64 * INDIRECT_WEIGHT,
        })
        .collect();

    let total_score = goals.iter().map(|g| g.score).sum();
    let coverage_percent = (goals.len() as f64 / SDG_GOAL_COUNT as f64) * 100.0;

    AlignmentSummary {
        goals,
        total_score,
        coverage_percent,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::RowId;

    fn alignment(sdg_number: i16, level: ContributionLevel) -> SdgAlignment {
        SdgAlignment {
            id: RowId::new_v4(),
            project_id: RowId::new_v4(),
            sdg_number,
            contribution_level: level,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_portfolio_has_zero_coverage() {
        let summary = alignment_summary(&[]);
        assert!(summary.goals.is_empty());
        assert_eq!(summary.total_score, 0.0);
        assert_eq!(summary.coverage_percent, 0.0);
    }

    #[test]
    fn direct_outweighs_indirect() {
        let rows = vec![
            alignment(13, ContributionLevel::Direct),
            alignment(13, ContributionLevel::Indirect),
            alignment(5, ContributionLevel::Indirect),
        ];

        let summary = alignment_summary(&rows);
        assert_eq!(summary.goals.len(), 2);

        // Ordered by SDG number.
        assert_eq!(summary.goals[0].sdg_number, 5);
        assert_eq!(summary.goals[0].score, 0.5);
        assert_eq!(summary.goals[1].sdg_number, 13);
        assert_eq!(summary.goals[1].direct, 1);
        assert_eq!(summary.goals[1].indirect, 1);
        assert_eq!(summary.goals[1].score, 1.5);

        assert_eq!(summary.total_score, 2.0);
    }

    #[test]
    fn coverage_counts_distinct_goals() {
        let rows = vec![
            alignment(1, ContributionLevel::Direct),
            alignment(1, ContributionLevel::Direct),
            alignment(2, ContributionLevel::Direct),
        ];

        let summary = alignment_summary(&rows);
        let expected = (2.0 / 17.0) * 100.0;
        assert!((summary.coverage_percent - expected).abs() < 1e-9);
    }
}
