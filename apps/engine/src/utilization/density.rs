//! Density targets and alignment with a reference document.

use tracing::debug;

use super::{selected_topics, ContentUtilizationService};
use crate::models::topic::selection_space;
use crate::models::{
    DensityAction, DensityActionType, DensityOptimizationResult, OrganizationStyle,
    ReferenceFormatAnalysis, SpaceConstraints, Topic, TopicSelection,
};
use crate::space::allocator::reference_density_ratio;
use crate::space::utilization_ratio;

/// Gaps at or below this are left alone.
const DENSITY_TOLERANCE: f64 = 0.1;
const PRIMARY_SHARE: f64 = 0.6;
const SECONDARY_SHARE: f64 = 0.4;

const STYLE_ADJUSTMENT: f64 = 0.05;
const MULTI_COLUMN_ADJUSTMENT: f64 = 0.05;
const MIN_TARGET: f64 = 0.70;
const MAX_TARGET: f64 = 0.95;

const COUNT_WEIGHT: f64 = 0.3;
const LENGTH_WEIGHT: f64 = 0.3;
const STYLE_WEIGHT: f64 = 0.4;

impl ContentUtilizationService {
    /// Compares the selection's fill against a target density and proposes
    /// how to close the gap.
    ///
    /// The target is `constraints.target_utilization`, or the reference's
    /// density ratio shifted by its style and layout when one is supplied.
    pub fn optimize_content_density(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        constraints: &SpaceConstraints,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> DensityOptimizationResult {
        let available = self.space().calculate_available_space(constraints);
        let current = utilization_ratio(selection_space(selection), available);
        let target = target_density(constraints, reference, available);
        let gap = target - current;

        let optimization_actions = density_actions(gap);
        let reference_alignment = match reference {
            Some(r) => self.calculate_reference_alignment(selection, all_topics, r),
            None => 1.0,
        };

        debug!(current, target, gap, reference_alignment, "density optimization");

        DensityOptimizationResult {
            current_density: current,
            target_density: target,
            density_gap: gap,
            optimization_actions,
            reference_alignment,
        }
    }

    /// `0.3·count + 0.3·length + 0.4·style`, each sub-score in [0, 1].
    ///
    /// - count: `1 − |1 − selected / reference.topic_count|`
    /// - length: `1 − |1 − avg_len / reference.average_topic_length|`
    /// - style: share of selections carrying subtopics, or its complement for
    ///   a flat reference
    ///
    /// A zero reference denominator or an empty selection zeroes the matching
    /// sub-score.
    pub fn calculate_reference_alignment(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        reference: &ReferenceFormatAnalysis,
    ) -> f64 {
        let count = if reference.topic_count == 0 {
            0.0
        } else {
            closeness(selection.len() as f64 / reference.topic_count as f64)
        };

        let topics = selected_topics(selection, all_topics);
        let length = if topics.is_empty() || reference.average_topic_length <= 0.0 {
            0.0
        } else {
            let total: usize = topics.iter().map(|(_, t)| t.content_len()).sum();
            let average = total as f64 / topics.len() as f64;
            closeness(average / reference.average_topic_length)
        };

        let style = if selection.is_empty() {
            0.0
        } else {
            let with_subtopics = selection.iter().filter(|s| !s.subtopic_ids.is_empty()).count();
            let ratio = with_subtopics as f64 / selection.len() as f64;
            match reference.organization_style {
                OrganizationStyle::Hierarchical => ratio,
                OrganizationStyle::Flat => 1.0 - ratio,
            }
        };

        COUNT_WEIGHT * count + LENGTH_WEIGHT * length + STYLE_WEIGHT * style
    }
}

/// `1 − |1 − ratio|`, clamped to [0, 1].
fn closeness(ratio: f64) -> f64 {
    (1.0 - (1.0 - ratio).abs()).clamp(0.0, 1.0)
}

fn target_density(
    constraints: &SpaceConstraints,
    reference: Option<&ReferenceFormatAnalysis>,
    available: u64,
) -> f64 {
    let Some(r) = reference else {
        return constraints.target_utilization;
    };

    let mut target =
        reference_density_ratio(Some(r), available).unwrap_or(constraints.target_utilization);
    target += match r.organization_style {
        OrganizationStyle::Hierarchical => STYLE_ADJUSTMENT,
        OrganizationStyle::Flat => -STYLE_ADJUSTMENT,
    };
    if r.is_multi_column() {
        target += MULTI_COLUMN_ADJUSTMENT;
    }
    target.clamp(MIN_TARGET, MAX_TARGET)
}

fn density_actions(gap: f64) -> Vec<DensityAction> {
    if gap.abs() <= DENSITY_TOLERANCE {
        return vec![DensityAction {
            action: DensityActionType::MaintainDensity,
            description: "Density is within 10% of the target".to_string(),
            impact: 0.0,
        }];
    }

    let pct = |share: f64| (gap.abs() * share * 100.0).round();
    if gap > 0.0 {
        vec![
            DensityAction {
                action: DensityActionType::IncreaseTopics,
                description: format!("Add topics to fill about {}% more of the page", pct(PRIMARY_SHARE)),
                impact: gap * PRIMARY_SHARE,
            },
            DensityAction {
                action: DensityActionType::IncreaseSubtopics,
                description: format!(
                    "Add subtopics to fill about {}% more of the page",
                    pct(SECONDARY_SHARE)
                ),
                impact: gap * SECONDARY_SHARE,
            },
        ]
    } else {
        vec![
            DensityAction {
                action: DensityActionType::DecreaseTopics,
                description: format!("Drop topics to free about {}% of the page", pct(PRIMARY_SHARE)),
                impact: gap * PRIMARY_SHARE,
            },
            DensityAction {
                action: DensityActionType::DecreaseSpacing,
                description: format!(
                    "Tighten spacing to free about {}% of the page",
                    pct(SECONDARY_SHARE)
                ),
                impact: gap * SECONDARY_SHARE,
            },
        ]
    }
}
