//! Utilization analysis: classification plus user-facing recommendations.
//!
//! # Recommendation rules
//! - utilization < underfill (70%)               → `add_content` (high)
//! - underfill ≤ utilization < expand (70–85%)   → `expand_existing` (medium)
//! - utilization > overflow (95%)                → `reduce_content` (high)
//! - reference supplied and alignment < 0.7      → `redistribute` (medium)
//!
//! At most one recommendation per kind, ordered high → medium → low.

use tracing::info;

use super::{percent, selected_topics, ContentUtilizationService};
use crate::models::topic::selection_space;
use crate::models::{
    ContentUtilizationAnalysis, ContentUtilizationRecommendation, Priority, RecommendationType,
    ReferenceFormatAnalysis, SpaceConstraints, Topic, TopicSelection, UtilizationState,
};
use crate::space::{signed_units, utilization_ratio};

const MAX_ADD_TARGETS: usize = 3;
const MAX_EXPAND_TARGETS: usize = 2;
const MIN_REFERENCE_ALIGNMENT: f64 = 0.7;

impl ContentUtilizationService {
    pub fn analyze_content_utilization(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        constraints: &SpaceConstraints,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> ContentUtilizationAnalysis {
        let available = self.space().calculate_available_space(constraints);
        let used = selection_space(selection);
        let utilization = utilization_ratio(used, available);
        let thresholds = *self.thresholds();
        let state = thresholds.classify(utilization);

        let density_optimization =
            self.optimize_content_density(selection, all_topics, constraints, reference);

        let mut recommendations = Vec::new();

        if utilization < thresholds.underfill {
            recommendations.push(self.add_content_recommendation(
                selection, all_topics, used, available, utilization, reference,
            ));
        } else if utilization < thresholds.expand {
            let target = (available as f64 * thresholds.expand).floor() as u64;
            recommendations.push(expand_existing_recommendation(
                selection,
                all_topics,
                target.saturating_sub(used),
                utilization,
            ));
        } else if utilization > thresholds.overflow {
            let ceiling = (available as f64 * thresholds.overflow).floor() as u64;
            recommendations.push(self.reduce_content_recommendation(
                selection,
                all_topics,
                used.saturating_sub(ceiling),
                utilization,
                reference,
            ));
        }

        if reference.is_some() && density_optimization.reference_alignment < MIN_REFERENCE_ALIGNMENT {
            recommendations.push(ContentUtilizationRecommendation {
                kind: RecommendationType::Redistribute,
                priority: Priority::Medium,
                description: format!(
                    "Selection matches the reference layout at {}%; rebalance topic count, length or subtopic use",
                    percent(density_optimization.reference_alignment)
                ),
                target_ids: selection.iter().map(|s| s.topic_id.clone()).collect(),
                space_impact: 0,
                actionable: !selection.is_empty(),
            });
        }

        recommendations.sort_by_key(|r| r.priority.rank());

        info!(
            used,
            available,
            utilization_pct = percent(utilization),
            state = ?state,
            recommendations = recommendations.len(),
            "analyzed content utilization"
        );

        ContentUtilizationAnalysis {
            utilization_percentage: utilization,
            state,
            empty_space_detected: state == UtilizationState::Underfilled,
            overflow_detected: state == UtilizationState::Overflowing,
            recommendations,
            density_optimization,
        }
    }

    fn add_content_recommendation(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        used: u64,
        available: u64,
        utilization: f64,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> ContentUtilizationRecommendation {
        let remaining = available.saturating_sub(used);
        let target_ids: Vec<String> = self
            .detect_empty_space_and_suggest_content(selection, all_topics, available, reference)
            .into_iter()
            .take(MAX_ADD_TARGETS)
            .map(|s| s.target_id)
            .collect();

        ContentUtilizationRecommendation {
            kind: RecommendationType::AddContent,
            priority: Priority::High,
            description: format!(
                "Only {}% of the space is used; {} units are free for additional content",
                percent(utilization),
                remaining
            ),
            actionable: !target_ids.is_empty(),
            target_ids,
            space_impact: signed_units(remaining),
        }
    }

    fn reduce_content_recommendation(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        overflow: u64,
        utilization: f64,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> ContentUtilizationRecommendation {
        let best = self
            .create_content_reduction_strategy(selection, all_topics, overflow, reference)
            .into_iter()
            .next();

        let (target_ids, recovered, how) = match best {
            Some(s) => (s.target_ids, s.space_recovered, s.description),
            None => (Vec::new(), 0, "No low-impact reduction is available".to_string()),
        };

        ContentUtilizationRecommendation {
            kind: RecommendationType::ReduceContent,
            priority: Priority::High,
            description: format!(
                "Content fills {}% of the space and overflows by {} units. {}",
                percent(utilization),
                overflow,
                how
            ),
            actionable: !target_ids.is_empty(),
            target_ids,
            space_impact: -signed_units(recovered),
        }
    }
}

fn expand_existing_recommendation(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    headroom: u64,
    utilization: f64,
) -> ContentUtilizationRecommendation {
    let mut topics = selected_topics(selection, all_topics);
    topics.sort_by_key(|(sel, _)| sel.priority.rank());
    let target_ids: Vec<String> = topics
        .into_iter()
        .take(MAX_EXPAND_TARGETS)
        .map(|(sel, _)| sel.topic_id.clone())
        .collect();

    ContentUtilizationRecommendation {
        kind: RecommendationType::ExpandExisting,
        priority: Priority::Medium,
        description: format!(
            "Space is {}% used; expand existing topics by about {} units",
            percent(utilization),
            headroom
        ),
        actionable: !target_ids.is_empty(),
        target_ids,
        space_impact: signed_units(headroom),
    }
}
