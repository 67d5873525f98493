//! Content reduction strategies for overflowing selections.
//!
//! Four strategies are computed independently and all returned when they apply,
//! ranked by how much content they preserve:
//!
//! | strategy           | preservation | applies when                                      |
//! |--------------------|--------------|---------------------------------------------------|
//! | `remove_topics`    | 0.90         | selected low topics cover ≥ 80% of the overflow   |
//! | `remove_subtopics` | 0.85         | any selected low subtopic exists                  |
//! | `merge_similar`    | 0.80         | two selected non-high topics have mergeable titles |
//! | `condense_content` | 0.75         | a non-high topic has condensation potential > 0.2 |

use std::cmp::Ordering;

use tracing::debug;

use super::{selected_topics, ContentUtilizationService};
use crate::models::{
    ContentImpact, ContentReductionStrategy, Priority, ReductionType, ReferenceFormatAnalysis,
    Topic, TopicSelection,
};
use crate::similarity::titles_mergeable;

const REMOVE_TOPICS_PRESERVATION: f64 = 0.9;
const REMOVE_SUBTOPICS_PRESERVATION: f64 = 0.85;
const MERGE_PRESERVATION: f64 = 0.8;
const CONDENSE_PRESERVATION: f64 = 0.75;

/// Low topics must cover this share of the overflow to be worth removing.
const REMOVE_TOPICS_COVERAGE: f64 = 0.8;
/// Share of the overflow a merge is assumed to recover.
const MERGE_RECOVERY: f64 = 0.3;

const MIN_CONDENSATION_POTENTIAL: f64 = 0.2;
const MAX_CONDENSATION_POTENTIAL: f64 = 0.8;

impl ContentUtilizationService {
    /// Builds every applicable reduction strategy for `overflow_amount` units,
    /// highest `preservation_score` first. Target ids always come from `selection`.
    pub fn create_content_reduction_strategy(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        overflow_amount: u64,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> Vec<ContentReductionStrategy> {
        if overflow_amount == 0 || selection.is_empty() {
            return Vec::new();
        }

        let mut strategies: Vec<ContentReductionStrategy> = [
            remove_topics_strategy(selection, overflow_amount),
            remove_subtopics_strategy(selection, all_topics, overflow_amount, reference),
            condense_strategy(selection, all_topics),
            merge_strategy(selection, all_topics, overflow_amount),
        ]
        .into_iter()
        .flatten()
        .collect();

        strategies.sort_by(|a, b| {
            b.preservation_score
                .partial_cmp(&a.preservation_score)
                .unwrap_or(Ordering::Equal)
        });
        debug!(
            overflow_amount,
            count = strategies.len(),
            "built content reduction strategies"
        );
        strategies
    }

    /// Heuristic 0–0.8 estimate of how far a topic can shrink without major loss.
    ///
    /// +0.3 content over 500 chars, +0.2 more than 3 subtopics, +0.2 confidence
    /// under 0.7, +0.3 low priority (+0.1 medium).
    pub fn condensation_potential(&self, topic: &Topic) -> f64 {
        condensation_potential(topic)
    }

    /// Ids of non-high topics that share mergeable titles with another one, in input order.
    pub fn find_mergeable_topics(&self, topics: &[Topic]) -> Vec<String> {
        let candidates: Vec<&Topic> = topics
            .iter()
            .filter(|t| t.priority != Priority::High)
            .collect();
        mergeable_ids(&candidates)
    }
}

pub fn condensation_potential(topic: &Topic) -> f64 {
    let mut potential = 0.0;
    if topic.content_len() > 500 {
        potential += 0.3;
    }
    if topic.subtopics.len() > 3 {
        potential += 0.2;
    }
    if topic.confidence_score() < 0.7 {
        potential += 0.2;
    }
    potential += match topic.priority {
        Priority::Low => 0.3,
        Priority::Medium => 0.1,
        Priority::High => 0.0,
    };
    f64::min(potential, MAX_CONDENSATION_POTENTIAL)
}

fn mergeable_ids(topics: &[&Topic]) -> Vec<String> {
    let mut flagged = vec![false; topics.len()];
    for i in 0..topics.len() {
        for j in (i + 1)..topics.len() {
            if titles_mergeable(&topics[i].title, &topics[j].title) {
                flagged[i] = true;
                flagged[j] = true;
            }
        }
    }
    topics
        .iter()
        .zip(flagged)
        .filter(|(_, hit)| *hit)
        .map(|(t, _)| t.id.clone())
        .collect()
}

/// Share of the selection a strategy touches, mapped to an impact tier.
fn impact_for(touched: usize, total: usize) -> ContentImpact {
    let share = touched as f64 / total.max(1) as f64;
    if share < 0.25 {
        ContentImpact::Minimal
    } else if share < 0.5 {
        ContentImpact::Moderate
    } else {
        ContentImpact::Significant
    }
}

fn remove_topics_strategy(
    selection: &[TopicSelection],
    overflow: u64,
) -> Option<ContentReductionStrategy> {
    let low: Vec<&TopicSelection> = selection
        .iter()
        .filter(|s| s.priority == Priority::Low)
        .collect();
    let recovered = low.iter().fold(0u64, |acc, s| acc.saturating_add(s.estimated_space));

    if low.is_empty() || (recovered as f64) < overflow as f64 * REMOVE_TOPICS_COVERAGE {
        return None;
    }

    Some(ContentReductionStrategy {
        reduction_type: ReductionType::RemoveTopics,
        target_ids: low.iter().map(|s| s.topic_id.clone()).collect(),
        space_recovered: recovered,
        content_impact: impact_for(low.len(), selection.len()),
        preservation_score: REMOVE_TOPICS_PRESERVATION,
        description: format!(
            "Remove {} low-priority topic(s) to recover {} units",
            low.len(),
            recovered
        ),
    })
}

fn remove_subtopics_strategy(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    overflow: u64,
    reference: Option<&ReferenceFormatAnalysis>,
) -> Option<ContentReductionStrategy> {
    let mut target_ids = Vec::new();
    let mut recovered = 0u64;

    'outer: for (sel, topic) in selected_topics(selection, all_topics) {
        for sub in sel.subtopic_ids.iter().filter_map(|id| topic.subtopic(id)) {
            if recovered >= overflow {
                break 'outer;
            }
            if sub.priority == Priority::Low {
                recovered = recovered.saturating_add(sub.estimated_space);
                target_ids.push(sub.id.clone());
            }
        }
    }

    if target_ids.is_empty() {
        return None;
    }

    // Subtopics carry the structure a hierarchical reference is built around.
    let content_impact = match reference {
        Some(r) if r.is_hierarchical() => ContentImpact::Moderate,
        _ => ContentImpact::Minimal,
    };

    Some(ContentReductionStrategy {
        reduction_type: ReductionType::RemoveSubtopics,
        description: format!(
            "Remove {} low-priority subtopic(s) to recover {} units",
            target_ids.len(),
            recovered
        ),
        target_ids,
        space_recovered: recovered,
        content_impact,
        preservation_score: REMOVE_SUBTOPICS_PRESERVATION,
    })
}

fn condense_strategy(
    selection: &[TopicSelection],
    all_topics: &[Topic],
) -> Option<ContentReductionStrategy> {
    let mut candidates: Vec<(&TopicSelection, f64)> = selected_topics(selection, all_topics)
        .into_iter()
        .filter(|(_, t)| t.priority != Priority::High)
        .map(|(sel, t)| (sel, condensation_potential(t)))
        .filter(|(_, p)| *p > MIN_CONDENSATION_POTENTIAL)
        .collect();

    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let recovered = candidates
        .iter()
        .map(|(sel, p)| (sel.estimated_space as f64 * p).floor() as u64)
        .fold(0u64, u64::saturating_add);

    Some(ContentReductionStrategy {
        reduction_type: ReductionType::CondenseContent,
        target_ids: candidates.iter().map(|(s, _)| s.topic_id.clone()).collect(),
        space_recovered: recovered,
        content_impact: ContentImpact::Moderate,
        preservation_score: CONDENSE_PRESERVATION,
        description: format!(
            "Condense {} topic(s) to recover about {} units",
            candidates.len(),
            recovered
        ),
    })
}

fn merge_strategy(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    overflow: u64,
) -> Option<ContentReductionStrategy> {
    let candidates: Vec<&Topic> = selected_topics(selection, all_topics)
        .into_iter()
        .filter(|(_, t)| t.priority != Priority::High)
        .map(|(_, t)| t)
        .collect();
    let target_ids = mergeable_ids(&candidates);

    if target_ids.is_empty() {
        return None;
    }

    let recovered = (overflow as f64 * MERGE_RECOVERY).floor() as u64;
    Some(ContentReductionStrategy {
        reduction_type: ReductionType::MergeSimilar,
        description: format!(
            "Merge {} overlapping topic(s) to recover about {} units",
            target_ids.len(),
            recovered
        ),
        target_ids,
        space_recovered: recovered,
        content_impact: ContentImpact::Moderate,
        preservation_score: MERGE_PRESERVATION,
    })
}
