//! Low-level space suggestions for an existing selection.
//!
//! # Rules
//! - utilization < 70%     → add up to 3 best-fitting topics, then up to 2 subtopics per selected topic
//! - 70% ≤ utilization < 85% → expand up to 2 selected topics
//! - utilization > 95%     → remove low-priority topics, else low-priority subtopics
//!
//! Suggestions come out in generation order (best candidates first) and are
//! capped at `max_suggestions`.

use std::cmp::{Ordering, Reverse};

use super::{signed_units, utilization_ratio, SpaceCalculationService};
use crate::models::topic::{find_topic, selection_space};
use crate::models::{
    Priority, SpaceSuggestion, SpaceUtilizationInfo, SuggestionType, Topic, TopicSelection,
};

const MAX_TOPIC_ADDITIONS: usize = 3;
const MAX_SUBTOPIC_ADDITIONS_PER_TOPIC: usize = 2;
const MAX_EXPANSIONS: usize = 2;

impl SpaceCalculationService {
    /// Suggests how to move `selection` toward the target fill band.
    pub fn generate_space_suggestions(
        &self,
        selection: &[TopicSelection],
        available_space: u64,
        all_topics: &[Topic],
    ) -> Vec<SpaceSuggestion> {
        let used = selection_space(selection);
        let utilization = utilization_ratio(used, available_space);
        let thresholds = self.thresholds();

        let mut suggestions = if utilization < thresholds.underfill {
            addition_suggestions(selection, all_topics, available_space.saturating_sub(used))
        } else if utilization < thresholds.expand {
            let target = (available_space as f64 * thresholds.expand).floor() as u64;
            expansion_suggestions(selection, all_topics, target.saturating_sub(used))
        } else if utilization > thresholds.overflow {
            let ceiling = (available_space as f64 * thresholds.overflow).floor() as u64;
            reduction_suggestions(selection, all_topics, used.saturating_sub(ceiling))
        } else {
            Vec::new()
        };

        suggestions.truncate(self.max_suggestions());
        suggestions
    }

    /// Read-only summary of how much of the budget `selection` uses.
    pub fn calculate_space_utilization(
        &self,
        selection: &[TopicSelection],
        available_space: u64,
        all_topics: &[Topic],
    ) -> SpaceUtilizationInfo {
        let used_space = selection_space(selection);
        SpaceUtilizationInfo {
            used_space,
            available_space,
            remaining_space: available_space.saturating_sub(used_space),
            utilization_percentage: utilization_ratio(used_space, available_space),
            suggestions: self.generate_space_suggestions(selection, available_space, all_topics),
        }
    }
}

/// `0.4·w + 0.3·min(1, remaining/space) + 0.2·confidence + 0.1` if the topic has subtopics.
pub fn fit_score(topic: &Topic, remaining: u64) -> f64 {
    let space_fit = if topic.estimated_space == 0 {
        1.0
    } else {
        (remaining as f64 / topic.estimated_space as f64).min(1.0)
    };
    let structure = if topic.subtopics.is_empty() { 0.0 } else { 0.1 };

    0.4 * topic.priority.scoring_weight() + 0.3 * space_fit + 0.2 * topic.confidence_score() + structure
}

fn is_selected(selection: &[TopicSelection], topic_id: &str) -> bool {
    selection.iter().any(|s| s.topic_id == topic_id)
}

fn title_of<'a>(all_topics: &'a [Topic], topic_id: &'a str) -> &'a str {
    find_topic(all_topics, topic_id)
        .map(|t| t.title.as_str())
        .unwrap_or(topic_id)
}

fn addition_suggestions(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    remaining: u64,
) -> Vec<SpaceSuggestion> {
    let mut candidates: Vec<(&Topic, f64)> = all_topics
        .iter()
        .filter(|t| !is_selected(selection, &t.id) && t.estimated_space <= remaining)
        .map(|t| (t, fit_score(t, remaining)))
        .collect();
    candidates.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let mut suggestions: Vec<SpaceSuggestion> = candidates
        .into_iter()
        .take(MAX_TOPIC_ADDITIONS)
        .map(|(t, _)| SpaceSuggestion {
            kind: SuggestionType::AddTopic,
            target_id: t.id.clone(),
            description: format!(
                "Add topic '{}' ({} units) to use the remaining {} units",
                t.title, t.estimated_space, remaining
            ),
            space_impact: signed_units(t.estimated_space),
        })
        .collect();

    for sel in selection {
        let Some(topic) = find_topic(all_topics, &sel.topic_id) else {
            continue;
        };
        let mut unselected: Vec<_> = topic
            .subtopics
            .iter()
            .filter(|s| !sel.subtopic_ids.contains(&s.id) && s.estimated_space <= remaining)
            .collect();
        unselected.sort_by_key(|s| s.priority.rank());

        suggestions.extend(unselected.into_iter().take(MAX_SUBTOPIC_ADDITIONS_PER_TOPIC).map(|s| {
            SpaceSuggestion {
                kind: SuggestionType::AddSubtopic,
                target_id: s.id.clone(),
                description: format!("Add subtopic '{}' under '{}'", s.title, topic.title),
                space_impact: signed_units(s.estimated_space),
            }
        }));
    }

    suggestions
}

fn expansion_suggestions(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    gap_to_target: u64,
) -> Vec<SpaceSuggestion> {
    let mut ordered: Vec<&TopicSelection> = selection.iter().collect();
    ordered.sort_by_key(|s| s.priority.rank());
    let chosen: Vec<&TopicSelection> = ordered.into_iter().take(MAX_EXPANSIONS).collect();
    if chosen.is_empty() {
        return Vec::new();
    }

    let per_topic = gap_to_target.div_ceil(chosen.len() as u64);
    chosen
        .into_iter()
        .map(|sel| SpaceSuggestion {
            kind: SuggestionType::ExpandContent,
            target_id: sel.topic_id.clone(),
            description: format!(
                "Expand '{}' with additional detail or examples (about {} units)",
                title_of(all_topics, &sel.topic_id),
                per_topic
            ),
            space_impact: signed_units(per_topic),
        })
        .collect()
}

fn reduction_suggestions(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    overflow: u64,
) -> Vec<SpaceSuggestion> {
    let mut low_topics: Vec<&TopicSelection> = selection
        .iter()
        .filter(|s| s.priority == Priority::Low)
        .collect();
    low_topics.sort_by_key(|s| Reverse(s.estimated_space));

    let mut suggestions = Vec::new();
    let mut recovered = 0u64;

    if !low_topics.is_empty() {
        for sel in low_topics {
            if recovered >= overflow && !suggestions.is_empty() {
                break;
            }
            recovered = recovered.saturating_add(sel.estimated_space);
            suggestions.push(SpaceSuggestion {
                kind: SuggestionType::ReduceContent,
                target_id: sel.topic_id.clone(),
                description: format!(
                    "Remove low-priority topic '{}' to free {} units",
                    title_of(all_topics, &sel.topic_id),
                    sel.estimated_space
                ),
                space_impact: -signed_units(sel.estimated_space),
            });
        }
        return suggestions;
    }

    for sel in selection {
        let Some(topic) = find_topic(all_topics, &sel.topic_id) else {
            continue;
        };
        let low_subtopics = sel
            .subtopic_ids
            .iter()
            .filter_map(|id| topic.subtopic(id))
            .filter(|s| s.priority == Priority::Low);
        for sub in low_subtopics {
            if recovered >= overflow && !suggestions.is_empty() {
                return suggestions;
            }
            recovered = recovered.saturating_add(sub.estimated_space);
            suggestions.push(SpaceSuggestion {
                kind: SuggestionType::ReduceContent,
                target_id: sub.id.clone(),
                description: format!(
                    "Remove low-priority subtopic '{}' from '{}' to free {} units",
                    sub.title, topic.title, sub.estimated_space
                ),
                space_impact: -signed_units(sub.estimated_space),
            });
        }
    }

    suggestions
}
