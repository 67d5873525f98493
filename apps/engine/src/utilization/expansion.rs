//! Empty-space detection and content expansion suggestions.

use std::cmp::Ordering;

use tracing::debug;

use super::{is_selected, selected_topics, ContentUtilizationService};
use crate::models::topic::selection_space;
use crate::models::{
    ContentExpansionSuggestion, ExpansionType, OrganizationStyle, ReferenceFormatAnalysis,
    SubTopic, Topic, TopicSelection,
};
use crate::similarity::calculate_string_similarity;
use crate::space::utilization_ratio;

/// Expansion is only worth suggesting below this utilization.
const EXPANSION_TRIGGER: f64 = 0.8;
const MIN_REMAINING: u64 = 100;
const DETAIL_MIN_REMAINING: u64 = 200;
const MAX_DETAIL_SPACE: u64 = 400;

const MAX_NEW_TOPICS: usize = 3;
const MAX_NEW_SUBTOPICS_PER_TOPIC: usize = 2;
const MAX_DETAIL_TOPICS: usize = 2;

impl ContentUtilizationService {
    /// Suggests content to fill empty space, at most `max_suggestions` entries.
    ///
    /// Nothing is suggested unless utilization is under 80% and more than 100
    /// units remain. Candidates, in order: new topics (up to 3), missing
    /// subtopics of selected topics (up to 2 each), and "add detail" for up to
    /// 2 selected topics when more than 200 units remain. A hierarchical
    /// reference moves subtopic additions to the front; a flat one moves new
    /// topics to the front.
    pub fn detect_empty_space_and_suggest_content(
        &self,
        selection: &[TopicSelection],
        all_topics: &[Topic],
        available_space: u64,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> Vec<ContentExpansionSuggestion> {
        let used = selection_space(selection);
        let utilization = utilization_ratio(used, available_space);
        let remaining = available_space.saturating_sub(used);

        if utilization >= EXPANSION_TRIGGER || remaining <= MIN_REMAINING {
            return Vec::new();
        }

        let mut suggestions = new_topic_suggestions(selection, all_topics, remaining);
        suggestions.extend(new_subtopic_suggestions(selection, all_topics, remaining));
        if remaining > DETAIL_MIN_REMAINING {
            suggestions.extend(detail_suggestions(selection, all_topics, remaining));
        }

        if let Some(r) = reference {
            let favored = match r.organization_style {
                OrganizationStyle::Hierarchical => ExpansionType::AddSubtopic,
                OrganizationStyle::Flat => ExpansionType::AddTopic,
            };
            suggestions.sort_by_key(|s| s.kind != favored);
        }

        suggestions.truncate(self.max_suggestions());
        debug!(
            remaining,
            count = suggestions.len(),
            "generated content expansion suggestions"
        );
        suggestions
    }
}

/// `0.4·w + 0.3·confidence + richness + 0.2·(1 − max title similarity to the selection)`.
pub fn topic_relevance(topic: &Topic, selected_titles: &[&str]) -> f64 {
    let richness = (topic.subtopics.len() as f64 * 0.025).min(0.1)
        + (topic.examples.len() as f64 * 0.05).min(0.1);
    let redundancy = selected_titles
        .iter()
        .map(|title| calculate_string_similarity(&topic.title, title))
        .fold(0.0_f64, f64::max);

    0.4 * topic.priority.scoring_weight()
        + 0.3 * topic.confidence_score()
        + richness
        + 0.2 * (1.0 - redundancy)
}

/// `0.5·w + 0.3·confidence + min(0.2, len/500)`.
pub fn subtopic_relevance(subtopic: &SubTopic) -> f64 {
    0.5 * subtopic.priority.scoring_weight()
        + 0.3 * subtopic.confidence_score()
        + (subtopic.content_len() as f64 / 500.0).min(0.2)
}

fn by_score_desc<T>(items: &mut [(T, f64)]) {
    items.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
}

fn new_topic_suggestions(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    remaining: u64,
) -> Vec<ContentExpansionSuggestion> {
    let selected_titles: Vec<&str> = selected_topics(selection, all_topics)
        .into_iter()
        .map(|(_, t)| t.title.as_str())
        .collect();

    let mut candidates: Vec<(&Topic, f64)> = all_topics
        .iter()
        .filter(|t| !is_selected(selection, &t.id) && t.estimated_space <= remaining)
        .map(|t| (t, topic_relevance(t, &selected_titles)))
        .collect();
    by_score_desc(&mut candidates);

    candidates
        .into_iter()
        .take(MAX_NEW_TOPICS)
        .map(|(t, score)| ContentExpansionSuggestion {
            kind: ExpansionType::AddTopic,
            target_id: t.id.clone(),
            parent_topic_id: None,
            title: t.title.clone(),
            description: format!("Add topic '{}' ({} units)", t.title, t.estimated_space),
            estimated_space: t.estimated_space,
            relevance_score: score,
        })
        .collect()
}

fn new_subtopic_suggestions(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    remaining: u64,
) -> Vec<ContentExpansionSuggestion> {
    let mut suggestions = Vec::new();

    for (sel, topic) in selected_topics(selection, all_topics) {
        let mut candidates: Vec<(&SubTopic, f64)> = topic
            .subtopics
            .iter()
            .filter(|s| !sel.subtopic_ids.contains(&s.id) && s.estimated_space <= remaining)
            .map(|s| (s, subtopic_relevance(s)))
            .collect();
        by_score_desc(&mut candidates);

        suggestions.extend(candidates.into_iter().take(MAX_NEW_SUBTOPICS_PER_TOPIC).map(
            |(s, score)| ContentExpansionSuggestion {
                kind: ExpansionType::AddSubtopic,
                target_id: s.id.clone(),
                parent_topic_id: Some(topic.id.clone()),
                title: s.title.clone(),
                description: format!(
                    "Add subtopic '{}' under '{}' ({} units)",
                    s.title, topic.title, s.estimated_space
                ),
                estimated_space: s.estimated_space,
                relevance_score: score,
            },
        ));
    }

    suggestions
}

fn detail_suggestions(
    selection: &[TopicSelection],
    all_topics: &[Topic],
    remaining: u64,
) -> Vec<ContentExpansionSuggestion> {
    let space = (remaining / 4).min(MAX_DETAIL_SPACE);

    selected_topics(selection, all_topics)
        .into_iter()
        .take(MAX_DETAIL_TOPICS)
        .map(|(_, t)| ContentExpansionSuggestion {
            kind: ExpansionType::ExpandDetail,
            target_id: t.id.clone(),
            parent_topic_id: None,
            title: t.title.clone(),
            description: format!(
                "Add examples or explanatory detail to '{}' (about {} units)",
                t.title, space
            ),
            estimated_space: space,
            relevance_score: 0.5 * t.priority.scoring_weight() + 0.3 * t.confidence_score(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{LayoutPattern, Priority};
    use crate::space::SpaceCalculationService;

    fn service() -> ContentUtilizationService {
        ContentUtilizationService::new(Arc::new(SpaceCalculationService::default()))
    }

    fn make_sub(id: &str, priority: Priority, len: usize) -> SubTopic {
        SubTopic {
            id: id.to_string(),
            title: format!("Sub {id}"),
            content: "x".repeat(len),
            priority,
            confidence: 0.5,
            estimated_space: 100,
        }
    }

    fn make_topic(id: &str, title: &str, priority: Priority, space: u64, subs: Vec<SubTopic>) -> Topic {
        Topic {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            subtopics: subs,
            priority,
            confidence: 0.5,
            estimated_space: space,
            source_files: vec![],
            examples: vec![],
        }
    }

    fn reference(style: OrganizationStyle) -> ReferenceFormatAnalysis {
        ReferenceFormatAnalysis {
            content_density: 5000.0,
            topic_count: 4,
            average_topic_length: 300.0,
            organization_style: style,
            layout_pattern: LayoutPattern::SingleColumn,
        }
    }

    fn fixture() -> (Vec<Topic>, Vec<TopicSelection>) {
        let selected = make_topic(
            "bio",
            "Cell Biology",
            Priority::High,
            1000,
            vec![make_sub("mito", Priority::High, 100), make_sub("ribo", Priority::Low, 0)],
        );
        let topics = vec![
            selected.clone(),
            make_topic("chem", "Organic Chemistry", Priority::Medium, 800, vec![]),
        ];
        let selection = vec![TopicSelection::from_topic(&selected, vec![])];
        (topics, selection)
    }

    #[test]
    fn test_no_suggestions_when_nearly_full() {
        let (topics, selection) = fixture();
        // 1000 / 1200 ≈ 83% ≥ 80%
        assert!(service()
            .detect_empty_space_and_suggest_content(&selection, &topics, 1200, None)
            .is_empty());
    }

    #[test]
    fn test_no_suggestions_when_remainder_tiny() {
        let (topics, selection) = fixture();
        // 1000 / 1100 ≈ 91%, remainder 100
        assert!(service()
            .detect_empty_space_and_suggest_content(&selection, &topics, 1100, None)
            .is_empty());
    }

    #[test]
    fn test_generates_topics_subtopics_and_detail() {
        let (topics, selection) = fixture();
        let suggestions = service().detect_empty_space_and_suggest_content(&selection, &topics, 10_000, None);
        let kinds: Vec<ExpansionType> = suggestions.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExpansionType::AddTopic,
                ExpansionType::AddSubtopic,
                ExpansionType::AddSubtopic,
                ExpansionType::ExpandDetail,
            ]
        );
        assert_eq!(suggestions[1].target_id, "mito");
        assert_eq!(suggestions[1].parent_topic_id.as_deref(), Some("bio"));
        // (10000 - 1000) / 4 capped at 400
        assert_eq!(suggestions[3].estimated_space, 400);
    }

    #[test]
    fn test_flat_reference_puts_new_topics_first() {
        let (topics, selection) = fixture();
        let r = reference(OrganizationStyle::Flat);
        let suggestions = service().detect_empty_space_and_suggest_content(&selection, &topics, 10_000, Some(&r));
        assert_eq!(suggestions[0].kind, ExpansionType::AddTopic);
    }

    #[test]
    fn test_hierarchical_reference_puts_subtopics_first() {
        let (topics, selection) = fixture();
        let r = reference(OrganizationStyle::Hierarchical);
        let suggestions = service().detect_empty_space_and_suggest_content(&selection, &topics, 10_000, Some(&r));
        assert_eq!(suggestions[0].kind, ExpansionType::AddSubtopic);
        assert_eq!(suggestions[1].kind, ExpansionType::AddSubtopic);
        assert_eq!(suggestions[2].kind, ExpansionType::AddTopic);
    }

    #[test]
    fn test_relevance_penalizes_redundant_titles() {
        let fresh = make_topic("a", "Organic Chemistry", Priority::Medium, 100, vec![]);
        let repeat = make_topic("b", "Cell Biology", Priority::Medium, 100, vec![]);
        let selected = ["Cell Biology"];
        assert!(topic_relevance(&fresh, &selected) > topic_relevance(&repeat, &selected));
        // identical title: no novelty bonus → 0.24 + 0.15
        assert!((topic_relevance(&repeat, &selected) - 0.39).abs() < 1e-9);
    }

    #[test]
    fn test_subtopic_relevance_caps_length_bonus() {
        let long = make_sub("l", Priority::High, 5000);
        // 0.5 + 0.15 + 0.2
        assert!((subtopic_relevance(&long) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_give_no_suggestions() {
        assert!(service()
            .detect_empty_space_and_suggest_content(&[], &[], 10_000, None)
            .is_empty());
    }
}
