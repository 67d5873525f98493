//! Four-phase greedy allocation of the space budget.
//!
//! 1. Mandatory: high-priority topics with their high-priority subtopics, up to
//!    `available × (1 − buffer)`.
//! 2. Fill: remaining high/medium topics by descending topic score, with their
//!    medium subtopics, up to `available × target`.
//! 3. Backfill: if more than 100 units remain, low-priority topics by score,
//!    each taken if it fits what is left.
//! 4. Fine-tune: if at least 50 units remain, unselected subtopics of selected
//!    topics, highest priority first, while they fit.
//!
//! Sorting is stable, so equal scores keep input order and the result is
//! deterministic. This is an explainable heuristic, not a knapsack solver.

use std::cmp::Ordering;

use tracing::debug;

use super::{utilization_ratio, SpaceCalculationService};
use crate::models::constraints::DEFAULT_TARGET_UTILIZATION;
use crate::models::{
    Priority, ReferenceFormatAnalysis, SpaceConstraints, SpaceOptimizationResult, SubTopic,
    SubtopicRecommendation, Topic, TopicSelection,
};

// ────────────────────────────────────────────────────────────────────────────
// Tuning constants
// ────────────────────────────────────────────────────────────────────────────

const DEFAULT_BUFFER: f64 = 0.10;
const HIERARCHICAL_BUFFER: f64 = 0.15;
const FLAT_BUFFER: f64 = 0.05;
const MULTI_COLUMN_BUFFER_BONUS: f64 = 0.05;

const MIN_REFERENCE_TARGET: f64 = 0.70;
const MAX_REFERENCE_TARGET: f64 = 0.95;

const BACKFILL_MIN_REMAINING: u64 = 100;
const FINE_TUNE_MIN_REMAINING: u64 = 50;

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Share of the budget held back during the mandatory phase.
pub fn buffer_space(reference: Option<&ReferenceFormatAnalysis>) -> f64 {
    match reference {
        None => DEFAULT_BUFFER,
        Some(r) => {
            let base = if r.is_hierarchical() {
                HIERARCHICAL_BUFFER
            } else {
                FLAT_BUFFER
            };
            if r.is_multi_column() {
                base + MULTI_COLUMN_BUFFER_BONUS
            } else {
                base
            }
        }
    }
}

/// Reference density relative to this budget, clamped to [0.7, 0.95].
///
/// `None` without a reference or when either side of the ratio is zero.
pub fn reference_density_ratio(
    reference: Option<&ReferenceFormatAnalysis>,
    available_space: u64,
) -> Option<f64> {
    let r = reference?;
    if available_space == 0 || r.content_density <= 0.0 {
        return None;
    }
    Some((r.content_density / available_space as f64).clamp(MIN_REFERENCE_TARGET, MAX_REFERENCE_TARGET))
}

/// How close `length` is to the reference average, in [0, 1].
pub fn length_alignment(length: usize, average: f64) -> f64 {
    if average <= 0.0 {
        return 0.0;
    }
    (1.0 - (length as f64 - average).abs() / average).max(0.0)
}

/// Composite rank for fill and backfill candidates.
///
/// `0.4·w + 0.25·confidence + min(0.2, 0.05·subtopics) + min(0.1, 0.03·examples)`,
/// plus `0.15·length_alignment` when a reference is supplied.
pub fn topic_score(topic: &Topic, reference: Option<&ReferenceFormatAnalysis>) -> f64 {
    let mut score = 0.4 * topic.priority.scoring_weight()
        + 0.25 * topic.confidence_score()
        + (topic.subtopics.len() as f64 * 0.05).min(0.2)
        + (topic.examples.len() as f64 * 0.03).min(0.1);

    if let Some(r) = reference {
        score += 0.15 * length_alignment(topic.content_len(), r.average_topic_length);
    }
    score
}

// ────────────────────────────────────────────────────────────────────────────
// Allocation state
// ────────────────────────────────────────────────────────────────────────────

struct Pick<'a> {
    topic: &'a Topic,
    subtopics: Vec<&'a SubTopic>,
}

impl Pick<'_> {
    fn has_subtopic(&self, id: &str) -> bool {
        self.subtopics.iter().any(|s| s.id == id)
    }
}

#[derive(Default)]
struct Allocation<'a> {
    picks: Vec<Pick<'a>>,
    used: u64,
}

impl<'a> Allocation<'a> {
    fn contains(&self, topic_id: &str) -> bool {
        self.picks.iter().any(|p| p.topic.id == topic_id)
    }

    /// Adds the topic with `subtopics` if the total stays within `limit`.
    fn try_add(&mut self, topic: &'a Topic, subtopics: Vec<&'a SubTopic>, limit: u64) -> bool {
        let space = subtopics
            .iter()
            .fold(topic.estimated_space, |acc, s| acc.saturating_add(s.estimated_space));
        let total = self.used.saturating_add(space);
        if total > limit {
            return false;
        }
        self.used = total;
        self.picks.push(Pick { topic, subtopics });
        true
    }

    fn remaining(&self, available: u64) -> u64 {
        available.saturating_sub(self.used)
    }

    fn to_selection(&self) -> Vec<TopicSelection> {
        self.picks
            .iter()
            .map(|p| {
                TopicSelection::from_topic(p.topic, p.subtopics.iter().map(|s| s.id.clone()).collect())
            })
            .collect()
    }
}

fn subtopics_with<'a>(topic: &'a Topic, priority: Priority) -> Vec<&'a SubTopic> {
    topic.subtopics.iter().filter(|s| s.priority == priority).collect()
}

/// Candidates sorted by descending topic score; ties keep input order.
fn ranked<'a>(
    candidates: impl Iterator<Item = &'a Topic>,
    reference: Option<&ReferenceFormatAnalysis>,
) -> Vec<&'a Topic> {
    let mut scored: Vec<(&Topic, f64)> = candidates.map(|t| (t, topic_score(t, reference))).collect();
    scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(t, _)| t).collect()
}

fn scaled(available: u64, fraction: f64) -> u64 {
    (available as f64 * fraction).floor() as u64
}

// ────────────────────────────────────────────────────────────────────────────
// Phases
// ────────────────────────────────────────────────────────────────────────────

fn mandatory_phase<'a>(alloc: &mut Allocation<'a>, topics: &'a [Topic], limit: u64) {
    for topic in topics.iter().filter(|t| t.priority == Priority::High) {
        alloc.try_add(topic, subtopics_with(topic, Priority::High), limit);
    }
}

fn fill_phase<'a>(
    alloc: &mut Allocation<'a>,
    topics: &'a [Topic],
    limit: u64,
    reference: Option<&ReferenceFormatAnalysis>,
) {
    let candidates = topics
        .iter()
        .filter(|t| t.priority != Priority::Low && !alloc.contains(&t.id));
    for topic in ranked(candidates, reference) {
        alloc.try_add(topic, subtopics_with(topic, Priority::Medium), limit);
    }
}

fn backfill_phase<'a>(
    alloc: &mut Allocation<'a>,
    topics: &'a [Topic],
    available: u64,
    reference: Option<&ReferenceFormatAnalysis>,
) {
    if alloc.remaining(available) <= BACKFILL_MIN_REMAINING {
        return;
    }
    let candidates = topics
        .iter()
        .filter(|t| t.priority == Priority::Low && !alloc.contains(&t.id));
    for topic in ranked(candidates, reference) {
        alloc.try_add(topic, Vec::new(), available);
    }
}

fn fine_tune_phase<'a>(alloc: &mut Allocation<'a>, available: u64) {
    if alloc.remaining(available) < FINE_TUNE_MIN_REMAINING {
        return;
    }

    let mut candidates: Vec<(usize, &'a SubTopic)> = alloc
        .picks
        .iter()
        .enumerate()
        .flat_map(|(idx, pick)| {
            let topic: &'a Topic = pick.topic;
            topic
                .subtopics
                .iter()
                .filter(move |s| !pick.has_subtopic(&s.id))
                .map(move |s| (idx, s))
        })
        .collect();
    candidates.sort_by_key(|(_, s)| s.priority.rank());

    for (idx, sub) in candidates {
        let remaining = alloc.remaining(available);
        if remaining == 0 {
            break;
        }
        if sub.estimated_space <= remaining {
            alloc.used += sub.estimated_space;
            alloc.picks[idx].subtopics.push(sub);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

impl SpaceCalculationService {
    /// Picks topics and subtopics for `available_space` (default 85% fill target).
    ///
    /// Spaces are taken from the records as given: without constraints there is
    /// nothing to estimate from, so a zero `estimated_space` costs nothing.
    /// Use `optimize_for_constraints` when upstream estimates may be missing.
    pub fn optimize_space_utilization(
        &self,
        topics: &[Topic],
        available_space: u64,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> SpaceOptimizationResult {
        self.allocate(topics, available_space, DEFAULT_TARGET_UTILIZATION, reference)
    }

    /// Same as `optimize_space_utilization`, budgeting from `constraints` and
    /// using their `target_utilization` when no reference overrides it.
    ///
    /// Topics and subtopics with a zero `estimated_space` are costed with the
    /// engine's own estimate first.
    pub fn optimize_for_constraints(
        &self,
        topics: &[Topic],
        constraints: &SpaceConstraints,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> SpaceOptimizationResult {
        let available = self.calculate_available_space(constraints);
        let topics = self.with_estimated_spaces(topics, constraints);
        self.allocate(&topics, available, constraints.target_utilization, reference)
    }

    fn allocate(
        &self,
        topics: &[Topic],
        available: u64,
        default_target: f64,
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> SpaceOptimizationResult {
        let buffer = buffer_space(reference);
        let target = reference_density_ratio(reference, available).unwrap_or(default_target);
        let mut alloc = Allocation::default();

        mandatory_phase(&mut alloc, topics, scaled(available, 1.0 - buffer));
        debug!(used = alloc.used, picks = alloc.picks.len(), buffer, "mandatory phase done");

        fill_phase(&mut alloc, topics, scaled(available, target), reference);
        debug!(used = alloc.used, picks = alloc.picks.len(), target, "fill phase done");

        backfill_phase(&mut alloc, topics, available, reference);
        debug!(used = alloc.used, picks = alloc.picks.len(), "backfill phase done");

        fine_tune_phase(&mut alloc, available);
        debug!(used = alloc.used, remaining = alloc.remaining(available), "fine-tune phase done");

        let selection = alloc.to_selection();
        let utilization_score = utilization_ratio(alloc.used, available);

        SpaceOptimizationResult {
            recommended_topics: selection.iter().map(|s| s.topic_id.clone()).collect(),
            recommended_subtopics: selection
                .iter()
                .filter(|s| !s.subtopic_ids.is_empty())
                .map(|s| SubtopicRecommendation {
                    topic_id: s.topic_id.clone(),
                    subtopic_ids: s.subtopic_ids.clone(),
                })
                .collect(),
            utilization_score,
            suggestions: self.generate_space_suggestions(&selection, available, topics),
            estimated_final_utilization: utilization_score.min(1.0),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FontSize, LayoutPattern, OrganizationStyle, PageSize};

    fn make_sub(id: &str, priority: Priority, space: u64) -> SubTopic {
        SubTopic {
            id: id.to_string(),
            title: format!("Sub {id}"),
            content: String::new(),
            priority,
            confidence: 0.7,
            estimated_space: space,
        }
    }

    fn make_topic(id: &str, priority: Priority, space: u64, subs: Vec<SubTopic>) -> Topic {
        Topic {
            id: id.to_string(),
            title: format!("Topic {id}"),
            content: String::new(),
            subtopics: subs,
            priority,
            confidence: 0.8,
            estimated_space: space,
            source_files: vec![],
            examples: vec![],
        }
    }

    fn reference(style: OrganizationStyle, layout: LayoutPattern) -> ReferenceFormatAnalysis {
        ReferenceFormatAnalysis {
            content_density: 850.0,
            topic_count: 5,
            average_topic_length: 200.0,
            organization_style: style,
            layout_pattern: layout,
        }
    }

    // ── scoring helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_buffer_space_by_reference() {
        assert_eq!(buffer_space(None), 0.10);
        let h = reference(OrganizationStyle::Hierarchical, LayoutPattern::SingleColumn);
        let f = reference(OrganizationStyle::Flat, LayoutPattern::MultiColumn);
        assert_eq!(buffer_space(Some(&h)), 0.15);
        assert!((buffer_space(Some(&f)) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_reference_density_ratio_clamped() {
        let r = reference(OrganizationStyle::Flat, LayoutPattern::SingleColumn);
        assert_eq!(reference_density_ratio(Some(&r), 10_000), Some(0.7));
        assert_eq!(reference_density_ratio(Some(&r), 500), Some(0.95));
        assert_eq!(reference_density_ratio(None, 500), None);
        assert_eq!(reference_density_ratio(Some(&r), 0), None);
    }

    #[test]
    fn test_topic_score_formula() {
        let mut topic = make_topic(
            "t",
            Priority::High,
            100,
            (0..5).map(|i| make_sub(&i.to_string(), Priority::Medium, 10)).collect(),
        );
        topic.confidence = 1.0;
        topic.examples = vec!["e".to_string(); 2];
        // 0.4 + 0.25 + min(0.2, 0.25) + min(0.1, 0.06) = 0.91
        assert!((topic_score(&topic, None) - 0.91).abs() < 1e-9);
    }

    #[test]
    fn test_topic_score_rewards_reference_length() {
        let r = reference(OrganizationStyle::Flat, LayoutPattern::SingleColumn);
        let mut close = make_topic("a", Priority::Medium, 100, vec![]);
        close.content = "x".repeat(200);
        let mut far = make_topic("b", Priority::Medium, 100, vec![]);
        far.content = "x".repeat(1000);
        assert!(topic_score(&close, Some(&r)) > topic_score(&far, Some(&r)));
        assert!((length_alignment(200, 200.0) - 1.0).abs() < 1e-12);
        assert_eq!(length_alignment(1000, 200.0), 0.0);
    }

    // ── phases ──────────────────────────────────────────────────────────────

    #[test]
    fn test_mandatory_phase_takes_high_topics_with_high_subtopics() {
        let topics = vec![make_topic(
            "core",
            Priority::High,
            1000,
            vec![make_sub("h", Priority::High, 200), make_sub("m", Priority::Medium, 5000)],
        )];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert_eq!(result.recommended_topics, vec!["core".to_string()]);
        // "m" only joins during fine-tuning
        assert_eq!(result.recommended_subtopics[0].subtopic_ids, vec!["h".to_string(), "m".to_string()]);
    }

    #[test]
    fn test_mandatory_phase_respects_buffer() {
        // 9500 > 10000 × 0.9 → not mandatory; fill limit 8500 also rejects it
        let topics = vec![make_topic("big", Priority::High, 9500, vec![])];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert!(result.recommended_topics.is_empty());
        assert_eq!(result.utilization_score, 0.0);
    }

    #[test]
    fn test_fill_phase_orders_by_score_and_stops_at_target() {
        let mut strong = make_topic("strong", Priority::Medium, 5000, vec![]);
        strong.confidence = 1.0;
        let mut weak = make_topic("weak", Priority::Medium, 5000, vec![]);
        weak.confidence = 0.1;
        // input order puts weak first; score order must pick strong
        let topics = vec![weak, strong];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert_eq!(result.recommended_topics, vec!["strong".to_string()]);
    }

    #[test]
    fn test_fill_phase_adds_medium_subtopics_only() {
        let topics = vec![make_topic(
            "t",
            Priority::Medium,
            1000,
            vec![make_sub("m", Priority::Medium, 100), make_sub("l", Priority::Low, 100000)],
        )];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert_eq!(result.recommended_subtopics[0].subtopic_ids, vec!["m".to_string()]);
    }

    #[test]
    fn test_backfill_packs_low_priority_into_remainder() {
        let topics = vec![
            make_topic("main", Priority::Medium, 8000, vec![]),
            make_topic("small-low", Priority::Low, 1500, vec![]),
            make_topic("huge-low", Priority::Low, 5000, vec![]),
        ];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert_eq!(
            result.recommended_topics,
            vec!["main".to_string(), "small-low".to_string()]
        );
        assert!((result.utilization_score - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_no_backfill_when_remainder_small() {
        let topics = vec![
            make_topic("main", Priority::High, 420, vec![]),
            make_topic("tiny-low", Priority::Low, 10, vec![]),
        ];
        // 80 units remain: below the backfill threshold even though tiny-low would fit
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 500, None);
        assert_eq!(result.recommended_topics, vec!["main".to_string()]);
    }

    #[test]
    fn test_fine_tune_adds_leftover_subtopics_by_priority() {
        let topics = vec![make_topic(
            "t",
            Priority::Medium,
            1000,
            vec![make_sub("low", Priority::Low, 300), make_sub("high", Priority::High, 300)],
        )];
        // 1000 used after fill; both subtopics fit in the 9000 remainder, high first
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert_eq!(
            result.recommended_subtopics[0].subtopic_ids,
            vec!["high".to_string(), "low".to_string()]
        );
    }

    #[test]
    fn test_zero_budget_selects_nothing() {
        let topics = vec![make_topic("t", Priority::Low, 50, vec![])];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 0, None);
        assert!(result.recommended_topics.is_empty());
        assert_eq!(result.estimated_final_utilization, 0.0);
    }

    #[test]
    fn test_empty_topics_yield_empty_result() {
        let result = SpaceCalculationService::default().optimize_space_utilization(&[], 10_000, None);
        assert!(result.recommended_topics.is_empty());
        assert!(result.recommended_subtopics.is_empty());
        assert_eq!(result.utilization_score, 0.0);
    }

    #[test]
    fn test_constraints_entry_point_estimates_missing_spaces() {
        // 1 × a4, large, 1 column → 8217 units; each topic costs 2400 + 50
        let constraints = SpaceConstraints::new(1, PageSize::A4, FontSize::Large, 1).unwrap();
        let topics: Vec<Topic> = (0..20)
            .map(|i| {
                let mut topic = make_topic(&i.to_string(), Priority::Medium, 0, vec![]);
                topic.content = "x".repeat(2000);
                topic
            })
            .collect();

        let result = SpaceCalculationService::default().optimize_for_constraints(&topics, &constraints, None);
        // fill target floor(8217 × 0.85) = 6984 holds two topics
        assert_eq!(result.recommended_topics, vec!["0".to_string(), "1".to_string()]);
        assert!((result.utilization_score - 4900.0 / 8217.0).abs() < 1e-9);
    }

    #[test]
    fn test_constraints_entry_point_estimates_missing_subtopic_spaces() {
        let constraints = SpaceConstraints::new(1, PageSize::A4, FontSize::Large, 1).unwrap();
        let mut sub = make_sub("s", Priority::High, 0);
        sub.content = "y".repeat(100);
        let topics = vec![make_topic("t", Priority::High, 1000, vec![sub])];

        let result = SpaceCalculationService::default().optimize_for_constraints(&topics, &constraints, None);
        // 1000 supplied + ceil(100 × 1.2) + 30 estimated
        assert!((result.utilization_score - 1150.0 / 8217.0).abs() < 1e-9);
    }

    #[test]
    fn test_bare_entry_point_uses_supplied_spaces() {
        let topics = vec![make_topic("a", Priority::Medium, 0, vec![])];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 1000, None);
        assert_eq!(result.recommended_topics, vec!["a".to_string()]);
        assert_eq!(result.utilization_score, 0.0);
    }

    #[test]
    fn test_huge_estimate_is_rejected_without_overflow() {
        let topics = vec![
            make_topic("a", Priority::High, 100, vec![]),
            make_topic("b", Priority::High, u64::MAX, vec![make_sub("s", Priority::High, u64::MAX)]),
        ];
        let result = SpaceCalculationService::default().optimize_space_utilization(&topics, 10_000, None);
        assert_eq!(result.recommended_topics, vec!["a".to_string()]);
    }

    #[test]
    fn test_reference_raises_target() {
        // reference ratio 9500 / 10000 = 0.95 target; default would stop at 8500
        let mut r = reference(OrganizationStyle::Flat, LayoutPattern::SingleColumn);
        r.content_density = 9500.0;
        let topics = vec![make_topic("a", Priority::Medium, 9000, vec![])];
        let service = SpaceCalculationService::default();
        assert!(service.optimize_space_utilization(&topics, 10_000, None).recommended_topics.is_empty());
        assert_eq!(
            service.optimize_space_utilization(&topics, 10_000, Some(&r)).recommended_topics,
            vec!["a".to_string()]
        );
    }
}
