//! Output types of the space calculation service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    AddTopic,
    AddSubtopic,
    ExpandContent,
    ReduceContent,
}

/// A single low-level space adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub target_id: String,
    pub description: String,
    /// Signed space delta; negative frees space.
    pub space_impact: i64,
}

/// Subtopics recommended under one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtopicRecommendation {
    pub topic_id: String,
    pub subtopic_ids: Vec<String>,
}

/// Result of the four-phase allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceOptimizationResult {
    pub recommended_topics: Vec<String>,
    pub recommended_subtopics: Vec<SubtopicRecommendation>,
    /// used / available; may exceed 1.0 only for infeasible budgets.
    pub utilization_score: f64,
    pub suggestions: Vec<SpaceSuggestion>,
    /// `utilization_score` capped at 1.0.
    pub estimated_final_utilization: f64,
}

/// Read-only utilization summary for an existing selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceUtilizationInfo {
    pub used_space: u64,
    pub available_space: u64,
    pub remaining_space: u64,
    /// Used over available as a fraction (0.5 = 50%); above 1.0 when overflowing.
    pub utilization_percentage: f64,
    pub suggestions: Vec<SpaceSuggestion>,
}
