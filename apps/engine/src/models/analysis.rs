//! Output types of the content utilization service.

use serde::{Deserialize, Serialize};

use crate::models::topic::Priority;

/// Fill classification of a selection, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationState {
    /// Below the underfill threshold (default 70%).
    Underfilled,
    Balanced,
    /// Above the overflow threshold (default 95%).
    Overflowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    AddContent,
    ExpandExisting,
    ReduceContent,
    Redistribute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUtilizationRecommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub description: String,
    pub target_ids: Vec<String>,
    /// Signed space delta; negative frees space.
    pub space_impact: i64,
    /// False when no concrete target could be found for the recommendation.
    pub actionable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUtilizationAnalysis {
    /// Used over available as a fraction (0.5 = 50%); above 1.0 when overflowing.
    pub utilization_percentage: f64,
    pub state: UtilizationState,
    pub empty_space_detected: bool,
    pub overflow_detected: bool,
    pub recommendations: Vec<ContentUtilizationRecommendation>,
    pub density_optimization: DensityOptimizationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionType {
    AddTopic,
    AddSubtopic,
    ExpandDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentExpansionSuggestion {
    #[serde(rename = "type")]
    pub kind: ExpansionType,
    pub target_id: String,
    /// Set for subtopic additions.
    pub parent_topic_id: Option<String>,
    pub title: String,
    pub description: String,
    pub estimated_space: u64,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionType {
    RemoveTopics,
    RemoveSubtopics,
    CondenseContent,
    MergeSimilar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentImpact {
    Minimal,
    Moderate,
    Significant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentReductionStrategy {
    pub reduction_type: ReductionType,
    /// Always ids taken from the current selection.
    pub target_ids: Vec<String>,
    pub space_recovered: u64,
    pub content_impact: ContentImpact,
    /// How much of the original content survives, in [0, 1].
    pub preservation_score: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityActionType {
    IncreaseTopics,
    IncreaseSubtopics,
    DecreaseTopics,
    DecreaseSpacing,
    MaintainDensity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityAction {
    pub action: DensityActionType,
    pub description: String,
    /// Signed share of the density gap this action should close.
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityOptimizationResult {
    pub current_density: f64,
    pub target_density: f64,
    /// target − current.
    pub density_gap: f64,
    pub optimization_actions: Vec<DensityAction>,
    pub reference_alignment: f64,
}
