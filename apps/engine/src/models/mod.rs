pub mod analysis;
pub mod constraints;
pub mod results;
pub mod topic;

pub use analysis::{
    ContentExpansionSuggestion, ContentImpact, ContentReductionStrategy,
    ContentUtilizationAnalysis, ContentUtilizationRecommendation, DensityAction,
    DensityActionType, DensityOptimizationResult, ExpansionType, RecommendationType,
    ReductionType, UtilizationState,
};
pub use constraints::{
    FontSize, LayoutPattern, OrganizationStyle, PageSize, ReferenceFormatAnalysis,
    SpaceConstraints,
};
pub use results::{
    SpaceOptimizationResult, SpaceSuggestion, SpaceUtilizationInfo, SubtopicRecommendation,
    SuggestionType,
};
pub use topic::{Priority, SubTopic, Topic, TopicSelection};
