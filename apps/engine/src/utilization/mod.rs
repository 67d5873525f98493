//! Content utilization: interprets a selection against its space budget.
//!
//! Builds on `SpaceCalculationService` for budgets and raw ratios, and adds
//! classification, user-facing recommendations, reduction strategies for
//! overflowing selections, expansion suggestions for underfilled ones, and
//! alignment with an optional reference document.

pub mod analysis;
pub mod density;
pub mod expansion;
pub mod reduction;

use std::sync::Arc;

use crate::config::UtilizationThresholds;
use crate::models::topic::find_topic;
use crate::models::{Topic, TopicSelection};
use crate::space::SpaceCalculationService;

/// Higher-level analysis service. Holds the injected space service.
#[derive(Debug, Clone)]
pub struct ContentUtilizationService {
    space: Arc<SpaceCalculationService>,
}

impl ContentUtilizationService {
    pub fn new(space: Arc<SpaceCalculationService>) -> Self {
        Self { space }
    }

    pub fn space(&self) -> &SpaceCalculationService {
        &self.space
    }

    fn thresholds(&self) -> &UtilizationThresholds {
        self.space.thresholds()
    }

    fn max_suggestions(&self) -> usize {
        self.space.max_suggestions()
    }

    /// Normalized edit-distance similarity, see `similarity::calculate_string_similarity`.
    pub fn calculate_string_similarity(&self, a: &str, b: &str) -> f64 {
        crate::similarity::calculate_string_similarity(a, b)
    }
}

/// Pairs each selection entry with the topic it names, skipping unknown ids.
fn selected_topics<'a>(
    selection: &'a [TopicSelection],
    all_topics: &'a [Topic],
) -> Vec<(&'a TopicSelection, &'a Topic)> {
    selection
        .iter()
        .filter_map(|sel| find_topic(all_topics, &sel.topic_id).map(|t| (sel, t)))
        .collect()
}

fn is_selected(selection: &[TopicSelection], topic_id: &str) -> bool {
    selection.iter().any(|s| s.topic_id == topic_id)
}

fn percent(ratio: f64) -> f64 {
    (ratio * 1000.0).round() / 10.0
}
