//! Space budget and content-size estimation.
//!
//! A space unit approximates one rendered character. The budget is the usable
//! page area (inches²) times a per-font character density:
//!
//! ```text
//! total    = width × height × pages
//! usable   = total × 0.85                 (15% margins)
//! adjusted = usable × 0.95^(columns − 1)  (5% per extra column for gutters)
//! budget   = floor(adjusted × density)    (small 180, medium 140, large 100)
//! ```

use tracing::debug;

use super::SpaceCalculationService;
use crate::models::{
    FontSize, PageSize, ReferenceFormatAnalysis, SpaceConstraints, SubTopic, Topic,
};

// ────────────────────────────────────────────────────────────────────────────
// Layout tables
// ────────────────────────────────────────────────────────────────────────────

const MARGIN_FACTOR: f64 = 0.85;
const COLUMN_GUTTER_FACTOR: f64 = 0.95;

/// Characters of overhead per character of content (headers, bullets, spacing).
const CONTENT_OVERHEAD: f64 = 1.2;
/// Extra overhead for column breaks in multi-column layouts.
const MULTI_COLUMN_OVERHEAD: f64 = 1.1;

pub const TOPIC_TITLE_OVERHEAD: u64 = 50;
pub const SUBTOPIC_TITLE_OVERHEAD: u64 = 30;
/// Flat allowance per worked example or figure.
pub const EXAMPLE_ALLOWANCE: u64 = 200;

/// Fraction of the budget the no-reference topic count aims to fill.
const OPTIMAL_COUNT_FILL: f64 = 0.85;

/// Page width and height in inches.
pub fn page_dimensions(size: PageSize) -> (f64, f64) {
    match size {
        PageSize::A4 => (8.27, 11.69),
        PageSize::Letter => (8.5, 11.0),
        PageSize::Legal => (8.5, 14.0),
        PageSize::A3 => (11.69, 16.54),
    }
}

/// Characters per square inch of usable page area.
pub fn font_density(size: FontSize) -> f64 {
    match size {
        FontSize::Small => 180.0,
        FontSize::Medium => 140.0,
        FontSize::Large => 100.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Budget & estimates
// ────────────────────────────────────────────────────────────────────────────

impl SpaceCalculationService {
    /// Converts layout parameters into a space budget.
    pub fn calculate_available_space(&self, constraints: &SpaceConstraints) -> u64 {
        let (width, height) = page_dimensions(constraints.page_size);
        let total_area = width * height * constraints.available_pages as f64;
        let usable_area = total_area * MARGIN_FACTOR;
        let extra_columns = constraints.columns.saturating_sub(1);
        let exponent = i32::try_from(extra_columns).unwrap_or(i32::MAX);
        let column_adjusted = usable_area * COLUMN_GUTTER_FACTOR.powi(exponent);

        let space = (column_adjusted * font_density(constraints.font_size)).floor() as u64;
        debug!(
            pages = constraints.available_pages,
            columns = constraints.columns,
            space,
            "calculated available space"
        );
        space
    }

    /// Space a block of text occupies once formatted.
    pub fn estimate_content_space(&self, text: &str, constraints: &SpaceConstraints) -> u64 {
        let mut characters = text.chars().count() as f64 * CONTENT_OVERHEAD;
        if constraints.columns > 1 {
            characters *= MULTI_COLUMN_OVERHEAD;
        }
        characters.ceil() as u64
    }

    pub fn estimate_subtopic_space(&self, subtopic: &SubTopic, constraints: &SpaceConstraints) -> u64 {
        self.estimate_content_space(&subtopic.content, constraints) + SUBTOPIC_TITLE_OVERHEAD
    }

    /// Space of a whole topic: body, title, every subtopic and its examples.
    pub fn estimate_topic_space(&self, topic: &Topic, constraints: &SpaceConstraints) -> u64 {
        let subtopics: u64 = topic
            .subtopics
            .iter()
            .map(|s| self.estimate_subtopic_space(s, constraints))
            .sum();
        self.estimate_topic_body_space(topic, constraints) + subtopics
    }

    fn estimate_topic_body_space(&self, topic: &Topic, constraints: &SpaceConstraints) -> u64 {
        self.estimate_content_space(&topic.content, constraints)
            + TOPIC_TITLE_OVERHEAD
            + topic.examples.len() as u64 * EXAMPLE_ALLOWANCE
    }

    /// Returns copies of `topics` with every zero `estimated_space` filled in.
    ///
    /// A topic's own estimate excludes its subtopics, which carry theirs separately.
    pub fn with_estimated_spaces(&self, topics: &[Topic], constraints: &SpaceConstraints) -> Vec<Topic> {
        topics
            .iter()
            .map(|topic| {
                let mut topic = topic.clone();
                if topic.estimated_space == 0 {
                    topic.estimated_space = self.estimate_topic_body_space(&topic, constraints);
                }
                for sub in topic.subtopics.iter_mut() {
                    if sub.estimated_space == 0 {
                        sub.estimated_space = self.estimate_subtopic_space(sub, constraints);
                    }
                }
                topic
            })
            .collect()
    }

    /// How many topics the budget comfortably holds, clamped to `[1, topics.len()]`.
    ///
    /// With a reference, the reference's topic count is scaled by the budget
    /// ratio (×0.9 hierarchical, ×1.1 flat). Without one, 85% of the budget is
    /// divided by the priority-weighted average topic space.
    pub fn calculate_optimal_topic_count(
        &self,
        available_space: u64,
        topics: &[Topic],
        reference: Option<&ReferenceFormatAnalysis>,
    ) -> usize {
        if topics.is_empty() {
            return 0;
        }

        let raw = match reference {
            Some(r) if r.content_density > 0.0 => {
                let scaled = (r.topic_count as f64 * available_space as f64 / r.content_density).floor();
                let style_factor = if r.is_hierarchical() { 0.9 } else { 1.1 };
                (scaled * style_factor).floor()
            }
            _ => {
                let average = weighted_average_topic_space(topics);
                if average <= 0.0 {
                    topics.len() as f64
                } else {
                    (available_space as f64 * OPTIMAL_COUNT_FILL / average).floor()
                }
            }
        };

        (raw.max(0.0) as usize).clamp(1, topics.len())
    }
}

/// Σ(space × w) / Σ(w) with high 1.5, medium 1.0, low 0.7.
fn weighted_average_topic_space(topics: &[Topic]) -> f64 {
    let (weighted, weights) = topics.iter().fold((0.0, 0.0), |(ws, w), t| {
        let weight = t.priority.space_weight();
        (ws + t.estimated_space as f64 * weight, w + weight)
    });
    if weights > 0.0 {
        weighted / weights
    } else {
        0.0
    }
}
