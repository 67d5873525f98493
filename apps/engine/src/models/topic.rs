use serde::{Deserialize, Serialize};

/// Priority tier assigned upstream to a topic or subtopic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Weight used by every ranking formula (topic score, fit score, relevance).
    pub fn scoring_weight(self) -> f64 {
        match self {
            Priority::High => 1.0,
            Priority::Medium => 0.6,
            Priority::Low => 0.3,
        }
    }

    /// Weight used when averaging per-topic space for the optimal topic count.
    pub fn space_weight(self) -> f64 {
        match self {
            Priority::High => 1.5,
            Priority::Medium => 1.0,
            Priority::Low => 0.7,
        }
    }

    /// Sort key: high first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// A subtopic, owned by exactly one parent `Topic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub confidence: f64,
    /// Space of the subtopic body in space units.
    #[serde(default)]
    pub estimated_space: u64,
}

/// A candidate unit of content produced by the upstream extraction step.
///
/// `estimated_space` covers the topic's own body (title, content, examples).
/// Subtopic space is carried on each `SubTopic` and added on selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub subtopics: Vec<SubTopic>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub estimated_space: u64,
    #[serde(default)]
    pub source_files: Vec<String>,
    /// Worked examples or figures attached to the topic.
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Topic {
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn subtopic(&self, id: &str) -> Option<&SubTopic> {
        self.subtopics.iter().find(|s| s.id == id)
    }

    /// Confidence clamped to [0, 1]; NaN counts as 0.
    pub fn confidence_score(&self) -> f64 {
        clamp_confidence(self.confidence)
    }
}

impl SubTopic {
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn confidence_score(&self) -> f64 {
        clamp_confidence(self.confidence)
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One element of a selection: a topic plus the subtopics chosen under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSelection {
    pub topic_id: String,
    #[serde(default)]
    pub subtopic_ids: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Aggregate space of the topic body plus its chosen subtopics.
    #[serde(default)]
    pub estimated_space: u64,
}

impl TopicSelection {
    /// Builds a selection entry for `topic` with the given subtopics, summing their space.
    pub fn from_topic(topic: &Topic, subtopic_ids: Vec<String>) -> Self {
        let sub_space = subtopic_ids
            .iter()
            .filter_map(|id| topic.subtopic(id))
            .fold(0u64, |acc, s| acc.saturating_add(s.estimated_space));
        Self {
            topic_id: topic.id.clone(),
            priority: topic.priority,
            estimated_space: topic.estimated_space.saturating_add(sub_space),
            subtopic_ids,
        }
    }
}

/// Total space consumed by a selection.
pub fn selection_space(selection: &[TopicSelection]) -> u64 {
    selection
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.estimated_space))
}

/// Finds the topic a selection entry refers to.
pub fn find_topic<'a>(topics: &'a [Topic], id: &str) -> Option<&'a Topic> {
    topics.iter().find(|t| t.id == id)
}
