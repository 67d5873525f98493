use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    A4,
    Letter,
    Legal,
    A3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

/// Physical description of the output target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceConstraints {
    pub available_pages: u32,
    pub page_size: PageSize,
    pub font_size: FontSize,
    pub columns: u32,
    /// Fraction of the budget the allocator aims to fill, in (0, 1].
    #[serde(default = "default_target_utilization")]
    pub target_utilization: f64,
}

pub const DEFAULT_TARGET_UTILIZATION: f64 = 0.85;

fn default_target_utilization() -> f64 {
    DEFAULT_TARGET_UTILIZATION
}

impl SpaceConstraints {
    /// Builds validated constraints with the default target utilization.
    pub fn new(
        available_pages: u32,
        page_size: PageSize,
        font_size: FontSize,
        columns: u32,
    ) -> Result<Self, EngineError> {
        let constraints = Self {
            available_pages,
            page_size,
            font_size,
            columns,
            target_utilization: DEFAULT_TARGET_UTILIZATION,
        };
        constraints.validate()?;
        Ok(constraints)
    }

    pub fn with_target_utilization(mut self, target: f64) -> Result<Self, EngineError> {
        self.target_utilization = target;
        self.validate()?;
        Ok(self)
    }

    /// Checks the invariants deserialized or hand-built constraints must hold.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.available_pages == 0 {
            return Err(EngineError::InvalidConstraints(
                "available_pages must be at least 1".to_string(),
            ));
        }
        if self.columns == 0 {
            return Err(EngineError::InvalidConstraints(
                "columns must be at least 1".to_string(),
            ));
        }
        if !(self.target_utilization > 0.0 && self.target_utilization <= 1.0) {
            return Err(EngineError::InvalidConstraints(format!(
                "target_utilization must be in (0, 1], got {}",
                self.target_utilization
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStyle {
    Hierarchical,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPattern {
    SingleColumn,
    MultiColumn,
}

/// Density and organization statistics of a reference document.
///
/// Only biases targets; the engine never modifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFormatAnalysis {
    /// Characters per available-space unit of the reference.
    pub content_density: f64,
    pub topic_count: u32,
    pub average_topic_length: f64,
    pub organization_style: OrganizationStyle,
    pub layout_pattern: LayoutPattern,
}

impl ReferenceFormatAnalysis {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.content_density.is_finite() || self.content_density < 0.0 {
            return Err(EngineError::InvalidReference(format!(
                "content_density must be a non-negative number, got {}",
                self.content_density
            )));
        }
        if !self.average_topic_length.is_finite() || self.average_topic_length < 0.0 {
            return Err(EngineError::InvalidReference(format!(
                "average_topic_length must be a non-negative number, got {}",
                self.average_topic_length
            )));
        }
        Ok(())
    }

    pub fn is_hierarchical(&self) -> bool {
        self.organization_style == OrganizationStyle::Hierarchical
    }

    pub fn is_multi_column(&self) -> bool {
        self.layout_pattern == LayoutPattern::MultiColumn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_pages() {
        let err = SpaceConstraints::new(0, PageSize::A4, FontSize::Medium, 1).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConstraints(_)));
    }

    #[test]
    fn test_new_rejects_zero_columns() {
        assert!(SpaceConstraints::new(1, PageSize::Letter, FontSize::Small, 0).is_err());
    }

    #[test]
    fn test_target_utilization_bounds() {
        let base = SpaceConstraints::new(1, PageSize::A4, FontSize::Medium, 1).unwrap();
        assert!(base.clone().with_target_utilization(1.0).is_ok());
        assert!(base.clone().with_target_utilization(0.0).is_err());
        assert!(base.with_target_utilization(1.2).is_err());
    }

    #[test]
    fn test_deserialize_defaults_target_utilization() {
        let json = r#"{"available_pages": 2, "page_size": "a4", "font_size": "medium", "columns": 1}"#;
        let constraints: SpaceConstraints = serde_json::from_str(json).unwrap();
        assert_eq!(constraints.target_utilization, 0.85);
        assert!(constraints.validate().is_ok());
    }

    #[test]
    fn test_layout_pattern_is_kebab_case() {
        let json = serde_json::to_string(&LayoutPattern::MultiColumn).unwrap();
        assert_eq!(json, "\"multi-column\"");
    }

    #[test]
    fn test_reference_rejects_negative_density() {
        let reference = ReferenceFormatAnalysis {
            content_density: -1.0,
            topic_count: 4,
            average_topic_length: 300.0,
            organization_style: OrganizationStyle::Flat,
            layout_pattern: LayoutPattern::SingleColumn,
        };
        assert!(matches!(
            reference.validate(),
            Err(EngineError::InvalidReference(_))
        ));
    }
}
