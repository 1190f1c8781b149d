//! Custom model training: model kinds, lifecycle status, and validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MIN_TRAINING_IMAGES: usize = 1;
pub const MAX_TRAINING_IMAGES: usize = 20;
pub const MAX_MODEL_NAME_LEN: usize = 100;

/// What a trained model learns to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Style,
    Person,
    Object,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Style, ModelKind::Person, ModelKind::Object];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Person => "person",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid model kind '{s}'. Must be one of: style, person, object"
                ))
            })
    }
}

/// Training lifecycle reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Queued,
    Training,
    Ready,
    Failed,
    /// A status this client does not know yet; treated as still training.
    #[serde(other)]
    Unknown,
}

impl ModelStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

pub fn validate_model_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Model name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_MODEL_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Model name must be at most {MAX_MODEL_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_training_image_count(count: usize) -> Result<(), CoreError> {
    if (MIN_TRAINING_IMAGES..=MAX_TRAINING_IMAGES).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Training needs between {MIN_TRAINING_IMAGES} and {MAX_TRAINING_IMAGES} images, got {count}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_known_values() {
        assert_eq!("style".parse::<ModelKind>().unwrap(), ModelKind::Style);
        assert_eq!(" person ".parse::<ModelKind>().unwrap(), ModelKind::Person);
        assert_eq!("object".parse::<ModelKind>().unwrap(), ModelKind::Object);
    }

    #[test]
    fn kind_rejects_unknown_value() {
        assert!("landscape".parse::<ModelKind>().is_err());
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ModelKind::Person).unwrap(), "\"person\"");
    }

    #[test]
    fn status_terminal() {
        assert!(ModelStatus::Ready.is_terminal());
        assert!(ModelStatus::Failed.is_terminal());
        assert!(!ModelStatus::Training.is_terminal());
        assert!(!ModelStatus::Unknown.is_terminal());
    }

    #[test]
    fn unrecognized_status_deserializes_as_unknown() {
        let status: ModelStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(status, ModelStatus::Unknown);
        let status: ModelStatus = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(status, ModelStatus::Ready);
    }

    #[test]
    fn name_validation() {
        assert!(validate_model_name("Watercolor").is_ok());
        assert!(validate_model_name("   ").is_err());
        assert!(validate_model_name(&"x".repeat(MAX_MODEL_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn image_count_validation() {
        assert!(validate_training_image_count(0).is_err());
        assert!(validate_training_image_count(1).is_ok());
        assert!(validate_training_image_count(MAX_TRAINING_IMAGES).is_ok());
        assert!(validate_training_image_count(MAX_TRAINING_IMAGES + 1).is_err());
    }
}
