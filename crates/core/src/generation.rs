//! Generation parameter constants, defaults, and validation.
//!
//! One user action submits `count` generations that all share the same
//! input photo, model and parameters.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits and defaults
// ---------------------------------------------------------------------------

/// Smallest number of images per submission.
pub const MIN_COUNT: u32 = 1;
/// Largest number of images per submission (also the largest batch).
pub const MAX_COUNT: u32 = 4;

/// Output dimensions must fall in this range (pixels).
pub const MIN_DIMENSION: u32 = 256;
pub const MAX_DIMENSION: u32 = 2048;
/// Output dimensions must be a multiple of this step.
pub const DIMENSION_STEP: u32 = 8;
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Default blend between the input photo and the trained style.
pub const DEFAULT_STYLE_STRENGTH: f32 = 0.8;

pub const MAX_PROMPT_LEN: usize = 1000;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters shared by every job in one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub count: u32,
    pub width: u32,
    pub height: u32,
    /// How strongly the trained model restyles the input, in `[0, 1]`.
    pub style_strength: f32,
    pub model_id: Option<String>,
    pub prompt: Option<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            count: MIN_COUNT,
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            style_strength: DEFAULT_STYLE_STRENGTH,
            model_id: None,
            prompt: None,
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_count(self.count)?;
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)?;
        validate_style_strength(self.style_strength)?;
        if let Some(prompt) = &self.prompt {
            validate_prompt(prompt)?;
        }
        if let Some(model_id) = &self.model_id {
            if model_id.trim().is_empty() {
                return Err(CoreError::Validation("model_id must not be blank".into()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub fn validate_count(count: u32) -> Result<(), CoreError> {
    if (MIN_COUNT..=MAX_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "count must be between {MIN_COUNT} and {MAX_COUNT}, got {count}"
        )))
    }
}

/// Validate one output dimension (`field` is used in the message).
pub fn validate_dimension(field: &str, value: u32) -> Result<(), CoreError> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between {MIN_DIMENSION} and {MAX_DIMENSION}, got {value}"
        )));
    }
    if value % DIMENSION_STEP != 0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a multiple of {DIMENSION_STEP}, got {value}"
        )));
    }
    Ok(())
}

pub fn validate_style_strength(value: f32) -> Result<(), CoreError> {
    // NaN fails the range check.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "style_strength must be between 0 and 1, got {value}"
        )))
    }
}

pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(CoreError::Validation(format!(
            "prompt must be at most {MAX_PROMPT_LEN} characters"
        )));
    }
    Ok(())
}

/// Snap a source-image dimension to the nearest valid output dimension
/// at or below it, clamped to the allowed range.
pub fn fit_dimension(raw: u32) -> u32 {
    let snapped = raw - raw % DIMENSION_STEP;
    snapped.clamp(MIN_DIMENSION, MAX_DIMENSION)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
