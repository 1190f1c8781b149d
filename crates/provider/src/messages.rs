//! Wire types for the generation provider's REST API.
//!
//! Generation status responses have the shape
//! `{"id": "...", "status": "<kind>", "output_url": "...", "error": "..."}`
//! and are interpreted into a [`StatusObservation`] for the tracker.

use atelier_core::job::StatusObservation;
use atelier_core::training::{ModelKind, ModelStatus};
use atelier_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Generations
// ---------------------------------------------------------------------------

/// Body of `POST /v1/generations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitGenerationRequest {
    /// Public URL of the photo to restyle.
    pub input_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub num_images: u32,
    pub width: u32,
    pub height: u32,
    pub style_strength: f32,
}

/// Response of `POST /v1/generations`: one entry per queued image.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitGenerationResponse {
    pub generations: Vec<SubmittedGeneration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedGeneration {
    pub id: JobId,
    #[serde(default)]
    pub status: Option<ProviderJobStatus>,
}

/// Status values reported by the provider for a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderJobStatus {
    Queued,
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    /// Any status this client does not know yet; treated as in progress.
    #[serde(other)]
    Unknown,
}

/// Response of `GET /v1/generations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub id: JobId,
    pub status: ProviderJobStatus,
    #[serde(default)]
    pub output_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationStatus {
    /// Interpret this response for the completion tracker.
    pub fn observation(&self) -> StatusObservation {
        match self.status {
            ProviderJobStatus::Succeeded => StatusObservation::Succeeded {
                artifact_url: self.output_url.clone(),
            },
            ProviderJobStatus::Failed => StatusObservation::Failed {
                reason: self.error.clone(),
            },
            ProviderJobStatus::Canceled => StatusObservation::Failed {
                reason: Some(self.error.clone().unwrap_or_else(|| "canceled".into())),
            },
            ProviderJobStatus::Queued
            | ProviderJobStatus::Starting
            | ProviderJobStatus::Processing
            | ProviderJobStatus::Unknown => StatusObservation::InProgress,
        }
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Body of `POST /v1/models`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateModelRequest {
    pub name: String,
    pub kind: ModelKind,
    pub image_urls: Vec<String>,
}

/// A trained (or training) custom model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    pub name: String,
    pub kind: ModelKind,
    pub status: ModelStatus,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /v1/models`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelRecord>,
}

/// Parse a generation status body.
pub fn parse_status(text: &str) -> Result<GenerationStatus, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_succeeded_status() {
        let json = r#"{"id":"gen-1","status":"succeeded","output_url":"https://cdn.x/1.png"}"#;
        let status = parse_status(json).unwrap();
        assert_eq!(status.id, JobId::from("gen-1"));
        assert_eq!(
            status.observation(),
            StatusObservation::Succeeded {
                artifact_url: Some("https://cdn.x/1.png".into())
            }
        );
    }

    #[test]
    fn parse_failed_status_carries_error() {
        let json = r#"{"id":"gen-1","status":"failed","error":"content filtered"}"#;
        let status = parse_status(json).unwrap();
        assert_eq!(
            status.observation(),
            StatusObservation::Failed {
                reason: Some("content filtered".into())
            }
        );
    }

    #[test]
    fn canceled_is_failure() {
        let json = r#"{"id":"gen-1","status":"canceled"}"#;
        match parse_status(json).unwrap().observation() {
            StatusObservation::Failed { reason } => assert_eq!(reason.as_deref(), Some("canceled")),
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn in_progress_states() {
        for raw in ["queued", "starting", "processing"] {
            let json = format!(r#"{{"id":"g","status":"{raw}"}}"#);
            assert_eq!(
                parse_status(&json).unwrap().observation(),
                StatusObservation::InProgress
            );
        }
    }

    #[test]
    fn unknown_status_is_in_progress() {
        let json = r#"{"id":"g","status":"warming_up"}"#;
        let status = parse_status(json).unwrap();
        assert_eq!(status.status, ProviderJobStatus::Unknown);
        assert_eq!(status.observation(), StatusObservation::InProgress);
    }

    #[test]
    fn parse_submit_response() {
        let json = r#"{"generations":[{"id":"a","status":"queued"},{"id":"b"}]}"#;
        let resp: SubmitGenerationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.generations.len(), 2);
        assert_eq!(resp.generations[0].status, Some(ProviderJobStatus::Queued));
        assert!(resp.generations[1].status.is_none());
    }

    #[test]
    fn submit_request_omits_absent_fields() {
        let req = SubmitGenerationRequest {
            input_image_url: "https://x/in.png".into(),
            model_id: None,
            prompt: None,
            num_images: 2,
            width: 1024,
            height: 768,
            style_strength: 0.5,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("model_id").is_none());
        assert_eq!(json["num_images"], 2);
    }

    #[test]
    fn parse_model_record() {
        let json = r#"{"id":"m1","name":"Ink","kind":"style","status":"training"}"#;
        let model: ModelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(model.kind, ModelKind::Style);
        assert_eq!(model.status, ModelStatus::Training);
        assert!(model.created_at.is_none());
    }

    #[test]
    fn model_list_tolerates_new_statuses() {
        let json = r#"{"models":[
            {"id":"m1","name":"Ink","kind":"style","status":"ready"},
            {"id":"m2","name":"Pet","kind":"object","status":"canceled"}
        ]}"#;
        let list: ModelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.models.len(), 2);
        assert_eq!(list.models[1].status, ModelStatus::Unknown);
    }

    #[test]
    fn parse_invalid_json_returns_error() {
        assert!(parse_status("not json at all").is_err());
    }
}
