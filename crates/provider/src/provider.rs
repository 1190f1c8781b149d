//! Provider traits.
//!
//! The tracker only needs [`JobStatusProvider`]; the HTTP handlers use the
//! wider [`GenerationProvider`]. Both are object safe so the API can hold
//! an `Arc<dyn GenerationProvider>` and tests can swap in fakes.

use async_trait::async_trait;
use atelier_core::types::JobId;

use crate::api::{GenerationApi, ProviderError};
use crate::messages::{CreateModelRequest, GenerationStatus, ModelRecord, SubmitGenerationRequest};

/// Answers "what is the status of job X?".
#[async_trait]
pub trait JobStatusProvider: Send + Sync {
    async fn job_status(&self, id: &JobId) -> Result<GenerationStatus, ProviderError>;
}

/// Full provider surface used by the HTTP layer.
#[async_trait]
pub trait GenerationProvider: JobStatusProvider {
    async fn submit_generation(
        &self,
        request: &SubmitGenerationRequest,
    ) -> Result<Vec<JobId>, ProviderError>;

    async fn create_model(&self, request: &CreateModelRequest)
        -> Result<ModelRecord, ProviderError>;

    async fn get_model(&self, id: &str) -> Result<ModelRecord, ProviderError>;

    async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError>;
}

#[async_trait]
impl JobStatusProvider for GenerationApi {
    async fn job_status(&self, id: &JobId) -> Result<GenerationStatus, ProviderError> {
        self.generation_status(id).await
    }
}

#[async_trait]
impl GenerationProvider for GenerationApi {
    async fn submit_generation(
        &self,
        request: &SubmitGenerationRequest,
    ) -> Result<Vec<JobId>, ProviderError> {
        GenerationApi::submit_generation(self, request).await
    }

    async fn create_model(
        &self,
        request: &CreateModelRequest,
    ) -> Result<ModelRecord, ProviderError> {
        GenerationApi::create_model(self, request).await
    }

    async fn get_model(&self, id: &str) -> Result<ModelRecord, ProviderError> {
        GenerationApi::get_model(self, id).await
    }

    async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError> {
        GenerationApi::list_models(self).await
    }
}
