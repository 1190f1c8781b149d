#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Every job in a batch reached the `Failed` state.
    #[error("All {count} generations failed")]
    AllGenerationsFailed { count: usize },

    /// The polling budget ran out with no successful job.
    #[error("Generation is taking too long ({pending} still pending after {attempts} attempts)")]
    GenerationTimedOut { pending: usize, attempts: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}
