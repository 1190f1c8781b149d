//! Client library for the external generative-image API.
//!
//! Provides typed wire messages, an HTTP client ([`api::GenerationApi`]),
//! the provider traits the rest of the service depends on, the batch
//! completion tracker, and best-effort artifact promotion.

pub mod api;
pub mod messages;
pub mod promotion;
pub mod provider;
pub mod tracker;

pub use api::{GenerationApi, ProviderError};
pub use provider::{GenerationProvider, JobStatusProvider};
pub use tracker::{BatchTracker, TrackerConfig};
