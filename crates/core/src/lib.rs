//! Domain logic for the Atelier image service.
//!
//! Pure types and functions only: the generation job state machine,
//! parameter validation, gallery merging and hashing. Network and
//! storage access live in `atelier-provider` and `atelier-storage`.

pub mod error;
pub mod gallery;
pub mod generation;
pub mod hashing;
pub mod image_probe;
pub mod job;
pub mod training;
pub mod types;
