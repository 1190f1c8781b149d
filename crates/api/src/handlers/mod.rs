pub mod gallery;
pub mod generation;
pub mod models;
