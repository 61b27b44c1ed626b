//! Cross-cutting plumbing shared by Hapa services: configuration loading,
//! tracing, HTTP layers, health handlers and serde helpers.

pub mod config;
pub mod health;
pub mod layers;
pub mod serde;
pub mod tracing;
