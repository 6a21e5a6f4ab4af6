//! Typed client for the emotion-classification HTTP API.
//!
//! [`client`] holds the `ureq`-based [`client::EmotionClient`]; [`types`]
//! holds the validated response entities shared with the history store.

pub mod client;
pub mod types;

pub use client::EmotionClient;
pub use types::{BatchItem, BatchResult, EmotionCatalog, HealthStatus, ModelInfo, Prediction};
