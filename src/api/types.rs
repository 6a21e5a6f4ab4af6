//! Validated entities built from the classification service's responses.
//!
//! Wire payloads are structurally loose (the service may omit per-item
//! fields on batch responses, and degraded predictions carry an `error`
//! string instead of meaningful scores). The raw shapes live in
//! [`super::client`]; everything here is fully populated and safe to
//! render or persist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-label confidence scores in `[0, 1]`.
///
/// Multi-label: the values are not guaranteed to sum to 1. A `BTreeMap`
/// keeps iteration deterministic (lexicographic by label), which the
/// ranking step relies on for stable tie-breaking.
pub type EmotionScores = BTreeMap<String, f64>;

/// A completed prediction for one text.
///
/// When `error` is set the remaining fields are placeholders from the
/// service's degraded path and must not be rendered as a successful
/// result or appended to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub original_text: String,
    #[serde(default)]
    pub processed_text: String,
    pub predicted_emotion: String,
    pub confidence: f64,
    pub all_emotions: EmotionScores,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Prediction {
    /// Whether the service reported a per-text failure instead of scores.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// One entry of a batch response, tagged with its 0-based submission index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub index: usize,
}

/// A full batch response. `predictions` preserves submission order and
/// `predictions.len() == total_texts` (checked by the client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub predictions: Vec<BatchItem>,
    pub total_texts: usize,
    pub timestamp: String,
}

/// Response of `GET /model/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub available_emotions: Vec<String>,
    pub total_emotions: usize,
    pub model_type: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub model_loaded: bool,
}

/// Response of `GET /emotions` — the label catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionCatalog {
    pub emotions: Vec<String>,
    pub count: usize,
}
