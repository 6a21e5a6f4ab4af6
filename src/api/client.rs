//! Synchronous HTTP client for the emotion-classification service.
//!
//! Talks to the service's JSON API (default `http://localhost:5000`) using
//! `ureq`. Provides:
//!
//! - **Single prediction**: `POST /predict`
//! - **Batch prediction**: `POST /predict/batch`
//! - **Model metadata**: `GET /model/info`
//! - **Health check**: `GET /health`
//! - **Label catalog**: `GET /emotions`
//!
//! All failure modes — network error, non-2xx status, unparseable body —
//! are normalized to a single `anyhow` error carrying a message. A non-2xx
//! response with a parseable `{ "error": ... }` body surfaces that message
//! verbatim; otherwise a per-operation default is substituted. Callers
//! distinguish failures by message only.
//!
//! The client holds no state between calls and performs no retries or
//! input validation: empty-input guards live at the call site.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::Deserialize;

use super::types::{
    BatchItem, BatchResult, EmotionCatalog, EmotionScores, HealthStatus, ModelInfo, Prediction,
};
use crate::config::EmoscopeConfig;

// ---------------------------------------------------------------------------
// Default failure messages, per operation
// ---------------------------------------------------------------------------

const ERR_PREDICT: &str = "Failed to predict emotion";
const ERR_PREDICT_BATCH: &str = "Failed to predict emotions";
const ERR_MODEL_INFO: &str = "Failed to get model info";
const ERR_HEALTH: &str = "Failed to get health status";
const ERR_EMOTIONS: &str = "Failed to get emotions";

// ---------------------------------------------------------------------------
// Raw wire shapes
// ---------------------------------------------------------------------------

/// Optional error envelope carried by non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// One entry of the raw batch response. Unlike the single-prediction
/// endpoint, batch entries carry neither `original_text` nor `timestamp`;
/// the client fills those in from the submitted texts and the envelope.
#[derive(Debug, Deserialize)]
struct RawBatchItem {
    predicted_emotion: String,
    confidence: f64,
    all_emotions: EmotionScores,
    #[serde(default)]
    processed_text: String,
    #[serde(default)]
    error: Option<String>,
    index: usize,
}

/// Raw envelope of `POST /predict/batch`.
#[derive(Debug, Deserialize)]
struct RawBatchResponse {
    predictions: Vec<RawBatchItem>,
    total_texts: usize,
    timestamp: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the classification service.
///
/// Created from the resolved config and reused for the lifetime of a single
/// invocation. Holds no state between calls.
#[derive(Debug)]
pub struct EmotionClient {
    base_url: String,
    timeout: Duration,
}

impl EmotionClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &EmoscopeConfig) -> Self {
        Self::new(&config.api.base_url, Duration::from_millis(config.api.timeout_ms))
    }

    /// Build a client for an explicit base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Predict the emotion of a single text via `POST /predict`.
    ///
    /// The caller is responsible for rejecting empty/whitespace-only input
    /// before issuing the call.
    pub fn predict_single(&self, text: &str) -> Result<Prediction> {
        let resp = ureq::post(&self.endpoint("/predict"))
            .timeout(self.timeout)
            .send_json(serde_json::json!({ "text": text }))
            .map_err(|e| normalize_error(e, ERR_PREDICT))?;

        resp.into_json::<Prediction>().map_err(|_| anyhow!(ERR_PREDICT))
    }

    /// Predict emotions for a batch of texts via `POST /predict/batch`.
    ///
    /// `texts` must already be filtered of blank entries and non-empty.
    /// The response is checked against the submission: one prediction per
    /// text, in submitted order, each tagged with its 0-based index.
    pub fn predict_batch(&self, texts: &[String]) -> Result<BatchResult> {
        let resp = ureq::post(&self.endpoint("/predict/batch"))
            .timeout(self.timeout)
            .send_json(serde_json::json!({ "texts": texts }))
            .map_err(|e| normalize_error(e, ERR_PREDICT_BATCH))?;

        let raw: RawBatchResponse = resp
            .into_json()
            .map_err(|_| anyhow!(ERR_PREDICT_BATCH))?;

        if raw.predictions.len() != raw.total_texts || raw.total_texts != texts.len() {
            bail!(
                "batch response is inconsistent: {} predictions for {} submitted texts",
                raw.predictions.len(),
                texts.len()
            );
        }

        let timestamp = raw.timestamp;
        let mut predictions = Vec::with_capacity(raw.predictions.len());
        for (position, item) in raw.predictions.into_iter().enumerate() {
            if item.index != position {
                bail!(
                    "batch response out of order: entry {} carries index {}",
                    position,
                    item.index
                );
            }
            predictions.push(BatchItem {
                prediction: Prediction {
                    original_text: texts[position].clone(),
                    processed_text: item.processed_text,
                    predicted_emotion: item.predicted_emotion,
                    confidence: item.confidence,
                    all_emotions: item.all_emotions,
                    timestamp: timestamp.clone(),
                    error: item.error,
                },
                index: item.index,
            });
        }

        Ok(BatchResult {
            total_texts: predictions.len(),
            predictions,
            timestamp,
        })
    }

    /// Fetch metadata about the loaded model via `GET /model/info`.
    pub fn model_info(&self) -> Result<ModelInfo> {
        let resp = ureq::get(&self.endpoint("/model/info"))
            .timeout(self.timeout)
            .call()
            .map_err(|e| normalize_error(e, ERR_MODEL_INFO))?;

        resp.into_json::<ModelInfo>().map_err(|_| anyhow!(ERR_MODEL_INFO))
    }

    /// Check service health via `GET /health`.
    pub fn health(&self) -> Result<HealthStatus> {
        let resp = ureq::get(&self.endpoint("/health"))
            .timeout(self.timeout)
            .call()
            .map_err(|e| normalize_error(e, ERR_HEALTH))?;

        resp.into_json::<HealthStatus>().map_err(|_| anyhow!(ERR_HEALTH))
    }

    /// Fetch the supported label catalog via `GET /emotions`.
    pub fn emotions(&self) -> Result<EmotionCatalog> {
        let resp = ureq::get(&self.endpoint("/emotions"))
            .timeout(self.timeout)
            .call()
            .map_err(|e| normalize_error(e, ERR_EMOTIONS))?;

        resp.into_json::<EmotionCatalog>().map_err(|_| anyhow!(ERR_EMOTIONS))
    }

    /// Return the configured base URL (for display).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let url = format!("{}{}", self.base_url, path);
        // On Windows, "localhost" may try IPv6 (::1) first, causing delays
        // when the service only binds to IPv4. Use 127.0.0.1 directly.
        url.replace("://localhost", "://127.0.0.1")
    }
}

/// Normalize a `ureq` failure into the uniform message-carrying error.
///
/// Non-2xx responses with a parseable `{ "error": ... }` body surface that
/// message exactly; anything else falls back to the operation's default.
fn normalize_error(err: ureq::Error, default_msg: &str) -> anyhow::Error {
    match err {
        ureq::Error::Status(_, resp) => match resp.into_json::<ErrorBody>() {
            Ok(ErrorBody { error: Some(msg) }) if !msg.is_empty() => anyhow!(msg),
            _ => anyhow!("{default_msg}"),
        },
        ureq::Error::Transport(transport) => anyhow!("{default_msg}: {transport}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
