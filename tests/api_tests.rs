//! Integration tests for the prediction client against a mock service.
//!
//! Each test spins up a `tiny_http` server on an ephemeral port, queues
//! one or more canned responses, and points an `EmotionClient` at it.
//! Unit tests for URL handling live in the client's `#[cfg(test)]` block.

use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server, StatusCode};

use emoscope::api::EmotionClient;
use emoscope::history::{HistoryStore, RecordKind};
use emoscope::ranking;

/// Start a mock service that answers the next `responses.len()` requests
/// in order, then shuts down. Returns the base URL.
fn spawn_service(responses: Vec<(u16, String)>) -> String {
    let server = Server::http("127.0.0.1:0").expect("bind mock server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("mock server has a TCP address")
        .port();

    thread::spawn(move || {
        for (status, body) in responses {
            let Ok(request) = server.recv() else { return };
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("static header");
            let response = Response::from_string(body)
                .with_status_code(StatusCode(status))
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    format!("http://127.0.0.1:{port}")
}

fn client_for(base_url: &str) -> EmotionClient {
    EmotionClient::new(base_url, Duration::from_secs(5))
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

#[test]
fn error_body_message_is_surfaced_verbatim() {
    let url = spawn_service(vec![(500, r#"{"error":"model unavailable"}"#.to_string())]);
    let err = client_for(&url).predict_single("x").unwrap_err();
    assert_eq!(err.to_string(), "model unavailable");
}

#[test]
fn unparseable_error_body_falls_back_to_default() {
    let url = spawn_service(vec![(500, "<html>boom</html>".to_string())]);
    let err = client_for(&url).predict_single("x").unwrap_err();
    assert_eq!(err.to_string(), "Failed to predict emotion");
}

#[test]
fn batch_uses_its_own_default_message() {
    let url = spawn_service(vec![(500, "nonsense".to_string())]);
    let err = client_for(&url)
        .predict_batch(&["a".to_string()])
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to predict emotions");
}

#[test]
fn error_body_without_error_field_falls_back_to_default() {
    let url = spawn_service(vec![(400, r#"{"detail":"nope"}"#.to_string())]);
    let err = client_for(&url).model_info().unwrap_err();
    assert_eq!(err.to_string(), "Failed to get model info");
}

#[test]
fn success_payload_missing_required_fields_is_a_failure() {
    // 200 but the body lacks confidence/all_emotions — schema validation
    // must reject it rather than hand back a half-built result.
    let url = spawn_service(vec![(200, r#"{"predicted_emotion":"joy"}"#.to_string())]);
    let err = client_for(&url).predict_single("x").unwrap_err();
    assert_eq!(err.to_string(), "Failed to predict emotion");
}

// ---------------------------------------------------------------------------
// Successful round trips
// ---------------------------------------------------------------------------

#[test]
fn single_prediction_parses_full_payload() {
    let body = r#"{
        "predicted_emotion": "joy",
        "confidence": 0.82,
        "all_emotions": {"joy": 0.82, "surprise": 0.10, "neutral": 0.08},
        "processed_text": "i am thrilled today",
        "original_text": "I am thrilled today!",
        "timestamp": "2026-08-25T12:00:00"
    }"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let prediction = client_for(&url)
        .predict_single("I am thrilled today!")
        .unwrap();

    assert_eq!(prediction.predicted_emotion, "joy");
    assert!((prediction.confidence - 0.82).abs() < f64::EPSILON);
    assert_eq!(prediction.all_emotions.len(), 3);
    assert!(!prediction.is_degraded());
}

#[test]
fn batch_preserves_submitted_order_and_fills_context() {
    let body = r#"{
        "predictions": [
            {"predicted_emotion": "joy", "confidence": 0.9,
             "all_emotions": {"joy": 0.9, "neutral": 0.1},
             "processed_text": "great", "index": 0},
            {"predicted_emotion": "anger", "confidence": 0.7,
             "all_emotions": {"anger": 0.7, "neutral": 0.3},
             "processed_text": "awful", "index": 1}
        ],
        "total_texts": 2,
        "timestamp": "2026-08-25T12:00:00"
    }"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let texts = vec!["Great!".to_string(), "Awful!".to_string()];
    let result = client_for(&url).predict_batch(&texts).unwrap();

    assert_eq!(result.total_texts, 2);
    assert_eq!(result.predictions.len(), 2);
    for (position, item) in result.predictions.iter().enumerate() {
        assert_eq!(item.index, position);
        assert_eq!(item.prediction.original_text, texts[position]);
        assert_eq!(item.prediction.timestamp, "2026-08-25T12:00:00");
    }
    assert_eq!(result.predictions[0].prediction.predicted_emotion, "joy");
    assert_eq!(result.predictions[1].prediction.predicted_emotion, "anger");
}

#[test]
fn batch_out_of_order_indices_are_rejected() {
    let body = r#"{
        "predictions": [
            {"predicted_emotion": "joy", "confidence": 0.9,
             "all_emotions": {"joy": 0.9}, "index": 1},
            {"predicted_emotion": "anger", "confidence": 0.7,
             "all_emotions": {"anger": 0.7}, "index": 0}
        ],
        "total_texts": 2,
        "timestamp": "2026-08-25T12:00:00"
    }"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let texts = vec!["a".to_string(), "b".to_string()];
    let err = client_for(&url).predict_batch(&texts).unwrap_err();
    assert!(err.to_string().contains("out of order"));
}

#[test]
fn batch_count_mismatch_is_rejected() {
    let body = r#"{
        "predictions": [
            {"predicted_emotion": "joy", "confidence": 0.9,
             "all_emotions": {"joy": 0.9}, "index": 0}
        ],
        "total_texts": 1,
        "timestamp": "2026-08-25T12:00:00"
    }"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let texts = vec!["a".to_string(), "b".to_string()];
    let err = client_for(&url).predict_batch(&texts).unwrap_err();
    assert!(err.to_string().contains("inconsistent"));
}

#[test]
fn model_info_and_health_parse() {
    let info_body = r#"{
        "model_name": "LogisticRegression (tuned)",
        "available_emotions": ["anger", "fear", "joy", "love", "sadness", "surprise"],
        "total_emotions": 6,
        "model_type": "LogisticRegression"
    }"#;
    let health_body = r#"{
        "status": "healthy",
        "timestamp": "2026-08-25T12:00:00",
        "model_loaded": true
    }"#;
    let url = spawn_service(vec![(200, info_body.to_string()), (200, health_body.to_string())]);
    let client = client_for(&url);

    let info = client.model_info().unwrap();
    assert_eq!(info.total_emotions, 6);
    assert_eq!(info.available_emotions.len(), 6);

    let health = client.health().unwrap();
    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);
}

#[test]
fn emotion_catalog_parses() {
    let body = r#"{"emotions": ["anger", "joy", "sadness"], "count": 3}"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let catalog = client_for(&url).emotions().unwrap();
    assert_eq!(catalog.count, 3);
    assert_eq!(catalog.emotions, vec!["anger", "joy", "sadness"]);
}

#[test]
fn degraded_prediction_is_flagged_not_failed() {
    // The service reports per-text failures inside a 200 response.
    let body = r#"{
        "predicted_emotion": "neutral",
        "confidence": 0.0,
        "all_emotions": {},
        "original_text": "...",
        "timestamp": "2026-08-25T12:00:00",
        "error": "Text is empty after preprocessing"
    }"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let prediction = client_for(&url).predict_single("...").unwrap();
    assert!(prediction.is_degraded());
    assert_eq!(
        prediction.error.as_deref(),
        Some("Text is empty after preprocessing")
    );
}

// ---------------------------------------------------------------------------
// End-to-end: predict → rank → record
// ---------------------------------------------------------------------------

#[test]
fn thrilled_text_flows_from_service_to_history_head() {
    let body = r#"{
        "predicted_emotion": "joy",
        "confidence": 0.82,
        "all_emotions": {"joy": 0.82, "surprise": 0.10, "neutral": 0.08},
        "processed_text": "i am thrilled today",
        "original_text": "I am thrilled today!",
        "timestamp": "2026-08-25T12:00:00"
    }"#;
    let url = spawn_service(vec![(200, body.to_string())]);

    let prediction = client_for(&url)
        .predict_single("I am thrilled today!")
        .unwrap();

    let ranking = ranking::rank(&prediction.all_emotions).unwrap();
    assert_eq!(ranking.headline().label, "joy");
    assert!((ranking.headline().score - 0.82).abs() < f64::EPSILON);
    assert!((ranking.headline().relative_width - 100.0).abs() < f64::EPSILON);
    assert_eq!(prediction.predicted_emotion, ranking.headline().label);

    let mut store = HistoryStore::ephemeral();
    let id = store.append(prediction, RecordKind::Single).id.clone();

    let head = &store.records()[0];
    assert_eq!(head.id, id);
    assert_eq!(head.kind, RecordKind::Single);
    assert_eq!(head.prediction.original_text, "I am thrilled today!");
}
