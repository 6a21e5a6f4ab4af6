//! Durable local store of past predictions.
//!
//! The store owns an ordered sequence of [`HistoryRecord`], newest first,
//! bounded at [`CAPACITY`] entries. Records are created only through
//! [`HistoryStore::append`], never mutated afterwards, and destroyed only
//! through [`HistoryStore::remove_by_id`] or [`HistoryStore::clear`].
//!
//! State persists as a single JSON document (`~/.emoscope/history.json`)
//! rewritten on every mutation. Loading tolerates a missing or corrupt
//! file by starting empty — persistence problems never surface to the
//! user. A store opened without a path is ephemeral.

use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::types::Prediction;

/// Maximum number of retained records. Appending past the cap evicts the
/// oldest (tail) records.
pub const CAPACITY: usize = 100;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// How a record entered the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// From a single-text analysis.
    #[serde(rename = "single")]
    Single,
    /// One member of a batch analysis.
    #[serde(rename = "batch")]
    BatchMember,
}

/// A persisted, immutable snapshot of one past prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Opaque unique identifier, assigned on append.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(flatten)]
    pub prediction: Prediction,
}

/// Snapshot document produced by [`HistoryStore::export`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    pub timestamp: String,
    pub total_predictions: usize,
    pub predictions: Vec<HistoryRecord>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Sole owner of the persisted prediction history.
///
/// Mutations take `&mut self`, so two operations can never interleave
/// against a stale snapshot within one process.
#[derive(Debug)]
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Open the store backed by the given file, or ephemeral if `None`.
    ///
    /// A missing or unparseable file yields an empty store; it is never an
    /// error.
    pub fn open(path: Option<PathBuf>) -> Self {
        let records = path.as_deref().map(load_records).unwrap_or_default();
        Self { records, path }
    }

    /// An in-memory store with no backing file.
    pub fn ephemeral() -> Self {
        Self {
            records: Vec::new(),
            path: None,
        }
    }

    /// Append a prediction as a new record at the head of the sequence.
    ///
    /// Generates the record's id, evicts tail records past [`CAPACITY`],
    /// and persists. Returns the stored record.
    pub fn append(&mut self, prediction: Prediction, kind: RecordKind) -> &HistoryRecord {
        let record = HistoryRecord {
            id: Uuid::new_v4().to_string(),
            kind,
            prediction,
        };
        self.records.insert(0, record);
        self.evict_over_capacity();
        self.persist();
        &self.records[0]
    }

    /// Drop tail (oldest) records until the length invariant holds again.
    fn evict_over_capacity(&mut self) {
        while self.records.len() > CAPACITY {
            self.records.pop();
        }
        debug_assert!(self.records.len() <= CAPACITY);
    }

    /// All records, newest first.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Filter records without mutating the store.
    ///
    /// `text` matches as a case-insensitive substring of the original text;
    /// `emotion` matches the predicted label exactly. When both are given
    /// they are ANDed.
    pub fn filter(&self, text: Option<&str>, emotion: Option<&str>) -> Vec<&HistoryRecord> {
        let needle = text.map(str::to_lowercase);
        self.records
            .iter()
            .filter(|record| {
                let text_ok = needle.as_deref().is_none_or(|n| {
                    record.prediction.original_text.to_lowercase().contains(n)
                });
                let emotion_ok = emotion.is_none_or(|e| record.prediction.predicted_emotion == e);
                text_ok && emotion_ok
            })
            .collect()
    }

    /// Remove the record with the given id. Returns whether a record was
    /// removed; a missing id is a no-op, not an error.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let Some(position) = self.records.iter().position(|r| r.id == id) else {
            return false;
        };
        self.records.remove(position);
        self.persist();
        true
    }

    /// Empty the store. Destructive and irreversible, so the caller must
    /// pass an explicit confirmation; the interactive prompt lives at the
    /// CLI boundary.
    pub fn clear(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            bail!("refusing to clear history without confirmation");
        }
        self.records.clear();
        self.persist();
        Ok(())
    }

    /// Produce an export snapshot of the current records.
    pub fn export(&self) -> HistoryExport {
        HistoryExport {
            timestamp: Utc::now().to_rfc3339(),
            total_predictions: self.records.len(),
            predictions: self.records.clone(),
        }
    }

    /// Write the current sequence to the backing file, best-effort.
    fn persist(&self) {
        let _ = self.write_to_disk();
    }

    fn write_to_disk(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, json)?;

        Ok(())
    }
}

/// Load persisted records, falling back to empty on any failure.
fn load_records(path: &Path) -> Vec<HistoryRecord> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

/// Default location of the history file: `~/.emoscope/history.json`.
pub fn default_history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".emoscope").join("history.json"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(text: &str, emotion: &str) -> Prediction {
        let mut all_emotions = crate::api::types::EmotionScores::new();
        all_emotions.insert(emotion.to_string(), 0.9);
        all_emotions.insert("neutral".to_string(), 0.1);
        Prediction {
            original_text: text.to_string(),
            processed_text: text.to_lowercase(),
            predicted_emotion: emotion.to_string(),
            confidence: 0.9,
            all_emotions,
            timestamp: "2026-08-25T12:00:00+00:00".to_string(),
            error: None,
        }
    }

    #[test]
    fn append_inserts_at_head() {
        let mut store = HistoryStore::ephemeral();
        store.append(prediction("first", "joy"), RecordKind::Single);
        store.append(prediction("second", "anger"), RecordKind::Single);

        assert_eq!(store.records()[0].prediction.original_text, "second");
        assert_eq!(store.records()[1].prediction.original_text, "first");
    }

    #[test]
    fn filter_text_is_case_insensitive_substring() {
        let mut store = HistoryStore::ephemeral();
        store.append(prediction("Pure JOY today", "joy"), RecordKind::Single);
        store.append(prediction("gloomy morning", "sadness"), RecordKind::Single);

        let hits = store.filter(Some("joy"), None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prediction.original_text, "Pure JOY today");
    }

    #[test]
    fn filter_emotion_is_exact() {
        let mut store = HistoryStore::ephemeral();
        store.append(prediction("a", "anger"), RecordKind::Single);
        store.append(prediction("b", "Anger"), RecordKind::Single);

        let hits = store.filter(None, Some("anger"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prediction.original_text, "a");
    }

    #[test]
    fn filters_are_anded() {
        let mut store = HistoryStore::ephemeral();
        store.append(prediction("joyful day", "joy"), RecordKind::Single);
        store.append(prediction("joyless day", "sadness"), RecordKind::Single);
        store.append(prediction("quiet day", "joy"), RecordKind::Single);

        let hits = store.filter(Some("joy"), Some("joy"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prediction.original_text, "joyful day");
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut store = HistoryStore::ephemeral();
        store.append(prediction("a", "joy"), RecordKind::Single);

        assert!(store.clear(false).is_err());
        assert_eq!(store.len(), 1);

        store.clear(true).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn export_contains_records_only() {
        let mut store = HistoryStore::ephemeral();
        store.append(prediction("a", "joy"), RecordKind::BatchMember);

        let export = store.export();
        assert_eq!(export.total_predictions, 1);
        assert_eq!(export.predictions.len(), 1);
        assert_eq!(export.predictions[0].kind, RecordKind::BatchMember);
    }
}
