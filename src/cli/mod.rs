//! CLI command implementations for emoscope.
//!
//! Provides subcommand handlers for:
//! - `emoscope analyze "text"` — single prediction with a ranking chart
//! - `emoscope batch ...` — batch prediction, up to 10 texts
//! - `emoscope history` — browse/filter the local prediction history
//! - `emoscope remove|clear|export` — history management
//! - `emoscope info|health|emotions` — service metadata
//! - `emoscope config show|init|path` — configuration management

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use colored::{Color, Colorize};

use crate::api::EmotionClient;
use crate::api::types::Prediction;
use crate::config;
use crate::history::{HistoryStore, RecordKind};
use crate::ranking::{self, Ranking};

/// Maximum number of texts accepted per batch. The service allows more;
/// this bound lives at the calling layer, mirroring the dashboard's
/// 10-row input limit.
pub const BATCH_LIMIT: usize = 10;

const BAR_WIDTH: usize = 30;

/// Output format for data-producing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// emoscope analyze
// ---------------------------------------------------------------------------

/// Analyze a single text, render the ranking, and record it in history.
///
/// The empty-input guard lives here: a whitespace-only text never issues
/// a request.
pub fn run_analyze(text: &str) -> Result<()> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        bail!("text cannot be empty");
    }

    let cfg = config::load();
    let client = EmotionClient::from_config(&cfg);
    let prediction = client.predict_single(trimmed)?;

    if let Some(reason) = &prediction.error {
        println!("{} {}", "Prediction failed:".yellow().bold(), reason);
        return Ok(());
    }

    let ranking = ranking::rank(&prediction.all_emotions)?;
    println!("{}", "Emotion Analysis".bold().cyan());
    println!("{}", "=".repeat(50));
    print_ranking(&ranking);

    let mut store = HistoryStore::open(cfg.history_path());
    let record = store.append(prediction, RecordKind::Single);
    println!();
    println!("{} {}", "Saved to history as".dimmed(), record.id.dimmed());

    Ok(())
}

// ---------------------------------------------------------------------------
// emoscope batch
// ---------------------------------------------------------------------------

/// Analyze up to [`BATCH_LIMIT`] texts in one round trip.
///
/// Blank/whitespace-only entries are filtered before submission; if
/// nothing remains, no request is issued. Successful items are appended
/// to history in submitted order as batch members.
pub fn run_batch(texts: Vec<String>, file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let mut collected = texts;
    if let Some(path) = file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        collected.extend(content.lines().map(str::to_string));
    }

    let filtered: Vec<String> = collected
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if filtered.is_empty() {
        bail!("no non-empty texts to analyze");
    }
    if filtered.len() > BATCH_LIMIT {
        bail!(
            "a batch is limited to {} texts, got {}",
            BATCH_LIMIT,
            filtered.len()
        );
    }

    let cfg = config::load();
    let client = EmotionClient::from_config(&cfg);
    let result = client.predict_batch(&filtered)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", "Batch Analysis".bold().cyan());
        println!("{}", "=".repeat(50));
        for item in &result.predictions {
            print_batch_item(item.index, &item.prediction);
        }
    }

    let mut store = HistoryStore::open(cfg.history_path());
    let mut saved = 0usize;
    for item in result.predictions {
        if !item.prediction.is_degraded() {
            store.append(item.prediction, RecordKind::BatchMember);
            saved += 1;
        }
    }
    if format == OutputFormat::Table {
        println!();
        println!(
            "{}",
            format!("{saved} of {} predictions saved to history", result.total_texts).dimmed()
        );
    }

    Ok(())
}

fn print_batch_item(index: usize, prediction: &Prediction) {
    let position = format!("[{}]", index + 1);
    if let Some(reason) = &prediction.error {
        println!(
            "  {} {:<40} {} {}",
            position.bold(),
            truncate(&prediction.original_text, 40),
            "failed:".yellow(),
            reason
        );
        return;
    }
    println!(
        "  {} {:<40} {} ({:.1}%)",
        position.bold(),
        truncate(&prediction.original_text, 40),
        prediction
            .predicted_emotion
            .color(emotion_color(&prediction.predicted_emotion))
            .bold(),
        prediction.confidence * 100.0,
    );
}

// ---------------------------------------------------------------------------
// emoscope history
// ---------------------------------------------------------------------------

/// Browse stored predictions, optionally filtered.
pub fn run_history(search: Option<&str>, emotion: Option<&str>, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let store = HistoryStore::open(cfg.history_path());
    let records = store.filter(search, emotion);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        if store.is_empty() {
            println!(
                "{}",
                "No predictions yet. Start analyzing some text!".yellow()
            );
        } else {
            println!("{}", "No predictions match your filters.".yellow());
        }
        return Ok(());
    }

    println!(
        "{} {}",
        "Prediction History".bold().cyan(),
        format!("({} predictions)", store.len()).dimmed()
    );
    println!("{}", "=".repeat(100));
    println!(
        "  {:<36} {:<12} {:<7} {:<20} Text",
        "Id", "Emotion", "Kind", "Timestamp"
    );
    println!("  {}", "-".repeat(98));

    for (i, record) in records.iter().enumerate() {
        let kind = match record.kind {
            RecordKind::Single => "single",
            RecordKind::BatchMember => "batch",
        };
        // No per-cell color here: escape codes would break column padding.
        let line = format!(
            "  {:<36} {:<12} {:<7} {:<20} {}",
            record.id,
            record.prediction.predicted_emotion,
            kind,
            truncate(&record.prediction.timestamp, 19),
            truncate(&record.prediction.original_text, 40),
        );

        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    Ok(())
}

/// Remove a single record by id. A missing id is reported, not an error.
pub fn run_remove(id: &str) -> Result<()> {
    let cfg = config::load();
    let mut store = HistoryStore::open(cfg.history_path());

    if store.remove_by_id(id) {
        println!("{} {}", "Removed".green(), id);
    } else {
        println!("{} {}", "No record with id".yellow(), id);
    }

    Ok(())
}

/// Clear all history after an explicit confirmation.
pub fn run_clear(yes: bool) -> Result<()> {
    let cfg = config::load();
    let mut store = HistoryStore::open(cfg.history_path());

    if store.is_empty() {
        println!("{}", "History is already empty.".yellow());
        return Ok(());
    }

    let confirmed = yes || confirm(&format!("Clear all {} records?", store.len()))?;
    if !confirmed {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    store.clear(confirmed)?;
    println!("{}", "History cleared.".green());

    Ok(())
}

/// Export the full history to a JSON snapshot file.
pub fn run_export(output: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let store = HistoryStore::open(cfg.history_path());

    if store.is_empty() {
        println!("{}", "Nothing to export: history is empty.".yellow());
        return Ok(());
    }

    let export = store.export();
    let default_name = format!("emotion-history-{}.json", Utc::now().format("%Y-%m-%d"));
    let path = output.unwrap_or_else(|| Path::new(&default_name));

    let json = serde_json::to_string_pretty(&export)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{} {} {}",
        "Exported".green(),
        export.total_predictions,
        format!("predictions to {}", path.display())
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// emoscope info / health / emotions
// ---------------------------------------------------------------------------

/// Show metadata about the loaded model.
pub fn run_info(format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let client = EmotionClient::from_config(&cfg);
    let info = client.model_info()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Model Information".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Name:    ".bold(), info.model_name);
    println!("  {} {}", "Type:    ".bold(), info.model_type);
    println!("  {} {}", "Emotions:".bold(), info.total_emotions);
    for emotion in &info.available_emotions {
        println!("    - {}", emotion.color(emotion_color(emotion)));
    }

    Ok(())
}

/// Check whether the classification service is reachable and healthy.
pub fn run_health() -> Result<()> {
    let cfg = config::load();
    let client = EmotionClient::from_config(&cfg);

    println!("{}", "emoscope Health Check".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Service:".bold(), client.base_url());

    match client.health() {
        Ok(health) => {
            let status = if health.status == "healthy" {
                health.status.green()
            } else {
                health.status.yellow()
            };
            println!("  {} {}", "Status:  ".bold(), status);
            let model = if health.model_loaded {
                "loaded".green()
            } else {
                "not loaded".red()
            };
            println!("  {} {}", "Model:   ".bold(), model);
        }
        Err(err) => {
            println!("  {} {}", "Status:  ".bold(), "unreachable".red());
            println!("  {} {}", "Error:   ".bold(), err);
        }
    }

    Ok(())
}

/// List the emotion labels the service supports.
pub fn run_emotions() -> Result<()> {
    let cfg = config::load();
    let client = EmotionClient::from_config(&cfg);
    let catalog = client.emotions()?;

    println!(
        "{} {}",
        "Supported emotions".bold().cyan(),
        format!("({})", catalog.count).dimmed()
    );
    for emotion in &catalog.emotions {
        println!("  - {}", emotion.color(emotion_color(emotion)));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// emoscope config
// ---------------------------------------------------------------------------

/// Print the effective configuration as TOML.
pub fn run_config_show() -> Result<()> {
    println!("{}", config::show_effective_config()?);
    Ok(())
}

/// Write the annotated default config file.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

/// Print the config file locations.
pub fn run_config_path() -> Result<()> {
    if let Some(path) = config::global_config_file() {
        println!("global:  {}", path.display());
    }
    if let Some(path) = config::project_config_file() {
        println!("project: {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

/// Render a ranking as labeled horizontal bars plus the headline and the
/// overall-confidence line.
fn print_ranking(ranking: &Ranking) {
    let headline = ranking.headline();
    println!(
        "  {} {} ({:.1}%)",
        "Top emotion:".bold(),
        headline
            .label
            .color(emotion_color(&headline.label))
            .bold(),
        headline.score * 100.0,
    );
    println!();

    for entry in ranking.top() {
        let filled = ((entry.relative_width / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled)
        );
        println!(
            "  {:<12} {} {:>5.1}%",
            entry.label,
            bar.color(emotion_color(&entry.label)),
            entry.score * 100.0,
        );
    }

    println!();
    println!(
        "  {} {:.0}%",
        "Overall confidence:".bold(),
        ranking.max_score() * 100.0
    );
}

/// Terminal color for an emotion label, mirroring the dashboard palette.
fn emotion_color(label: &str) -> Color {
    match label.to_lowercase().as_str() {
        "joy" | "happiness" | "excitement" => Color::Yellow,
        "love" => Color::Magenta,
        "sadness" => Color::Blue,
        "anger" | "negative" => Color::Red,
        "fear" => Color::BrightMagenta,
        "surprise" | "positive" => Color::Green,
        "disgust" | "neutral" => Color::White,
        _ => Color::Cyan,
    }
}

/// Ask a yes/no question on stdin. Defaults to no.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Truncate a string for table display.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
