//! Pure ranking/normalization of a label→confidence score set.
//!
//! Turns an [`EmotionScores`] map into a descending display ranking: the
//! full sorted list, a top-K slice for rendering, the headline (highest
//! confidence) pair, and a relative bar width per label normalized against
//! the maximum score. No I/O, no side effects — identical input always
//! produces identical output.

use anyhow::{Result, bail};

use crate::api::types::EmotionScores;

/// Number of entries shown by display consumers.
pub const TOP_K: usize = 6;

/// One ranked (label, score) pair with its display width.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEmotion {
    pub label: String,
    /// Model confidence in `[0, 1]`.
    pub score: f64,
    /// Bar width relative to the highest score, in `[0, 100]`.
    /// 0 for every entry when the maximum score is 0.
    pub relative_width: f64,
}

/// A completed ranking over a non-empty score set.
#[derive(Debug, Clone)]
pub struct Ranking {
    entries: Vec<RankedEmotion>,
    max_score: f64,
}

impl Ranking {
    /// The full ordering, descending by score.
    pub fn all(&self) -> &[RankedEmotion] {
        &self.entries
    }

    /// The top entries for display, at most [`TOP_K`].
    pub fn top(&self) -> &[RankedEmotion] {
        &self.entries[..self.entries.len().min(TOP_K)]
    }

    /// The highest-confidence (label, score) pair.
    pub fn headline(&self) -> &RankedEmotion {
        // Construction guarantees at least one entry.
        &self.entries[0]
    }

    /// The maximum score across all labels — the overall confidence.
    pub fn max_score(&self) -> f64 {
        self.max_score
    }
}

/// Rank a score set for display.
///
/// Ordering is descending by score; ties keep the map's lexicographic
/// label order (the sort is stable), so the result is deterministic and
/// never depends on hash order. Errors on an empty set.
pub fn rank(scores: &EmotionScores) -> Result<Ranking> {
    if scores.is_empty() {
        bail!("cannot rank empty emotion set");
    }

    let max_score = scores.values().copied().fold(0.0_f64, f64::max);

    let mut entries: Vec<RankedEmotion> = scores
        .iter()
        .map(|(label, &score)| RankedEmotion {
            label: label.clone(),
            score,
            relative_width: if max_score > 0.0 {
                score / max_score * 100.0
            } else {
                0.0
            },
        })
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Ranking { entries, max_score })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> EmotionScores {
        pairs
            .iter()
            .map(|(label, score)| (label.to_string(), *score))
            .collect()
    }

    #[test]
    fn empty_set_is_an_error() {
        let err = rank(&EmotionScores::new()).unwrap_err();
        assert_eq!(err.to_string(), "cannot rank empty emotion set");
    }

    #[test]
    fn ordering_is_descending_by_score() {
        let ranking = rank(&scores(&[
            ("joy", 0.82),
            ("surprise", 0.10),
            ("neutral", 0.08),
        ]))
        .unwrap();

        let labels: Vec<&str> = ranking.all().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["joy", "surprise", "neutral"]);
        for pair in ranking.all().windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn headline_is_first_entry() {
        let ranking = rank(&scores(&[("anger", 0.7), ("fear", 0.3)])).unwrap();
        assert_eq!(ranking.headline().label, "anger");
        assert!((ranking.headline().score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn top_is_capped_at_six_but_full_set_retained() {
        let ranking = rank(&scores(&[
            ("joy", 0.30),
            ("sadness", 0.25),
            ("anger", 0.15),
            ("fear", 0.10),
            ("love", 0.08),
            ("surprise", 0.06),
            ("disgust", 0.04),
            ("neutral", 0.02),
        ]))
        .unwrap();

        assert_eq!(ranking.top().len(), TOP_K);
        assert_eq!(ranking.all().len(), 8);
    }

    #[test]
    fn top_entry_width_is_100_when_max_positive() {
        let ranking = rank(&scores(&[("joy", 0.5), ("fear", 0.25)])).unwrap();
        assert!((ranking.headline().relative_width - 100.0).abs() < f64::EPSILON);
        assert!((ranking.all()[1].relative_width - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn all_widths_zero_when_max_is_zero() {
        let ranking = rank(&scores(&[("joy", 0.0), ("fear", 0.0)])).unwrap();
        assert!((ranking.max_score()).abs() < f64::EPSILON);
        for entry in ranking.all() {
            assert!((entry.relative_width).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ties_break_by_lexicographic_label_order() {
        let ranking = rank(&scores(&[
            ("surprise", 0.4),
            ("anger", 0.4),
            ("joy", 0.4),
        ]))
        .unwrap();

        let labels: Vec<&str> = ranking.all().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["anger", "joy", "surprise"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let input = scores(&[("joy", 0.4), ("anger", 0.4), ("fear", 0.2)]);
        let first = rank(&input).unwrap();
        let second = rank(&input).unwrap();
        assert_eq!(first.all(), second.all());
    }
}
