//! Lexicon-based sentiment polarity
//!
//! Each word found in the lexicon contributes its polarity, scaled by any
//! preceding intensifiers and flipped (at half strength) by a preceding
//! negation. The reading is the mean contribution, clamped to [-1, 1].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Scores above this are positive, below its negation negative
pub const POLARITY_THRESHOLD: f64 = 0.1;

/// Tokens a negation stays active for
const NEGATION_WINDOW: usize = 2;

/// Factor applied to a negated polarity
const NEGATION_SCALE: f64 = -0.5;

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("best", 1.0),
    ("better", 0.5),
    ("happy", 0.8),
    ("glad", 0.5),
    ("positive", 0.227),
    ("success", 0.3),
    ("successful", 0.75),
    ("win", 0.8),
    ("wins", 0.8),
    ("won", 0.6),
    ("victory", 0.5),
    ("growth", 0.3),
    ("improve", 0.4),
    ("improved", 0.4),
    ("strong", 0.433),
    ("safe", 0.5),
    ("peace", 0.3),
    ("peaceful", 0.5),
    ("celebrate", 0.5),
    ("celebrated", 0.5),
    ("hope", 0.3),
    ("love", 0.5),
    ("benefit", 0.3),
    ("boost", 0.3),
    ("record", 0.2),
    ("progress", 0.3),
    ("welcome", 0.8),
    ("relief", 0.3),
    ("rescued", 0.4),
    ("award", 0.4),
    ("historic", 0.3),
    // negative
    ("bad", -0.7),
    ("worst", -1.0),
    ("worse", -0.4),
    ("terrible", -1.0),
    ("horrible", -1.0),
    ("awful", -1.0),
    ("sad", -0.5),
    ("poor", -0.4),
    ("negative", -0.3),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.3),
    ("crisis", -0.4),
    ("disaster", -0.8),
    ("death", -0.5),
    ("deaths", -0.5),
    ("dead", -0.2),
    ("killed", -0.6),
    ("violence", -0.6),
    ("violent", -0.8),
    ("attack", -0.5),
    ("fear", -0.5),
    ("angry", -0.5),
    ("corrupt", -0.5),
    ("corruption", -0.5),
    ("fraud", -0.6),
    ("fake", -0.5),
    ("loss", -0.3),
    ("losses", -0.3),
    ("decline", -0.3),
    ("weak", -0.375),
    ("dangerous", -0.6),
    ("injured", -0.5),
    ("protest", -0.2),
    ("flood", -0.3),
    ("floods", -0.3),
    ("collapse", -0.5),
    ("shortage", -0.3),
    ("scam", -0.6),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("really", 1.2),
    ("highly", 1.3),
    ("so", 1.2),
    ("too", 1.2),
    ("most", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("barely", 0.4),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "nothing", "hardly", "without", "nor"];

fn lexicon() -> &'static HashMap<&'static str, f64> {
    static MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    MAP.get_or_init(|| LEXICON.iter().copied().collect())
}

fn intensifiers() -> &'static HashMap<&'static str, f64> {
    static MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    MAP.get_or_init(|| INTENSIFIERS.iter().copied().collect())
}

/// Sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score > POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if score < -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Label plus polarity rounded to 3 decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub label: Sentiment,
    pub score: f64,
}

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_lowercase())
}

/// Raw mean polarity in [-1, 1]; 0.0 when no lexicon word occurs
pub fn polarity(text: &str) -> f64 {
    let lexicon = lexicon();
    let intensifiers = intensifiers();

    let mut contributions = Vec::new();
    let mut modifier = 1.0;
    let mut negation_left = 0usize;

    for token in tokenize(text) {
        if is_negation(&token) {
            negation_left = NEGATION_WINDOW;
            continue;
        }
        if let Some(factor) = intensifiers.get(token.as_str()) {
            modifier *= factor;
            continue;
        }
        if let Some(value) = lexicon.get(token.as_str()) {
            let mut value = (value * modifier).clamp(-1.0, 1.0);
            if negation_left > 0 {
                value *= NEGATION_SCALE;
            }
            contributions.push(value);
            negation_left = 0;
        } else {
            negation_left = negation_left.saturating_sub(1);
        }
        modifier = 1.0;
    }

    if contributions.is_empty() {
        return 0.0;
    }
    let mean = contributions.iter().sum::<f64>() / contributions.len() as f64;
    mean.clamp(-1.0, 1.0)
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Analyze text sentiment
pub fn analyze(text: &str) -> SentimentReading {
    let score = polarity(text);
    SentimentReading {
        label: Sentiment::from_score(score),
        score: round3(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let reading = analyze("The new metro line is a great success for the city");
        assert_eq!(reading.label, Sentiment::Positive);
        assert!(reading.score > 0.1);
    }

    #[test]
    fn test_negative_text() {
        let reading = analyze("A terrible disaster left many injured");
        assert_eq!(reading.label, Sentiment::Negative);
        assert!(reading.score < -0.1);
    }

    #[test]
    fn test_no_lexicon_words_is_neutral_zero() {
        let reading = analyze("The committee meets on Tuesday at noon");
        assert_eq!(reading.label, Sentiment::Neutral);
        assert_eq!(reading.score, 0.0);
    }

    #[test]
    fn test_negation_flips_at_half_strength() {
        assert_eq!(polarity("good"), 0.7);
        assert!((polarity("not good") - (-0.35)).abs() < 1e-9);
        assert!(polarity("isn't good") < 0.0);
    }

    #[test]
    fn test_negation_expires() {
        // "not" is two non-lexicon tokens away from "good"
        assert_eq!(polarity("not at the good"), 0.7);
    }

    #[test]
    fn test_intensifier_scales_and_clamps() {
        assert!(polarity("very good") > polarity("good"));
        assert_eq!(polarity("extremely excellent"), 1.0);
        assert!(polarity("slightly bad") > polarity("bad"));
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(Sentiment::from_score(0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(0.1001), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(-0.1001), Sentiment::Negative);
    }

    #[test]
    fn test_score_rounded_to_three_decimals() {
        // (0.227 + 0.7 + 0.8) / 3 = 0.57566...
        let reading = analyze("positive, good and great");
        assert_eq!(reading.score, 0.576);
    }
}
