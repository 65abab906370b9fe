//! News enrichment pipeline
//!
//! Raw submitted text goes through emoji removal, sentiment scoring,
//! best-effort evidence lookups, optional model classification and the trust
//! policy before it becomes a stored document.

pub mod classifier;
pub mod evidence;
pub mod pipeline;
pub mod policy;
pub mod sanitize;
pub mod sentiment;

pub use classifier::{AgentAnalysis, ClassifierError, LlmClassifier, NewsClassifier};
pub use evidence::{
    EvidenceBatch, EvidenceError, EvidenceItem, EvidenceReport, EvidenceSource, NewsApiClient,
    WebSearchClient,
};
pub use pipeline::{AnalysisResult, Enricher, Submission};
pub use policy::{decide_trust, is_famous, TrustDecision, FAMOUS_SOURCES};
pub use sanitize::remove_emojis;
pub use sentiment::{Sentiment, SentimentReading};

/// Longest prefix of `s` holding at most `max_chars` characters
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
