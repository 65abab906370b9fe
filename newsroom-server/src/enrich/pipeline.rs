//! Enrichment orchestration
//!
//! Every external step is optional. A failed or missing step is logged and
//! skipped, so enrichment always terminates with a usable result.

use newsroom_common::config::NewsroomConfig;
use newsroom_common::time::{self, DateParts};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::classifier::{AgentAnalysis, LlmClassifier, NewsClassifier};
use super::evidence::{EvidenceItem, EvidenceReport, EvidenceSource, NewsApiClient, WebSearchClient};
use super::policy::decide_trust;
use super::sanitize::remove_emojis;
use super::sentiment;
use super::truncate_chars;
use crate::db::news::{AssociatedMedia, Location, NewsDocument};

/// Characters of text kept as summary when the model gave none
pub const SUMMARY_FALLBACK_CHARS: usize = 150;

/// Validated reporter submission ready for enrichment
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub full_text: String,
    pub source: String,
    pub location: Location,
    pub media: AssociatedMedia,
    pub reporter_id: Option<String>,
    pub reporter_name: Option<String>,
}

/// Read-only analysis returned to end users; nothing is persisted
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub title: String,
    pub summary: String,
    pub credibility: f64,
    pub fake_prob: f64,
    pub sentiment: String,
    pub status: &'static str,
    pub category: String,
    pub evidence_sources: Vec<EvidenceItem>,
}

/// Runs the enrichment steps with whichever integrations are configured
pub struct Enricher {
    evidence: Vec<Box<dyn EvidenceSource>>,
    classifier: Option<Box<dyn NewsClassifier>>,
}

impl Enricher {
    pub fn new(
        evidence: Vec<Box<dyn EvidenceSource>>,
        classifier: Option<Box<dyn NewsClassifier>>,
    ) -> Self {
        Self {
            evidence,
            classifier,
        }
    }

    /// No evidence sources and no classifier: fallback records only
    pub fn offline() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Build the integrations enabled in `config`
    pub fn from_config(config: &NewsroomConfig) -> Self {
        let mut evidence: Vec<Box<dyn EvidenceSource>> = Vec::new();

        if config.web_search_enabled {
            match WebSearchClient::new() {
                Ok(client) => evidence.push(Box::new(client)),
                Err(e) => warn!("Web search disabled: {}", e),
            }
        } else {
            info!("Web search disabled by configuration");
        }

        if let Some(key) = &config.news_api_key {
            match NewsApiClient::new(key) {
                Ok(client) => evidence.push(Box::new(client)),
                Err(e) => warn!("News API disabled: {}", e),
            }
        }

        let classifier: Option<Box<dyn NewsClassifier>> = match &config.groq_api_key {
            Some(key) => match LlmClassifier::new(key) {
                Ok(client) => Some(Box::new(client)),
                Err(e) => {
                    warn!("Model classification disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        info!(
            evidence_sources = evidence.len(),
            classifier = classifier.is_some(),
            "Enrichment pipeline ready"
        );

        Self::new(evidence, classifier)
    }

    pub fn evidence_source_names(&self) -> Vec<&'static str> {
        self.evidence.iter().map(|s| s.name()).collect()
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Gather evidence and classify `text`
    ///
    /// Evidence sources run one after another, then the classifier. Any
    /// failure degrades to skipping that step; a missing or failed
    /// classifier yields [`AgentAnalysis::fallback`].
    pub async fn run_agent(&self, text: &str) -> (AgentAnalysis, EvidenceReport) {
        let text = remove_emojis(text);
        let mut report = EvidenceReport::default();

        for source in &self.evidence {
            match source.gather(&text).await {
                Ok(batch) => {
                    info!(
                        source = source.name(),
                        results = batch.sources.len(),
                        trusted_hits = batch.trusted_hits,
                        "Evidence gathered"
                    );
                    report.absorb(batch);
                }
                Err(e) => warn!(source = source.name(), "Evidence lookup failed: {}", e),
            }
        }

        let analysis = match &self.classifier {
            Some(classifier) => match classifier.classify(&text).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!("Classification failed, using fallback: {}", e);
                    AgentAnalysis::fallback(&text)
                }
            },
            None => AgentAnalysis::fallback(&text),
        };

        (analysis, report)
    }

    /// Analyze text for display without storing anything
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let clean = remove_emojis(text);
        let reading = sentiment::analyze(&clean);
        let (analysis, evidence) = self.run_agent(&clean).await;

        AnalysisResult {
            title: analysis.headline,
            summary: analysis.summary,
            credibility: analysis.credibility,
            fake_prob: analysis.fake_prob,
            sentiment: reading.label.as_str().to_string(),
            status: "analyzed",
            category: analysis.category,
            evidence_sources: evidence.sources,
        }
    }

    /// Enrich a submission into a complete document
    ///
    /// The caller persists the result.
    pub async fn ingest(&self, submission: Submission) -> NewsDocument {
        let full_text = remove_emojis(&submission.full_text);
        let reading = sentiment::analyze(&full_text);
        let (analysis, evidence) = self.run_agent(&full_text).await;

        let decision = decide_trust(&submission.source, analysis.model_scores());

        let published = time::now();
        let parts = DateParts::from_timestamp(published);
        let published_at = time::format_timestamp(published);

        let content = if analysis.summary.is_empty() {
            full_text.clone()
        } else {
            analysis.summary.clone()
        };
        let summary = if analysis.summary.is_empty() {
            truncate_chars(&full_text, SUMMARY_FALLBACK_CHARS).to_string()
        } else {
            analysis.summary
        };

        let location = Location {
            district: prefer(&submission.location.district, analysis.district),
            state: prefer(&submission.location.state, analysis.state),
            country: prefer(&submission.location.country, analysis.country),
        };

        info!(
            status = %decision.status,
            credibility = decision.credibility,
            evidence = evidence.sources.len(),
            "Submission enriched"
        );

        NewsDocument {
            id: Uuid::new_v4().to_string(),
            title: analysis.headline,
            content,
            summary,
            full_text,
            source: submission.source,
            published_at: published_at.clone(),
            date: parts.date,
            week: parts.week,
            month: parts.month,
            year: parts.year,
            time: parts.time,
            category: analysis.category,
            credibility: decision.credibility,
            fake_prob: decision.fake_prob,
            status: decision.status,
            sentiment: reading.label.as_str().to_string(),
            sentiment_score: reading.score,
            associate_media: submission.media,
            location,
            reporter_id: submission.reporter_id,
            reporter_name: submission.reporter_name,
            evidence_sources: evidence.sources,
            breaking: false,
            created_at: published_at,
        }
    }
}

/// Submitted value unless blank, then the model's
fn prefer(submitted: &str, derived: String) -> String {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        derived
    } else {
        submitted.to_string()
    }
}
