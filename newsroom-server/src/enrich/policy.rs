//! Trust decision for submitted news
//!
//! A declared source that names a well-known outlet is verified outright.
//! Everything else stays under monitoring with model-derived scores, or a
//! neutral 0.5 / 0.5 when no model output is available.

use newsroom_common::db::NewsStatus;

/// Outlet name fragments treated as trusted, matched case-insensitively
pub const FAMOUS_SOURCES: &[&str] = &[
    "bbc",
    "reuters",
    "the hindu",
    "cnn",
    "ndtv",
    "al jazeera",
    "times of india",
];

/// Score used for credibility and fake probability when nothing better exists
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Whether `text` mentions an allowlisted outlet
pub fn is_famous(text: &str) -> bool {
    let lowered = text.to_lowercase();
    FAMOUS_SOURCES.iter().any(|name| lowered.contains(name))
}

/// Outcome of the trust policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustDecision {
    pub status: NewsStatus,
    pub credibility: f64,
    pub fake_prob: f64,
}

/// Apply the trust policy
///
/// `model_scores` is `(credibility, fake_prob)` from the classifier, if any.
pub fn decide_trust(source: &str, model_scores: Option<(f64, f64)>) -> TrustDecision {
    if is_famous(source) {
        return TrustDecision {
            status: NewsStatus::Verified,
            credibility: 1.0,
            fake_prob: 0.0,
        };
    }

    let (credibility, fake_prob) = model_scores.unwrap_or((NEUTRAL_SCORE, NEUTRAL_SCORE));
    TrustDecision {
        status: NewsStatus::Monitoring,
        credibility,
        fake_prob,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_famous_source_case_insensitive() {
        assert!(is_famous("BBC News"));
        assert!(is_famous("Reported by The Hindu (Chennai)"));
        assert!(is_famous("reuters.com"));
        assert!(!is_famous("whatsapp forward"));
        assert!(!is_famous(""));
    }

    #[test]
    fn test_famous_source_overrides_model() {
        let decision = decide_trust("CNN", Some((0.1, 0.9)));
        assert_eq!(decision.status, NewsStatus::Verified);
        assert_eq!(decision.credibility, 1.0);
        assert_eq!(decision.fake_prob, 0.0);
    }

    #[test]
    fn test_unknown_source_uses_model_scores() {
        let decision = decide_trust("local blog", Some((0.8, 0.15)));
        assert_eq!(decision.status, NewsStatus::Monitoring);
        assert_eq!(decision.credibility, 0.8);
        assert_eq!(decision.fake_prob, 0.15);
    }

    #[test]
    fn test_unknown_source_without_model_is_neutral() {
        let decision = decide_trust("telegram", None);
        assert_eq!(decision.status, NewsStatus::Monitoring);
        assert_eq!(decision.credibility, NEUTRAL_SCORE);
        assert_eq!(decision.fake_prob, NEUTRAL_SCORE);
    }
}
