//! Reporter input validation and sanitization

use regex::Regex;
use std::sync::OnceLock;

use crate::db::news::Location;

pub const MIN_FULL_TEXT_CHARS: usize = 10;
pub const MAX_FULL_TEXT_CHARS: usize = 10_000;
pub const MAX_SOURCE_CHARS: usize = 200;
pub const MAX_LOCATION_FIELD_CHARS: usize = 100;

fn html_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("html tag regex must compile"))
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<script|javascript:|on\w+\s*=").expect("script regex must compile")
    })
}

fn source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\s\-.,()]+$").expect("source regex must compile"))
}

fn strip_tags(text: &str) -> std::borrow::Cow<'_, str> {
    html_tag_re().replace_all(text, "")
}

pub fn validate_full_text(text: &str) -> Result<(), String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Full text is required".to_string());
    }
    if trimmed.chars().count() < MIN_FULL_TEXT_CHARS {
        return Err("Full text must be at least 10 characters long".to_string());
    }
    if text.chars().count() > MAX_FULL_TEXT_CHARS {
        return Err("Full text must not exceed 10,000 characters".to_string());
    }
    if script_re().is_match(&strip_tags(text)) {
        return Err("Invalid content detected".to_string());
    }
    Ok(())
}

pub fn validate_source(source: &str) -> Result<(), String> {
    let source = source.trim();
    if source.is_empty() {
        return Err("Source is required".to_string());
    }
    if source.chars().count() > MAX_SOURCE_CHARS {
        return Err("Source must not exceed 200 characters".to_string());
    }
    if !source_re().is_match(source) {
        return Err("Source contains invalid characters".to_string());
    }
    Ok(())
}

/// Check every location field, reporting all problems at once
pub fn validate_location(location: Option<&Location>) -> Result<(), Vec<String>> {
    let Some(location) = location else {
        return Err(vec!["Location data is required".to_string()]);
    };

    let mut errors = Vec::new();
    for (label, value) in [
        ("District", &location.district),
        ("State", &location.state),
        ("Country", &location.country),
    ] {
        let value = value.trim();
        if value.is_empty() {
            errors.push(format!("{} is required", label));
        } else if value.chars().count() > MAX_LOCATION_FIELD_CHARS {
            errors.push(format!("{} name too long", label));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Strip tags and quote characters, then collapse whitespace
pub fn sanitize_text(text: &str) -> String {
    let without_tags = strip_tags(text);
    let without_quotes: String = without_tags
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .collect();
    without_quotes.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Media paths outside the upload folders are dropped
pub fn filter_media_paths(paths: &[String], folder: &str) -> Vec<String> {
    let prefix = format!("static/{}/", folder);
    paths
        .iter()
        .filter(|p| p.starts_with(&prefix) && !p.contains(".."))
        .cloned()
        .collect()
}
