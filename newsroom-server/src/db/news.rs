//! News article storage and queries

use newsroom_common::db::NewsStatus;
use newsroom_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::enrich::EvidenceItem;

/// Maximum rows returned by a search
pub const SEARCH_LIMIT: i64 = 50;

/// Column weights for title, full_text, content, category
const BM25_WEIGHTS: &str = "10.0, 3.0, 3.0, 2.0";

const NEWS_COLUMNS: &str = "guid, title, content, summary, full_text, source, published_at, \
    date, week, month, year, time, category, credibility, fake_prob, status, sentiment, \
    sentiment_score, images, videos, district, state, country, reporter_id, reporter_name, \
    evidence_sources, breaking, created_at";

/// Missing fields deserialize as empty so validation can report them together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub district: String,
    pub state: String,
    pub country: String,
}

/// Relative paths (`static/images/...`, `static/videos/...`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedMedia {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// A stored news article
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub full_text: String,
    pub source: String,
    pub published_at: String,
    pub date: String,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub time: String,
    pub category: String,
    pub credibility: f64,
    pub fake_prob: f64,
    pub status: NewsStatus,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub associate_media: AssociatedMedia,
    pub location: Location,
    pub reporter_id: Option<String>,
    pub reporter_name: Option<String>,
    pub evidence_sources: Vec<EvidenceItem>,
    pub breaking: bool,
    pub created_at: String,
}

/// How a search was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// Ranked full-text index
    Text,
    /// Case-insensitive substring match
    Regex,
}

/// Optional filters for paginated listings
#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl NewsFilter {
    /// `all` and blank values mean "no filter"
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_string);
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { category, search }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut first = true;
        let mut clause = |qb: &mut QueryBuilder<'_, Sqlite>| {
            qb.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if let Some(category) = &self.category {
            clause(qb);
            qb.push("category = ").push_bind(category.clone());
        }
        if let Some(search) = &self.search {
            clause(qb);
            let pattern = like_pattern(search);
            qb.push("(title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR content LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR source LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }
}

/// `%needle%` with LIKE metacharacters escaped
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// FTS5 query matching any word of `query`
///
/// Words are split on whitespace and ASCII punctuation, then quoted so FTS
/// operators in user input are inert.
pub fn fts_query(query: &str) -> Option<String> {
    let tokens: Vec<String> = query
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();
    (!tokens.is_empty()).then(|| tokens.join(" OR "))
}

fn json_err(e: serde_json::Error) -> Error {
    Error::Internal(format!("JSON column error: {}", e))
}

fn parse_json_column<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(json_err)
}

fn row_to_news(row: &SqliteRow) -> Result<NewsDocument> {
    let status: String = row.try_get("status")?;
    let images: String = row.try_get("images")?;
    let videos: String = row.try_get("videos")?;
    let evidence: String = row.try_get("evidence_sources")?;
    let week: i64 = row.try_get("week")?;
    let month: i64 = row.try_get("month")?;
    let year: i64 = row.try_get("year")?;

    Ok(NewsDocument {
        id: row.try_get("guid")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        summary: row.try_get("summary")?,
        full_text: row.try_get("full_text")?,
        source: row.try_get("source")?,
        published_at: row.try_get("published_at")?,
        date: row.try_get("date")?,
        week: week as u32,
        month: month as u32,
        year: year as i32,
        time: row.try_get("time")?,
        category: row.try_get("category")?,
        credibility: row.try_get("credibility")?,
        fake_prob: row.try_get("fake_prob")?,
        status: status.parse().map_err(Error::Internal)?,
        sentiment: row.try_get("sentiment")?,
        sentiment_score: row.try_get("sentiment_score")?,
        associate_media: AssociatedMedia {
            images: parse_json_column(&images)?,
            videos: parse_json_column(&videos)?,
        },
        location: Location {
            district: row.try_get("district")?,
            state: row.try_get("state")?,
            country: row.try_get("country")?,
        },
        reporter_id: row.try_get("reporter_id")?,
        reporter_name: row.try_get("reporter_name")?,
        evidence_sources: parse_json_column(&evidence)?,
        breaking: row.try_get("breaking")?,
        created_at: row.try_get("created_at")?,
    })
}

fn rows_to_news(rows: &[SqliteRow]) -> Result<Vec<NewsDocument>> {
    rows.iter().map(row_to_news).collect()
}

/// Insert a new article
pub async fn insert_news(pool: &SqlitePool, doc: &NewsDocument) -> Result<()> {
    let images = serde_json::to_string(&doc.associate_media.images).map_err(json_err)?;
    let videos = serde_json::to_string(&doc.associate_media.videos).map_err(json_err)?;
    let evidence = serde_json::to_string(&doc.evidence_sources).map_err(json_err)?;

    sqlx::query(
        r#"
        INSERT INTO news (
            guid, title, content, summary, full_text, source, published_at,
            date, week, month, year, time, category, credibility, fake_prob, status,
            sentiment, sentiment_score, images, videos, district, state, country,
            reporter_id, reporter_name, evidence_sources, breaking, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&doc.id)
    .bind(&doc.title)
    .bind(&doc.content)
    .bind(&doc.summary)
    .bind(&doc.full_text)
    .bind(&doc.source)
    .bind(&doc.published_at)
    .bind(&doc.date)
    .bind(doc.week as i64)
    .bind(doc.month as i64)
    .bind(doc.year as i64)
    .bind(&doc.time)
    .bind(&doc.category)
    .bind(doc.credibility)
    .bind(doc.fake_prob)
    .bind(doc.status.as_str())
    .bind(&doc.sentiment)
    .bind(doc.sentiment_score)
    .bind(images)
    .bind(videos)
    .bind(&doc.location.district)
    .bind(&doc.location.state)
    .bind(&doc.location.country)
    .bind(&doc.reporter_id)
    .bind(&doc.reporter_name)
    .bind(evidence)
    .bind(doc.breaking)
    .bind(&doc.created_at)
    .execute(pool)
    .await?;

    debug!(id = %doc.id, "Inserted news article");
    Ok(())
}

pub async fn get_news_by_id(pool: &SqlitePool, id: &str) -> Result<Option<NewsDocument>> {
    let sql = format!("SELECT {} FROM news WHERE guid = ?", NEWS_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(row_to_news).transpose()
}

/// Articles flagged breaking, newest publication first
pub async fn breaking_news(pool: &SqlitePool) -> Result<Vec<NewsDocument>> {
    let sql = format!(
        "SELECT {} FROM news WHERE breaking = 1 ORDER BY published_at DESC",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows_to_news(&rows)
}

/// Articles of one category, newest first
pub async fn news_by_category(pool: &SqlitePool, category: &str) -> Result<Vec<NewsDocument>> {
    let sql = format!(
        "SELECT {} FROM news WHERE category = ? ORDER BY created_at DESC",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(category).fetch_all(pool).await?;
    rows_to_news(&rows)
}

/// Ranked full-text search
async fn search_fulltext(pool: &SqlitePool, match_expr: &str) -> Result<Vec<NewsDocument>> {
    let sql = format!(
        "SELECT {cols} FROM news \
         JOIN (SELECT rowid AS hit, bm25(news_fts, {weights}) AS rank \
               FROM news_fts WHERE news_fts MATCH ? ORDER BY rank LIMIT ?) ranked \
         ON news.seq = ranked.hit \
         ORDER BY ranked.rank",
        cols = NEWS_COLUMNS,
        weights = BM25_WEIGHTS
    );
    let rows = sqlx::query(&sql)
        .bind(match_expr)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await?;
    rows_to_news(&rows)
}

/// Case-insensitive substring search, newest first
async fn search_substring(pool: &SqlitePool, query: &str) -> Result<Vec<NewsDocument>> {
    let pattern = like_pattern(query);
    let sql = format!(
        "SELECT {} FROM news \
         WHERE title LIKE ? ESCAPE '\\' OR full_text LIKE ? ESCAPE '\\' \
            OR content LIKE ? ESCAPE '\\' OR category LIKE ? ESCAPE '\\' \
         ORDER BY created_at DESC LIMIT ?",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await?;
    rows_to_news(&rows)
}

/// Search articles, preferring the full-text index
///
/// Falls back to substring matching when the query has no indexable tokens
/// or the full-text query fails.
pub async fn search_news(pool: &SqlitePool, query: &str) -> Result<(Vec<NewsDocument>, SearchMethod)> {
    if let Some(match_expr) = fts_query(query) {
        match search_fulltext(pool, &match_expr).await {
            Ok(news) => {
                debug!(query = %query, results = news.len(), "Full-text search");
                return Ok((news, SearchMethod::Text));
            }
            Err(e) => warn!("Full-text search failed, falling back to substring search: {}", e),
        }
    }

    let news = search_substring(pool, query).await?;
    debug!(query = %query, results = news.len(), "Substring search");
    Ok((news, SearchMethod::Regex))
}

pub async fn count_news(pool: &SqlitePool, filter: &NewsFilter) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM news");
    filter.push_where(&mut qb);
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

/// One page of articles, newest publication first
pub async fn list_news_page(
    pool: &SqlitePool,
    filter: &NewsFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<NewsDocument>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM news", NEWS_COLUMNS));
    filter.push_where(&mut qb);
    qb.push(" ORDER BY published_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows = qb.build().fetch_all(pool).await?;
    rows_to_news(&rows)
}

/// Most recently published articles
pub async fn recent_news(pool: &SqlitePool, limit: i64) -> Result<Vec<NewsDocument>> {
    list_news_page(pool, &NewsFilter::default(), limit, 0).await
}

/// A reporter's submissions, newest first
pub async fn reporter_submissions(
    pool: &SqlitePool,
    reporter_id: &str,
    limit: i64,
) -> Result<Vec<NewsDocument>> {
    let sql = format!(
        "SELECT {} FROM news WHERE reporter_id = ? ORDER BY created_at DESC LIMIT ?",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(reporter_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows_to_news(&rows)
}

/// Distinct non-empty categories, alphabetical
pub async fn categories_list(pool: &SqlitePool) -> Result<Vec<String>> {
    let categories: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT category FROM news WHERE category <> '' ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// Change moderation status and optionally the breaking flag
///
/// Returns false when no article has `id`.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: NewsStatus,
    breaking: Option<bool>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE news SET status = ?, breaking = COALESCE(?, breaking) WHERE guid = ?",
    )
    .bind(status.as_str())
    .bind(breaking)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_treats_all_and_blank_as_none() {
        let filter = NewsFilter::new(Some("all"), Some("   "));
        assert!(filter.category.is_none());
        assert!(filter.search.is_none());

        let filter = NewsFilter::new(Some("Sports"), Some(" cricket "));
        assert_eq!(filter.category.as_deref(), Some("Sports"));
        assert_eq!(filter.search.as_deref(), Some("cricket"));
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("rain"), "%rain%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_fts_query_quotes_tokens() {
        assert_eq!(
            fts_query("flood AND \"rescue\"").as_deref(),
            Some("\"flood\" OR \"AND\" OR \"rescue\"")
        );
        assert_eq!(fts_query("!!! ---"), None);
        assert_eq!(fts_query("मुंबई बारिश").as_deref(), Some("\"मुंबई\" OR \"बारिश\""));
    }
}
