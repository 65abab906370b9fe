//! Dashboard aggregation queries
//!
//! Each function is a single SQL aggregation over `news` or `users`. Empty
//! tables produce zeroed metrics rather than errors.

use chrono::Duration;
use newsroom_common::time;
use newsroom_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Articles with a higher fake probability count as fake
pub const FAKE_THRESHOLD: f64 = 0.5;

/// Window for "active" users
pub const ACTIVE_USER_DAYS: i64 = 30;

const TOP_SOURCES: i64 = 10;

const SENTIMENT_BUCKET_SQL: &str = "CASE \
    WHEN sentiment_score < -0.5 THEN 'Very Negative' \
    WHEN sentiment_score < -0.1 THEN 'Negative' \
    WHEN sentiment_score < 0.1 THEN 'Neutral' \
    WHEN sentiment_score < 0.5 THEN 'Positive' \
    ELSE 'Very Positive' END";

const CREDIBILITY_BUCKET_SQL: &str = "CASE \
    WHEN credibility < 0.2 THEN '0.0-0.2' \
    WHEN credibility < 0.4 THEN '0.2-0.4' \
    WHEN credibility < 0.6 THEN '0.4-0.6' \
    WHEN credibility < 0.8 THEN '0.6-0.8' \
    ELSE '0.8-1.0' END";

/// Headline numbers for a set of articles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsMetrics {
    pub total_articles: i64,
    pub fake_news_detected: i64,
    /// Mean credibility as a percentage, one decimal
    pub avg_credibility: f64,
    pub avg_sentiment: f64,
    /// Most frequent sentiment score
    pub most_common_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentCount {
    pub sentiment: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCount {
    pub range: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// Everything the visualization page draws
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub category_distribution: Vec<CategoryCount>,
    pub sentiment_distribution: Vec<SentimentCount>,
    pub fake_vs_real_ratio: Vec<TypeCount>,
    pub credibility_distribution: Vec<RangeCount>,
    pub news_per_source: Vec<SourceCount>,
}

/// Dashboard card counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreviewData {
    pub news_count: i64,
    pub users_count: i64,
    pub sources_count: i64,
}

/// Per-source aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub source: String,
    pub article_count: i64,
    pub avg_credibility: f64,
    pub fake_news_count: i64,
    pub avg_sentiment: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserMetrics {
    pub total_users: i64,
    pub active_users: i64,
    pub role_distribution: Vec<RoleCount>,
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

async fn news_metrics_where(pool: &SqlitePool, date: Option<&str>) -> Result<NewsMetrics> {
    let filter = if date.is_some() { " WHERE date = ?" } else { "" };

    let sql = format!(
        "SELECT COUNT(*) AS total, \
                COALESCE(SUM(CASE WHEN fake_prob > ? THEN 1 ELSE 0 END), 0) AS fake, \
                AVG(credibility) AS avg_cred, \
                AVG(sentiment_score) AS avg_sent \
         FROM news{}",
        filter
    );
    let mut query = sqlx::query(&sql).bind(FAKE_THRESHOLD);
    if let Some(date) = date {
        query = query.bind(date);
    }
    let row = query.fetch_one(pool).await?;

    let modal_sql = format!(
        "SELECT sentiment_score FROM news{} \
         GROUP BY sentiment_score ORDER BY COUNT(*) DESC, sentiment_score LIMIT 1",
        filter
    );
    let mut modal = sqlx::query_scalar::<_, f64>(&modal_sql);
    if let Some(date) = date {
        modal = modal.bind(date);
    }
    let most_common = modal.fetch_optional(pool).await?.unwrap_or(0.0);

    let avg_cred: Option<f64> = row.try_get("avg_cred")?;
    let avg_sent: Option<f64> = row.try_get("avg_sent")?;

    Ok(NewsMetrics {
        total_articles: row.try_get("total")?,
        fake_news_detected: row.try_get("fake")?,
        avg_credibility: round_to(avg_cred.unwrap_or(0.0) * 100.0, 1),
        avg_sentiment: round_to(avg_sent.unwrap_or(0.0), 3),
        most_common_sentiment: round_to(most_common, 3),
    })
}

/// Metrics over articles dated today (UTC)
pub async fn today_metrics(pool: &SqlitePool) -> Result<NewsMetrics> {
    news_metrics_where(pool, Some(&time::today())).await
}

/// Metrics over every article
pub async fn overall_metrics(pool: &SqlitePool) -> Result<NewsMetrics> {
    news_metrics_where(pool, None).await
}

pub async fn category_distribution(pool: &SqlitePool) -> Result<Vec<CategoryCount>> {
    let rows = sqlx::query(
        "SELECT category, COUNT(*) AS count FROM news \
         GROUP BY category ORDER BY count DESC, category",
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(CategoryCount {
                category: row.try_get("category")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}

pub async fn sentiment_distribution(pool: &SqlitePool) -> Result<Vec<SentimentCount>> {
    let sql = format!(
        "SELECT {} AS bucket, COUNT(*) AS count FROM news \
         GROUP BY bucket ORDER BY count DESC, bucket",
        SENTIMENT_BUCKET_SQL
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(SentimentCount {
                sentiment: row.try_get("bucket")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}

pub async fn fake_vs_real(pool: &SqlitePool) -> Result<Vec<TypeCount>> {
    let rows = sqlx::query(
        "SELECT CASE WHEN fake_prob > ? THEN 'Fake News' ELSE 'Real News' END AS kind, \
                COUNT(*) AS count \
         FROM news GROUP BY kind ORDER BY count DESC, kind",
    )
    .bind(FAKE_THRESHOLD)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(TypeCount {
                kind: row.try_get("kind")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}

pub async fn credibility_distribution(pool: &SqlitePool) -> Result<Vec<RangeCount>> {
    let sql = format!(
        "SELECT {} AS bucket, COUNT(*) AS count FROM news \
         GROUP BY bucket ORDER BY count DESC, bucket",
        CREDIBILITY_BUCKET_SQL
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(RangeCount {
                range: row.try_get("bucket")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}

/// Top sources by article count
pub async fn news_per_source(pool: &SqlitePool) -> Result<Vec<SourceCount>> {
    let rows = sqlx::query(
        "SELECT source, COUNT(*) AS count FROM news \
         GROUP BY source ORDER BY count DESC, source LIMIT ?",
    )
    .bind(TOP_SOURCES)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            Ok(SourceCount {
                source: row.try_get("source")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}

pub async fn chart_data(pool: &SqlitePool) -> Result<ChartData> {
    Ok(ChartData {
        category_distribution: category_distribution(pool).await?,
        sentiment_distribution: sentiment_distribution(pool).await?,
        fake_vs_real_ratio: fake_vs_real(pool).await?,
        credibility_distribution: credibility_distribution(pool).await?,
        news_per_source: news_per_source(pool).await?,
    })
}

pub async fn preview_data(pool: &SqlitePool) -> Result<PreviewData> {
    let row = sqlx::query(
        "SELECT (SELECT COUNT(*) FROM news) AS news_count, \
                (SELECT COUNT(*) FROM users) AS users_count, \
                (SELECT COUNT(DISTINCT source) FROM news) AS sources_count",
    )
    .fetch_one(pool)
    .await?;

    Ok(PreviewData {
        news_count: row.try_get("news_count")?,
        users_count: row.try_get("users_count")?,
        sources_count: row.try_get("sources_count")?,
    })
}

/// Aggregates for every source, busiest first
pub async fn sources_data(pool: &SqlitePool) -> Result<Vec<SourceStats>> {
    let rows = sqlx::query(
        "SELECT source, COUNT(*) AS article_count, \
                AVG(credibility) AS avg_credibility, \
                SUM(CASE WHEN fake_prob > ? THEN 1 ELSE 0 END) AS fake_news_count, \
                AVG(sentiment_score) AS avg_sentiment \
         FROM news GROUP BY source ORDER BY article_count DESC, source",
    )
    .bind(FAKE_THRESHOLD)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<_> {
            let avg_credibility: f64 = row.try_get("avg_credibility")?;
            let avg_sentiment: f64 = row.try_get("avg_sentiment")?;
            Ok(SourceStats {
                source: row.try_get("source")?,
                article_count: row.try_get("article_count")?,
                avg_credibility: round_to(avg_credibility, 3),
                fake_news_count: row.try_get("fake_news_count")?,
                avg_sentiment: round_to(avg_sentiment, 3),
            })
        })
        .collect()
}

pub async fn user_metrics(pool: &SqlitePool) -> Result<UserMetrics> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let cutoff = time::format_timestamp(time::now() - Duration::days(ACTIVE_USER_DAYS));
    let active_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= ?")
        .bind(cutoff)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(
        "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY count DESC, role",
    )
    .fetch_all(pool)
    .await?;
    let role_distribution = rows
        .iter()
        .map(|row| -> Result<_> {
            Ok(RoleCount {
                role: row.try_get("role")?,
                count: row.try_get("count")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UserMetrics {
        total_users,
        active_users,
        role_distribution,
    })
}
