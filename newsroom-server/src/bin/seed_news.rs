//! News seeding utility
//!
//! Fills a development database with synthetic articles spread over the past
//! year so the admin dashboards and charts have something to show.
//!
//! **Usage:**
//! ```bash
//! seed-news --root-folder ./data --count 500 [--seed 42]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use newsroom_common::config::{self, CliOverrides};
use newsroom_common::db::init::init_database;
use newsroom_common::db::NewsStatus;
use newsroom_common::time::{self, DateParts};
use newsroom_server::db::{news, AssociatedMedia, Location, NewsDocument};
use newsroom_server::enrich::Sentiment;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;
use uuid::Uuid;

const CATEGORIES: [&str; 8] = [
    "Politics",
    "Technology",
    "Sports",
    "Entertainment",
    "Business",
    "Health",
    "Science",
    "World",
];

const SOURCES: [&str; 5] = ["whatsapp", "twitter", "facebook", "news", "telegram"];

const STATUSES: [NewsStatus; 3] = [
    NewsStatus::Monitoring,
    NewsStatus::Verified,
    NewsStatus::Flagged,
];

const SENTIMENTS: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

const LOCATIONS: [(&str, &str, &str); 4] = [
    ("Pune", "Maharashtra", "India"),
    ("Bengaluru Urban", "Karnataka", "India"),
    ("Cook", "Illinois", "USA"),
    ("Greater London", "England", "UK"),
];

/// Synthetic article generator
#[derive(Parser, Debug)]
#[command(name = "seed-news")]
#[command(about = "Insert synthetic news articles for development")]
struct Args {
    /// Data directory holding the database
    #[arg(short, long, env = "NEWSROOM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Number of articles to insert
    #[arg(short = 'n', long, default_value = "200")]
    count: usize,

    /// RNG seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of articles marked breaking
    #[arg(long, default_value = "0.1")]
    breaking_ratio: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let toml_config = config::load_toml_config(None).context("Failed to load configuration file")?;
    let cli = CliOverrides {
        root_folder: args.root_folder.clone(),
        ..Default::default()
    };
    let config = config::resolve(&cli, &toml_config).context("Invalid configuration")?;

    let db_path = config.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Seeding {} articles into {}", args.count, db_path.display());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let breaking_ratio = args.breaking_ratio.clamp(0.0, 1.0);
    let docs: Vec<NewsDocument> = (0..args.count)
        .map(|i| synthetic_article(&mut rng, i + 1, breaking_ratio))
        .collect();

    for doc in &docs {
        news::insert_news(&pool, doc)
            .await
            .with_context(|| format!("Failed to insert article {}", doc.id))?;
    }

    info!("Inserted {} articles", docs.len());
    Ok(())
}

fn synthetic_article(rng: &mut StdRng, n: usize, breaking_ratio: f64) -> NewsDocument {
    let category = *CATEGORIES.choose(rng).unwrap_or(&"World");
    let source = *SOURCES.choose(rng).unwrap_or(&"news");
    let status = *STATUSES.choose(rng).unwrap_or(&NewsStatus::Monitoring);
    let sentiment = *SENTIMENTS.choose(rng).unwrap_or(&Sentiment::Neutral);
    let (district, state, country) = *LOCATIONS.choose(rng).unwrap_or(&LOCATIONS[0]);

    let age = Duration::seconds(rng.gen_range(0..365 * 24 * 3600));
    let published = Utc::now() - age;
    let parts = DateParts::from_timestamp(published);
    let published_at = time::format_timestamp(published);

    let credibility = round2(rng.gen_range(0.6..0.95));
    let fake_prob = round2(rng.gen_range(0.05..0.4));
    let sentiment_score = match sentiment {
        Sentiment::Positive => round2(rng.gen_range(0.1..1.0)),
        Sentiment::Negative => round2(rng.gen_range(-1.0..-0.1)),
        Sentiment::Neutral => 0.0,
    };

    let title = format!("{} update #{}", category, n);
    let full_text = format!(
        "Sample {} report number {} received via {} from {}, {}.",
        category.to_lowercase(),
        n,
        source,
        district,
        country
    );

    NewsDocument {
        id: Uuid::new_v4().to_string(),
        title,
        content: full_text.clone(),
        summary: full_text.clone(),
        full_text,
        source: source.to_string(),
        published_at: published_at.clone(),
        date: parts.date,
        week: parts.week,
        month: parts.month,
        year: parts.year,
        time: parts.time,
        category: category.to_string(),
        credibility,
        fake_prob,
        status,
        sentiment: sentiment.as_str().to_string(),
        sentiment_score,
        associate_media: AssociatedMedia::default(),
        location: Location {
            district: district.to_string(),
            state: state.to_string(),
            country: country.to_string(),
        },
        reporter_id: None,
        reporter_name: None,
        evidence_sources: Vec::new(),
        breaking: rng.gen_bool(breaking_ratio),
        created_at: published_at,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
