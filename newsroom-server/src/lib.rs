//! newsroom-server library
//!
//! News aggregation service: public feeds and search, reporter submissions
//! with automatic enrichment, and admin dashboards over the news database.

use axum::Router;
use newsroom_common::config::NewsroomConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

pub mod api;
pub mod assistant;
pub mod db;
pub mod enrich;
pub mod error;
pub mod media;
pub mod pagination;
pub mod validation;

pub use error::{ApiError, ApiResult};

use assistant::{ChatAssistant, PineconeAssistant};
use enrich::Enricher;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Resolved configuration
    pub config: Arc<NewsroomConfig>,
    /// Enrichment pipeline with the configured integrations
    pub enricher: Arc<Enricher>,
    /// Chatbot backend, absent without an API key
    pub assistant: Option<Arc<dyn ChatAssistant>>,
    /// Server start, for uptime reporting
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: NewsroomConfig,
        enricher: Enricher,
        assistant: Option<Arc<dyn ChatAssistant>>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            enricher: Arc::new(enricher),
            assistant,
            startup_time: Instant::now(),
        }
    }

    /// State with every integration enabled in `config`
    pub fn from_config(db: SqlitePool, config: NewsroomConfig) -> Self {
        let enricher = Enricher::from_config(&config);

        let assistant: Option<Arc<dyn ChatAssistant>> = match &config.pinecone_api_key {
            Some(key) => match PineconeAssistant::new(key, &config.assistant_name) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!("Chat assistant disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        Self::new(db, config, enricher, assistant)
    }
}

/// Build application router
///
/// Admin and reporter routers carry their role guard; health checks, the
/// public pages and account routes need no session.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::services::ServeDir;

    let admin = Router::new()
        .route("/admin", get(api::admin::index_redirect))
        .route("/admin/", get(api::admin::index_redirect))
        .route("/admin/dashboard", get(api::admin::dashboard))
        .route("/admin/news", get(api::admin::news_listing))
        .route("/admin/news/data", get(api::admin::news_data))
        .route("/admin/news/visualization", get(api::admin::news_visualization))
        .route("/admin/news/viz", get(api::admin::news_visualization))
        .route("/admin/news/charts/data", get(api::admin::chart_data))
        .route("/admin/news/sample", get(api::admin::news_sample))
        .route("/admin/news/status", post(api::admin::update_news_status))
        .route("/admin/news/:id", get(api::admin::news_details))
        .route("/admin/users", get(api::admin::users_listing))
        .route("/admin/users/data", get(api::admin::users_data))
        .route("/admin/users/metrics", get(api::admin::users_metrics))
        .route("/admin/users/update-role", post(api::admin::update_user_role))
        .route("/admin/users/delete", post(api::admin::delete_user))
        .route("/admin/sources", get(api::admin::sources))
        .route("/admin/sources/data", get(api::admin::sources))
        .route("/admin/analytics", get(api::admin::analytics_redirect))
        .route("/admin/settings", get(api::admin::settings))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let upload_limit = DefaultBodyLimit::max(media::UPLOAD_BODY_LIMIT);
    let reporter = Router::new()
        .route("/reporter", get(api::reporter::index_redirect))
        .route("/reporter/", get(api::reporter::index_redirect))
        .route("/reporter/dashboard", get(api::reporter::dashboard))
        .route("/reporter/submit", post(api::reporter::submit))
        .route("/reporter/submissions", get(api::reporter::submissions))
        .route("/reporter/submissions/api", get(api::reporter::submissions))
        .route(
            "/reporter/upload/images",
            post(api::reporter::upload_images).layer(upload_limit.clone()),
        )
        .route(
            "/reporter/upload/videos",
            post(api::reporter::upload_videos).layer(upload_limit),
        )
        .route("/reporter/upload/status", get(api::reporter::upload_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_reporter,
        ));

    let public = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/user/dashboard", get(api::public::dashboard_redirect))
        .route("/user/dashboard/", get(api::public::dashboard_redirect))
        .route("/user/dashboard/search", get(api::public::search))
        .route("/user/dashboard/:category", get(api::public::category_feed))
        .route("/user/for_you", get(api::public::for_you))
        .route("/user/chatbot", get(api::ui::serve_chatbot))
        .route("/user/news-analysis", get(api::ui::serve_news_analysis))
        .route("/user/news-analysis/analyze", post(api::public::analyze))
        .route("/chat", post(api::public::chat))
        .route(
            "/register",
            get(api::auth::register_page).post(api::auth::register),
        )
        .route("/login", get(api::auth::login_page).post(api::auth::login))
        .route("/logout", post(api::auth::logout))
        .merge(api::health_routes());

    let upload_root = state.config.upload_root();
    let media_files = Router::new()
        .nest_service("/images", ServeDir::new(upload_root.join("images")))
        .nest_service("/videos", ServeDir::new(upload_root.join("videos")));

    Router::new()
        .merge(admin)
        .merge(reporter)
        .merge(public)
        .merge(media_files)
        .with_state(state)
}
