//! Admin routes
//!
//! Every handler here sits behind [`require_admin`](super::auth::require_admin).
//! Listings share the pagination rules in [`crate::pagination`].

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use newsroom_common::db::{NewsStatus, Role};
use newsroom_common::time;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::db::metrics::{self, ChartData, NewsMetrics, PreviewData, SourceStats, UserMetrics};
use crate::db::{news, users, NewsDocument, NewsFilter, UserRecord};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::pagination::{calculate_pagination, clamp_limit, PageInfo, ADMIN_PAGE_SIZE};
use crate::AppState;

/// Articles shown in the dashboard preview
pub const DASHBOARD_RECENT: i64 = 5;

/// Cap on articles returned for client-side analysis
pub const SAMPLE_LIMIT: i64 = 1000;

// ========================================
// Dashboard
// ========================================

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub today: String,
    pub today_metrics: NewsMetrics,
    pub overall_metrics: NewsMetrics,
    pub preview_data: PreviewData,
    pub recent_news: Vec<NewsDocument>,
}

/// GET /admin
pub async fn index_redirect() -> Redirect {
    Redirect::to("/admin/dashboard")
}

/// GET /admin/analytics
pub async fn analytics_redirect() -> Redirect {
    Redirect::to("/admin/news/viz")
}

/// GET /admin/dashboard
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    Ok(Json(DashboardResponse {
        today: time::format_timestamp(time::now()),
        today_metrics: metrics::today_metrics(&state.db).await?,
        overall_metrics: metrics::overall_metrics(&state.db).await?,
        preview_data: metrics::preview_data(&state.db).await?,
        recent_news: news::recent_news(&state.db, DASHBOARD_RECENT).await?,
    }))
}

// ========================================
// News
// ========================================

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsPage {
    pub articles: Vec<NewsDocument>,
    #[serde(flatten)]
    pub page: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct NewsListing {
    pub news_data: NewsPage,
    pub categories: Vec<String>,
    pub current_category: String,
    pub current_search: String,
}

async fn news_page(state: &AppState, params: &NewsParams, limit: i64) -> ApiResult<NewsPage> {
    let filter = NewsFilter::new(params.category.as_deref(), params.search.as_deref());
    let total = news::count_news(&state.db, &filter).await?;
    let page = calculate_pagination(total, params.page.unwrap_or(1), limit);
    let articles = news::list_news_page(&state.db, &filter, limit, page.offset).await?;
    Ok(NewsPage { articles, page })
}

/// GET /admin/news
pub async fn news_listing(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> ApiResult<Json<NewsListing>> {
    let news_data = news_page(&state, &params, ADMIN_PAGE_SIZE).await?;
    let categories = news::categories_list(&state.db).await?;

    Ok(Json(NewsListing {
        news_data,
        categories,
        current_category: params.category.unwrap_or_else(|| "all".to_string()),
        current_search: params.search.unwrap_or_default(),
    }))
}

/// GET /admin/news/data
pub async fn news_data(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> ApiResult<Json<NewsPage>> {
    let limit = clamp_limit(params.limit);
    Ok(Json(news_page(&state, &params, limit).await?))
}

#[derive(Debug, Serialize)]
pub struct VisualizationResponse {
    pub chart_data: ChartData,
    pub sample_count: usize,
}

/// GET /admin/news/visualization, /admin/news/viz
pub async fn news_visualization(
    State(state): State<AppState>,
) -> ApiResult<Json<VisualizationResponse>> {
    let chart_data = metrics::chart_data(&state.db).await?;
    let sample = news::recent_news(&state.db, SAMPLE_LIMIT).await?;
    Ok(Json(VisualizationResponse {
        chart_data,
        sample_count: sample.len(),
    }))
}

/// GET /admin/news/charts/data
pub async fn chart_data(State(state): State<AppState>) -> ApiResult<Json<ChartData>> {
    Ok(Json(metrics::chart_data(&state.db).await?))
}

/// GET /admin/news/sample
pub async fn news_sample(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let articles = news::recent_news(&state.db, SAMPLE_LIMIT).await?;
    Ok(Json(json!({
        "count": articles.len(),
        "articles": articles,
    })))
}

/// GET /admin/news/:id
pub async fn news_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NewsDocument>> {
    news::get_news_by_id(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("News article not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub news_id: Option<String>,
    pub status: Option<String>,
    pub breaking: Option<bool>,
}

/// POST /admin/news/status
///
/// Moderation: change an article's status and optionally its breaking flag.
pub async fn update_news_status(
    State(state): State<AppState>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> ApiResult<Json<Value>> {
    let (Some(news_id), Some(status)) = (update.news_id, update.status) else {
        return Err(ApiError::BadRequest("News ID and status are required".to_string()));
    };
    let status: NewsStatus = status
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid status specified".to_string()))?;

    if !news::update_status(&state.db, &news_id, status, update.breaking).await? {
        return Err(ApiError::NotFound("News article not found".to_string()));
    }

    info!(news_id = %news_id, status = %status, breaking = ?update.breaking, "News status updated");
    Ok(Json(json!({
        "success": true,
        "message": "News status updated successfully",
    })))
}

// ========================================
// Users
// ========================================

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsersPage {
    pub users: Vec<UserRecord>,
    #[serde(flatten)]
    pub page: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct UsersListing {
    pub users_data: UsersPage,
    pub user_metrics: UserMetrics,
    pub current_role: String,
}

/// `all` or blank means every role
fn role_filter(raw: Option<&str>) -> ApiResult<Option<Role>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(role) => role
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest("Invalid role specified".to_string())),
    }
}

async fn users_page(state: &AppState, params: &UserParams, limit: i64) -> ApiResult<UsersPage> {
    let role = role_filter(params.role.as_deref())?;
    let total = users::count_users(&state.db, role).await?;
    let page = calculate_pagination(total, params.page.unwrap_or(1), limit);
    let users = users::list_users_page(&state.db, role, limit, page.offset).await?;
    Ok(UsersPage { users, page })
}

/// GET /admin/users
pub async fn users_listing(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> ApiResult<Json<UsersListing>> {
    let users_data = users_page(&state, &params, ADMIN_PAGE_SIZE).await?;
    let user_metrics = metrics::user_metrics(&state.db).await?;

    Ok(Json(UsersListing {
        users_data,
        user_metrics,
        current_role: params.role.unwrap_or_else(|| "all".to_string()),
    }))
}

/// GET /admin/users/data
pub async fn users_data(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> ApiResult<Json<UsersPage>> {
    let limit = clamp_limit(params.limit);
    Ok(Json(users_page(&state, &params, limit).await?))
}

/// GET /admin/users/metrics
pub async fn users_metrics(State(state): State<AppState>) -> ApiResult<Json<UserMetrics>> {
    Ok(Json(metrics::user_metrics(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// POST /admin/users/update-role
pub async fn update_user_role(
    State(state): State<AppState>,
    JsonBody(update): JsonBody<RoleUpdate>,
) -> ApiResult<Json<Value>> {
    let (Some(user_id), Some(role)) = (
        update.user_id.filter(|id| !id.trim().is_empty()),
        update.role.filter(|r| !r.trim().is_empty()),
    ) else {
        return Err(ApiError::BadRequest("User ID and role are required".to_string()));
    };

    let role: Role = role
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid role specified".to_string()))?;

    if !users::update_role(&state.db, &user_id, role).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "User role updated successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserDelete {
    pub user_id: Option<String>,
}

/// POST /admin/users/delete
pub async fn delete_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UserDelete>,
) -> ApiResult<Json<Value>> {
    let Some(user_id) = request.user_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::BadRequest("User ID is required".to_string()));
    };

    if !users::delete_user(&state.db, &user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}

// ========================================
// Sources and settings
// ========================================

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<SourceStats>,
    pub count: usize,
}

/// GET /admin/sources, /admin/sources/data
pub async fn sources(State(state): State<AppState>) -> ApiResult<Json<SourcesResponse>> {
    let sources = metrics::sources_data(&state.db).await?;
    Ok(Json(SourcesResponse {
        count: sources.len(),
        sources,
    }))
}

/// GET /admin/settings
///
/// Reports which integrations are active; key values are never returned.
pub async fn settings(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "integrations": {
            "web_search": config.web_search_enabled,
            "news_api": config.news_api_key.is_some(),
            "language_model": state.enricher.has_classifier(),
            "chat_assistant": state.assistant.is_some(),
        },
        "evidence_sources": state.enricher.evidence_source_names(),
        "assistant_name": config.assistant_name,
        "session_hours": config.session_hours,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_filter() {
        assert_eq!(role_filter(None).unwrap(), None);
        assert_eq!(role_filter(Some("all")).unwrap(), None);
        assert_eq!(role_filter(Some(" ")).unwrap(), None);
        assert_eq!(role_filter(Some("news_reporter")).unwrap(), Some(Role::NewsReporter));
        assert!(role_filter(Some("root")).is_err());
    }
}
