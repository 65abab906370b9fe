//! End-user routes: feeds, search, text analysis and the chatbot

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::db::{news, NewsDocument, SearchMethod};
use crate::enrich::{truncate_chars, AnalysisResult};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::AppState;

/// Category name selecting the breaking feed
pub const BREAKING_CATEGORY: &str = "breakingnews";

/// Longest accepted search query, in characters
pub const MAX_QUERY_CHARS: usize = 100;

/// Longest text analyzed by `/user/news-analysis/analyze`
pub const MAX_ANALYZE_CHARS: usize = 5000;

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub selected_category: String,
    pub news_list: Vec<NewsDocument>,
    pub news_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub selected_category: &'static str,
    pub search_query: String,
    pub search_truncated: bool,
    pub search_method: SearchMethod,
    pub news_list: Vec<NewsDocument>,
    pub news_count: usize,
}

/// GET /user/dashboard
pub async fn dashboard_redirect() -> Redirect {
    Redirect::to("/user/dashboard/breakingnews")
}

async fn load_feed(state: &AppState, category: &str) -> ApiResult<FeedResponse> {
    let news_list = if category == BREAKING_CATEGORY {
        news::breaking_news(&state.db).await?
    } else {
        news::news_by_category(&state.db, category).await?
    };

    info!(category = %category, count = news_list.len(), "Loaded feed");

    Ok(FeedResponse {
        selected_category: category.to_string(),
        news_count: news_list.len(),
        news_list,
    })
}

/// GET /user/dashboard/:category
pub async fn category_feed(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<FeedResponse>> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ApiError::BadRequest("Category is required".to_string()));
    }
    Ok(Json(load_feed(&state, category).await?))
}

/// GET /user/for_you
pub async fn for_you(State(state): State<AppState>) -> ApiResult<Json<FeedResponse>> {
    Ok(Json(load_feed(&state, BREAKING_CATEGORY).await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /user/dashboard/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let raw = params.q.unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("Please enter a search term".to_string()));
    }

    let query = truncate_chars(raw, MAX_QUERY_CHARS);
    let search_truncated = query.len() < raw.len();

    let (news_list, search_method) = news::search_news(&state.db, query).await?;

    Ok(Json(SearchResponse {
        selected_category: "search",
        search_query: query.to_string(),
        search_truncated,
        search_method,
        news_count: news_list.len(),
        news_list,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub result: AnalysisResult,
}

/// POST /user/news-analysis/analyze
///
/// Runs the enrichment steps on the text without storing anything.
pub async fn analyze(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Some(text) = request.text else {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Empty text provided".to_string()));
    }

    let text = truncate_chars(text, MAX_ANALYZE_CHARS);
    let result = state.enricher.analyze(text).await;

    Ok(Json(AnalyzeResponse {
        success: true,
        result,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> ApiResult<Json<Value>> {
    let message = request.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Empty message".to_string()));
    }

    let Some(assistant) = &state.assistant else {
        return Err(ApiError::ServiceUnavailable(
            "Chat assistant is not configured".to_string(),
        ));
    };

    let reply = assistant.chat(message).await.map_err(|e| {
        warn!("Assistant request failed: {}", e);
        ApiError::Internal("Chat assistant request failed".to_string())
    })?;

    Ok(Json(json!({ "reply": reply })))
}
