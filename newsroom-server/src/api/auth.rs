//! Session authentication and account routes
//!
//! Sessions are server-side rows keyed by a random token carried in the
//! `newsroom_session` cookie. The role guards below run as middleware on the
//! admin and reporter routers and place the [`Session`] in request
//! extensions for handlers.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use newsroom_common::api::{create_credentials, verify_password};
use newsroom_common::db::Role;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::db::{sessions, users, NewUser, Session};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Cookie holding the session token
pub const SESSION_COOKIE: &str = "newsroom_session";

const LOGIN_HTML: &str = include_str!("../ui/login.html");
const REGISTER_HTML: &str = include_str!("../ui/register.html");

/// Session token from the request cookies, if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// Load the caller's session, `None` when absent or expired
pub async fn load_session(state: &AppState, headers: &HeaderMap) -> ApiResult<Option<Session>> {
    match session_token(headers) {
        Some(token) => Ok(sessions::find_session(&state.db, &token).await?),
        None => Ok(None),
    }
}

/// Guard for `/admin`: admin role required
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(session) = load_session(&state, request.headers()).await? else {
        return Err(ApiError::Unauthorized {
            message: "Authentication required".to_string(),
            redirect: Some("/login"),
        });
    };

    if session.role != Role::Admin {
        warn!(user_id = %session.user_id, "Non-admin attempted admin access");
        return Err(ApiError::Forbidden {
            message: "Access denied. Admin privileges required.".to_string(),
            redirect: Some("/user/dashboard"),
        });
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Guard for `/reporter`: news_reporter or admin role required
pub async fn require_reporter(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(session) = load_session(&state, request.headers()).await? else {
        return Err(ApiError::unauthorized("User not logged in"));
    };

    if !session.role.can_report() {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

// ========================================
// Registration
// ========================================

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

/// GET /register
pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_HTML)
}

/// POST /register
///
/// Self-registration may choose `user` or `news_reporter`; admin accounts
/// are granted by an existing admin.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<impl IntoResponse> {
    let first_name = required(form.first_name, "First name")?;
    let last_name = required(form.last_name, "Last name")?;
    let email = required(form.email, "Email")?;
    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Password is required".to_string()))?;

    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    let age = match form.age.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        Some(raw) => Some(
            raw.parse::<i64>()
                .ok()
                .filter(|age| (0..=150).contains(age))
                .ok_or_else(|| ApiError::BadRequest("Invalid age".to_string()))?,
        ),
        None => None,
    };

    let role = match form.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| ApiError::BadRequest("Invalid role specified".to_string()))?,
        None => Role::User,
    };
    if role == Role::Admin {
        return Err(ApiError::BadRequest(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let (password_hash, password_salt) =
        create_credentials(&password).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = users::create_user(
        &state.db,
        NewUser {
            first_name,
            last_name,
            email,
            age,
            location: form.location,
            role,
            password_hash,
            password_salt,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "user_id": user.id,
            "redirect": "/login",
        })),
    ))
}

// ========================================
// Login / logout
// ========================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// POST /login
///
/// On success sets the session cookie and tells the client where the
/// user's role lands.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let (Some(email), Some(password)) = (
        form.email.filter(|e| !e.trim().is_empty()),
        form.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Missing credentials".to_string()));
    };

    let invalid = || ApiError::unauthorized("Invalid email or password");

    let credentials = users::find_credentials_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&password, &credentials.password_salt, &credentials.password_hash) {
        warn!(user_id = %credentials.user.id, "Failed login attempt");
        return Err(invalid());
    }

    let hours = state.config.session_hours;
    let session = sessions::create_session(&state.db, &credentials.user, hours).await?;
    info!(user_id = %session.user_id, role = %session.role, "User logged in");

    let cookie = HeaderValue::from_str(&session_cookie(&session.token, hours * 3600))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let body = Json(json!({
        "success": true,
        "message": "Login successful",
        "redirect": session.role.home_path(),
    }));

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if let Some(token) = session_token(&headers) {
        sessions::delete_session(&state.db, &token).await?;
    }

    let cleared = HeaderValue::from_str(&session_cookie("", 0))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let body = Json(json!({
        "success": true,
        "message": "Logged out",
        "redirect": "/login",
    }));

    Ok(([(header::SET_COOKIE, cleared)], body).into_response())
}
