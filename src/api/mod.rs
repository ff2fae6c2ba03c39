//! API handlers for the intake REST endpoints

pub mod form;
pub mod health;
pub mod openapi;
pub mod requests;
pub mod sessions;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::request::Parts,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{error::AppError, AppState};

/// Header carrying the form session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Extractor for the form session named by the `X-Session-Id` header
pub struct SessionKey(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for SessionKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing X-Session-Id header".to_string()))?;

        let id = Uuid::parse_str(value.trim())
            .map_err(|_| AppError::BadRequest("Invalid X-Session-Id header".to_string()))?;

        Ok(SessionKey(id))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_mb * 1024 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Sessions
        .route("/sessions", post(sessions::start_session))
        .route("/sessions/current", delete(sessions::end_session))
        .route("/sessions/current/captcha", get(sessions::current_captcha))
        .route("/sessions/current/receipt", get(sessions::download_receipt))
        // Form
        .route("/form/options", get(form::get_options))
        .route("/form/evaluate", post(form::evaluate_form))
        // Requests
        .route("/requests", post(requests::submit_request))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
