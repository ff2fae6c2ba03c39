//! Form session endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::SessionKey;
use crate::{error::AppResult, AppState};

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    /// Value to send back in the `X-Session-Id` header
    pub session_id: Uuid,
    /// Arithmetic question the submission must answer
    pub captcha_question: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct CaptchaResponse {
    pub captcha_question: String,
}

/// Open a new form session
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = SessionResponse)
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = state.services.sessions.start(Utc::now())?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id,
            captcha_question: session.captcha_question,
            expires_at: session.expires_at,
        }),
    ))
}

/// End the current session
#[utoipa::path(
    delete,
    path = "/sessions/current",
    tag = "sessions",
    params(("X-Session-Id" = Uuid, Header, description = "Form session id")),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Unknown session", body = crate::error::ErrorResponse)
    )
)]
pub async fn end_session(
    State(state): State<AppState>,
    SessionKey(id): SessionKey,
) -> AppResult<StatusCode> {
    state.services.sessions.end(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current captcha question of the session
///
/// The question changes after every accepted submission.
#[utoipa::path(
    get,
    path = "/sessions/current/captcha",
    tag = "sessions",
    params(("X-Session-Id" = Uuid, Header, description = "Form session id")),
    responses(
        (status = 200, description = "Captcha question", body = CaptchaResponse),
        (status = 404, description = "Unknown session", body = crate::error::ErrorResponse)
    )
)]
pub async fn current_captcha(
    State(state): State<AppState>,
    SessionKey(id): SessionKey,
) -> AppResult<Json<CaptchaResponse>> {
    let captcha_question = state.services.sessions.captcha_question(id, Utc::now())?;
    Ok(Json(CaptchaResponse { captcha_question }))
}

/// Download the PDF summary of the session's last accepted submission
#[utoipa::path(
    get,
    path = "/sessions/current/receipt",
    tag = "sessions",
    params(("X-Session-Id" = Uuid, Header, description = "Form session id")),
    responses(
        (status = 200, description = "PDF summary as application/pdf"),
        (status = 404, description = "Unknown session or no receipt", body = crate::error::ErrorResponse)
    )
)]
pub async fn download_receipt(
    State(state): State<AppState>,
    SessionKey(id): SessionKey,
) -> AppResult<impl IntoResponse> {
    let receipt = state.services.sessions.receipt(id)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", receipt.file_name),
            ),
        ],
        receipt.pdf,
    ))
}
