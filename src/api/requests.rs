//! Service request submission endpoint

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;

use super::SessionKey;
use crate::{
    error::{AppError, AppResult},
    models::{AttachmentCategory, AttachmentTarget, ServiceRequestForm, Submission, UploadedFile},
    services::intake::SubmissionOutcome,
    AppState,
};

/// Category and equipment link of a file part, from its field name
///
/// `invoice` applies to every equipment, `invoice_{n}` and `evidence_{n}` to
/// the n-th one, `attachment` to none.
pub fn file_part(name: &str) -> Option<(AttachmentCategory, AttachmentTarget)> {
    let numbered = |prefix: &str| {
        name.strip_prefix(prefix)
            .and_then(|n| n.parse::<usize>().ok())
            .map(AttachmentTarget::Equipment)
    };

    match name {
        "invoice" => Some((AttachmentCategory::Invoice, AttachmentTarget::AllEquipment)),
        "evidence" => Some((AttachmentCategory::FailureEvidence, AttachmentTarget::Equipment(1))),
        "attachment" => Some((AttachmentCategory::General, AttachmentTarget::Unlinked)),
        _ => numbered("invoice_")
            .map(|target| (AttachmentCategory::Invoice, target))
            .or_else(|| numbered("evidence_").map(|target| (AttachmentCategory::FailureEvidence, target))),
    }
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", e))
}

/// Read the multipart body into a submission
async fn read_submission(mut multipart: Multipart) -> AppResult<Submission> {
    let mut form: Option<ServiceRequestForm> = None;
    let mut captcha_answer = None;
    let mut honeypot = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "payload" => {
                let text = field.text().await.map_err(malformed)?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| AppError::BadRequest(format!("Invalid form payload: {}", e)))?;
                form = Some(parsed);
            }
            "captcha_answer" => captcha_answer = Some(field.text().await.map_err(malformed)?),
            "website" => honeypot = Some(field.text().await.map_err(malformed)?),
            other => {
                let Some((category, target)) = file_part(other) else {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                    continue;
                };
                let file_name = field.file_name().unwrap_or(other).to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;
                if bytes.is_empty() {
                    continue;
                }
                files.push(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                    category,
                    target,
                });
            }
        }
    }

    let form = form.ok_or_else(|| AppError::BadRequest("Missing form payload".to_string()))?;

    Ok(Submission {
        form,
        captcha_answer,
        honeypot,
        files,
    })
}

/// Submit a service request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    params(("X-Session-Id" = uuid::Uuid, Header, description = "Form session id")),
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "`payload` (form JSON), `captcha_answer`, `website`, and files `invoice`, `invoice_{n}`, `evidence_{n}`, `attachment`"
    ),
    responses(
        (status = 201, description = "Request stored", body = SubmissionOutcome),
        (status = 400, description = "Malformed body or security check failed", body = crate::error::ErrorResponse),
        (status = 403, description = "Session blocked", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown session", body = crate::error::ErrorResponse),
        (status = 422, description = "Missing or invalid fields", body = crate::error::ErrorResponse),
        (status = 429, description = "Too many submissions", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_request(
    State(state): State<AppState>,
    SessionKey(session_id): SessionKey,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<SubmissionOutcome>)> {
    let submission = read_submission(multipart).await?;
    let outcome = state.services.intake.submit(session_id, submission).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
