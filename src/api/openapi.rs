//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{form, health, requests, sessions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Syemed ST Intake API",
        version = "1.0.0",
        description = "Technical-service request intake for medical equipment",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Sessions
        sessions::start_session,
        sessions::end_session,
        sessions::current_captcha,
        sessions::download_receipt,
        // Form
        form::get_options,
        form::evaluate_form,
        // Requests
        requests::submit_request,
    ),
    components(
        schemas(
            health::HealthResponse,
            sessions::SessionResponse,
            sessions::CaptchaResponse,
            form::EvaluationResponse,
            crate::rules::Stage,
            crate::models::reference::ReferenceData,
            crate::models::ServiceRequestForm,
            crate::models::EquipmentEntry,
            crate::models::request::EquipmentBatch,
            crate::services::intake::SubmissionOutcome,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sessions", description = "Form sessions, captcha and receipts"),
        (name = "form", description = "Form options and live evaluation"),
        (name = "requests", description = "Service request submission")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
