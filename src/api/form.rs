//! Form helper endpoints
//!
//! Both are stateless: the UI calls them while the user fills the form.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{reference::ReferenceData, Motive, ServiceRequestForm},
    rules::{category_code, evaluate, FormState, Stage},
};

#[derive(Serialize, ToSchema)]
pub struct EvaluationResponse {
    /// Next question the form has to ask
    pub stage: Stage,
    /// Motives offered for the chosen ownership path
    pub available_motives: Vec<String>,
    /// Several units may be entered as one batch of serial numbers
    pub bulk_equipment: bool,
    /// An invoice upload is requested
    pub invoice_expected: bool,
    /// Photos or videos of the failure may be attached
    pub failure_evidence: bool,
    pub valid: bool,
    /// Required-field and format errors, in form order
    pub errors: Vec<String>,
    pub category: String,
}

/// Option lists for every selector of the form
#[utoipa::path(
    get,
    path = "/form/options",
    tag = "form",
    responses(
        (status = 200, description = "Reference data", body = ReferenceData)
    )
)]
pub async fn get_options() -> Json<ReferenceData> {
    Json(ReferenceData::load())
}

/// Evaluate a partially or fully filled form
#[utoipa::path(
    post,
    path = "/form/evaluate",
    tag = "form",
    request_body = ServiceRequestForm,
    responses(
        (status = 200, description = "Form state and errors", body = EvaluationResponse)
    )
)]
pub async fn evaluate_form(Json(mut form): Json<ServiceRequestForm>) -> Json<EvaluationResponse> {
    form.normalize();
    let state = FormState::resolve(&form);
    let outcome = evaluate(&form);

    Json(EvaluationResponse {
        stage: state.stage(),
        available_motives: state
            .available_motives()
            .iter()
            .map(|m| m.option_label().to_string())
            .collect(),
        bulk_equipment: state.allows_bulk_equipment(),
        invoice_expected: state.invoice_expected(),
        failure_evidence: state.motive.is_some_and(Motive::collects_failure_evidence),
        valid: outcome.valid,
        errors: outcome.errors,
        category: category_code(&form),
    })
}
