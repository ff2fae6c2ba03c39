//! Submission pipeline
//!
//! Screening and validation happen before anything is written. Attachments
//! are uploaded before the transaction because their URLs are stored with
//! it. Once the request is committed, failures of the PDF, its upload or the
//! email only produce warnings.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    email::{EmailAttachment, Mailer, OutgoingEmail},
    sessions::SessionService,
    storage::{upload_many, ObjectStorage, StoredObject},
};
use crate::{
    config::AppConfig,
    documents::{build_summary, confirmation, pdf},
    error::{AppError, AppResult},
    models::{AttachmentCategory, ServiceRequestForm, Submission},
    repository::{NewSubmission, Repository},
    rules::{
        category_code,
        derived::{build_equipment, build_request},
        evaluate,
    },
    security::{Receipt, SecurityGate, SecurityRejection},
};

/// Converts instants to the business's local wall-clock time
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or(Utc.fix());
        Self { offset }
    }

    pub fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset).naive_local()
    }
}

/// Answer to an accepted submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    pub request_id: i32,
    pub category: String,
    /// Tracking numbers of the registered equipment, in form order
    pub osts: Vec<i32>,
    pub pdf_url: Option<String>,
    pub email_sent: bool,
    pub receipt_available: bool,
    /// Problems that did not prevent storing the request
    pub warnings: Vec<String>,
    pub message: String,
}

/// Result of the steps run after commit
#[derive(Debug, Default)]
pub(crate) struct Delivery {
    pub pdf: Option<Vec<u8>>,
    pub pdf_url: Option<String>,
    pub email_sent: bool,
    pub warnings: Vec<String>,
}

/// What the post-commit steps need to know about a stored request
pub(crate) struct DeliveryRequest<'a> {
    pub form: &'a ServiceRequestForm,
    pub category: &'a str,
    pub request_id: i32,
    pub osts: &'a [i32],
    pub at: NaiveDateTime,
    pub pdf_folder: String,
    pub copy_address: Option<String>,
}

/// Render the summary, archive it and email the requester
pub(crate) async fn deliver(
    storage: &dyn ObjectStorage,
    mailer: &dyn Mailer,
    req: DeliveryRequest<'_>,
) -> Delivery {
    let mut delivery = Delivery::default();

    let summary = build_summary(req.form, req.request_id, req.osts, req.at);
    let pdf = match pdf::render(&summary) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = req.request_id, "PDF generation failed: {}", e);
            delivery
                .warnings
                .push(format!("No se pudo generar el PDF: {}", e));
            return delivery;
        }
    };

    let archive = confirmation::archive_name(req.request_id, req.at);
    match storage
        .upload(StoredObject::pdf(&archive, req.pdf_folder, pdf.clone(), req.at))
        .await
    {
        Ok(url) => delivery.pdf_url = Some(url),
        Err(e) => {
            tracing::warn!(request_id = req.request_id, "PDF upload failed: {}", e);
            delivery
                .warnings
                .push(format!("No se pudo subir el PDF: {}", e));
        }
    }

    let message = confirmation::compose(req.form, req.category, req.request_id, req.osts, req.at);
    let to = req.form.email.clone().unwrap_or_default();
    let email = OutgoingEmail {
        to,
        cc: req.copy_address,
        subject: message.subject,
        body: message.body,
        attachment: Some(EmailAttachment {
            file_name: message.attachment_name,
            content_type: "application/pdf".to_string(),
            bytes: pdf.clone(),
        }),
    };
    match mailer.send(email).await {
        Ok(()) => delivery.email_sent = true,
        Err(e) => {
            tracing::warn!(request_id = req.request_id, "Confirmation email failed: {}", e);
            delivery
                .warnings
                .push(format!("No se pudo enviar el email de confirmación: {}", e));
        }
    }

    delivery.pdf = Some(pdf);
    delivery
}

/// Screen, validate and admit a submission under one session lock
///
/// The rate-limit slot and the captcha are consumed in the same critical
/// section that checked them. A form that fails validation consumes neither.
pub(crate) fn accept(
    sessions: &SessionService,
    gate: &SecurityGate,
    session_id: Uuid,
    submission: &mut Submission,
    now: DateTime<Utc>,
) -> AppResult<String> {
    sessions.with_session(session_id, now, |ctx, limiter| {
        gate.screen(ctx, limiter, submission, now)
            .map_err(|rejection: SecurityRejection| {
                if !rejection.is_suspicious() {
                    tracing::info!(session = %session_id, reason = rejection.reason_code(), "Submission rejected");
                }
                AppError::from(rejection)
            })?;

        submission.form.normalize();
        let outcome = evaluate(&submission.form);
        if !outcome.valid {
            return Err(AppError::Validation(outcome.errors));
        }

        gate.admit(ctx, limiter, submission, now);
        Ok(category_code(&submission.form))
    })?
}

fn success_message(request_id: i32, osts: &[i32]) -> String {
    if osts.is_empty() {
        format!("Solicitud #{} guardada correctamente!", request_id)
    } else {
        let list = osts
            .iter()
            .map(|o| format!("#{}", o))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Solicitud #{} guardada correctamente! OST(s): {}",
            request_id, list
        )
    }
}

#[derive(Clone)]
pub struct IntakeService {
    repository: Repository,
    sessions: SessionService,
    gate: SecurityGate,
    storage: Arc<dyn ObjectStorage>,
    mailer: Arc<dyn Mailer>,
    clock: LocalClock,
    base_folder: String,
    copy_address: Option<String>,
}

impl IntakeService {
    pub fn new(
        repository: Repository,
        sessions: SessionService,
        storage: Arc<dyn ObjectStorage>,
        mailer: Arc<dyn Mailer>,
        copy_address: Option<String>,
        config: &AppConfig,
    ) -> Self {
        Self {
            repository,
            sessions,
            gate: SecurityGate::new(&config.security),
            storage,
            mailer,
            clock: LocalClock::new(config.locale.utc_offset_hours),
            base_folder: config.storage.base_folder.clone(),
            copy_address,
        }
    }

    pub fn clock(&self) -> LocalClock {
        self.clock
    }

    /// Screen, validate and store one submission
    pub async fn submit(
        &self,
        session_id: Uuid,
        mut submission: Submission,
    ) -> AppResult<SubmissionOutcome> {
        let now = Utc::now();

        let category = accept(&self.sessions, &self.gate, session_id, &mut submission, now)?;

        let local = self.clock.local(now);
        let mut warnings = Vec::new();

        let uploads = upload_many(
            self.storage.as_ref(),
            &self.base_folder,
            &submission.files,
            local,
        )
        .await;
        for (file, error) in &uploads.failures {
            warnings.push(format!("No se pudo subir {}: {}", file, error));
        }
        let invoice_url = uploads
            .attachments
            .iter()
            .find(|a| a.category == AttachmentCategory::Invoice)
            .map(|a| a.url.clone());

        let data = NewSubmission {
            request: build_request(&submission.form, &category, local),
            equipment: build_equipment(&submission.form, local),
            attachments: uploads.attachments,
            invoice_url,
        };

        let persisted = self
            .repository
            .requests_insert_submission(&data)
            .await
            .map_err(|e| {
                tracing::error!(session = %session_id, "Submission could not be stored: {}", e);
                e
            })?;
        let osts = persisted.osts();

        tracing::info!(
            request_id = persisted.request_id,
            category = %category,
            equipment = osts.len(),
            "Service request stored"
        );

        let delivery = deliver(
            self.storage.as_ref(),
            self.mailer.as_ref(),
            DeliveryRequest {
                form: &submission.form,
                category: &category,
                request_id: persisted.request_id,
                osts: &osts,
                at: local,
                pdf_folder: format!("{}/pdfs", self.base_folder),
                copy_address: self.copy_address.clone(),
            },
        )
        .await;
        warnings.extend(delivery.warnings);

        if let Some(url) = &delivery.pdf_url {
            if let Err(e) = self
                .repository
                .requests_set_pdf_url(persisted.request_id, url)
                .await
            {
                tracing::warn!(request_id = persisted.request_id, "Could not record PDF URL: {}", e);
                warnings.push("No se pudo registrar la URL del PDF".to_string());
            }
        }

        let receipt_available = match delivery.pdf {
            Some(pdf) => {
                let receipt = Receipt {
                    request_id: persisted.request_id,
                    file_name: confirmation::attachment_name(persisted.request_id, local),
                    pdf,
                };
                self.sessions.store_receipt(session_id, receipt).is_ok()
            }
            None => false,
        };

        Ok(SubmissionOutcome {
            request_id: persisted.request_id,
            message: success_message(persisted.request_id, &osts),
            category,
            osts,
            pdf_url: delivery.pdf_url,
            email_sent: delivery.email_sent,
            receipt_available,
            warnings,
        })
    }
}
