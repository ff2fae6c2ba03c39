//! Security checks applied to every submission

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    files::{FileRejection, FileValidator},
    rate_limit::{RateLimited, RateLimiter},
    sanitize::{sanitize_email, sanitize_form, TextLimits},
    session::SessionContext,
};
use crate::{config::SecurityConfig, error::AppError, models::Submission};

#[derive(Debug, Error)]
pub enum SecurityRejection {
    #[error(transparent)]
    RateLimited(#[from] RateLimited),

    #[error("Validación de seguridad fallida.")]
    Honeypot,

    #[error("La respuesta de verificación es incorrecta.")]
    Captcha,

    #[error("{file}: {reason}")]
    InvalidFile { file: String, reason: FileRejection },

    #[error("El correo electrónico no es válido.")]
    InvalidEmail,

    #[error("La sesión fue bloqueada por actividad sospechosa. Inicie una nueva sesión.")]
    Blocked,
}

impl SecurityRejection {
    /// Reason recorded in the security log
    pub fn reason_code(&self) -> &'static str {
        match self {
            SecurityRejection::RateLimited(_) => "rate_limit_exceeded",
            SecurityRejection::Honeypot => "honeypot_filled",
            SecurityRejection::Captcha => "captcha_failed",
            SecurityRejection::InvalidFile { .. } => "invalid_file",
            SecurityRejection::InvalidEmail => "invalid_email",
            SecurityRejection::Blocked => "session_blocked",
        }
    }

    /// Whether the failure counts toward blocking the session
    pub fn is_suspicious(&self) -> bool {
        !matches!(
            self,
            SecurityRejection::InvalidEmail | SecurityRejection::Blocked
        )
    }
}

impl From<SecurityRejection> for AppError {
    fn from(rejection: SecurityRejection) -> Self {
        match rejection {
            SecurityRejection::RateLimited(e) => AppError::RateLimited(e.to_string()),
            SecurityRejection::Blocked => AppError::SessionBlocked(rejection.to_string()),
            other => AppError::SecurityRejected(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityGate {
    files: FileValidator,
    limits: TextLimits,
    max_suspicious_events: u32,
}

impl SecurityGate {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            files: FileValidator::new(config),
            limits: TextLimits {
                short: config.short_text_max,
                long: config.long_text_max,
            },
            max_suspicious_events: config.max_suspicious_events,
        }
    }

    /// Screen a submission and sanitize it in place
    ///
    /// Does not consume a rate-limit slot; call `admit` once the
    /// submission is accepted.
    pub fn screen(
        &self,
        ctx: &mut SessionContext,
        limiter: &mut RateLimiter,
        submission: &mut Submission,
        now: DateTime<Utc>,
    ) -> Result<(), SecurityRejection> {
        if ctx.is_blocked() {
            return Err(SecurityRejection::Blocked);
        }

        if let Err(rejection) = self.run_checks(ctx, limiter, submission, now) {
            return Err(self.register_failure(ctx, rejection));
        }

        let email = submission.form.email.as_deref().unwrap_or_default();
        if !email.trim().is_empty() {
            let email = sanitize_email(email).ok_or(SecurityRejection::InvalidEmail)?;
            submission.form.email = Some(email);
        }

        sanitize_form(&mut submission.form, self.limits);
        Ok(())
    }

    fn run_checks(
        &self,
        ctx: &SessionContext,
        limiter: &mut RateLimiter,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<(), SecurityRejection> {
        limiter.check(&ctx.rate_limit_key(), now)?;

        if submission
            .honeypot
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
        {
            return Err(SecurityRejection::Honeypot);
        }

        let answer = submission.captcha_answer.as_deref().unwrap_or_default();
        if !ctx.check_captcha(answer) {
            return Err(SecurityRejection::Captcha);
        }

        for file in &submission.files {
            self.files
                .validate(&file.file_name, file.size(), &file.bytes)
                .map_err(|reason| SecurityRejection::InvalidFile {
                    file: file.file_name.clone(),
                    reason,
                })?;
        }

        Ok(())
    }

    fn register_failure(
        &self,
        ctx: &mut SessionContext,
        rejection: SecurityRejection,
    ) -> SecurityRejection {
        let blocked = ctx.record_suspicious(self.max_suspicious_events);
        tracing::warn!(
            target: "security",
            event = "suspicious_attempt",
            session = %ctx.id,
            reason = rejection.reason_code(),
            attempts = ctx.suspicious_events(),
            detail = %rejection,
        );

        if blocked {
            tracing::warn!(
                target: "security",
                event = "session_blocked",
                session = %ctx.id,
                attempts = ctx.suspicious_events(),
            );
            SecurityRejection::Blocked
        } else {
            rejection
        }
    }

    /// Consume a rate-limit slot and retire the captcha for an accepted submission
    pub fn admit(
        &self,
        ctx: &mut SessionContext,
        limiter: &mut RateLimiter,
        submission: &Submission,
        now: DateTime<Utc>,
    ) {
        limiter.record(&ctx.rate_limit_key(), now);
        ctx.rotate_captcha();
        tracing::info!(
            target: "security",
            event = "submission_accepted",
            session = %ctx.id,
            email = submission.form.email.as_deref().unwrap_or_default(),
            requester_kind = submission.form.requester_kind.as_deref().unwrap_or_default(),
            equipment_count = submission.form.registrable_equipment().len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttachmentCategory, AttachmentTarget, EquipmentBatch, ServiceRequestForm, UploadedFile,
    };
    use crate::security::captcha::Captcha;
    use chrono::Duration;

    fn gate() -> SecurityGate {
        SecurityGate::new(&SecurityConfig::default())
    }

    fn limiter() -> RateLimiter {
        RateLimiter::new(5, Duration::minutes(60))
    }

    fn session() -> SessionContext {
        SessionContext::with_captcha(Utc::now(), Captcha::new(2, 2))
    }

    fn submission() -> Submission {
        Submission {
            form: ServiceRequestForm {
                email: Some(" Compras@MedSur.com.ar ".to_string()),
                trade_name: Some("<b>MedSur</b>".to_string()),
                ..Default::default()
            },
            captcha_answer: Some("4".to_string()),
            honeypot: None,
            files: Vec::new(),
        }
    }

    #[test]
    fn test_clean_submission_is_sanitized() {
        let mut sub = submission();
        gate()
            .screen(&mut session(), &mut limiter(), &mut sub, Utc::now())
            .expect("clean submission passes");
        assert_eq!(sub.form.email.as_deref(), Some("compras@medsur.com.ar"));
        assert_eq!(sub.form.trade_name.as_deref(), Some("bMedSur/b"));
    }

    #[test]
    fn test_batch_equipment_is_sanitized() {
        let mut sub = submission();
        sub.form.requester_kind = Some("Colaborador de Syemed".to_string());
        sub.form.belongs_to = Some("Equipo de Stock".to_string());
        sub.form.equipment_batch = Some(EquipmentBatch {
            equipment_type: Some("<script>CPAP</script>".to_string()),
            brand: Some("Philips".to_string()),
            model: Some("M".repeat(300)),
            serial_numbers: format!("SN#1;{}", "A".repeat(150)),
        });

        gate()
            .screen(&mut session(), &mut limiter(), &mut sub, Utc::now())
            .expect("batch submission passes");
        sub.form.normalize();

        let rows = &sub.form.equipment;
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .all(|r| r.equipment_type.as_deref() == Some("scriptCPAP/script")));
        assert!(rows
            .iter()
            .all(|r| r.model.as_deref().map(str::len) == Some(100)));
        assert_eq!(rows[0].serial_number.as_deref(), Some("SN1"));
        assert_eq!(rows[1].serial_number.as_deref().map(str::len), Some(100));
    }

    #[test]
    fn test_honeypot_rejected_as_suspicious() {
        let mut ctx = session();
        let mut sub = submission();
        sub.honeypot = Some("http://spam.example".to_string());
        let err = gate()
            .screen(&mut ctx, &mut limiter(), &mut sub, Utc::now())
            .expect_err("honeypot must reject");
        assert!(matches!(err, SecurityRejection::Honeypot));
        assert_eq!(err.to_string(), "Validación de seguridad fallida.");
        assert_eq!(ctx.suspicious_events(), 1);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut sub = submission();
        sub.files.push(UploadedFile {
            file_name: "invoice.pdf.exe".to_string(),
            content_type: None,
            bytes: vec![0; 16],
            category: AttachmentCategory::Invoice,
            target: AttachmentTarget::AllEquipment,
        });
        let err = gate()
            .screen(&mut session(), &mut limiter(), &mut sub, Utc::now())
            .expect_err("executable must reject");
        assert_eq!(err.reason_code(), "invalid_file");
    }

    #[test]
    fn test_third_failure_blocks_session() {
        let gate = gate();
        let mut ctx = session();
        let mut limiter = limiter();

        for _ in 0..2 {
            let mut sub = submission();
            sub.captcha_answer = Some("5".to_string());
            let err = gate.screen(&mut ctx, &mut limiter, &mut sub, Utc::now());
            assert!(matches!(err, Err(SecurityRejection::Captcha)));
        }

        let mut sub = submission();
        sub.captcha_answer = None;
        let err = gate.screen(&mut ctx, &mut limiter, &mut sub, Utc::now());
        assert!(matches!(err, Err(SecurityRejection::Blocked)));

        // even a correct submission is refused afterwards
        let err = gate.screen(&mut ctx, &mut limiter, &mut submission(), Utc::now());
        assert!(matches!(err, Err(SecurityRejection::Blocked)));
    }

    #[test]
    fn test_invalid_email_not_suspicious() {
        let mut ctx = session();
        let mut sub = submission();
        sub.form.email = Some("compras@medsur".to_string());
        let err = gate()
            .screen(&mut ctx, &mut limiter(), &mut sub, Utc::now())
            .expect_err("bad email must reject");
        assert!(matches!(err, SecurityRejection::InvalidEmail));
        assert_eq!(ctx.suspicious_events(), 0);
    }

    #[test]
    fn test_admit_consumes_slot_and_rotates_captcha() {
        let gate = gate();
        let mut ctx = session();
        let mut limiter = RateLimiter::new(1, Duration::minutes(60));
        let now = Utc::now();

        let mut sub = submission();
        gate.screen(&mut ctx, &mut limiter, &mut sub, now).expect("passes");
        gate.admit(&mut ctx, &mut limiter, &sub, now);

        let err = gate.screen(&mut ctx, &mut limiter, &mut submission(), now);
        assert!(matches!(err, Err(SecurityRejection::RateLimited(_))));
    }
}
