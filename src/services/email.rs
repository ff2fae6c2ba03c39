//! Email service for confirmation messages

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// File attached to an outgoing email
#[derive(Debug, Clone, PartialEq)]
pub struct EmailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub cc: Option<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<EmailAttachment>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutgoingEmail) -> AppResult<Message> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Syemed");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Email(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(&email.to)
            .map_err(|e| AppError::Email(format!("Invalid to address: {}", e)))?;

        let mut builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(email.subject.as_str());

        if let Some(cc) = &email.cc {
            let cc_mailbox = Mailbox::from_str(cc)
                .map_err(|e| AppError::Email(format!("Invalid cc address: {}", e)))?;
            builder = builder.cc(cc_mailbox);
        }

        let mut body = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(email.body.clone()),
        );

        if let Some(attachment) = &email.attachment {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| AppError::Email(format!("Invalid attachment type: {}", e)))?;
            body = body.singlepart(
                Attachment::new(attachment.file_name.clone())
                    .body(attachment.bytes.clone(), content_type),
            );
        }

        builder
            .multipart(body)
            .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        else {
            return Err(AppError::Email(
                "Error: Credenciales SMTP no configuradas".to_string(),
            ));
        };

        let mailer_builder = if self.config.smtp_use_tls {
            // STARTTLS on the submission port
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Email(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port)
        .credentials(Credentials::new(username.clone(), password.clone()));

        Ok(mailer_builder.build())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        if !self.config.has_credentials() {
            return Err(AppError::Email(
                "Error: Credenciales SMTP no configuradas".to_string(),
            ));
        }

        let message = self.build_message(&email)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Email(format!("Error SMTP: {}", e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Confirmation email sent");
        Ok(())
    }
}
