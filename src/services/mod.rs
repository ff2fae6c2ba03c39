//! Business logic services

pub mod email;
pub mod intake;
pub mod sessions;
pub mod storage;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub sessions: sessions::SessionService,
    pub intake: intake::IntakeService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let storage = storage::CloudinaryStorage::new(config.storage.clone())?;
        let email = email::EmailService::new(config.email.clone());
        Ok(Self::with_backends(
            repository,
            Arc::new(storage),
            Arc::new(email),
            config,
        ))
    }

    /// Build the services around explicit storage and mail backends
    pub fn with_backends(
        repository: Repository,
        storage: Arc<dyn storage::ObjectStorage>,
        mailer: Arc<dyn email::Mailer>,
        config: &AppConfig,
    ) -> Self {
        let sessions = sessions::SessionService::new(&config.security);
        let intake = intake::IntakeService::new(
            repository.clone(),
            sessions.clone(),
            storage,
            mailer,
            config.email.copy_recipient(),
            config,
        );

        Self {
            sessions,
            intake,
            repository,
        }
    }
}
