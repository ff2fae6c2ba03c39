//! Syemed technical-service intake server
//!
//! REST JSON API behind the technical-service request form: form evaluation,
//! abuse screening, transactional storage of requests and equipment, PDF
//! summaries and confirmation emails.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod models;
pub mod repository;
pub mod rules;
pub mod security;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
