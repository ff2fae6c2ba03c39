//! Configuration management for the intake server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body, in megabytes
    pub max_body_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Directory receiving the JSON security event log
    pub security_log_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_from_name: Option<String>,
    pub smtp_use_tls: bool,
    /// Fixed internal address copied on every confirmation
    pub copy_address: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: String,
    /// Root folder for every uploaded file
    pub base_folder: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SecurityConfig {
    pub max_submissions: usize,
    pub window_minutes: i64,
    pub max_suspicious_events: u32,
    pub session_ttl_minutes: i64,
    pub image_max_mb: u64,
    pub video_max_mb: u64,
    pub document_max_mb: u64,
    pub short_text_max: usize,
    pub long_text_max: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocaleConfig {
    /// Offset applied to timestamps shown to users and stored in the database
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let smtp_email = env::var("SMTP_EMAIL").ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix INTAKE_)
            .add_source(
                Environment::with_prefix("INTAKE")
                    .separator("_")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("email.smtp_host", env::var("SMTP_SERVER").ok())?
            .set_override_option("email.smtp_port", env::var("SMTP_PORT").ok())?
            .set_override_option("email.smtp_username", smtp_email.clone())?
            .set_override_option("email.smtp_from", smtp_email)?
            .set_override_option("email.smtp_password", env::var("SMTP_PASSWORD").ok())?
            .set_override_option("email.copy_address", env::var("EMAIL_COPIA").ok())?
            .set_override_option("storage.cloud_name", env::var("CLOUDINARY_CLOUD_NAME").ok())?
            .set_override_option("storage.api_key", env::var("CLOUDINARY_API_KEY").ok())?
            .set_override_option("storage.api_secret", env::var("CLOUDINARY_API_SECRET").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "database URL is not configured (set DATABASE_URL)".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Cloud name, key and secret, when all three are present
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.cloud_name, &self.api_key, &self.api_secret) {
            (Some(name), Some(key), Some(secret))
                if !name.is_empty() && !key.is_empty() && !secret.is_empty() =>
            {
                Some((name, key, secret))
            }
            _ => None,
        }
    }
}

impl EmailConfig {
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.smtp_username, &self.smtp_password),
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty()
        )
    }

    /// Fixed address copied on every confirmation, if configured
    pub fn copy_recipient(&self) -> Option<String> {
        self.copy_address
            .clone()
            .filter(|address| !address.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_mb: 120,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            security_log_dir: "logs".to_string(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: String::new(),
            smtp_from_name: Some("Post Venta y Servicio Técnico Syemed".to_string()),
            smtp_use_tls: true,
            copy_address: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            api_base_url: "https://api.cloudinary.com/v1_1".to_string(),
            base_folder: "solicitudes_st".to_string(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_submissions: 5,
            window_minutes: 60,
            max_suspicious_events: 3,
            session_ttl_minutes: 240,
            image_max_mb: 10,
            video_max_mb: 50,
            document_max_mb: 5,
            short_text_max: 255,
            long_text_max: 1000,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self { utc_offset_hours: -3 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            email: EmailConfig::default(),
            storage: StorageConfig::default(),
            security: SecurityConfig::default(),
            locale: LocaleConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_url_is_rejected() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.url = "postgres://intake@localhost/intake".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_credentials_require_all_three() {
        let mut storage = StorageConfig::default();
        assert!(storage.credentials().is_none());

        storage.cloud_name = Some("demo".to_string());
        storage.api_key = Some("123".to_string());
        assert!(storage.credentials().is_none());

        storage.api_secret = Some("s3cr3t".to_string());
        assert_eq!(storage.credentials(), Some(("demo", "123", "s3cr3t")));
    }
}
