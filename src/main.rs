//! Syemed ST intake server
//!
//! REST API for technical-service requests on medical equipment.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use st_intake_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Console output filtered by RUST_LOG, security events also go to a daily JSON file
    let console_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("st_intake_server={},tower_http=debug", config.logging.level).into()
    });
    let console = if config.logging.format == "json" {
        tracing_subscriber::fmt::layer().json().with_filter(console_filter).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_filter(console_filter).boxed()
    };

    let security_file =
        tracing_appender::rolling::daily(&config.logging.security_log_dir, "security.log");
    let (security_writer, _security_guard) = tracing_appender::non_blocking(security_file);
    let security = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(security_writer)
        .with_filter(filter::filter_fn(|meta| meta.target() == "security"));

    tracing_subscriber::registry()
        .with(console)
        .with(security)
        .init();

    tracing::info!("Starting ST intake server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    if !config.email.has_credentials() {
        tracing::warn!("SMTP credentials missing, confirmation emails will be skipped");
    }

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config).context("Failed to create services")?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
