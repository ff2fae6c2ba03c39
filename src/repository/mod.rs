//! Repository layer for database operations

pub mod attachments;
pub mod equipment;
pub mod requests;

use sqlx::{Pool, Postgres};

pub use requests::{NewSubmission, PersistedSubmission};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
