//! Attachment metadata queries

use super::Repository;
use crate::{error::AppResult, models::attachment::Attachment};

impl Repository {
    /// List the attachments of a request
    pub async fn attachments_list_for_request(&self, request_id: i32) -> AppResult<Vec<Attachment>> {
        let rows = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, solicitud_id, equipo_id, nombre_archivo, url_cloudinary,
                   tipo_archivo, tamano_bytes, categoria
            FROM archivos_adjuntos
            WHERE solicitud_id = $1
            ORDER BY id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
