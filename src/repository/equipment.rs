//! Equipment domain methods on Repository

use super::Repository;
use crate::{error::AppResult, models::Equipment};

impl Repository {
    /// List the equipment of a request, in form order
    pub async fn equipment_list_for_request(&self, request_id: i32) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT id, solicitud_id, numero_equipo, tipo_equipo, marca, modelo,
                   numero_serie, en_garantia, cliente, ost
            FROM equipos
            WHERE solicitud_id = $1
            ORDER BY numero_equipo
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count equipment rows sharing a serial number
    pub async fn equipment_count_by_serial(&self, serial_number: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipos WHERE numero_serie = $1")
            .bind(serial_number)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
