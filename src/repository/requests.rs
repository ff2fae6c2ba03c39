//! Service request persistence
//!
//! A submission is stored in one transaction: the request row, its
//! equipment rows and the attachment metadata either all commit or none do.

use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        request::{ServiceRequest, PENDING_STATUS},
        NewAttachment, NewEquipment, NewServiceRequest, RegisteredEquipment,
    },
};

/// Everything written for one accepted submission
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub request: NewServiceRequest,
    pub equipment: Vec<NewEquipment>,
    pub attachments: Vec<NewAttachment>,
    /// Invoice URL copied onto every equipment row when the column exists
    pub invoice_url: Option<String>,
}

/// Identifiers generated while storing a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSubmission {
    pub request_id: i32,
    pub equipment: Vec<RegisteredEquipment>,
}

impl PersistedSubmission {
    /// OST numbers in equipment order
    pub fn osts(&self) -> Vec<i32> {
        self.equipment.iter().map(|e| e.ost).collect()
    }

    pub fn equipment_ids(&self) -> Vec<i32> {
        self.equipment.iter().map(|e| e.id).collect()
    }
}

impl Repository {
    /// Store a request with its equipment and attachments atomically
    pub async fn requests_insert_submission(
        &self,
        data: &NewSubmission,
    ) -> AppResult<PersistedSubmission> {
        let mut tx = self.pool.begin().await?;

        let request_id = insert_request(&mut *tx, &data.request).await?;

        let with_invoice_column = invoice_column_exists(&mut *tx).await?;
        let mut equipment = Vec::with_capacity(data.equipment.len());
        for row in &data.equipment {
            let invoice_url = if with_invoice_column {
                data.invoice_url.as_deref()
            } else {
                None
            };
            let registered =
                insert_equipment(&mut *tx, request_id, row, with_invoice_column, invoice_url).await?;
            equipment.push(registered);
        }

        let equipment_ids: Vec<i32> = equipment.iter().map(|e| e.id).collect();
        for attachment in &data.attachments {
            insert_attachment(
                &mut *tx,
                request_id,
                attachment,
                attachment.target.resolve(&equipment_ids),
                data.request.received_at,
            )
            .await?;
        }

        tx.commit().await?;

        Ok(PersistedSubmission {
            request_id,
            equipment,
        })
    }

    /// Record where the summary PDF was archived
    pub async fn requests_set_pdf_url(&self, id: i32, url: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE solicitudes SET pdf_url = $1 WHERE id = $2")
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }
        Ok(())
    }

    /// Get request by ID
    pub async fn requests_get_by_id(&self, id: i32) -> AppResult<ServiceRequest> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            SELECT id, fecha_solicitud, email_solicitante, quien_completa,
                   motivo_solicitud, categoria, estado, pdf_url
            FROM solicitudes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Check that the database answers
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn insert_request(conn: &mut PgConnection, r: &NewServiceRequest) -> AppResult<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO solicitudes (
            fecha_solicitud, email_solicitante, quien_completa,
            area_solicitante, solicitante, nivel_urgencia,
            logistica_cargo, equipo_corresponde_a, equipo_propiedad,
            nombre_fantasia, razon_social, cuit, contacto_nombre, contacto_telefono,
            comercial_syemed, contacto_tecnico,
            nombre_apellido_paciente, telefono_paciente, equipo_origen,
            motivo_solicitud, detalle_fallo, comentarios_caso,
            categoria, estado, pdf_url
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
            $21, $22, $23, $24, NULL
        )
        RETURNING id
        "#,
    )
    .bind(r.received_at)
    .bind(&r.email)
    .bind(&r.requester_kind)
    .bind(&r.requesting_area)
    .bind(&r.requester_name)
    .bind(&r.urgency)
    .bind(&r.logistics)
    .bind(&r.belongs_to)
    .bind(&r.ownership)
    .bind(&r.trade_name)
    .bind(&r.legal_name)
    .bind(&r.tax_id)
    .bind(&r.contact_name)
    .bind(&r.contact_phone)
    .bind(&r.sales_contact)
    .bind(&r.technical_contact)
    .bind(&r.patient_name)
    .bind(&r.patient_phone)
    .bind(&r.equipment_origin)
    .bind(&r.motive)
    .bind(&r.failure_detail)
    .bind(&r.case_comments)
    .bind(&r.category)
    .bind(PENDING_STATUS)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// Older databases lack `equipos.factura_url`
async fn invoice_column_exists(conn: &mut PgConnection) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.columns
            WHERE table_name = 'equipos' AND column_name = 'factura_url'
        )
        "#,
    )
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

async fn insert_equipment(
    conn: &mut PgConnection,
    request_id: i32,
    e: &NewEquipment,
    with_invoice_column: bool,
    invoice_url: Option<&str>,
) -> AppResult<RegisteredEquipment> {
    let query = if with_invoice_column {
        r#"
        INSERT INTO equipos (
            solicitud_id, numero_equipo, tipo_equipo, marca, modelo,
            numero_serie, en_garantia, fecha_compra, cliente,
            observacion_ingreso, fecha_ingreso, factura_url
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, ost
        "#
    } else {
        r#"
        INSERT INTO equipos (
            solicitud_id, numero_equipo, tipo_equipo, marca, modelo,
            numero_serie, en_garantia, fecha_compra, cliente,
            observacion_ingreso, fecha_ingreso
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, ost
        "#
    };

    let mut builder = sqlx::query_as::<_, (i32, i32)>(query)
        .bind(request_id)
        .bind(e.position)
        .bind(&e.equipment_type)
        .bind(&e.brand)
        .bind(&e.model)
        .bind(&e.serial_number)
        .bind(e.under_warranty)
        .bind(e.purchase_date)
        .bind(&e.client)
        .bind(&e.intake_observation)
        .bind(e.received_at);
    if with_invoice_column {
        builder = builder.bind(invoice_url);
    }

    let (id, ost) = builder.fetch_one(conn).await?;
    Ok(RegisteredEquipment {
        id,
        position: e.position,
        ost,
    })
}

async fn insert_attachment(
    conn: &mut PgConnection,
    request_id: i32,
    a: &NewAttachment,
    equipment_id: Option<i32>,
    uploaded_at: chrono::NaiveDateTime,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO archivos_adjuntos (
            solicitud_id, equipo_id, nombre_archivo, url_cloudinary,
            tipo_archivo, tamano_bytes, fecha_subida, categoria
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(request_id)
    .bind(equipment_id)
    .bind(&a.file_name)
    .bind(&a.url)
    .bind(&a.extension)
    .bind(a.size_bytes)
    .bind(uploaded_at)
    .bind(a.category.as_str())
    .execute(conn)
    .await?;
    Ok(())
}
