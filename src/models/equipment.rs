//! Equipment model

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    #[sqlx(rename = "solicitud_id")]
    pub request_id: i32,
    /// Position inside the request, starting at 1
    #[sqlx(rename = "numero_equipo")]
    pub position: i32,
    #[sqlx(rename = "tipo_equipo")]
    pub equipment_type: String,
    #[sqlx(rename = "marca")]
    pub brand: String,
    #[sqlx(rename = "modelo")]
    pub model: String,
    #[sqlx(rename = "numero_serie")]
    pub serial_number: String,
    #[sqlx(rename = "en_garantia")]
    pub under_warranty: bool,
    #[sqlx(rename = "cliente")]
    pub client: Option<String>,
    /// Tracking number generated by the database
    pub ost: i32,
}

/// Equipment row about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewEquipment {
    pub position: i32,
    pub equipment_type: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub under_warranty: bool,
    pub purchase_date: Option<NaiveDate>,
    pub client: String,
    pub intake_observation: Option<String>,
    pub received_at: NaiveDateTime,
}

/// Identifiers of an inserted equipment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegisteredEquipment {
    pub id: i32,
    pub position: i32,
    pub ost: i32,
}
