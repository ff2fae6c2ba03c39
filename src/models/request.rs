//! Service request model
//!
//! `ServiceRequestForm` is the field dictionary posted by the form. Select
//! fields stay raw strings here so that missing or placeholder values can be
//! reported as validation errors instead of failing deserialization.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::attachment::UploadedFile;
use super::enums::{BelongsTo, EquipmentOrigin, Motive, Ownership, RequesterKind, Warranty, YesNo};
use super::reference::{is_unset, TYPE_PLACEHOLDER};

/// Status of every freshly submitted request
pub const PENDING_STATUS: &str = "Pendiente";

static SERIAL_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n\r]+").expect("valid separator regex"));

/// One equipment row of the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EquipmentEntry {
    pub equipment_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
}

impl EquipmentEntry {
    /// A row counts once a real equipment type is chosen
    pub fn has_type(&self) -> bool {
        !is_unset(self.equipment_type.as_deref(), Some(TYPE_PLACEHOLDER))
    }

    pub fn has_serial(&self) -> bool {
        !is_unset(self.serial_number.as_deref(), None)
    }
}

/// Several similar units sharing type, brand and model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EquipmentBatch {
    pub equipment_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Serial numbers separated by commas, semicolons or new lines
    pub serial_numbers: String,
}

impl EquipmentBatch {
    /// Non-empty serial numbers of the batch, in entry order
    pub fn serials(&self) -> impl Iterator<Item = &str> {
        SERIAL_SEPARATOR
            .split(&self.serial_numbers)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn expand(&self) -> Vec<EquipmentEntry> {
        self.serials()
            .map(|serial| EquipmentEntry {
                equipment_type: self.equipment_type.clone(),
                brand: self.brand.clone(),
                model: self.model.clone(),
                serial_number: Some(serial.to_string()),
            })
            .collect()
    }
}

/// Form submission as posted by the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct ServiceRequestForm {
    #[validate(email(message = "El formato del correo electrónico no es válido"))]
    pub email: Option<String>,
    /// "Colaborador de Syemed", "Distribuidor", "Institución" or "Paciente/Particular"
    pub requester_kind: Option<String>,

    // Internal collaborator
    pub requesting_area: Option<String>,
    pub requester_name: Option<String>,
    #[validate(range(max = 5, message = "El nivel de urgencia debe estar entre 0 y 5"))]
    pub urgency_level: Option<u8>,
    pub logistics: Vec<String>,
    pub case_comments: Option<String>,
    pub belongs_to: Option<String>,

    // Distributor / institution
    pub trade_name: Option<String>,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub sales_contact: Option<String>,
    pub technical_contact: Option<String>,

    // Patient
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_address: Option<String>,
    pub equipment_origin: Option<String>,
    pub delivered_by: Option<String>,
    pub delivery_date: Option<NaiveDate>,

    // Ownership path
    pub ownership: Option<String>,
    pub direct_purchase: Option<String>,
    pub warranty: Option<String>,
    pub purchase_date: Option<NaiveDate>,

    // Motive
    pub motive: Option<String>,
    pub rental_change_reason: Option<String>,
    pub failures: Vec<String>,
    pub failure_detail: Option<String>,
    pub patient_diagnosis: Option<String>,

    // Rental write-off
    pub contract_ended: Option<String>,
    pub equipment_failing: Option<String>,
    pub write_off_detail: Option<String>,

    pub equipment: Vec<EquipmentEntry>,
    pub equipment_batch: Option<EquipmentBatch>,
}

fn parse_opt<T>(value: &Option<String>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    value.as_deref().and_then(parse)
}

fn digits_only(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        v.retain(|c| c.is_ascii_digit());
    }
}

impl ServiceRequestForm {
    pub fn requester_kind(&self) -> Option<RequesterKind> {
        parse_opt(&self.requester_kind, RequesterKind::from_label)
    }

    pub fn belongs_to(&self) -> Option<BelongsTo> {
        parse_opt(&self.belongs_to, BelongsTo::from_label)
    }

    pub fn ownership(&self) -> Option<Ownership> {
        parse_opt(&self.ownership, Ownership::from_label)
    }

    pub fn equipment_origin(&self) -> Option<EquipmentOrigin> {
        parse_opt(&self.equipment_origin, EquipmentOrigin::from_label)
    }

    pub fn direct_purchase(&self) -> Option<YesNo> {
        parse_opt(&self.direct_purchase, YesNo::from_label)
    }

    pub fn warranty(&self) -> Option<Warranty> {
        parse_opt(&self.warranty, Warranty::from_label)
    }

    pub fn motive(&self) -> Option<Motive> {
        parse_opt(&self.motive, Motive::parse)
    }

    /// Rows with a real equipment type, in form order
    pub fn typed_equipment(&self) -> impl Iterator<Item = &EquipmentEntry> {
        self.equipment.iter().filter(|e| e.has_type())
    }

    /// Rows that will become equipment records
    pub fn registrable_equipment(&self) -> Vec<&EquipmentEntry> {
        self.typed_equipment().filter(|e| e.has_serial()).collect()
    }

    /// Bring the dictionary to its canonical shape before validation
    ///
    /// Motive aliases become stored labels, stock and demo write-off imply
    /// their motive, numeric fields keep digits only and a batch of similar
    /// units is expanded into equipment rows.
    pub fn normalize(&mut self) {
        if self.requester_kind() == Some(RequesterKind::InternalCollaborator) {
            match self.belongs_to() {
                Some(BelongsTo::StockEquipment) => {
                    self.motive = Some(Motive::StockEquipment.label().to_string())
                }
                Some(BelongsTo::DemoWriteOff) => {
                    self.motive = Some(Motive::DemoWriteOff.label().to_string())
                }
                _ => {}
            }
        }

        if let Some(motive) = self.motive() {
            self.motive = Some(motive.label().to_string());
        }

        digits_only(&mut self.tax_id);
        digits_only(&mut self.contact_phone);
        digits_only(&mut self.patient_phone);
        if let Some(cuit) = self.tax_id.as_mut() {
            cuit.truncate(11);
        }
        for phone in [&mut self.contact_phone, &mut self.patient_phone] {
            if let Some(p) = phone.as_mut() {
                p.truncate(15);
            }
        }

        if let Some(batch) = self.equipment_batch.take() {
            if self.motive().is_some_and(Motive::allows_bulk_equipment) {
                self.equipment = batch.expand();
            } else {
                self.equipment_batch = Some(batch);
            }
        }
    }
}

/// Everything posted with one submission
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub form: ServiceRequestForm,
    pub captcha_answer: Option<String>,
    /// Hidden field that only bots fill in
    pub honeypot: Option<String>,
    pub files: Vec<UploadedFile>,
}

/// Request row about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceRequest {
    pub received_at: NaiveDateTime,
    pub email: String,
    pub requester_kind: String,
    pub requesting_area: Option<String>,
    pub requester_name: Option<String>,
    pub urgency: Option<String>,
    pub logistics: Option<String>,
    pub belongs_to: Option<String>,
    pub ownership: Option<String>,
    pub trade_name: Option<String>,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub sales_contact: Option<String>,
    pub technical_contact: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub equipment_origin: Option<String>,
    pub motive: Option<String>,
    pub failure_detail: Option<String>,
    pub case_comments: Option<String>,
    pub category: String,
}

/// Stored request summary
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ServiceRequest {
    pub id: i32,
    #[sqlx(rename = "fecha_solicitud")]
    pub received_at: NaiveDateTime,
    #[sqlx(rename = "email_solicitante")]
    pub email: String,
    #[sqlx(rename = "quien_completa")]
    pub requester_kind: String,
    #[sqlx(rename = "motivo_solicitud")]
    pub motive: Option<String>,
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,
    #[sqlx(rename = "estado")]
    pub status: String,
    pub pdf_url: Option<String>,
}
