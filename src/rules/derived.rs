//! Values derived from a validated form before it is stored

use chrono::NaiveDateTime;

use super::form_state::{FormState, OwnershipPath};
use crate::models::{
    enums::{Motive, Party, Warranty, YesNo},
    NewEquipment, NewServiceRequest, ServiceRequestForm,
};

/// Client recorded on equipment rented out by the company itself
pub const COMPANY_CLIENT: &str = "Syemed";

/// Urgency level as stored, e.g. "Medio (3)"
pub fn urgency_label(level: u8) -> String {
    match level {
        0..=1 => format!("Bajo ({})", level),
        2..=3 => format!("Medio ({})", level),
        _ => format!("Alto ({})", level),
    }
}

/// Outcome of the rental write-off questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOff {
    pub reason: &'static str,
    pub observation: Option<String>,
    pub equipment_state: &'static str,
}

/// Interpret "contract ended?" and "equipment failing?" answers
pub fn rental_write_off(form: &ServiceRequestForm) -> Option<WriteOff> {
    let contract_ended = form.contract_ended.as_deref().and_then(YesNo::from_label)?;
    let failing = form.equipment_failing.as_deref().and_then(YesNo::from_label)?;
    let detail = non_blank(&form.write_off_detail);

    let write_off = match (contract_ended, failing) {
        (YesNo::Yes, YesNo::Yes) => WriteOff {
            reason: "Fin de contrato",
            observation: detail,
            equipment_state: "Con falla",
        },
        (YesNo::Yes, YesNo::No) => WriteOff {
            reason: "Fin de contrato",
            observation: None,
            equipment_state: "Funcional",
        },
        (YesNo::No, YesNo::Yes) => WriteOff {
            reason: "Falla en el equipo",
            observation: detail,
            equipment_state: "Con falla",
        },
        (YesNo::No, YesNo::No) => WriteOff {
            reason: "Otros motivos",
            observation: detail,
            equipment_state: "Funcional",
        },
    };
    Some(write_off)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn join_parts(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn failure_parts(form: &ServiceRequestForm, with_failures: bool) -> Vec<String> {
    let mut parts = Vec::new();
    if with_failures && !form.failures.is_empty() {
        parts.push(form.failures.join(", "));
    }
    if let Some(detail) = non_blank(&form.failure_detail) {
        parts.push(detail);
    }
    if let Some(diagnosis) = non_blank(&form.patient_diagnosis) {
        parts.push(format!("Diagnóstico: {}", diagnosis));
    }
    parts
}

/// Observation stored on each equipment row and as the request's failure detail
pub fn intake_observation(form: &ServiceRequestForm, motive: Option<Motive>) -> Option<String> {
    match motive? {
        Motive::TechnicalService | Motive::AfterSales => join_parts(failure_parts(form, true)),
        Motive::CriticalFailure => join_parts(failure_parts(form, false)),
        Motive::RentalWriteOff => {
            let write_off = rental_write_off(form)?;
            let mut parts = vec![format!("Motivo: {}", write_off.reason)];
            parts.extend(write_off.observation);
            parts.push(format!("Estado: {}", write_off.equipment_state));
            join_parts(parts)
        }
        Motive::RentalChange => non_blank(&form.rental_change_reason),
        Motive::StockEquipment | Motive::DemoWriteOff => None,
    }
}

/// Client name recorded on the equipment rows
pub fn client_name(form: &ServiceRequestForm, state: &FormState) -> String {
    let fallback = || COMPANY_CLIENT.to_string();
    match state.party() {
        Some(Party::Distributor) | Some(Party::Institution) => {
            if state.ownership == OwnershipPath::Rented {
                fallback()
            } else {
                non_blank(&form.trade_name).unwrap_or_else(fallback)
            }
        }
        Some(Party::Patient) => non_blank(&form.patient_name).unwrap_or_else(fallback),
        None => fallback(),
    }
}

/// Request row for a validated, sanitized form
pub fn build_request(
    form: &ServiceRequestForm,
    category: &str,
    received_at: NaiveDateTime,
) -> NewServiceRequest {
    let state = FormState::resolve(form);
    let logistics = if form.logistics.is_empty() {
        None
    } else {
        Some(form.logistics.join(", "))
    };

    NewServiceRequest {
        received_at,
        email: form.email.clone().unwrap_or_default(),
        requester_kind: form.requester_kind.clone().unwrap_or_default(),
        requesting_area: non_blank(&form.requesting_area),
        requester_name: non_blank(&form.requester_name),
        urgency: form.urgency_level.map(urgency_label),
        logistics,
        belongs_to: non_blank(&form.belongs_to),
        ownership: non_blank(&form.ownership),
        trade_name: non_blank(&form.trade_name),
        legal_name: non_blank(&form.legal_name),
        tax_id: non_blank(&form.tax_id),
        contact_name: non_blank(&form.contact_name),
        contact_phone: non_blank(&form.contact_phone),
        sales_contact: non_blank(&form.sales_contact),
        technical_contact: non_blank(&form.technical_contact),
        patient_name: non_blank(&form.patient_name),
        patient_phone: non_blank(&form.patient_phone),
        equipment_origin: non_blank(&form.equipment_origin),
        motive: state.motive.map(|m| m.label().to_string()),
        failure_detail: intake_observation(form, state.motive),
        case_comments: non_blank(&form.case_comments),
        category: category.to_string(),
    }
}

fn entry_value(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Equipment rows for a validated form, empty for after-sales requests
pub fn build_equipment(form: &ServiceRequestForm, received_at: NaiveDateTime) -> Vec<NewEquipment> {
    let state = FormState::resolve(form);
    if !state.motive.map_or(true, Motive::registers_equipment) {
        return Vec::new();
    }

    let client = client_name(form, &state);
    let observation = intake_observation(form, state.motive);
    let under_warranty = form.warranty() == Some(Warranty::Yes);

    form.registrable_equipment()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| NewEquipment {
            position: i as i32 + 1,
            equipment_type: entry_value(&entry.equipment_type),
            brand: entry_value(&entry.brand),
            model: entry_value(&entry.model),
            serial_number: entry_value(&entry.serial_number),
            under_warranty,
            purchase_date: form.purchase_date,
            client: client.clone(),
            intake_observation: observation.clone(),
            received_at,
        })
        .collect()
}
