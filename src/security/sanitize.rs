//! Input sanitization

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{EquipmentBatch, EquipmentEntry, ServiceRequestForm};

/// Width of the type, brand, model and serial columns of `equipos`
pub const EQUIPMENT_FIELD_MAX: usize = 100;

const STRIPPED_CHARS: &[char] = &['<', '>', '{', '}', '|', '\\', '^', '~', '[', ']', '`'];

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Maximum lengths, in characters, for free-text fields
#[derive(Debug, Clone, Copy)]
pub struct TextLimits {
    pub short: usize,
    pub long: usize,
}

/// Truncate, drop markup-like characters and collapse whitespace
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    let truncated: String = text.chars().take(max_len).collect();
    truncated
        .replace(STRIPPED_CHARS, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased address, or `None` when it does not match the strict pattern
pub fn sanitize_email(email: &str) -> Option<String> {
    let email = email.trim();
    if EMAIL_PATTERN.is_match(email) {
        Some(email.to_lowercase())
    } else {
        None
    }
}

/// Keep letters, digits, hyphens and spaces, up to the column width
pub fn sanitize_serial(serial: &str) -> String {
    serial
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .chars()
        .take(EQUIPMENT_FIELD_MAX)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn clean(value: &mut Option<String>, max_len: usize) {
    if let Some(v) = value.as_mut() {
        *v = sanitize_text(v, max_len);
    }
}

/// Sanitize every free-text field of a form in place
pub fn sanitize_form(form: &mut ServiceRequestForm, limits: TextLimits) {
    for field in [
        &mut form.requesting_area,
        &mut form.requester_name,
        &mut form.belongs_to,
        &mut form.trade_name,
        &mut form.legal_name,
        &mut form.contact_name,
        &mut form.sales_contact,
        &mut form.technical_contact,
        &mut form.patient_name,
        &mut form.patient_address,
        &mut form.equipment_origin,
        &mut form.delivered_by,
        &mut form.ownership,
        &mut form.direct_purchase,
        &mut form.warranty,
        &mut form.motive,
        &mut form.contract_ended,
        &mut form.equipment_failing,
    ] {
        clean(field, limits.short);
    }

    for field in [
        &mut form.case_comments,
        &mut form.failure_detail,
        &mut form.patient_diagnosis,
        &mut form.rental_change_reason,
        &mut form.write_off_detail,
    ] {
        clean(field, limits.long);
    }

    for item in form.logistics.iter_mut().chain(form.failures.iter_mut()) {
        *item = sanitize_text(item, limits.short);
    }

    let equipment_max = limits.short.min(EQUIPMENT_FIELD_MAX);
    for entry in &mut form.equipment {
        sanitize_equipment(entry, equipment_max);
    }
    if let Some(batch) = form.equipment_batch.as_mut() {
        sanitize_batch(batch, equipment_max);
    }
}

fn sanitize_equipment(entry: &mut EquipmentEntry, max_len: usize) {
    clean(&mut entry.equipment_type, max_len);
    clean(&mut entry.brand, max_len);
    clean(&mut entry.model, max_len);
    if let Some(serial) = entry.serial_number.as_mut() {
        *serial = sanitize_serial(serial);
    }
}

/// Serials are cleaned one by one and rejoined one per line
fn sanitize_batch(batch: &mut EquipmentBatch, max_len: usize) {
    clean(&mut batch.equipment_type, max_len);
    clean(&mut batch.brand, max_len);
    clean(&mut batch.model, max_len);
    batch.serial_numbers = batch
        .serials()
        .map(sanitize_serial)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
}
