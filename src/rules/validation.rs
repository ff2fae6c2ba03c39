//! Required-field validation
//!
//! Rules never short-circuit: every missing field adds its own message, in
//! the order the form asks for them.

use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use super::form_state::FormState;
use crate::models::{
    enums::Motive,
    reference::{is_unset, BRAND_PLACEHOLDER, MODEL_PLACEHOLDER},
    ServiceRequestForm,
};

/// Result of checking a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check every mandatory field of the branch the form is in
pub fn validate_required_fields(form: &ServiceRequestForm) -> ValidationOutcome {
    let state = FormState::resolve(form);
    let mut errors = Vec::new();

    for table in state.rule_tables() {
        for rule in table {
            if rule.field.is_missing(form) {
                errors.push(rule.message.to_string());
            }
        }
    }

    if let Some(motive) = state.motive {
        motive_errors(form, motive, &mut errors);
    }

    equipment_errors(form, &mut errors);

    ValidationOutcome::from_errors(errors)
}

fn is_blank(value: Option<&str>) -> bool {
    is_unset(value, None)
}

fn motive_errors(form: &ServiceRequestForm, motive: Motive, errors: &mut Vec<String>) {
    match motive {
        Motive::RentalChange if is_blank(form.rental_change_reason.as_deref()) => {
            errors.push("Debe especificar el motivo del cambio de alquiler".to_string());
        }
        Motive::CriticalFailure if is_blank(form.failure_detail.as_deref()) => {
            errors.push("Debe describir la falla crítica que justifica el cambio".to_string());
        }
        Motive::TechnicalService | Motive::AfterSales
            if form.failures.is_empty() && is_blank(form.failure_detail.as_deref()) =>
        {
            errors.push(
                "Debe seleccionar al menos una opción o especificar en 'Otros' el motivo de su solicitud"
                    .to_string(),
            );
        }
        _ => {}
    }
}

fn equipment_errors(form: &ServiceRequestForm, errors: &mut Vec<String>) {
    let typed: Vec<_> = form.typed_equipment().collect();
    if typed.is_empty() {
        errors.push("Debe registrar al menos un equipo".to_string());
        return;
    }

    for (i, entry) in typed.iter().enumerate() {
        let n = i + 1;
        if is_unset(entry.brand.as_deref(), Some(BRAND_PLACEHOLDER)) {
            errors.push(format!("La marca del equipo {} es obligatoria", n));
        }
        if is_unset(entry.model.as_deref(), Some(MODEL_PLACEHOLDER)) {
            errors.push(format!("El modelo del equipo {} es obligatorio", n));
        }
        if !entry.has_serial() {
            errors.push(format!("El número de serie del equipo {} es obligatorio", n));
        }
    }
}

/// Format errors reported after the required-field ones
pub fn format_errors(form: &ServiceRequestForm) -> Vec<String> {
    let Err(errors) = form.validate() else {
        return Vec::new();
    };

    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|list| list.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect();
    messages.sort();
    messages
}

/// Required-field and format errors together
pub fn evaluate(form: &ServiceRequestForm) -> ValidationOutcome {
    let mut errors = validate_required_fields(form).errors;
    errors.extend(format_errors(form));
    ValidationOutcome::from_errors(errors)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::EquipmentEntry;
    use crate::rules::form_state::{Field, FormState};

    fn equipment() -> Vec<EquipmentEntry> {
        vec![EquipmentEntry {
            equipment_type: Some("CPAP".to_string()),
            brand: Some("Philips".to_string()),
            model: Some("Trilogy".to_string()),
            serial_number: Some("SN-001".to_string()),
        }]
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    /// Fully populated forms, one per branch of the rule tree
    pub(crate) fn complete_forms() -> Vec<ServiceRequestForm> {
        let distributor = ServiceRequestForm {
            email: s("compras@distribuidora.com.ar"),
            requester_kind: s("Distribuidor"),
            trade_name: s("MedSur"),
            legal_name: s("MedSur S.A."),
            tax_id: s("30712345678"),
            contact_name: s("Laura Gómez"),
            contact_phone: s("1145551234"),
            sales_contact: s("Lucas"),
            technical_contact: s("Sí"),
            ownership: s("Alquilado"),
            motive: s("Servicio Técnico (reparaciones de equipos en general)"),
            failures: vec!["No enciende".to_string()],
            equipment: equipment(),
            ..Default::default()
        };

        let institution = ServiceRequestForm {
            requester_kind: s("Institución"),
            tax_id: None,
            ownership: s("Propio"),
            direct_purchase: s("No"),
            motive: s("Cambio por falla de funcionamiento crítica"),
            failures: Vec::new(),
            failure_detail: s("Se apaga durante la ventilación"),
            ..distributor.clone()
        };

        let patient = ServiceRequestForm {
            email: s("paciente@gmail.com"),
            requester_kind: s("Paciente/Particular"),
            patient_name: s("Juan Pérez"),
            patient_phone: s("1166667777"),
            equipment_origin: s("Se lo entregaron"),
            motive: s("Asistencia Técnica"),
            failure_detail: s("No sé cómo cambiar el filtro"),
            equipment: equipment(),
            ..Default::default()
        };

        let collaborator = ServiceRequestForm {
            email: s("interno@syemed.com"),
            requester_kind: s("Colaborador de Syemed"),
            requesting_area: s("Comercial"),
            requester_name: s("Clara"),
            urgency_level: Some(3),
            ..Default::default()
        };

        let collaborator_distributor = ServiceRequestForm {
            belongs_to: s("Distribuidor"),
            trade_name: s("MedSur"),
            legal_name: s("MedSur S.A."),
            tax_id: s("30712345678"),
            contact_name: s("Laura Gómez"),
            contact_phone: s("1145551234"),
            technical_contact: s("No"),
            ownership: s("Alquilado"),
            motive: s("Cambio de Alquiler"),
            rental_change_reason: s("Necesita mayor capacidad"),
            equipment: equipment(),
            ..collaborator.clone()
        };

        let collaborator_institution = ServiceRequestForm {
            belongs_to: s("Institución"),
            tax_id: None,
            motive: s("Baja de Alquiler"),
            rental_change_reason: None,
            ..collaborator_distributor.clone()
        };

        let collaborator_patient = ServiceRequestForm {
            belongs_to: s("Paciente/Particular"),
            patient_name: s("Ana Ruiz"),
            patient_phone: s("1177778888"),
            equipment_origin: s("Lo compró de manera directa"),
            warranty: s("Sí"),
            motive: s("Servicio Técnico (reparaciones de equipos en general)"),
            failure_detail: s("Ruido al encender"),
            equipment: equipment(),
            ..collaborator.clone()
        };

        let collaborator_stock = ServiceRequestForm {
            belongs_to: s("Equipo de Stock"),
            equipment: equipment(),
            ..collaborator.clone()
        };

        vec![
            distributor,
            institution,
            patient,
            collaborator_distributor,
            collaborator_institution,
            collaborator_patient,
            collaborator_stock,
        ]
    }

    fn clear(form: &mut ServiceRequestForm, field: Field) {
        let slot = match field {
            Field::Email => &mut form.email,
            Field::RequesterKind => &mut form.requester_kind,
            Field::RequestingArea => &mut form.requesting_area,
            Field::RequesterName => &mut form.requester_name,
            Field::BelongsTo => &mut form.belongs_to,
            Field::TradeName => &mut form.trade_name,
            Field::LegalName => &mut form.legal_name,
            Field::TaxId => &mut form.tax_id,
            Field::ContactName => &mut form.contact_name,
            Field::ContactPhone => &mut form.contact_phone,
            Field::SalesContact => &mut form.sales_contact,
            Field::TechnicalContact => &mut form.technical_contact,
            Field::PatientName => &mut form.patient_name,
            Field::PatientPhone => &mut form.patient_phone,
            Field::EquipmentOrigin => &mut form.equipment_origin,
            Field::Motive => &mut form.motive,
        };
        *slot = Some(String::new());
    }

    #[test]
    fn test_complete_forms_are_valid() {
        for form in complete_forms() {
            let outcome = validate_required_fields(&form);
            assert!(outcome.valid, "{:?} -> {:?}", form.requester_kind, outcome.errors);
            assert!(outcome.errors.is_empty());
        }
    }

    #[test]
    fn test_clearing_any_required_field_fails() {
        for form in complete_forms() {
            let state = FormState::resolve(&form);
            for table in state.rule_tables() {
                for rule in table {
                    let mut broken = form.clone();
                    clear(&mut broken, rule.field);
                    let outcome = validate_required_fields(&broken);
                    assert!(
                        !outcome.valid,
                        "clearing {:?} on {:?} went unnoticed",
                        rule.field, form.requester_kind
                    );
                }
            }
        }
    }

    #[test]
    fn test_errors_keep_form_order() {
        let form = ServiceRequestForm {
            requester_kind: s("Distribuidor"),
            ..Default::default()
        };
        let outcome = validate_required_fields(&form);
        assert_eq!(
            outcome.errors,
            vec![
                "El correo electrónico es obligatorio",
                "Nombre de Fantasía es obligatorio",
                "Razón Social es obligatorio",
                "CUIT es obligatorio",
                "Nombre de contacto es obligatorio",
                "Teléfono de contacto es obligatorio",
                "Comercial de contacto en Syemed es obligatorio",
                "Debe indicar si quiere contacto técnico",
                "Motivo de la solicitud es obligatorio",
                "Debe registrar al menos un equipo",
            ]
        );
    }

    #[test]
    fn test_motive_specific_rules() {
        let mut form = complete_forms().remove(3);
        form.rental_change_reason = s("  ");
        assert_eq!(
            validate_required_fields(&form).errors,
            vec!["Debe especificar el motivo del cambio de alquiler"]
        );

        let mut form = complete_forms().remove(0);
        form.failures.clear();
        assert_eq!(validate_required_fields(&form).errors.len(), 1);
        form.failure_detail = s("Pantalla en negro");
        assert!(validate_required_fields(&form).valid);
    }

    #[test]
    fn test_equipment_rows_numbered_among_typed_rows() {
        let mut form = complete_forms().remove(0);
        form.equipment.insert(
            0,
            EquipmentEntry {
                equipment_type: s("Seleccionar tipo..."),
                ..Default::default()
            },
        );
        form.equipment.push(EquipmentEntry {
            equipment_type: s("Respirador"),
            brand: s("Seleccionar marca..."),
            model: s("Trilogy"),
            serial_number: None,
        });
        assert_eq!(
            validate_required_fields(&form).errors,
            vec![
                "La marca del equipo 2 es obligatoria",
                "El número de serie del equipo 2 es obligatorio",
            ]
        );
    }

    #[test]
    fn test_format_errors() {
        let mut form = complete_forms().remove(0);
        assert!(format_errors(&form).is_empty());

        form.email = s("no-es-un-email");
        form.urgency_level = Some(9);
        let errors = evaluate(&form).errors;
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"El formato del correo electrónico no es válido".to_string()));
    }
}
