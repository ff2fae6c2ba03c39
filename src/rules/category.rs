//! Category code derivation
//!
//! Codes combine an ownership prefix (`A/` rented, `G/` under warranty) with
//! the motive code. Forms that do not pin down a code get "N/A".

use super::form_state::{FormState, OwnershipPath};
use crate::models::{enums::Warranty, ServiceRequestForm};

pub const UNKNOWN_CATEGORY: &str = "N/A";

/// Derive the category code of a form
pub fn category_code(form: &ServiceRequestForm) -> String {
    let state = FormState::resolve(form);

    let Some(motive) = state.motive else {
        return UNKNOWN_CATEGORY.to_string();
    };

    if motive.has_fixed_code() {
        return motive.code().to_string();
    }

    let warranty = has_warranty(form);
    let prefix = match state.ownership {
        OwnershipPath::Rented => "A/",
        OwnershipPath::Owned { .. } | OwnershipPath::BoughtDirectly { .. } if warranty => "G/",
        OwnershipPath::Owned { .. }
        | OwnershipPath::BoughtDirectly { .. }
        | OwnershipPath::HandedOver => "",
        OwnershipPath::Undecided => return UNKNOWN_CATEGORY.to_string(),
    };

    format!("{}{}", prefix, motive.code())
}

fn has_warranty(form: &ServiceRequestForm) -> bool {
    form.warranty() == Some(Warranty::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> ServiceRequestForm {
        let mut form = ServiceRequestForm::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "motivo" => form.motive = value,
                "equipo_propiedad" => form.ownership = value,
                "quien_completa" => form.requester_kind = value,
                "en_garantia" => form.warranty = value,
                "equipo_origen" => form.equipment_origin = value,
                "equipo_corresponde_a" => form.belongs_to = value,
                other => panic!("unknown key {}", other),
            }
        }
        form
    }

    const ST: &str = "Servicio Técnico (reparaciones de equipos en general)";

    #[test]
    fn test_fixed_codes_ignore_other_fields() {
        assert_eq!(category_code(&form(&[("motivo", "Baja de Alquiler")])), "A/BA");
        assert_eq!(
            category_code(&form(&[("motivo", "Cambio de Alquiler"), ("equipo_propiedad", "Propio")])),
            "A/CA"
        );
        assert_eq!(category_code(&form(&[("motivo", "Equipo de Stock")])), "S");
        assert_eq!(category_code(&form(&[("motivo", "Baja de demo")])), "BD");
    }

    #[test]
    fn test_rented_distributor() {
        let f = form(&[
            ("motivo", ST),
            ("equipo_propiedad", "Alquilado"),
            ("quien_completa", "Distribuidor"),
        ]);
        assert_eq!(category_code(&f), "A/ST/R");
    }

    #[test]
    fn test_owned_without_warranty() {
        let f = form(&[
            ("motivo", ST),
            ("equipo_propiedad", "Propio"),
            ("en_garantia", "No"),
        ]);
        assert_eq!(category_code(&f), "ST/R");
    }

    #[test]
    fn test_owned_with_warranty() {
        let f = form(&[
            ("motivo", "Cambio por falla crítica"),
            ("equipo_propiedad", "Propio"),
            ("en_garantia", "Sí"),
            ("quien_completa", "Institución"),
        ]);
        assert_eq!(category_code(&f), "G/FC");

        let f = form(&[
            ("motivo", "Asistencia Técnica"),
            ("equipo_propiedad", "Propio"),
            ("en_garantia", "No lo sé"),
        ]);
        assert_eq!(category_code(&f), "AT");
    }

    #[test]
    fn test_patient_paths() {
        let handed = form(&[
            ("motivo", ST),
            ("quien_completa", "Paciente/Particular"),
            ("equipo_origen", "Se lo entregaron"),
        ]);
        assert_eq!(category_code(&handed), "ST/R");

        let bought = form(&[
            ("motivo", ST),
            ("quien_completa", "Colaborador de Syemed"),
            ("equipo_corresponde_a", "Paciente/Particular"),
            ("equipo_origen", "Lo compró de manera directa"),
            ("en_garantia", "Sí"),
        ]);
        assert_eq!(category_code(&bought), "G/ST/R");
    }

    #[test]
    fn test_unknown_is_na() {
        assert_eq!(category_code(&ServiceRequestForm::default()), "N/A");
        assert_eq!(category_code(&form(&[("motivo", "Otro")])), "N/A");
        assert_eq!(
            category_code(&form(&[("motivo", ST), ("quien_completa", "Distribuidor")])),
            "N/A"
        );
    }

    #[test]
    fn test_deterministic() {
        let f = form(&[("motivo", ST), ("equipo_propiedad", "Alquilado")]);
        assert_eq!(category_code(&f), category_code(&f.clone()));
    }
}
