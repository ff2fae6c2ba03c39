//! Confirmation email content

use chrono::NaiveDateTime;

use crate::models::{
    enums::{BelongsTo, RequesterKind},
    ServiceRequestForm,
};

/// Subject, body and attachment name of one confirmation email
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
}

pub fn compose(
    form: &ServiceRequestForm,
    category: &str,
    request_id: i32,
    osts: &[i32],
    at: NaiveDateTime,
) -> Confirmation {
    Confirmation {
        subject: subject(category, request_id),
        body: body(form, request_id, osts, at),
        attachment_name: attachment_name(request_id, at),
    }
}

/// Name of the PDF attached to the confirmation email
pub fn attachment_name(request_id: i32, at: NaiveDateTime) -> String {
    format!("Solicitud_ST_{}_{}.pdf", request_id, at.format("%Y%m%d"))
}

/// Name under which the PDF is archived in object storage
pub fn archive_name(request_id: i32, at: NaiveDateTime) -> String {
    format!("solicitud_ST_{}_{}.pdf", request_id, at.format("%Y%m%d_%H%M%S"))
}

pub fn subject(category: &str, request_id: i32) -> String {
    format!("{} Seguimiento Caso #{} - Syemed", category, request_id)
        .trim_start()
        .to_string()
}

fn or_na(v: &Option<String>) -> &str {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A")
}

fn phone_line(phone: &Option<String>) -> Option<String> {
    phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("- Teléfono: {}", p))
}

/// Requester description plus optional phone and contact lines
fn requester_lines(form: &ServiceRequestForm) -> (String, Option<String>, Option<String>) {
    match form.requester_kind() {
        Some(RequesterKind::InternalCollaborator) => {
            let mut who = format!("Colaborador de Syemed: {}", or_na(&form.requester_name));
            let phone = match form.belongs_to() {
                Some(BelongsTo::Distributor) => {
                    who.push_str(&format!("\n- Cliente (Distribuidor): {}", or_na(&form.trade_name)));
                    phone_line(&form.contact_phone)
                }
                Some(BelongsTo::Institution) => {
                    who.push_str(&format!("\n- Cliente (Institución): {}", or_na(&form.trade_name)));
                    phone_line(&form.contact_phone)
                }
                Some(BelongsTo::Patient) => {
                    who.push_str(&format!("\n- Cliente (Paciente): {}", or_na(&form.patient_name)));
                    phone_line(&form.patient_phone)
                }
                _ => None,
            };
            (who, phone, None)
        }
        Some(RequesterKind::Distributor) => (
            format!("Distribuidor: {}", or_na(&form.trade_name)),
            phone_line(&form.contact_phone),
            None,
        ),
        Some(RequesterKind::Institution) => (
            format!("Institución: {}", or_na(&form.trade_name)),
            phone_line(&form.contact_phone),
            None,
        ),
        Some(RequesterKind::Patient) => {
            let contact = form
                .technical_contact
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(|c| format!("- ¿Quiere que lo contactemos desde el área técnica?: {}", c));
            (
                format!("Paciente/Particular: {}", or_na(&form.patient_name)),
                phone_line(&form.patient_phone),
                contact,
            )
        }
        None => ("N/A".to_string(), None, None),
    }
}

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Plain-text body of the confirmation email
pub fn body(form: &ServiceRequestForm, request_id: i32, osts: &[i32], at: NaiveDateTime) -> String {
    let (requester, phone, contact) = requester_lines(form);
    let equipment_count = form.typed_equipment().count();

    let mut details = vec![format!("- ID de Solicitud: #{}", request_id)];
    if !osts.is_empty() {
        let list = osts
            .iter()
            .map(|o| format!("#{}", o))
            .collect::<Vec<_>>()
            .join(", ");
        details.push(format!("- OST(s) generado(s): {}", list));
    }
    details.push(format!("- Solicitante: {}", requester));
    details.extend(phone);
    details.extend(contact);
    details.push(format!("- Cantidad de equipos: {}", equipment_count));
    details.push(format!("- Fecha: {}", at.format("%d/%m/%Y %H:%M")));

    format!(
        "Estimado/a,

Se ha registrado exitosamente su solicitud de servicio técnico.

DETALLES DE LA SOLICITUD:
{sep}
{details}

Adjunto encontrará el resumen completo de su solicitud en formato PDF.

Nos pondremos en contacto a la brevedad para coordinar el servicio.

{sep}
HORARIO DE ATENCIÓN:
Lunes a Viernes de 8 a 17hs
Teléfono de urgencias: 11 2373-0278

Saludos cordiales,
Equipo de Asistencia Técnica y Servicio Técnico
Syemed

{sep}
Este es un email automático. Por favor no responda a este mensaje.
",
        sep = SEPARATOR,
        details = details.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::validation::tests::complete_forms;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 5, 7))
            .expect("valid date")
    }

    #[test]
    fn test_names() {
        assert_eq!(attachment_name(42, at()), "Solicitud_ST_42_20250314.pdf");
        assert_eq!(archive_name(42, at()), "solicitud_ST_42_20250314_090507.pdf");
    }

    #[test]
    fn test_subject() {
        assert_eq!(subject("A/ST/R", 42), "A/ST/R Seguimiento Caso #42 - Syemed");
        assert_eq!(subject("", 42), "Seguimiento Caso #42 - Syemed");
    }

    #[test]
    fn test_body_for_distributor() {
        let form = &complete_forms()[0];
        let text = body(form, 42, &[1001, 1002], at());
        assert!(text.contains("- ID de Solicitud: #42"));
        assert!(text.contains("- OST(s) generado(s): #1001, #1002"));
        assert!(text.contains("- Solicitante: Distribuidor: MedSur"));
        assert!(text.contains("- Teléfono: 1145551234"));
        assert!(text.contains("- Fecha: 14/03/2025 09:05"));
    }

    #[test]
    fn test_compose() {
        let form = &complete_forms()[0];
        let confirmation = compose(form, "A/ST/R", 42, &[1001], at());
        assert_eq!(confirmation.subject, "A/ST/R Seguimiento Caso #42 - Syemed");
        assert_eq!(confirmation.attachment_name, "Solicitud_ST_42_20250314.pdf");
        assert!(confirmation.body.starts_with("Estimado/a,"));
    }

    #[test]
    fn test_body_without_osts() {
        let form = &complete_forms()[2];
        let text = body(form, 7, &[], at());
        assert!(!text.contains("OST(s)"));
        assert!(text.contains("Paciente/Particular: Juan Pérez"));
    }
}
