//! Request summary content
//!
//! The summary is plain data so its wording can be checked without
//! rendering a PDF.

use chrono::NaiveDateTime;

use crate::{
    models::{
        enums::{BelongsTo, Motive, RequesterKind, Warranty},
        ServiceRequestForm,
    },
    rules::derived::{rental_write_off, urgency_label},
};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph { text: String, bold: bool },
    Bullet(String),
    /// Two-column label/value table
    Fields(Vec<(String, String)>),
    /// Grid with a header row
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Spacer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl SummaryDocument {
    /// Every piece of text in document order
    pub fn text(&self) -> Vec<String> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Title(t) | Block::Heading(t) | Block::Bullet(t) => out.push(t.clone()),
                Block::Paragraph { text, .. } => out.push(text.clone()),
                Block::Fields(pairs) => {
                    for (label, value) in pairs {
                        out.push(format!("{} {}", label, value));
                    }
                }
                Block::Table { header, rows } => {
                    out.push(header.join(" | "));
                    out.extend(rows.iter().map(|r| r.join(" | ")));
                }
                Block::Spacer => {}
            }
        }
        out
    }
}

fn value(v: &Option<String>) -> String {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn field(label: &str, v: String) -> (String, String) {
    (label.to_string(), v)
}

fn motive_display(form: &ServiceRequestForm) -> String {
    form.motive()
        .map(|m| m.display_label().to_string())
        .unwrap_or_else(|| value(&form.motive))
}

fn organization_fields(form: &ServiceRequestForm) -> Vec<(String, String)> {
    vec![
        field("Nombre de fantasía:", value(&form.trade_name)),
        field("Razón social:", value(&form.legal_name)),
        field("CUIT:", value(&form.tax_id)),
        field("Nombre contacto:", value(&form.contact_name)),
        field("Teléfono:", value(&form.contact_phone)),
        field("Comercial a cargo:", value(&form.sales_contact)),
        field("¿Lo contactamos?:", value(&form.technical_contact)),
        field("Motivo solicitud:", motive_display(form)),
        field("Propio o Alquilado:", value(&form.ownership)),
    ]
}

fn patient_fields(form: &ServiceRequestForm) -> Vec<(String, String)> {
    vec![
        field("Nombre y Apellido:", value(&form.patient_name)),
        field("Teléfono:", value(&form.patient_phone)),
        field("Dirección:", value(&form.patient_address)),
        field("¿Lo contactamos?:", value(&form.technical_contact)),
        field("Motivo solicitud:", motive_display(form)),
    ]
}

fn requester_section(form: &ServiceRequestForm, blocks: &mut Vec<Block>) {
    blocks.push(Block::Heading("INFORMACIÓN DE LA SOLICITUD".to_string()));

    let mut general = vec![
        field("Correo electrónico:", value(&form.email)),
        field("Tipo de solicitante:", value(&form.requester_kind)),
    ];

    match form.requester_kind() {
        Some(RequesterKind::InternalCollaborator) => {
            let logistics = if form.logistics.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                form.logistics.join(", ")
            };
            general.extend([
                field("Área solicitante:", value(&form.requesting_area)),
                field("Solicitante:", value(&form.requester_name)),
                field(
                    "Nivel de Urgencia:",
                    urgency_label(form.urgency_level.unwrap_or(0)),
                ),
                field("Logística a cargo:", logistics),
                field("Comentarios del caso:", value(&form.case_comments)),
            ]);
            blocks.push(Block::Fields(general));
            blocks.push(Block::Spacer);

            blocks.push(Block::Paragraph {
                text: format!(
                    "El equipo corresponde a: {}",
                    form.belongs_to.as_deref().unwrap_or_default()
                ),
                bold: true,
            });

            match form.belongs_to() {
                Some(BelongsTo::Distributor) | Some(BelongsTo::Institution) => {
                    blocks.push(Block::Fields(organization_fields(form)));
                }
                Some(BelongsTo::Patient) => {
                    let mut fields = patient_fields(form);
                    fields.push(field(
                        "Diagnóstico del Paciente:",
                        value(&form.patient_diagnosis),
                    ));
                    blocks.push(Block::Fields(fields));
                }
                _ => {}
            }
        }
        Some(RequesterKind::Distributor) | Some(RequesterKind::Institution) => {
            general.extend(organization_fields(form));
            blocks.push(Block::Fields(general));
        }
        Some(RequesterKind::Patient) => {
            general.extend(patient_fields(form));
            blocks.push(Block::Fields(general));
        }
        None => blocks.push(Block::Fields(general)),
    }

    blocks.push(Block::Spacer);
}

fn filled(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn labelled(label: &str, text: &str, blocks: &mut Vec<Block>) {
    blocks.push(Block::Paragraph {
        text: label.to_string(),
        bold: true,
    });
    blocks.push(Block::Paragraph {
        text: text.to_string(),
        bold: false,
    });
}

fn technical_section(form: &ServiceRequestForm, blocks: &mut Vec<Block>) {
    let mut details = Vec::new();

    match form.motive() {
        Some(Motive::TechnicalService) | Some(Motive::AfterSales) => {
            if !form.failures.is_empty() {
                details.push(Block::Paragraph {
                    text: "Fallas detectadas seleccionadas:".to_string(),
                    bold: true,
                });
                details.extend(form.failures.iter().map(|f| Block::Bullet(f.clone())));
            }
            if let Some(detail) = filled(&form.failure_detail) {
                labelled("Otros problemas o detalles adicionales:", detail, &mut details);
            }
            if let Some(diagnosis) = filled(&form.patient_diagnosis) {
                labelled("Diagnóstico del Paciente:", diagnosis, &mut details);
            }
        }
        Some(Motive::RentalWriteOff) => {
            if let Some(write_off) = rental_write_off(form) {
                details.push(Block::Paragraph {
                    text: format!("Motivo de baja: {}", write_off.reason),
                    bold: false,
                });
                if let Some(observation) = &write_off.observation {
                    labelled("Observación:", observation, &mut details);
                }
                details.push(Block::Paragraph {
                    text: format!("Estado del equipo: {}", write_off.equipment_state),
                    bold: false,
                });
            }
        }
        Some(Motive::RentalChange) => {
            if let Some(reason) = filled(&form.rental_change_reason) {
                labelled("Motivo del cambio:", reason, &mut details);
            }
        }
        Some(Motive::CriticalFailure) => {
            if let Some(detail) = filled(&form.failure_detail) {
                labelled("Descripción de la falla crítica:", detail, &mut details);
            }
            if let Some(diagnosis) = filled(&form.patient_diagnosis) {
                labelled("Diagnóstico del Paciente:", diagnosis, &mut details);
            }
        }
        _ => {}
    }

    if !details.is_empty() {
        blocks.push(Block::Heading("DETALLES TÉCNICOS".to_string()));
        blocks.extend(details);
        blocks.push(Block::Spacer);
    }
}

fn equipment_section(form: &ServiceRequestForm, osts: &[i32], blocks: &mut Vec<Block>) {
    blocks.push(Block::Heading("EQUIPOS REGISTRADOS".to_string()));

    let warranty = if form.warranty() == Some(Warranty::Yes) {
        "Sí"
    } else {
        "No"
    };

    let rows = form
        .registrable_equipment()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let ost = osts
                .get(i)
                .map(|o| o.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            vec![
                format!("#{}", ost),
                value(&entry.equipment_type),
                value(&entry.brand),
                value(&entry.model),
                value(&entry.serial_number),
                warranty.to_string(),
            ]
        })
        .collect();

    blocks.push(Block::Table {
        header: ["OST", "Tipo", "Marca", "Modelo", "N° Serie", "Garantía"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    });
}

/// Lay out the summary of a stored request
pub fn build_summary(
    form: &ServiceRequestForm,
    request_id: i32,
    osts: &[i32],
    generated_at: NaiveDateTime,
) -> SummaryDocument {
    let main_ost = osts.first().copied().unwrap_or(request_id);
    let mut blocks = vec![
        Block::Title(format!(
            "Solicitud de Servicio Técnico - Caso #{}",
            request_id
        )),
        Block::Paragraph {
            text: format!("Fecha: {}", generated_at.format("%d/%m/%Y %H:%M")),
            bold: false,
        },
        Block::Spacer,
    ];

    requester_section(form, &mut blocks);
    technical_section(form, &mut blocks);
    equipment_section(form, osts, &mut blocks);

    SummaryDocument {
        title: format!("Solicitud ST - OST #{}", main_ost),
        blocks,
    }
}
