//! Form state machine
//!
//! The dynamic form is a product of three answers: the requester branch,
//! the ownership path of the equipment and the motive. `FormState::resolve`
//! is the transition function from the raw field dictionary to that state,
//! and every branch owns the ordered table of fields it makes mandatory.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    enums::{BelongsTo, EquipmentOrigin, Motive, Ownership, Party, RequesterKind, Warranty, YesNo},
    reference::{is_unset, REQUESTER_PLACEHOLDER, SALES_CONTACT_PLACEHOLDER},
    ServiceRequestForm,
};

/// Requester branch of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Requester kind not chosen yet
    Unselected,
    /// Internal collaborator, optionally with the party the equipment belongs to
    Collaborator(Option<BelongsTo>),
    /// External requester filling in for themselves
    Direct(Party),
}

/// How the equipment reached its current holder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipPath {
    Undecided,
    Rented,
    Owned {
        direct_purchase: Option<YesNo>,
        warranty: Option<Warranty>,
    },
    HandedOver,
    BoughtDirectly {
        warranty: Option<Warranty>,
    },
}

/// Next question the form has to ask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RequesterKind,
    BelongsTo,
    OwnershipPath,
    Motive,
    Details,
}

/// Field of the dictionary that a rule can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    RequesterKind,
    RequestingArea,
    RequesterName,
    BelongsTo,
    TradeName,
    LegalName,
    TaxId,
    ContactName,
    ContactPhone,
    SalesContact,
    TechnicalContact,
    PatientName,
    PatientPhone,
    EquipmentOrigin,
    Motive,
}

impl Field {
    pub fn value(self, form: &ServiceRequestForm) -> Option<&str> {
        let value = match self {
            Field::Email => &form.email,
            Field::RequesterKind => &form.requester_kind,
            Field::RequestingArea => &form.requesting_area,
            Field::RequesterName => &form.requester_name,
            Field::BelongsTo => &form.belongs_to,
            Field::TradeName => &form.trade_name,
            Field::LegalName => &form.legal_name,
            Field::TaxId => &form.tax_id,
            Field::ContactName => &form.contact_name,
            Field::ContactPhone => &form.contact_phone,
            Field::SalesContact => &form.sales_contact,
            Field::TechnicalContact => &form.technical_contact,
            Field::PatientName => &form.patient_name,
            Field::PatientPhone => &form.patient_phone,
            Field::EquipmentOrigin => &form.equipment_origin,
            Field::Motive => &form.motive,
        };
        value.as_deref()
    }

    /// Placeholder entry that still counts as missing
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            Field::RequesterName => Some(REQUESTER_PLACEHOLDER),
            Field::SalesContact => Some(SALES_CONTACT_PLACEHOLDER),
            _ => None,
        }
    }

    pub fn is_missing(self, form: &ServiceRequestForm) -> bool {
        is_unset(self.value(form), self.placeholder())
    }
}

/// One mandatory field and the message reported when it is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub field: Field,
    pub message: &'static str,
}

const fn rule(field: Field, message: &'static str) -> Rule {
    Rule { field, message }
}

const COMMON: &[Rule] = &[
    rule(Field::Email, "El correo electrónico es obligatorio"),
    rule(Field::RequesterKind, "Debe indicar quién completa la solicitud"),
];

const COLLABORATOR: &[Rule] = &[
    rule(Field::RequestingArea, "Área Solicitante es obligatorio"),
    rule(Field::RequesterName, "Solicitante es obligatorio"),
    rule(Field::BelongsTo, "'El equipo corresponde a' es obligatorio"),
];

const COLLABORATOR_DISTRIBUTOR: &[Rule] = &[
    rule(Field::TradeName, "Nombre de Fantasía (Distribuidor) es obligatorio"),
    rule(Field::LegalName, "Razón Social (Distribuidor) es obligatorio"),
    rule(Field::TaxId, "CUIT (Distribuidor) es obligatorio"),
    rule(Field::ContactName, "Nombre de contacto (Distribuidor) es obligatorio"),
    rule(Field::ContactPhone, "Teléfono de contacto (Distribuidor) es obligatorio"),
    rule(Field::TechnicalContact, "Debe indicar si quiere contacto técnico (Distribuidor)"),
    rule(Field::Motive, "Motivo de la solicitud (Distribuidor) es obligatorio"),
];

const COLLABORATOR_INSTITUTION: &[Rule] = &[
    rule(Field::TradeName, "Nombre del Hospital/Clínica (Institución) es obligatorio"),
    rule(Field::LegalName, "Razón Social (Institución) es obligatorio"),
    rule(Field::ContactName, "Nombre de contacto (Institución) es obligatorio"),
    rule(Field::ContactPhone, "Teléfono de contacto (Institución) es obligatorio"),
    rule(Field::TechnicalContact, "Debe indicar si quiere contacto técnico (Institución)"),
    rule(Field::Motive, "Motivo de la solicitud (Institución) es obligatorio"),
];

const COLLABORATOR_PATIENT: &[Rule] = &[
    rule(Field::PatientName, "Nombre y Apellido (Paciente) es obligatorio"),
    rule(Field::PatientPhone, "Teléfono (Paciente) es obligatorio"),
    rule(Field::EquipmentOrigin, "Origen del equipo (Paciente) es obligatorio"),
    rule(Field::Motive, "Motivo de la solicitud (Paciente) es obligatorio"),
];

const DIRECT_DISTRIBUTOR: &[Rule] = &[
    rule(Field::TradeName, "Nombre de Fantasía es obligatorio"),
    rule(Field::LegalName, "Razón Social es obligatorio"),
    rule(Field::TaxId, "CUIT es obligatorio"),
    rule(Field::ContactName, "Nombre de contacto es obligatorio"),
    rule(Field::ContactPhone, "Teléfono de contacto es obligatorio"),
    rule(Field::SalesContact, "Comercial de contacto en Syemed es obligatorio"),
    rule(Field::TechnicalContact, "Debe indicar si quiere contacto técnico"),
    rule(Field::Motive, "Motivo de la solicitud es obligatorio"),
];

const DIRECT_INSTITUTION: &[Rule] = &[
    rule(Field::TradeName, "Nombre del Hospital/Clínica/Sanatorio es obligatorio"),
    rule(Field::LegalName, "Razón Social es obligatorio"),
    rule(Field::ContactName, "Nombre de contacto es obligatorio"),
    rule(Field::ContactPhone, "Teléfono de contacto es obligatorio"),
    rule(Field::SalesContact, "Comercial de contacto en Syemed es obligatorio"),
    rule(Field::TechnicalContact, "Debe indicar si quiere contacto técnico"),
    rule(Field::Motive, "Motivo de la solicitud es obligatorio"),
];

const DIRECT_PATIENT: &[Rule] = &[
    rule(Field::PatientName, "Nombre y Apellido es obligatorio"),
    rule(Field::PatientPhone, "Teléfono de contacto es obligatorio"),
    rule(Field::EquipmentOrigin, "Origen del equipo es obligatorio"),
    rule(Field::Motive, "Motivo de la solicitud es obligatorio"),
];

const SERVICE_MOTIVES: &[Motive] = &[
    Motive::TechnicalService,
    Motive::AfterSales,
    Motive::CriticalFailure,
];

const RENTAL_MOTIVES: &[Motive] = &[
    Motive::TechnicalService,
    Motive::AfterSales,
    Motive::RentalWriteOff,
    Motive::RentalChange,
    Motive::CriticalFailure,
];

/// Resolved position of a form inside the decision tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormState {
    pub branch: Branch,
    pub ownership: OwnershipPath,
    pub motive: Option<Motive>,
}

impl FormState {
    pub fn resolve(form: &ServiceRequestForm) -> Self {
        let branch = match form.requester_kind() {
            None => Branch::Unselected,
            Some(RequesterKind::InternalCollaborator) => Branch::Collaborator(form.belongs_to()),
            Some(RequesterKind::Distributor) => Branch::Direct(Party::Distributor),
            Some(RequesterKind::Institution) => Branch::Direct(Party::Institution),
            Some(RequesterKind::Patient) => Branch::Direct(Party::Patient),
        };

        let party = party_of(branch);
        let ownership = if party == Some(Party::Patient) {
            match form.equipment_origin() {
                Some(EquipmentOrigin::HandedOver) => OwnershipPath::HandedOver,
                Some(EquipmentOrigin::BoughtDirectly) => OwnershipPath::BoughtDirectly {
                    warranty: form.warranty(),
                },
                None => OwnershipPath::Undecided,
            }
        } else {
            match form.ownership() {
                Some(Ownership::Rented) => OwnershipPath::Rented,
                Some(Ownership::Owned) => OwnershipPath::Owned {
                    direct_purchase: form.direct_purchase(),
                    warranty: form.warranty(),
                },
                None => OwnershipPath::Undecided,
            }
        };

        let motive = match branch {
            Branch::Collaborator(Some(BelongsTo::StockEquipment)) => Some(Motive::StockEquipment),
            Branch::Collaborator(Some(BelongsTo::DemoWriteOff)) => Some(Motive::DemoWriteOff),
            _ => form.motive(),
        };

        Self {
            branch,
            ownership,
            motive,
        }
    }

    /// External party the equipment is serviced for
    pub fn party(&self) -> Option<Party> {
        party_of(self.branch)
    }

    /// Mandatory field tables for this branch, in the order they are checked
    pub fn rule_tables(&self) -> Vec<&'static [Rule]> {
        let mut tables = vec![COMMON];
        match self.branch {
            Branch::Unselected => {}
            Branch::Collaborator(belongs_to) => {
                tables.push(COLLABORATOR);
                match belongs_to {
                    Some(BelongsTo::Distributor) => tables.push(COLLABORATOR_DISTRIBUTOR),
                    Some(BelongsTo::Institution) => tables.push(COLLABORATOR_INSTITUTION),
                    Some(BelongsTo::Patient) => tables.push(COLLABORATOR_PATIENT),
                    Some(BelongsTo::StockEquipment) | Some(BelongsTo::DemoWriteOff) | None => {}
                }
            }
            Branch::Direct(Party::Distributor) => tables.push(DIRECT_DISTRIBUTOR),
            Branch::Direct(Party::Institution) => tables.push(DIRECT_INSTITUTION),
            Branch::Direct(Party::Patient) => tables.push(DIRECT_PATIENT),
        }
        tables
    }

    /// Motives the form offers once the ownership path is answered
    pub fn available_motives(&self) -> &'static [Motive] {
        match self.branch {
            Branch::Collaborator(Some(BelongsTo::StockEquipment)) => &[Motive::StockEquipment],
            Branch::Collaborator(Some(BelongsTo::DemoWriteOff)) => &[Motive::DemoWriteOff],
            _ => match self.ownership {
                OwnershipPath::Rented => RENTAL_MOTIVES,
                OwnershipPath::Owned {
                    direct_purchase: Some(YesNo::No),
                    ..
                } => SERVICE_MOTIVES,
                OwnershipPath::Owned {
                    direct_purchase: Some(YesNo::Yes),
                    warranty: Some(_),
                } => SERVICE_MOTIVES,
                OwnershipPath::HandedOver => SERVICE_MOTIVES,
                OwnershipPath::BoughtDirectly { warranty: Some(_) } => SERVICE_MOTIVES,
                _ => &[],
            },
        }
    }

    /// Next unanswered question
    pub fn stage(&self) -> Stage {
        match self.branch {
            Branch::Unselected => Stage::RequesterKind,
            Branch::Collaborator(None) => Stage::BelongsTo,
            _ if self.available_motives().is_empty() => Stage::OwnershipPath,
            _ if self.motive.is_none() => Stage::Motive,
            _ => Stage::Details,
        }
    }

    /// Warranty was confirmed on an owned or directly bought unit
    pub fn invoice_expected(&self) -> bool {
        matches!(
            self.ownership,
            OwnershipPath::Owned {
                direct_purchase: Some(YesNo::Yes),
                warranty: Some(Warranty::Yes),
            } | OwnershipPath::BoughtDirectly {
                warranty: Some(Warranty::Yes),
            }
        )
    }

    pub fn allows_bulk_equipment(&self) -> bool {
        self.motive.is_some_and(Motive::allows_bulk_equipment)
    }
}

fn party_of(branch: Branch) -> Option<Party> {
    match branch {
        Branch::Direct(party) => Some(party),
        Branch::Collaborator(Some(BelongsTo::Distributor)) => Some(Party::Distributor),
        Branch::Collaborator(Some(BelongsTo::Institution)) => Some(Party::Institution),
        Branch::Collaborator(Some(BelongsTo::Patient)) => Some(Party::Patient),
        _ => None,
    }
}
