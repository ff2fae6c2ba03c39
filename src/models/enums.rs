//! Domain enums for the intake form
//!
//! Every enum maps to the exact option label shown in the form and stored in
//! the database, so parsing goes through `from_label` rather than serde.

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label as shown in the form and stored in the database
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_label(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL.iter().copied().find(|v| v.label() == value)
            }

            /// Every label, in declaration order
            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.label()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Requester
// ---------------------------------------------------------------------------

labelled_enum! {
    /// Who fills in the request
    RequesterKind {
        InternalCollaborator => "Colaborador de Syemed",
        Distributor => "Distribuidor",
        Institution => "Institución",
        Patient => "Paciente/Particular",
    }
}

labelled_enum! {
    /// Whom the equipment belongs to, answered by internal collaborators
    BelongsTo {
        Patient => "Paciente/Particular",
        Distributor => "Distribuidor",
        Institution => "Institución",
        StockEquipment => "Equipo de Stock",
        DemoWriteOff => "Baja de demo",
    }
}

/// External party the equipment is serviced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Distributor,
    Institution,
    Patient,
}

// ---------------------------------------------------------------------------
// Ownership path
// ---------------------------------------------------------------------------

labelled_enum! {
    /// Rented vs owned equipment (distributors and institutions)
    Ownership {
        Rented => "Alquilado",
        Owned => "Propio",
    }
}

labelled_enum! {
    /// How a patient got the equipment
    EquipmentOrigin {
        HandedOver => "Se lo entregaron",
        BoughtDirectly => "Lo compró de manera directa",
    }
}

labelled_enum! {
    YesNo {
        Yes => "Sí",
        No => "No",
    }
}

labelled_enum! {
    /// Warranty answer, with an explicit "don't know"
    Warranty {
        Yes => "Sí",
        No => "No",
        DontKnow => "No lo sé",
    }
}

// ---------------------------------------------------------------------------
// Motive
// ---------------------------------------------------------------------------

labelled_enum! {
    /// Reason for the request
    Motive {
        TechnicalService => "Servicio Técnico (reparaciones de equipos en general)",
        AfterSales => "Servicio Post Venta (para alguno de nuestros productos adquiridos)",
        RentalWriteOff => "Baja de Alquiler",
        RentalChange => "Cambio de Alquiler",
        CriticalFailure => "Cambio por falla de funcionamiento crítica",
        StockEquipment => "Equipo de Stock",
        DemoWriteOff => "Baja de demo",
    }
}

impl Motive {
    /// Parse a motive, accepting the short menu labels as aliases
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Asistencia Técnica"
            | "Servicio de Asistencia Técnica (para nuestros productos adquiridos)" => {
                Some(Motive::AfterSales)
            }
            "Cambio por falla crítica" => Some(Motive::CriticalFailure),
            other => Self::from_label(other),
        }
    }

    /// Short label used in option menus
    pub fn option_label(self) -> &'static str {
        match self {
            Motive::AfterSales => "Asistencia Técnica",
            Motive::CriticalFailure => "Cambio por falla crítica",
            other => other.label(),
        }
    }

    /// Label printed in documents
    pub fn display_label(self) -> &'static str {
        match self {
            Motive::AfterSales => "Asistencia Técnica",
            other => other.label(),
        }
    }

    /// Base category code, before any ownership prefix
    pub fn code(self) -> &'static str {
        match self {
            Motive::TechnicalService => "ST/R",
            Motive::AfterSales => "AT",
            Motive::RentalWriteOff => "A/BA",
            Motive::RentalChange => "A/CA",
            Motive::CriticalFailure => "FC",
            Motive::StockEquipment => "S",
            Motive::DemoWriteOff => "BD",
        }
    }

    /// Motives whose code never depends on ownership or warranty
    pub fn has_fixed_code(self) -> bool {
        matches!(
            self,
            Motive::RentalWriteOff
                | Motive::RentalChange
                | Motive::StockEquipment
                | Motive::DemoWriteOff
        )
    }

    /// Several similar units may be entered as one batch of serials
    pub fn allows_bulk_equipment(self) -> bool {
        self.has_fixed_code()
    }

    /// Whether the request registers equipment rows at all
    pub fn registers_equipment(self) -> bool {
        self != Motive::AfterSales
    }

    /// Whether failure evidence (photos/videos) is collected
    pub fn collects_failure_evidence(self) -> bool {
        matches!(
            self,
            Motive::TechnicalService | Motive::AfterSales | Motive::CriticalFailure
        )
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Attachment category stored with each uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentCategory {
    Invoice,
    FailureEvidence,
    General,
}

impl AttachmentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentCategory::Invoice => "factura",
            AttachmentCategory::FailureEvidence => "falla",
            AttachmentCategory::General => "general",
        }
    }

    /// Storage folder below the configured base folder
    pub fn folder(self) -> &'static str {
        match self {
            AttachmentCategory::Invoice => "facturas",
            AttachmentCategory::FailureEvidence => "fotos",
            AttachmentCategory::General => "general",
        }
    }
}
