//! Reference data for the form option lists
//!
//! The first entry of each select list is its placeholder; a field still
//! holding a placeholder counts as missing.

use serde::Serialize;
use utoipa::ToSchema;

use super::enums::{BelongsTo, EquipmentOrigin, Motive, Ownership, RequesterKind, Warranty, YesNo};

pub const TYPE_PLACEHOLDER: &str = "Seleccionar tipo...";
pub const BRAND_PLACEHOLDER: &str = "Seleccionar marca...";
pub const MODEL_PLACEHOLDER: &str = "Seleccionar modelo...";
pub const SALES_CONTACT_PLACEHOLDER: &str = "Seleccionar comercial...";
pub const REQUESTER_PLACEHOLDER: &str = "Seleccionar solicitante...";

pub const EQUIPMENT_TYPES: &[&str] = &[
    TYPE_PLACEHOLDER,
    "Analizador de gases",
    "Asistente de Tos",
    "Aspirador de secreciones",
    "Aspirador Manual",
    "Balón de Contrapulsación",
    "Bomba a jeringa",
    "Bomba de Infusión",
    "Bomba de Presión Negativa",
    "BPAP",
    "Cables Varios",
    "Calentador Humidificador",
    "Capnógrafo",
    "Cardiodesfibrilador",
    "Concentrador de Oxígeno",
    "Concentrador de Oxígeno Portátil",
    "CPAP",
    "DEA",
    "Electrocardiógrafo",
    "Incubadora",
    "Luminoterapia",
    "Marcapasos",
    "Mesa de Anestesia",
    "Mochila de Oxígeno",
    "Módulo de Capnografía",
    "Módulo PI",
    "Monitor Multiparamétrico",
    "Oxímetro de Pulso",
    "Respirador",
    "Respirador Portátil",
    "Tubo de Oxígeno",
    "Vaporizador de anestesia",
    "No se/No lo encuentro en la lista",
];

pub const EQUIPMENT_BRANDS: &[&str] = &[
    BRAND_PLACEHOLDER,
    "Arrow",
    "Biocare",
    "Bistos",
    "Cardiotécnica",
    "Cegens",
    "Comen",
    "Confort Cough",
    "Contec",
    "Covidien",
    "Daiwha",
    "Datascope",
    "Dräger",
    "Edan",
    "Enmind",
    "Fisher&Paykel",
    "Leex",
    "Lifotronic",
    "Long Fian",
    "Lovego",
    "Marbel",
    "Massimo",
    "Maverick",
    "MDV",
    "Medix",
    "Medtronic",
    "Mindray",
    "MUX",
    "Nellcor",
    "Neumovent",
    "Philips",
    "Yuwell",
    "No se / No lo encuentro en esta lista",
];

pub const EQUIPMENT_MODELS: &[&str] = &[
    MODEL_PLACEHOLDER,
    "7E-C", "7E-G", "7F-10", "7F-5 Mini", "9F-5", "Autocat II", "Autocat II Wave",
    "BT-400", "BT-500", "Cloud", "CC20", "CMS8000", "CO2-M01", "DI2000",
    "EN-S7", "EN-V7", "Evergo", "Fabius", "Fabius Plus", "Fabius Plus XL",
    "Graphnet TS", "HC100", "HT-109", "iE-101", "iE-300", "IM8B", "Jay-5",
    "Jay-5Q", "LG103", "Libra", "M3A", "MR810", "N/E", "NP-100", "NP-600",
    "Prisma Vent 40", "Prisma Vent 50", "Puritan Bennett 560", "RG-401",
    "RG-401 Plus", "RG-501", "RG-501 Plus", "Scio Four", "SP-50", "SP-50 Pro",
    "Spirit 3", "Star 8000", "System 97", "System 97e", "Trilogy", "Vapor 2000",
    "Vista 120", "VP-50", "VP-50 Pro", "YH-350", "YH-360", "YH-550", "YH-560",
    "YH-725", "YH-730", "5342", "5346",
    "No se / No lo encuentro en esta lista",
];

pub const SALES_CONTACTS: &[&str] = &[
    SALES_CONTACT_PLACEHOLDER,
    "Ariel",
    "Clara",
    "Diana",
    "Francesca",
    "Isabel",
    "Lucas",
    "Miguel",
];

pub const INTERNAL_REQUESTERS: &[&str] = &[
    REQUESTER_PLACEHOLDER,
    "Ariel",
    "Clara",
    "Daiana",
    "Diana",
    "Facundo",
    "Francesca",
    "Isabel",
    "Lucas",
    "Miguel",
    "Rubén",
    "Tomás",
];

pub const REQUESTING_AREAS: &[&str] = &["Comercial", "Comex", "Logística/Depósito"];

pub const LOGISTICS_OPTIONS: &[&str] = &[
    "Ida a cargo de Cliente",
    "Ida a cargo de Syemed",
    "Vuelta a cargo de Cliente",
    "Vuelta a cargo de Syemed",
];

/// General problem list offered to every requester
pub const COMMON_PROBLEMS: &[&str] = &[
    "El equipo no muestra ningún signo de falla pero no funciona",
    "El equipo no enciende cuando lo enchufo",
    "El equipo presento una falla en su funcionamiento",
    "El equipo indica un código de error",
    "El equipo se cayo y no funciona",
    "El equipo se mojó y no funciona",
    "El equipo muestra una alarma amarilla/roja",
    "Faltan accesorios",
    "Garantia",
    "No se como se usa el equipamiento",
    "No se como funcionan los descartables del equipo",
];

/// Failures offered for technical service
pub const SERVICE_FAILURES: &[&str] = &[
    "No enciende",
    "Falla eléctrica",
    "Problema mecánico",
    "Ruidos anormales",
    "Pérdida de precisión",
    "Necesita calibración",
    "Desgaste de piezas",
    "Mantenimiento preventivo",
    "Falla en display/pantalla",
    "Problema de conectividad",
];

/// Queries offered for after-sales assistance
pub const AFTER_SALES_QUERIES: &[&str] = &[
    "Consulta sobre uso del equipo",
    "Solicitud de capacitación",
    "Consulta sobre garantía",
    "Solicitud de manual/documentación",
    "Necesito accesorios",
    "Necesito repuestos",
    "Actualización de software",
    "Configuración inicial",
];

/// True when a select value is empty or still on a placeholder
pub fn is_unset(value: Option<&str>, placeholder: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(v) => placeholder == Some(v),
    }
}

/// Every option list the form needs, served to the UI in one call
#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceData {
    pub requester_kinds: Vec<&'static str>,
    pub belongs_to: Vec<&'static str>,
    pub requesting_areas: Vec<&'static str>,
    pub internal_requesters: Vec<&'static str>,
    pub logistics: Vec<&'static str>,
    pub sales_contacts: Vec<&'static str>,
    pub ownership: Vec<&'static str>,
    pub equipment_origins: Vec<&'static str>,
    pub yes_no: Vec<&'static str>,
    pub warranty: Vec<&'static str>,
    pub motives: Vec<&'static str>,
    pub equipment_types: Vec<&'static str>,
    pub equipment_brands: Vec<&'static str>,
    pub equipment_models: Vec<&'static str>,
    pub common_problems: Vec<&'static str>,
    pub service_failures: Vec<&'static str>,
    pub after_sales_queries: Vec<&'static str>,
    /// Maximum urgency level (levels start at 0)
    pub max_urgency: u8,
}

impl ReferenceData {
    pub fn load() -> Self {
        Self {
            requester_kinds: RequesterKind::labels(),
            belongs_to: BelongsTo::labels(),
            requesting_areas: REQUESTING_AREAS.to_vec(),
            internal_requesters: INTERNAL_REQUESTERS.to_vec(),
            logistics: LOGISTICS_OPTIONS.to_vec(),
            sales_contacts: SALES_CONTACTS.to_vec(),
            ownership: Ownership::labels(),
            equipment_origins: EquipmentOrigin::labels(),
            yes_no: YesNo::labels(),
            warranty: Warranty::labels(),
            motives: Motive::ALL.iter().map(|m| m.option_label()).collect(),
            equipment_types: EQUIPMENT_TYPES.to_vec(),
            equipment_brands: EQUIPMENT_BRANDS.to_vec(),
            equipment_models: EQUIPMENT_MODELS.to_vec(),
            common_problems: COMMON_PROBLEMS.to_vec(),
            service_failures: SERVICE_FAILURES.to_vec(),
            after_sales_queries: AFTER_SALES_QUERIES.to_vec(),
            max_urgency: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_start_with_placeholder() {
        assert_eq!(EQUIPMENT_TYPES[0], TYPE_PLACEHOLDER);
        assert_eq!(EQUIPMENT_BRANDS[0], BRAND_PLACEHOLDER);
        assert_eq!(EQUIPMENT_MODELS[0], MODEL_PLACEHOLDER);
        assert_eq!(SALES_CONTACTS[0], SALES_CONTACT_PLACEHOLDER);
        assert_eq!(INTERNAL_REQUESTERS[0], REQUESTER_PLACEHOLDER);
    }

    #[test]
    fn test_is_unset() {
        assert!(is_unset(None, None));
        assert!(is_unset(Some("   "), None));
        assert!(is_unset(Some(BRAND_PLACEHOLDER), Some(BRAND_PLACEHOLDER)));
        assert!(!is_unset(Some("Philips"), Some(BRAND_PLACEHOLDER)));
    }
}
