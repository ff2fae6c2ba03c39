//! Attachment model

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::AttachmentCategory;

/// Equipment an uploaded file refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentTarget {
    /// Applies to the whole request, linked to its first equipment
    AllEquipment,
    /// 1-based equipment position
    Equipment(usize),
    Unlinked,
}

impl AttachmentTarget {
    /// Equipment id the attachment row is bound to, if any
    pub fn resolve(self, equipment_ids: &[i32]) -> Option<i32> {
        match self {
            AttachmentTarget::AllEquipment => equipment_ids.first().copied(),
            AttachmentTarget::Equipment(n) if n >= 1 => equipment_ids.get(n - 1).copied(),
            _ => None,
        }
    }
}

/// File received with a submission, before it reaches storage
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub category: AttachmentCategory,
    pub target: AttachmentTarget,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Uploaded file metadata about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub file_name: String,
    pub url: String,
    /// Lowercase extension without the dot
    pub extension: String,
    pub size_bytes: i64,
    pub category: AttachmentCategory,
    pub target: AttachmentTarget,
}

/// Stored attachment record
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Attachment {
    pub id: i32,
    #[sqlx(rename = "solicitud_id")]
    pub request_id: i32,
    #[sqlx(rename = "equipo_id")]
    pub equipment_id: Option<i32>,
    #[sqlx(rename = "nombre_archivo")]
    pub file_name: String,
    #[sqlx(rename = "url_cloudinary")]
    pub url: String,
    #[sqlx(rename = "tipo_archivo")]
    pub extension: String,
    #[sqlx(rename = "tamano_bytes")]
    pub size_bytes: i64,
    #[sqlx(rename = "categoria")]
    pub category: String,
}
