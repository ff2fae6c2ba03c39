//! Object storage for attachments and generated PDFs
//!
//! Files go to a Cloudinary account through its signed upload API.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    models::{NewAttachment, UploadedFile},
    security::files::extension,
};

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\-.]").expect("valid file name regex"));

const RAW_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn for_file(file_name: &str) -> Self {
        match extension(file_name) {
            Some(ext) if RAW_EXTENSIONS.contains(&ext.as_str()) => ResourceType::Raw,
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => ResourceType::Video,
            _ => ResourceType::Image,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }
}

/// One object to store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub public_id: String,
    pub folder: String,
    pub resource_type: ResourceType,
    pub format: Option<String>,
    pub tags: Vec<String>,
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl StoredObject {
    /// A user-supplied file, named `{YYYYmmdd_HHMMSS}_{clean name}`
    pub fn attachment(file: &UploadedFile, folder: String, at: NaiveDateTime) -> Self {
        let stamp = at.format("%Y%m%d_%H%M%S").to_string();
        Self {
            public_id: public_id(&file.file_name, at),
            folder,
            resource_type: ResourceType::for_file(&file.file_name),
            format: None,
            tags: vec!["solicitud_st".to_string(), stamp],
            bytes: file.bytes.clone(),
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
        }
    }

    /// A generated summary PDF
    pub fn pdf(file_name: &str, folder: String, bytes: Vec<u8>, at: NaiveDateTime) -> Self {
        Self {
            public_id: file_name.trim_end_matches(".pdf").to_string(),
            folder,
            resource_type: ResourceType::Raw,
            format: Some("pdf".to_string()),
            tags: vec!["solicitud_pdf".to_string(), at.format("%Y%m%d").to_string()],
            bytes,
            file_name: file_name.to_string(),
            content_type: Some("application/pdf".to_string()),
        }
    }
}

/// Storage name for an uploaded file
pub fn public_id(file_name: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_{}",
        at.format("%Y%m%d_%H%M%S"),
        UNSAFE_NAME_CHARS.replace_all(file_name, "_")
    )
}

/// Cloudinary request signature: sorted `key=value` pairs, the secret appended, SHA-1 hex
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object and return its public HTTPS URL
    async fn upload(&self, object: StoredObject) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct CloudinaryStorage {
    config: StorageConfig,
    http: Client,
}

impl CloudinaryStorage {
    pub fn new(config: StorageConfig) -> AppResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        if config.credentials().is_none() {
            tracing::warn!("Object storage credentials missing, uploads will be rejected");
        }

        Ok(Self { config, http })
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, object: StoredObject) -> AppResult<String> {
        let (cloud_name, api_key, api_secret) = self.config.credentials().ok_or_else(|| {
            AppError::Storage(
                "El almacenamiento de archivos no está configurado. Verifica las variables de entorno."
                    .to_string(),
            )
        })?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("folder", object.folder.clone());
        params.insert("overwrite", "true".to_string());
        params.insert("public_id", object.public_id.clone());
        params.insert("tags", object.tags.join(","));
        params.insert("timestamp", timestamp);
        if let Some(format) = &object.format {
            params.insert("format", format.clone());
        }
        let signature = sign(&params, api_secret);

        let mut file = multipart::Part::bytes(object.bytes).file_name(object.file_name.clone());
        if let Some(content_type) = &object.content_type {
            file = file
                .mime_str(content_type)
                .map_err(|e| AppError::Storage(format!("Tipo de archivo inválido: {}", e)))?;
        }
        let mut form = multipart::Form::new()
            .part("file", file)
            .text("api_key", api_key.to_string())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = format!(
            "{}/{}/{}/upload",
            self.config.api_base_url.trim_end_matches('/'),
            cloud_name,
            object.resource_type.as_str()
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Error al subir archivo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::Storage(format!(
                "Error al subir archivo {}: {}",
                object.file_name, message
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Respuesta de almacenamiento inválida: {}", e)))?;

        tracing::debug!(public_id = %object.public_id, folder = %object.folder, "Object stored");
        Ok(body.secure_url)
    }
}

/// Outcome of uploading every file of a submission
#[derive(Debug, Default)]
pub struct BatchUpload {
    pub attachments: Vec<NewAttachment>,
    /// File name and error message of each failed upload
    pub failures: Vec<(String, String)>,
}

/// Upload files one by one; a failed upload does not stop the others
pub async fn upload_many(
    storage: &dyn ObjectStorage,
    base_folder: &str,
    files: &[UploadedFile],
    at: NaiveDateTime,
) -> BatchUpload {
    let mut batch = BatchUpload::default();

    for file in files {
        let folder = format!("{}/{}", base_folder, file.category.folder());
        match storage.upload(StoredObject::attachment(file, folder, at)).await {
            Ok(url) => batch.attachments.push(NewAttachment {
                file_name: file.file_name.clone(),
                url,
                extension: extension(&file.file_name).unwrap_or_default(),
                size_bytes: file.size() as i64,
                category: file.category,
                target: file.target,
            }),
            Err(e) => {
                tracing::warn!(file = %file.file_name, "Attachment upload failed: {}", e);
                batch.failures.push((file.file_name.clone(), e.to_string()));
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentCategory, AttachmentTarget};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 5, 7))
            .expect("valid date")
    }

    fn file(name: &str, category: AttachmentCategory) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes: vec![1, 2, 3],
            category,
            target: AttachmentTarget::AllEquipment,
        }
    }

    #[test]
    fn test_public_id_cleans_name() {
        assert_eq!(
            public_id("Factura Nº 12 & cía.pdf", at()),
            "20250314_090507_Factura_Nº_12___cía.pdf"
        );
    }

    #[test]
    fn test_resource_type() {
        assert_eq!(ResourceType::for_file("factura.PDF"), ResourceType::Raw);
        assert_eq!(ResourceType::for_file("falla.mov"), ResourceType::Video);
        assert_eq!(ResourceType::for_file("foto.jpg"), ResourceType::Image);
        assert_eq!(ResourceType::for_file("sin_extension"), ResourceType::Image);
    }

    #[test]
    fn test_signature() {
        // Reference values from Cloudinary's signing documentation
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample_image".to_string());
        params.insert("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string());
        assert_eq!(
            sign(&params, "abcd"),
            "bfd09f95f331f558cbd1320e67aa8d488770583e"
        );
    }

    #[test]
    fn test_pdf_object() {
        let object = StoredObject::pdf(
            "solicitud_ST_7_20250314_090507.pdf",
            "solicitudes_st/pdfs".to_string(),
            vec![],
            at(),
        );
        assert_eq!(object.public_id, "solicitud_ST_7_20250314_090507");
        assert_eq!(object.resource_type, ResourceType::Raw);
        assert_eq!(object.tags, vec!["solicitud_pdf", "20250314"]);
    }

    #[tokio::test]
    async fn test_upload_many_keeps_going_after_failure() {
        let mut storage = MockObjectStorage::new();
        storage.expect_upload().times(2).returning(|object| {
            if object.file_name == "roto.jpg" {
                Err(AppError::Storage("timeout".to_string()))
            } else {
                Ok(format!("https://cdn.example/{}/{}", object.folder, object.public_id))
            }
        });

        let files = vec![
            file("roto.jpg", AttachmentCategory::FailureEvidence),
            file("factura.pdf", AttachmentCategory::Invoice),
        ];
        let batch = upload_many(&storage, "solicitudes_st", &files, at()).await;

        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.attachments.len(), 1);
        let invoice = &batch.attachments[0];
        assert_eq!(invoice.extension, "pdf");
        assert_eq!(
            invoice.url,
            "https://cdn.example/solicitudes_st/facturas/20250314_090507_factura.pdf"
        );
    }
}
