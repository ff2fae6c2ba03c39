//! Upload validation: file name, extension, size and (optionally) content

use thiserror::Error;

use crate::config::SecurityConfig;

const DANGEROUS_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "sh", "ps1", "scr", "vbs", "js", "jar", "com", "pif", "msi", "dll", "sys",
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

#[cfg_attr(not(feature = "content-sniffing"), allow(dead_code))]
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

const MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Document,
}

impl FileKind {
    fn from_extension(ext: &str) -> Option<Self> {
        if IMAGE_EXTENSIONS.contains(&ext) {
            Some(FileKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Some(FileKind::Video)
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            Some(FileKind::Document)
        } else {
            None
        }
    }

    fn subject(self) -> &'static str {
        match self {
            FileKind::Image => "La imagen",
            FileKind::Video => "El video",
            FileKind::Document => "El documento",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("Nombre inválido: extensión .{0} no permitida")]
    DangerousExtension(String),

    #[error("Nombre inválido: archivo con múltiples extensiones no permitido")]
    MultipleExtensions,

    #[error("Extensión no permitida: {0}")]
    ExtensionNotAllowed(String),

    #[error("{} supera el tamaño máximo de {max_mb}MB", .kind.subject())]
    TooLarge { kind: FileKind, max_mb: u64 },

    #[error("Tipo de archivo no permitido: {0}")]
    ContentNotAllowed(String),
}

/// Lowercase extension after the last dot
pub fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[derive(Debug, Clone)]
pub struct FileValidator {
    image_max_mb: u64,
    video_max_mb: u64,
    document_max_mb: u64,
}

impl FileValidator {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            image_max_mb: config.image_max_mb,
            video_max_mb: config.video_max_mb,
            document_max_mb: config.document_max_mb,
        }
    }

    /// Validate one upload; `content` is only inspected with content sniffing enabled
    pub fn validate(&self, file_name: &str, size: u64, content: &[u8]) -> Result<FileKind, FileRejection> {
        let ext = extension(file_name).unwrap_or_default();

        if DANGEROUS_EXTENSIONS.contains(&ext.as_str()) {
            return Err(FileRejection::DangerousExtension(ext));
        }
        if file_name.split('.').count() > 2 {
            return Err(FileRejection::MultipleExtensions);
        }

        let kind = FileKind::from_extension(&ext)
            .ok_or_else(|| FileRejection::ExtensionNotAllowed(file_name.to_string()))?;

        let max_mb = match kind {
            FileKind::Image => self.image_max_mb,
            FileKind::Video => self.video_max_mb,
            FileKind::Document => self.document_max_mb,
        };
        if size > max_mb * MB {
            return Err(FileRejection::TooLarge { kind, max_mb });
        }

        check_content(&ext, content)?;
        Ok(kind)
    }
}

#[cfg(feature = "content-sniffing")]
fn check_content(ext: &str, content: &[u8]) -> Result<(), FileRejection> {
    match infer::get(content) {
        Some(detected) if ALLOWED_MIME_TYPES.contains(&detected.mime_type()) => Ok(()),
        Some(detected) => Err(FileRejection::ContentNotAllowed(detected.mime_type().to_string())),
        // plain text has no signature
        None if ext == "txt" => Ok(()),
        None => Err(FileRejection::ContentNotAllowed("unknown".to_string())),
    }
}

#[cfg(not(feature = "content-sniffing"))]
fn check_content(_ext: &str, _content: &[u8]) -> Result<(), FileRejection> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> FileValidator {
        FileValidator::new(&SecurityConfig::default())
    }

    #[test]
    fn test_rejects_disguised_executable() {
        assert_eq!(
            validator().validate("invoice.pdf.exe", 1024, &[]),
            Err(FileRejection::DangerousExtension("exe".to_string()))
        );
        assert_eq!(
            validator().validate("factura.2024.pdf", 1024, &[]),
            Err(FileRejection::MultipleExtensions)
        );
    }

    #[test]
    fn test_rejects_oversized_image() {
        let err = validator()
            .validate("foto.jpg", 60 * MB, &[])
            .expect_err("60MB image must be rejected");
        assert_eq!(
            err,
            FileRejection::TooLarge {
                kind: FileKind::Image,
                max_mb: 10
            }
        );
        assert_eq!(err.to_string(), "La imagen supera el tamaño máximo de 10MB");
    }

    #[test]
    fn test_size_limits_by_kind() {
        assert_eq!(validator().validate("falla.mp4", 45 * MB, &[]), Ok(FileKind::Video));
        assert!(validator().validate("falla.mov", 51 * MB, &[]).is_err());
        assert!(validator().validate("manual.docx", 6 * MB, &[]).is_err());
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            validator().validate("planilla.xlsx", 10, &[]),
            Err(FileRejection::ExtensionNotAllowed(_))
        ));
        assert!(matches!(
            validator().validate("sin_extension", 10, &[]),
            Err(FileRejection::ExtensionNotAllowed(_))
        ));
    }

    #[cfg(not(feature = "content-sniffing"))]
    #[test]
    fn test_accepts_small_pdf() {
        assert_eq!(
            validator().validate("Factura.PDF", 2 * MB, b"%PDF-1.4"),
            Ok(FileKind::Document)
        );
    }

    #[cfg(feature = "content-sniffing")]
    #[test]
    fn test_content_must_match_allowed_types() {
        assert_eq!(
            validator().validate("Factura.PDF", 2 * MB, b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n"),
            Ok(FileKind::Document)
        );
        assert!(validator().validate("foto.png", 10, b"MZ\x90\x00\x03\x00\x00\x00").is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("Foto.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("archivo."), None);
        assert_eq!(extension("archivo"), None);
    }
}
