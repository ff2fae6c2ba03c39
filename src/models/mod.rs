//! Data models for the intake server

pub mod attachment;
pub mod enums;
pub mod equipment;
pub mod reference;
pub mod request;

// Re-export commonly used types
pub use attachment::{AttachmentTarget, NewAttachment, UploadedFile};
pub use enums::{AttachmentCategory, BelongsTo, Motive, Party, RequesterKind};
pub use equipment::{Equipment, NewEquipment, RegisteredEquipment};
pub use request::{EquipmentBatch, EquipmentEntry, NewServiceRequest, ServiceRequestForm, Submission};
