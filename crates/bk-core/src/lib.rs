//! # bk-core
//!
//! Core domain models and ports for BaseKit.
//!
//! This crate contains pure business logic without any infrastructure dependencies.
//! The host base application (selection, tables, attachments) and the remote
//! image / URL services are only visible through the traits in [`ports`].

// Public module exports
pub mod config;
pub mod errors;
pub mod file;
pub mod ids;
pub mod image;
pub mod ports;
pub mod selection;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use errors::NetworkError;
pub use file::{format_file_size, BinaryFile, MimeType};
pub use ids::{AttachmentToken, FieldId, RecordId};
pub use image::{
    AttachmentDescriptor, ImageItem, ImageRecordList, WorkingSet, BACKGROUND_REMOVAL_SUBTYPES,
};
pub use selection::{FieldMeta, FieldType, ScanMode, Selection, SelectionScope};
