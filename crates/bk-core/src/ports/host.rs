//! Host base SDK surface.
//!
//! 宿主（多维表格）SDK 能力，由外部提供，这里只定义契约。

use anyhow::Result;
use tokio::sync::mpsc;

use crate::file::BinaryFile;
use crate::ids::{AttachmentToken, FieldId, RecordId};
use crate::image::AttachmentDescriptor;
use crate::selection::{FieldMeta, Selection};

/// Selection state of the host UI.
#[async_trait::async_trait]
pub trait SelectionPort: Send + Sync {
    /// Current selection, possibly empty.
    async fn current_selection(&self) -> Result<Selection>;

    /// Subscribe to selection changes. The channel closes when the host goes away.
    async fn subscribe(&self) -> Result<mpsc::Receiver<Selection>>;
}

/// Accessors on the host's active table.
#[async_trait::async_trait]
pub trait BaseTablePort: Send + Sync {
    /// Field descriptor, `None` when the table has no such field.
    async fn field_meta(&self, field_id: &FieldId) -> Result<Option<FieldMeta>>;

    /// Every record id of the active table, in table order.
    async fn record_ids(&self) -> Result<Vec<RecordId>>;

    /// Attachments stored in one cell, in cell order. Empty cells yield an empty list.
    async fn attachments(
        &self,
        field_id: &FieldId,
        record_id: &RecordId,
    ) -> Result<Vec<AttachmentDescriptor>>;

    /// Time-limited download URL for an attachment.
    async fn attachment_url(
        &self,
        token: &AttachmentToken,
        field_id: &FieldId,
        record_id: &RecordId,
    ) -> Result<String>;

    /// Replace the cell value with `files`. `Ok(false)` means the host refused the write.
    async fn set_attachments(
        &self,
        field_id: &FieldId,
        record_id: &RecordId,
        files: Vec<BinaryFile>,
    ) -> Result<bool>;
}
