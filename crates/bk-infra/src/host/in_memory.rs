use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use bk_core::ports::{BaseTablePort, SelectionPort};
use bk_core::{
    AttachmentDescriptor, AttachmentToken, BinaryFile, FieldId, FieldMeta, FieldType, MimeType,
    RecordId, Selection,
};

const SUBSCRIBER_BUFFER: usize = 32;

/// In-memory host base.
///
/// 内存版的多维表格宿主：一张活动数据表加上选区广播。
///
/// Implements both host ports so the synchronizer can be embedded without a
/// real host SDK. Attachment URLs are `{download_base}/{token}`, which lets a
/// plain HTTP server stand in for the host's file service.
pub struct InMemoryBase {
    download_base: String,
    state: Mutex<BaseState>,
    subscribers: Mutex<Vec<mpsc::Sender<Selection>>>,
}

#[derive(Default)]
struct BaseState {
    selection: Selection,
    fields: HashMap<FieldId, FieldMeta>,
    records: Vec<RecordId>,
    cells: HashMap<(FieldId, RecordId), Vec<AttachmentDescriptor>>,
    files: HashMap<AttachmentToken, BinaryFile>,
    read_only: HashSet<RecordId>,
    next_token: u64,
}

impl BaseState {
    fn store(&mut self, file: BinaryFile) -> AttachmentDescriptor {
        self.next_token += 1;
        let token = AttachmentToken::new(format!("tok{}", self.next_token));
        let descriptor =
            AttachmentDescriptor::new(token.clone(), file.name(), file.mime().clone(), file.size());
        self.files.insert(token, file);
        descriptor
    }
}

impl InMemoryBase {
    pub fn new(download_base: impl Into<String>) -> Self {
        Self {
            download_base: download_base.into().trim_end_matches('/').to_string(),
            state: Mutex::new(BaseState::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BaseState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_field(&self, id: impl Into<FieldId>, name: impl Into<String>, field_type: FieldType) {
        let id = id.into();
        let meta = FieldMeta {
            id: id.clone(),
            name: name.into(),
            field_type,
        };
        self.lock().fields.insert(id, meta);
    }

    pub fn add_record(&self, id: impl Into<RecordId>) {
        let id = id.into();
        let mut state = self.lock();
        if !state.records.contains(&id) {
            state.records.push(id);
        }
    }

    /// Append an attachment to a cell and return its token.
    pub fn put_attachment(
        &self,
        field_id: impl Into<FieldId>,
        record_id: impl Into<RecordId>,
        name: &str,
        mime: &str,
        bytes: impl Into<bytes::Bytes>,
    ) -> AttachmentToken {
        let file = BinaryFile::new(name, MimeType::from(mime), bytes);
        let mut state = self.lock();
        let descriptor = state.store(file);
        let token = descriptor.token.clone();
        state
            .cells
            .entry((field_id.into(), record_id.into()))
            .or_default()
            .push(descriptor);
        token
    }

    /// Refuse (`set_attachments` returns `false`) writes to this record.
    pub fn set_read_only(&self, record_id: impl Into<RecordId>, read_only: bool) {
        let record_id = record_id.into();
        let mut state = self.lock();
        if read_only {
            state.read_only.insert(record_id);
        } else {
            state.read_only.remove(&record_id);
        }
    }

    pub fn file(&self, token: &AttachmentToken) -> Option<BinaryFile> {
        self.lock().files.get(token).cloned()
    }

    /// Files currently stored in a cell, in cell order.
    pub fn cell_files(&self, field_id: &FieldId, record_id: &RecordId) -> Vec<BinaryFile> {
        let state = self.lock();
        state
            .cells
            .get(&(field_id.clone(), record_id.clone()))
            .map(|descriptors| {
                descriptors
                    .iter()
                    .filter_map(|d| state.files.get(&d.token).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Change the selection and notify every live subscriber.
    pub async fn select(&self, selection: Selection) {
        self.lock().selection = selection.clone();

        let subscribers: Vec<_> = {
            let mut subs = self
                .subscribers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            subs.retain(|tx| !tx.is_closed());
            subs.clone()
        };
        for tx in subscribers {
            if tx.send(selection.clone()).await.is_err() {
                debug!("Selection subscriber went away");
            }
        }
    }
}

#[async_trait]
impl SelectionPort for InMemoryBase {
    async fn current_selection(&self) -> Result<Selection> {
        Ok(self.lock().selection.clone())
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<Selection>> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        Ok(rx)
    }
}

#[async_trait]
impl BaseTablePort for InMemoryBase {
    async fn field_meta(&self, field_id: &FieldId) -> Result<Option<FieldMeta>> {
        Ok(self.lock().fields.get(field_id).cloned())
    }

    async fn record_ids(&self) -> Result<Vec<RecordId>> {
        Ok(self.lock().records.clone())
    }

    async fn attachments(
        &self,
        field_id: &FieldId,
        record_id: &RecordId,
    ) -> Result<Vec<AttachmentDescriptor>> {
        Ok(self
            .lock()
            .cells
            .get(&(field_id.clone(), record_id.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn attachment_url(
        &self,
        token: &AttachmentToken,
        _field_id: &FieldId,
        _record_id: &RecordId,
    ) -> Result<String> {
        if !self.lock().files.contains_key(token) {
            return Err(anyhow!("unknown attachment token {token}"));
        }
        Ok(format!("{}/{}", self.download_base, token))
    }

    async fn set_attachments(
        &self,
        field_id: &FieldId,
        record_id: &RecordId,
        files: Vec<BinaryFile>,
    ) -> Result<bool> {
        let mut state = self.lock();
        if !state.fields.contains_key(field_id) {
            return Err(anyhow!("unknown field {field_id}"));
        }
        if !state.records.contains(record_id) {
            return Err(anyhow!("unknown record {record_id}"));
        }
        if state.read_only.contains(record_id) {
            return Ok(false);
        }

        let key = (field_id.clone(), record_id.clone());
        if let Some(replaced) = state.cells.remove(&key) {
            for descriptor in replaced {
                state.files.remove(&descriptor.token);
            }
        }
        let descriptors: Vec<_> = files.into_iter().map(|file| state.store(file)).collect();
        state.cells.insert(key, descriptors);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> InMemoryBase {
        let base = InMemoryBase::new("http://files.local/download/");
        base.add_field("fldA", "Images", FieldType::ATTACHMENT);
        base.add_record("recA");
        base
    }

    #[tokio::test]
    async fn test_attachments_keep_insertion_order_and_metadata() {
        let base = base();
        let t1 = base.put_attachment("fldA", "recA", "a.jpg", "image/jpeg", vec![0u8; 1024]);
        base.put_attachment("fldA", "recA", "b.pdf", "application/pdf", vec![0u8; 2]);

        let list = base
            .attachments(&"fldA".into(), &"recA".into())
            .await
            .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].token, t1);
        assert_eq!(list[0].name, "a.jpg");
        assert_eq!(list[0].size, 1024);
        assert_eq!(list[1].mime_type.as_str(), "application/pdf");
    }

    #[tokio::test]
    async fn test_attachment_url_uses_download_base() {
        let base = base();
        let token = base.put_attachment("fldA", "recA", "a.jpg", "image/jpeg", vec![1u8]);

        let url = base
            .attachment_url(&token, &"fldA".into(), &"recA".into())
            .await
            .unwrap();

        assert_eq!(url, format!("http://files.local/download/{token}"));
        assert!(base
            .attachment_url(&"missing".into(), &"fldA".into(), &"recA".into())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_set_attachments_replaces_cell_unless_read_only() {
        let base = base();
        let old_token = base.put_attachment("fldA", "recA", "a.jpg", "image/jpeg", vec![1u8]);
        let new_file = BinaryFile::new("a.jpg", MimeType::from("image/png"), vec![9u8, 9]);

        let ok = base
            .set_attachments(&"fldA".into(), &"recA".into(), vec![new_file.clone()])
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(base.cell_files(&"fldA".into(), &"recA".into()), vec![new_file]);
        assert!(base.file(&old_token).is_none());
        assert_eq!(base.lock().files.len(), 1);

        base.set_read_only("recA", true);
        let refused = base
            .set_attachments(&"fldA".into(), &"recA".into(), vec![])
            .await
            .unwrap();
        assert!(!refused);
        assert_eq!(base.cell_files(&"fldA".into(), &"recA".into()).len(), 1);
    }

    #[tokio::test]
    async fn test_select_broadcasts_to_subscribers() {
        let base = base();
        let mut rx = base.subscribe().await.unwrap();

        base.select(Selection::cell("fldA", "recA")).await;

        assert_eq!(rx.recv().await, Some(Selection::cell("fldA", "recA")));
        assert_eq!(
            base.current_selection().await.unwrap(),
            Selection::cell("fldA", "recA")
        );
    }
}
