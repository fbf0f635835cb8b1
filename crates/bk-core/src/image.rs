//! Image working set.
//!
//! ## Invariants / 不变量
//!
//! - An [`ImageItem`]'s name never changes after it is fetched; only its file
//!   can be swapped, through [`ImageItem::with_file`].
//! - A [`WorkingSet`] never holds a record without images.
//! - Image order inside a record is the host attachment order.

use serde::{Deserialize, Serialize};

use crate::file::{BinaryFile, MimeType};
use crate::ids::{AttachmentToken, FieldId, RecordId};

/// Raster subtypes the background removal service accepts.
pub const BACKGROUND_REMOVAL_SUBTYPES: [&str; 5] = ["jpeg", "png", "webp", "bmp", "jpg"];

/// Attachment entry as listed by the host for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub token: AttachmentToken,
    pub name: String,
    pub mime_type: MimeType,
    pub size: u64,
}

impl AttachmentDescriptor {
    pub fn new(
        token: impl Into<AttachmentToken>,
        name: impl Into<String>,
        mime_type: impl Into<MimeType>,
        size: u64,
    ) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.is_image()
    }
}

/// One fetched attachment image.
///
/// 一张已下载的附件图片。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    url: String,
    file: BinaryFile,
    name: String,
    size: u64,
    mime_type: MimeType,
    token: AttachmentToken,
    fetched_at_ms: i64,
}

impl ImageItem {
    pub fn new(
        descriptor: AttachmentDescriptor,
        url: impl Into<String>,
        file: BinaryFile,
        fetched_at_ms: i64,
    ) -> Self {
        Self {
            url: url.into(),
            file,
            name: descriptor.name,
            size: descriptor.size,
            mime_type: descriptor.mime_type,
            token: descriptor.token,
            fetched_at_ms,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file(&self) -> &BinaryFile {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size declared by the host descriptor. The current payload size is
    /// `file().size()`.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// MIME type declared by the host descriptor.
    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    pub fn token(&self) -> &AttachmentToken {
        &self.token
    }

    pub fn fetched_at_ms(&self) -> i64 {
        self.fetched_at_ms
    }

    /// Whether the background removal service accepts this image.
    pub fn supports_background_removal(&self) -> bool {
        self.mime_type
            .subtype()
            .is_some_and(|subtype| BACKGROUND_REMOVAL_SUBTYPES.contains(&subtype))
    }

    /// Replace the payload, keeping every other attribute.
    pub fn with_file(self, file: BinaryFile) -> Self {
        Self { file, ..self }
    }

    /// Payload to upload back to the host: current bytes under the original
    /// name. The type follows the payload, falling back to the descriptor
    /// when the payload carries none.
    ///
    /// The descriptor type is deliberately not reused: a PNG returned by
    /// background removal is uploaded as `image/png`, not as the source type.
    pub fn upload_file(&self) -> BinaryFile {
        let mime = if self.file.mime().as_str().is_empty() {
            self.mime_type.clone()
        } else {
            self.file.mime().clone()
        };
        self.file.renamed(self.name.clone(), mime)
    }
}

/// All images of one record for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecordList {
    pub field_id: FieldId,
    pub record_id: RecordId,
    pub images: Vec<ImageItem>,
}

impl ImageRecordList {
    pub fn new(field_id: FieldId, record_id: RecordId, images: Vec<ImageItem>) -> Self {
        Self {
            field_id,
            record_id,
            images,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// The image lists currently displayed and operated on.
///
/// 当前显示与操作的图片集合。只会被整体替换，不做增量修改。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    records: Vec<ImageRecordList>,
}

impl WorkingSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a working set, dropping records that ended up without images.
    pub fn from_records(records: impl IntoIterator<Item = ImageRecordList>) -> Self {
        Self {
            records: records.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    pub fn records(&self) -> &[ImageRecordList] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn image_count(&self) -> usize {
        self.records.iter().map(|r| r.images.len()).sum()
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageItem> {
        self.records.iter().flat_map(|r| r.images.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, mime: &str) -> ImageItem {
        ImageItem::new(
            AttachmentDescriptor::new("t1", name, mime, 4),
            "https://host/download/t1",
            BinaryFile::new(name, MimeType::from(mime), vec![1u8, 2, 3, 4]),
            42,
        )
    }

    #[test]
    fn test_with_file_keeps_name_and_metadata() {
        let original = item("a.jpg", "image/jpeg");
        let replaced = original.clone().with_file(BinaryFile::new(
            "ignored.png",
            MimeType::from("image/png"),
            vec![9u8; 10],
        ));

        assert_eq!(replaced.name(), "a.jpg");
        assert_eq!(replaced.token(), original.token());
        assert_eq!(replaced.size(), 4);
        assert_eq!(replaced.file().size(), 10);
        assert_eq!(replaced.fetched_at_ms(), 42);
    }

    #[test]
    fn test_background_removal_allow_list() {
        assert!(item("a.jpg", "image/jpeg").supports_background_removal());
        assert!(item("a.png", "image/png").supports_background_removal());
        assert!(item("a.webp", "image/webp").supports_background_removal());
        assert!(!item("a.gif", "image/gif").supports_background_removal());
        assert!(!item("a.svg", "image/svg+xml").supports_background_removal());
    }

    #[test]
    fn test_upload_file_uses_item_name_and_payload_type() {
        let replaced = item("a.jpg", "image/jpeg").with_file(BinaryFile::new(
            "other",
            MimeType::from("image/png"),
            vec![7u8; 2],
        ));
        let upload = replaced.upload_file();
        assert_eq!(upload.name(), "a.jpg");
        assert_eq!(upload.mime().as_str(), "image/png");
        assert_eq!(upload.size(), 2);

        let untyped = item("b.jpg", "image/jpeg").with_file(BinaryFile::new(
            "b.jpg",
            MimeType::from(""),
            vec![1u8],
        ));
        assert_eq!(untyped.upload_file().mime().as_str(), "image/jpeg");
    }

    #[test]
    fn test_working_set_drops_empty_records() {
        let set = WorkingSet::from_records(vec![
            ImageRecordList::new("fldA".into(), "rec1".into(), vec![]),
            ImageRecordList::new(
                "fldA".into(),
                "rec2".into(),
                vec![item("a.png", "image/png"), item("b.png", "image/png")],
            ),
        ]);

        assert_eq!(set.record_count(), 1);
        assert_eq!(set.records()[0].record_id.as_str(), "rec2");
        assert_eq!(set.image_count(), 2);
    }
}
