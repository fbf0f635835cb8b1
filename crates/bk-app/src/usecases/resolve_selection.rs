use std::sync::Arc;

use anyhow::Context;
use futures::future::try_join_all;
use tracing::{debug, info, info_span, Instrument};

use bk_core::ports::{AttachmentFetcherPort, BaseTablePort, ClockPort};
use bk_core::{
    AttachmentDescriptor, FieldId, ImageItem, ImageRecordList, NetworkError, RecordId, ScanMode,
    SelectionScope, WorkingSet,
};

/// Error type for a failed resolution.
/// 解析选区失败的错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ResolveSelectionError {
    #[error("host call failed: {0:#}")]
    Host(anyhow::Error),

    #[error("attachment download failed: {0}")]
    Network(#[from] NetworkError),
}

/// What a resolution found for a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The field holds attachments; here are the images.
    Resolved(WorkingSet),
    /// The field is missing or is not an attachment column.
    NotAttachmentField,
}

/// Use case for turning a selected cell into a working set of images.
///
/// ## Behavior / 行为
/// - Validates the selected field is an attachment column
/// - Enumerates the target records (`cell`: the selected one, `field`: all)
/// - Keeps attachments whose MIME type starts with `image`
/// - Resolves download URLs and fetches every payload concurrently
///
/// Any single failure aborts the whole resolution.
/// 任何一个下载失败都会使整个解析失败。
pub struct ResolveSelectionUseCase {
    table: Arc<dyn BaseTablePort>,
    fetcher: Arc<dyn AttachmentFetcherPort>,
    clock: Arc<dyn ClockPort>,
}

impl ResolveSelectionUseCase {
    pub fn new(
        table: Arc<dyn BaseTablePort>,
        fetcher: Arc<dyn AttachmentFetcherPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            table,
            fetcher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        scope: &SelectionScope,
        scan_mode: ScanMode,
    ) -> Result<ResolveOutcome, ResolveSelectionError> {
        let span = info_span!(
            "usecase.resolve_selection.execute",
            field_id = %scope.field_id,
            record_id = %scope.record_id,
            scan_mode = %scan_mode,
        );

        async {
            let meta = self
                .table
                .field_meta(&scope.field_id)
                .await
                .with_context(|| format!("failed to load field meta for {}", scope.field_id))
                .map_err(ResolveSelectionError::Host)?;

            match meta {
                Some(meta) if meta.field_type.is_attachment() => {}
                Some(meta) => {
                    debug!(field_type = meta.field_type.0, "Selected field is not an attachment field");
                    return Ok(ResolveOutcome::NotAttachmentField);
                }
                None => {
                    debug!("Selected field not found in active table");
                    return Ok(ResolveOutcome::NotAttachmentField);
                }
            }

            let record_ids = match scan_mode {
                ScanMode::Cell => vec![scope.record_id.clone()],
                ScanMode::Field => self
                    .table
                    .record_ids()
                    .await
                    .context("failed to list records of active table")
                    .map_err(ResolveSelectionError::Host)?,
            };

            let records = try_join_all(
                record_ids
                    .into_iter()
                    .map(|record_id| self.load_record(&scope.field_id, record_id)),
            )
            .await?;

            let working_set = WorkingSet::from_records(records);
            info!(
                records = working_set.record_count(),
                images = working_set.image_count(),
                "Selection resolved"
            );
            Ok(ResolveOutcome::Resolved(working_set))
        }
        .instrument(span)
        .await
    }

    async fn load_record(
        &self,
        field_id: &FieldId,
        record_id: RecordId,
    ) -> Result<ImageRecordList, ResolveSelectionError> {
        let attachments = self
            .table
            .attachments(field_id, &record_id)
            .await
            .with_context(|| format!("failed to read attachments of record {record_id}"))
            .map_err(ResolveSelectionError::Host)?;

        let images = try_join_all(
            attachments
                .into_iter()
                .filter(AttachmentDescriptor::is_image)
                .map(|descriptor| self.load_image(field_id, &record_id, descriptor)),
        )
        .await?;

        Ok(ImageRecordList::new(field_id.clone(), record_id, images))
    }

    async fn load_image(
        &self,
        field_id: &FieldId,
        record_id: &RecordId,
        descriptor: AttachmentDescriptor,
    ) -> Result<ImageItem, ResolveSelectionError> {
        let url = self
            .table
            .attachment_url(&descriptor.token, field_id, record_id)
            .await
            .with_context(|| format!("failed to resolve url for attachment {}", descriptor.token))
            .map_err(ResolveSelectionError::Host)?;

        let file = self.fetcher.fetch(&url, &descriptor.name).await?;
        Ok(ImageItem::new(descriptor, url, file, self.clock.now_ms()))
    }
}
