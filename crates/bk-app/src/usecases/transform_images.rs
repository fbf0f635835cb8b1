use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use bk_core::ports::BackgroundRemoverPort;
use bk_core::{ImageRecordList, NetworkError, RecordId, WorkingSet};

#[derive(Debug, thiserror::Error)]
pub enum TransformImagesError {
    #[error("background removal failed for {name} in record {record_id}: {source}")]
    RemoveBackground {
        record_id: RecordId,
        name: String,
        #[source]
        source: NetworkError,
    },
}

/// Use case for removing the background of every supported image.
///
/// The input working set is never touched; a new one is returned. Images
/// whose subtype is not in the allow-list pass through unchanged. The first
/// remote failure aborts the batch.
pub struct TransformImagesUseCase {
    remover: Arc<dyn BackgroundRemoverPort>,
}

impl TransformImagesUseCase {
    pub fn new(remover: Arc<dyn BackgroundRemoverPort>) -> Self {
        Self { remover }
    }

    pub async fn execute(&self, working_set: &WorkingSet) -> Result<WorkingSet, TransformImagesError> {
        let span = info_span!(
            "usecase.transform_images.execute",
            records = working_set.record_count(),
            images = working_set.image_count(),
        );

        async {
            let mut records = Vec::with_capacity(working_set.record_count());
            let mut transformed = 0usize;

            for record in working_set.records() {
                let mut images = Vec::with_capacity(record.images.len());
                for item in &record.images {
                    if !item.supports_background_removal() {
                        debug!(name = item.name(), mime = %item.mime_type(), "Passing image through");
                        images.push(item.clone());
                        continue;
                    }

                    let file = self
                        .remover
                        .remove_background(item.file(), item.name())
                        .await
                        .map_err(|source| TransformImagesError::RemoveBackground {
                            record_id: record.record_id.clone(),
                            name: item.name().to_string(),
                            source,
                        })?;
                    images.push(item.clone().with_file(file));
                    transformed += 1;
                }
                records.push(ImageRecordList::new(
                    record.field_id.clone(),
                    record.record_id.clone(),
                    images,
                ));
            }

            info!(transformed, "Background removal finished");
            Ok(WorkingSet::from_records(records))
        }
        .instrument(span)
        .await
    }
}
