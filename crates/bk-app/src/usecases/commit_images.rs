use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use bk_core::ports::BaseTablePort;
use bk_core::{BinaryFile, FieldId, RecordId, WorkingSet};

/// Outcome of writing one record back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCommit {
    pub field_id: FieldId,
    pub record_id: RecordId,
    pub succeeded: bool,
}

/// Per-record outcomes of a commit, in working-set order.
///
/// 提交结果：逐条记录的成功/失败。已成功的写入不会回滚。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    records: Vec<RecordCommit>,
}

impl CommitReport {
    pub fn records(&self) -> &[RecordCommit] {
        &self.records
    }

    pub fn results(&self) -> Vec<bool> {
        self.records.iter().map(|r| r.succeeded).collect()
    }

    /// True only if every record was written.
    pub fn all_succeeded(&self) -> bool {
        self.records.iter().all(|r| r.succeeded)
    }

    pub fn failed_records(&self) -> impl Iterator<Item = &RecordId> {
        self.records
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| &r.record_id)
    }
}

/// Use case for writing the working set back into the host field.
///
/// Each record gets a fresh attachment list built from the current payloads.
/// Records are written one after another; there is no rollback.
pub struct CommitImagesUseCase {
    table: Arc<dyn BaseTablePort>,
}

impl CommitImagesUseCase {
    pub fn new(table: Arc<dyn BaseTablePort>) -> Self {
        Self { table }
    }

    pub async fn execute(&self, working_set: &WorkingSet) -> CommitReport {
        let span = info_span!(
            "usecase.commit_images.execute",
            records = working_set.record_count(),
        );

        async {
            let mut records = Vec::with_capacity(working_set.record_count());

            for record in working_set.records() {
                let files: Vec<BinaryFile> =
                    record.images.iter().map(|image| image.upload_file()).collect();

                let succeeded = match self
                    .table
                    .set_attachments(&record.field_id, &record.record_id, files)
                    .await
                {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(
                            record_id = %record.record_id,
                            error = %err,
                            "Failed to write attachments back to host"
                        );
                        false
                    }
                };

                records.push(RecordCommit {
                    field_id: record.field_id.clone(),
                    record_id: record.record_id.clone(),
                    succeeded,
                });
            }

            let report = CommitReport { records };
            info!(
                all_succeeded = report.all_succeeded(),
                failed = report.failed_records().count(),
                "Commit finished"
            );
            report
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bk_core::{
        AttachmentDescriptor, AttachmentToken, FieldMeta, ImageItem, ImageRecordList, MimeType,
    };
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Table {}

        #[async_trait]
        impl BaseTablePort for Table {
            async fn field_meta(&self, field_id: &FieldId) -> anyhow::Result<Option<FieldMeta>>;
            async fn record_ids(&self) -> anyhow::Result<Vec<RecordId>>;
            async fn attachments(
                &self,
                field_id: &FieldId,
                record_id: &RecordId,
            ) -> anyhow::Result<Vec<AttachmentDescriptor>>;
            async fn attachment_url(
                &self,
                token: &AttachmentToken,
                field_id: &FieldId,
                record_id: &RecordId,
            ) -> anyhow::Result<String>;
            async fn set_attachments(
                &self,
                field_id: &FieldId,
                record_id: &RecordId,
                files: Vec<BinaryFile>,
            ) -> anyhow::Result<bool>;
        }
    }

    fn record(record_id: &str, names: &[&str]) -> ImageRecordList {
        let images = names
            .iter()
            .map(|name| {
                ImageItem::new(
                    AttachmentDescriptor::new(*name, *name, "image/jpeg", 3),
                    "https://host/x",
                    BinaryFile::new(*name, MimeType::from("image/jpeg"), b"abc".to_vec()),
                    0,
                )
            })
            .collect();
        ImageRecordList::new("fldA".into(), record_id.into(), images)
    }

    #[tokio::test]
    async fn test_one_refused_record_fails_the_aggregate() {
        let mut table = MockTable::new();
        table
            .expect_set_attachments()
            .with(
                eq(FieldId::from("fldA")),
                eq(RecordId::from("rec1")),
                mockall::predicate::always(),
            )
            .times(1)
            .returning(|_, _, _| Ok(true));
        table
            .expect_set_attachments()
            .with(
                eq(FieldId::from("fldA")),
                eq(RecordId::from("rec2")),
                mockall::predicate::always(),
            )
            .times(1)
            .returning(|_, _, _| Ok(false));
        let uc = CommitImagesUseCase::new(Arc::new(table));
        let set = WorkingSet::from_records(vec![record("rec1", &["a.jpg"]), record("rec2", &["b.jpg"])]);

        let report = uc.execute(&set).await;

        assert!(!report.all_succeeded());
        assert_eq!(report.results(), vec![true, false]);
        let failed: Vec<_> = report.failed_records().map(|r| r.as_str()).collect();
        assert_eq!(failed, vec!["rec2"]);
    }

    #[tokio::test]
    async fn test_files_are_built_from_current_images() {
        let mut table = MockTable::new();
        table
            .expect_set_attachments()
            .withf(|_, _, files| {
                files.len() == 2
                    && files[0].name() == "a.jpg"
                    && files[1].name() == "b.jpg"
                    && files.iter().all(|f| f.size() == 3)
            })
            .times(1)
            .returning(|_, _, _| Ok(true));
        let uc = CommitImagesUseCase::new(Arc::new(table));
        let set = WorkingSet::from_records(vec![record("rec1", &["a.jpg", "b.jpg"])]);

        let report = uc.execute(&set).await;

        assert!(report.all_succeeded());
    }

    #[tokio::test]
    async fn test_host_error_counts_as_failure() {
        let mut table = MockTable::new();
        table
            .expect_set_attachments()
            .returning(|_, _, _| Err(anyhow::anyhow!("permission denied")));
        let uc = CommitImagesUseCase::new(Arc::new(table));
        let set = WorkingSet::from_records(vec![record("rec1", &["a.jpg"])]);

        let report = uc.execute(&set).await;

        assert_eq!(report.results(), vec![false]);
    }

    #[tokio::test]
    async fn test_empty_working_set_commits_nothing() {
        let table = MockTable::new();
        let uc = CommitImagesUseCase::new(Arc::new(table));

        let report = uc.execute(&WorkingSet::empty()).await;

        assert!(report.records().is_empty());
        assert!(report.all_succeeded());
    }
}
