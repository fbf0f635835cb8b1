//! Selection synchronizer
//! 选区同步器
//!
//! Owns the working set and its loading flag, reacts to host selection
//! changes and drives the resolve / transform / commit use cases.
//!
//! ## Concurrency / 并发
//!
//! A single busy flag serializes every operation. A selection change that
//! arrives while another operation runs is dropped, not queued; the
//! in-flight operation always runs to completion. State is published through
//! a `watch` channel and only ever replaced wholesale.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use bk_core::ports::SelectionPort;
use bk_core::{FieldId, ScanMode, Selection, SelectionScope, WorkingSet};

use crate::usecases::{
    CommitImagesUseCase, CommitReport, ResolveOutcome, ResolveSelectionUseCase,
    TransformImagesError, TransformImagesUseCase,
};

/// Snapshot observed by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
    /// Number of completed resolutions (including ones that cleared the set).
    pub generation: u64,
    pub loading: bool,
    pub scan_mode: ScanMode,
    pub working_set: Arc<WorkingSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// No field or no record is selected.
    NoSelection,
    /// The selected field is missing or is not an attachment field.
    NotAttachmentField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another operation is in flight.
    Busy,
    /// Field mode and the field has already been resolved.
    FieldUnchanged,
}

/// Result of handling one selection trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStatus {
    Updated { generation: u64, records: usize },
    Cleared(ClearReason),
    Skipped(SkipReason),
    /// Resolution failed; the previous working set is kept.
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("another operation is in progress")]
    Busy,

    #[error(transparent)]
    Transform(#[from] TransformImagesError),
}

/// Drives the working set from host selection events.
pub struct SelectionSynchronizer {
    selection: Arc<dyn SelectionPort>,
    resolve: ResolveSelectionUseCase,
    transform: TransformImagesUseCase,
    commit: CommitImagesUseCase,
    busy: AtomicBool,
    last_field: Mutex<Option<FieldId>>,
    state: watch::Sender<SyncSnapshot>,
}

/// Holds the busy flag and the loading flag for one operation; both are
/// released on drop, whatever the outcome.
struct OperationGuard<'a> {
    busy: &'a AtomicBool,
    state: &'a watch::Sender<SyncSnapshot>,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
        self.busy.store(false, Ordering::Release);
    }
}

impl SelectionSynchronizer {
    pub fn new(
        selection: Arc<dyn SelectionPort>,
        resolve: ResolveSelectionUseCase,
        transform: TransformImagesUseCase,
        commit: CommitImagesUseCase,
        scan_mode: ScanMode,
    ) -> Self {
        let (state, _) = watch::channel(SyncSnapshot {
            scan_mode,
            ..SyncSnapshot::default()
        });
        Self {
            selection,
            resolve,
            transform,
            commit,
            busy: AtomicBool::new(false),
            last_field: Mutex::new(None),
            state,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        self.state.borrow().clone()
    }

    pub fn working_set(&self) -> Arc<WorkingSet> {
        self.state.borrow().working_set.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Resolve the host's current selection, then follow selection changes
    /// until the host closes the subscription.
    pub async fn start(self: Arc<Self>) -> anyhow::Result<JoinHandle<()>> {
        let initial = self.selection.current_selection().await?;
        self.on_selection_changed(initial).await;

        let mut events = self.selection.subscribe().await?;
        let this = self.clone();
        let handle = tokio::spawn(
            async move {
                while let Some(selection) = events.recv().await {
                    let this = this.clone();
                    // Spawned so that triggers arriving mid-resolution hit the busy flag.
                    tokio::spawn(async move {
                        this.on_selection_changed(selection).await;
                    });
                }
                info!("Selection subscription closed");
            }
            .instrument(info_span!("synchronizer.selection_loop")),
        );
        Ok(handle)
    }

    /// Handle a host selection-change notification.
    pub async fn on_selection_changed(&self, selection: Selection) -> ResolveStatus {
        let Some(_guard) = self.try_begin() else {
            debug!("Resolution in progress, dropping selection change");
            return ResolveStatus::Skipped(SkipReason::Busy);
        };

        let Some(scope) = selection.scope() else {
            return self.clear(ClearReason::NoSelection);
        };

        let scan_mode = self.state.borrow().scan_mode;
        if scan_mode == ScanMode::Field && self.last_field_is(&scope.field_id) {
            debug!(field_id = %scope.field_id, "Field unchanged in field mode, skipping");
            return ResolveStatus::Skipped(SkipReason::FieldUnchanged);
        }

        self.resolve_scope(scope, scan_mode).await
    }

    /// Switch scan mode and re-resolve the current selection.
    ///
    /// While another operation runs the mode is left unchanged and
    /// `Skipped(Busy)` is returned.
    pub async fn set_scan_mode(&self, scan_mode: ScanMode) -> ResolveStatus {
        let Some(_guard) = self.try_begin() else {
            debug!(scan_mode = %scan_mode, "Operation in progress, scan mode not changed");
            return ResolveStatus::Skipped(SkipReason::Busy);
        };

        self.state.send_modify(|s| s.scan_mode = scan_mode);
        *self.lock_last_field() = None;
        info!(scan_mode = %scan_mode, "Scan mode changed");
        self.resolve_current().await
    }

    /// Re-resolve the current host selection, ignoring the field-mode skip.
    pub async fn refresh(&self) -> ResolveStatus {
        let Some(_guard) = self.try_begin() else {
            return ResolveStatus::Skipped(SkipReason::Busy);
        };
        self.resolve_current().await
    }

    /// Remove backgrounds on the current working set and publish the result.
    /// On failure the working set is left as it was.
    pub async fn remove_backgrounds(&self) -> Result<(), WorkspaceError> {
        let _guard = self.try_begin().ok_or(WorkspaceError::Busy)?;

        let current = self.working_set();
        let transformed = self.transform.execute(&current).await?;
        self.state
            .send_modify(|s| s.working_set = Arc::new(transformed));
        Ok(())
    }

    /// Write the current working set back to the host.
    pub async fn apply(&self) -> Result<CommitReport, WorkspaceError> {
        let _guard = self.try_begin().ok_or(WorkspaceError::Busy)?;

        let current = self.working_set();
        let report = self.commit.execute(&current).await;
        if !report.all_succeeded() {
            warn!(
                failed = report.failed_records().count(),
                "Some records could not be written back"
            );
        }
        Ok(report)
    }

    /// Caller must hold the operation guard.
    async fn resolve_current(&self) -> ResolveStatus {
        let selection = match self.selection.current_selection().await {
            Ok(selection) => selection,
            Err(err) => {
                error!(error = %err, "Failed to read current selection");
                return ResolveStatus::Failed;
            }
        };

        let Some(scope) = selection.scope() else {
            return self.clear(ClearReason::NoSelection);
        };
        let scan_mode = self.state.borrow().scan_mode;
        self.resolve_scope(scope, scan_mode).await
    }

    async fn resolve_scope(&self, scope: SelectionScope, scan_mode: ScanMode) -> ResolveStatus {
        match self.resolve.execute(&scope, scan_mode).await {
            Ok(ResolveOutcome::Resolved(working_set)) => {
                let records = working_set.record_count();
                let generation = self.publish(working_set);
                *self.lock_last_field() = Some(scope.field_id);
                ResolveStatus::Updated {
                    generation,
                    records,
                }
            }
            Ok(ResolveOutcome::NotAttachmentField) => self.clear(ClearReason::NotAttachmentField),
            Err(err) => {
                error!(error = %err, "Failed to resolve selection, keeping previous images");
                *self.lock_last_field() = None;
                ResolveStatus::Failed
            }
        }
    }

    fn clear(&self, reason: ClearReason) -> ResolveStatus {
        debug!(?reason, "Clearing working set");
        self.publish(WorkingSet::empty());
        *self.lock_last_field() = None;
        ResolveStatus::Cleared(reason)
    }

    fn publish(&self, working_set: WorkingSet) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            s.working_set = Arc::new(working_set);
            generation = s.generation;
        });
        generation
    }

    fn try_begin(&self) -> Option<OperationGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.state.send_modify(|s| s.loading = true);
        Some(OperationGuard {
            busy: &self.busy,
            state: &self.state,
        })
    }

    fn last_field_is(&self, field_id: &FieldId) -> bool {
        self.lock_last_field().as_ref() == Some(field_id)
    }

    fn lock_last_field(&self) -> std::sync::MutexGuard<'_, Option<FieldId>> {
        self.last_field
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
