//! BaseKit Application Orchestration Layer
//!
//! This crate contains the use cases (resolve, transform, commit, shorten)
//! and the [`SelectionSynchronizer`] that drives them from host selection
//! events.

pub mod deps;
pub mod synchronizer;
pub mod usecases;

pub use deps::{App, AppDeps};
pub use synchronizer::{
    ClearReason, ResolveStatus, SelectionSynchronizer, SkipReason, SyncSnapshot, WorkspaceError,
};
