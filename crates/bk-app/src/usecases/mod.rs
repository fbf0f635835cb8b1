//! Business logic use cases
//!
//! [host selection change]
//!         ↓
//! ResolveSelectionUseCase   → working set shown to the user
//!         ↓
//! TransformImagesUseCase    → background removed (not yet persisted)
//!         ↓
//! CommitImagesUseCase       → written back to the host field
//!
//! ShortenUrlUseCase stands alone.

pub mod commit_images;
pub mod resolve_selection;
pub mod shorten_url;
pub mod transform_images;

pub use commit_images::{CommitImagesUseCase, CommitReport, RecordCommit};
pub use resolve_selection::{ResolveOutcome, ResolveSelectionError, ResolveSelectionUseCase};
pub use shorten_url::{ShortenUrlError, ShortenUrlUseCase};
pub use transform_images::{TransformImagesError, TransformImagesUseCase};
