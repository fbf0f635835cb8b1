//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. This follows Hexagonal Architecture
//! principles: the host base SDK and the remote HTTP services are only ever
//! reached through these traits, so every use case can run against stand-ins.
//!
//! ## Error conventions / 错误约定
//!
//! - Host ports return `anyhow::Result`; callers add context.
//! - Remote HTTP ports return [`NetworkError`](crate::errors::NetworkError).

mod attachment_fetcher;
mod background_remover;
mod clock;
pub mod host;
mod url_shortener;

pub use attachment_fetcher::AttachmentFetcherPort;
pub use background_remover::BackgroundRemoverPort;
pub use clock::ClockPort;
pub use host::{BaseTablePort, SelectionPort};
pub use url_shortener::UrlShortenerPort;
