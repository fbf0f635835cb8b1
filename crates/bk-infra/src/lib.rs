pub mod config;
pub mod host;
pub mod http;
pub mod time;

pub use config::ServiceConfig;
pub use host::InMemoryBase;
pub use http::{HttpAttachmentFetcher, HttpBackgroundRemover, HttpUrlShortener};
pub use time::SystemClock;
