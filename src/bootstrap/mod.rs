pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use wiring::{build_app, WiringError, WiringResult};
