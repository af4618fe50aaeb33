//! sdtmpipe core - shared infrastructure for the sdtmpipe crates
//!
//! Provides the pooled HTTP client with its synchronous facade, the
//! transport error type, and logging setup used by the CLI.

pub mod http;
pub mod logging;

// Re-exports for convenience
pub use http::{HttpError, SHARED_RUNTIME, fetch_bytes, http_client, url_exists};
pub use logging::init_logging;
