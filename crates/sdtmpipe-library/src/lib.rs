//! sdtmpipe library - caching client for the CDISC Library API
//!
//! This crate provides a thin, memoizing client over the CDISC Library
//! hypermedia API: direct link follows, versioned dataset lookups, and
//! derived views (version lists, controlled-terminology packages).

pub mod client;
pub mod error;
pub mod link;

// Re-exports
pub use client::{DEFAULT_BASE_URL, LibraryClient};
pub use error::LibraryError;
pub use link::Link;
