//! Service layer for the watcher application.
//!
//! This module contains the per-page plumbing:
//! - Page retrieval (`PageFetcher`)
//! - Post extraction (`PostExtractor`)

mod extract;
mod fetch;

pub use extract::PostExtractor;
pub use fetch::PageFetcher;
