// src/models/mod.rs

//! Domain models for the watcher application.

mod post;
mod target;

// Re-export all public types
pub use post::{Author, PostRecord};
pub use target::{TargetList, is_valid_handle};
