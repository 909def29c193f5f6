//! The background poller.
//!
//! - `control`: lifecycle and control commands (`Watcher`)
//! - `cycle`: one pass over the watch list
//! - `dedup`: bounded per-target history of delivered ids

mod control;
mod cycle;
mod dedup;

pub use control::{DEFAULT_INTERVAL_SECS, KEY_INTERVAL, KEY_TARGETS, Watcher};
pub use cycle::CycleOutcome;
pub use dedup::{DedupCache, HISTORY_CAPACITY};
