//! One polling cycle over the watch list.
//!
//! Each target is fetched, parsed, dedup-filtered, and delivered in
//! sequence. A failing target is logged and counted, never fatal to the
//! rest of the pass.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::delivery::DeliverySink;
use crate::error::Result;
use crate::services::{PageFetcher, PostExtractor};
use crate::watcher::dedup::DedupCache;

/// Summary of one pass over the watch list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Targets polled before the pass finished or was cancelled
    pub targets_polled: usize,

    /// Records that reached the sink, including records a failing target
    /// delivered before its failure
    pub delivered: usize,

    /// Targets whose fetch, extraction, or delivery failed
    pub failures: usize,
}

/// Run one full pass over `targets` in order.
///
/// Cancellation is honored between targets; a cancelled pass returns the
/// counters accumulated so far.
pub(crate) async fn run_cycle(
    targets: &[String],
    fetcher: &PageFetcher,
    extractor: &PostExtractor,
    dedup: &Mutex<DedupCache>,
    sink: &dyn DeliverySink,
    cancel: &CancellationToken,
) -> CycleOutcome {
    let mut outcome = CycleOutcome::default();

    for target in targets {
        if cancel.is_cancelled() {
            break;
        }
        outcome.targets_polled += 1;

        let mut delivered = 0;
        let result = poll_target(target, fetcher, extractor, dedup, sink, &mut delivered).await;
        outcome.delivered += delivered;
        match result {
            Ok(()) if delivered == 0 => log::debug!("{target}: no new posts"),
            Ok(()) => log::info!("{target}: delivered {delivered} new post(s)"),
            Err(e) => {
                log::warn!("poll failed for {target}: {e}");
                outcome.failures += 1;
            }
        }
    }

    outcome
}

/// Poll a single target. `delivered` is bumped per record as it reaches
/// the sink, so records handed off before a mid-batch failure stay
/// counted.
async fn poll_target(
    target: &str,
    fetcher: &PageFetcher,
    extractor: &PostExtractor,
    dedup: &Mutex<DedupCache>,
    sink: &dyn DeliverySink,
    delivered: &mut usize,
) -> Result<()> {
    let body = fetcher.fetch(target).await?;
    let records = extractor.extract(&body, Utc::now())?;

    let candidates: Vec<u64> = records.iter().map(|r| r.id).collect();
    let mut fresh: HashSet<u64> = {
        let cache = dedup.lock().unwrap();
        cache.filter_new(target, &candidates).into_iter().collect()
    };

    for record in &records {
        if !fresh.remove(&record.id) {
            continue;
        }
        // History is updated before the hand-off; a record whose delivery
        // fails is not retried on later cycles.
        dedup.lock().unwrap().record(target, record.id);
        sink.deliver(record).await?;
        *delivered += 1;
    }

    Ok(())
}
