//! Bounded per-target history of delivered record ids.
//!
//! The profile pages only show a recent window of posts, so remembering
//! the last [`HISTORY_CAPACITY`] delivered ids per target is enough to
//! tell new posts from re-observed ones while keeping memory flat for
//! long-running processes.

use std::collections::{HashMap, HashSet, VecDeque};

/// How many delivered record ids are remembered per target.
pub const HISTORY_CAPACITY: usize = 50;

/// Per-target FIFO history of delivered record ids.
///
/// Once a target's history exceeds its capacity the oldest id is evicted;
/// an evicted id would be treated as new if the page ever showed it again.
#[derive(Debug)]
pub struct DedupCache {
    histories: HashMap<String, VecDeque<u64>>,
    capacity: usize,
}

impl DedupCache {
    /// Cache with the standard per-target capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Cache with a custom per-target capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            histories: HashMap::new(),
            capacity,
        }
    }

    /// Ids from `candidates` not yet recorded for `target`, in candidate
    /// order. An id repeated within `candidates` is returned once.
    pub fn filter_new(&self, target: &str, candidates: &[u64]) -> Vec<u64> {
        let history = self.histories.get(&Self::key(target));
        let mut seen = HashSet::new();
        candidates
            .iter()
            .copied()
            .filter(|id| history.is_none_or(|h| !h.contains(id)) && seen.insert(*id))
            .collect()
    }

    /// Append `id` to `target`'s history, evicting the oldest entry once
    /// the capacity is exceeded. The history is created on first use.
    pub fn record(&mut self, target: &str, id: u64) {
        let history = self.histories.entry(Self::key(target)).or_default();
        history.push_back(id);
        if history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// Number of ids currently remembered for `target`.
    pub fn history_len(&self, target: &str) -> usize {
        self.histories
            .get(&Self::key(target))
            .map_or(0, VecDeque::len)
    }

    /// Target keys compare case-insensitively, matching the watch list.
    fn key(target: &str) -> String {
        target.to_ascii_lowercase()
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_is_new_for_unknown_target() {
        let cache = DedupCache::new();
        assert_eq!(cache.filter_new("alice", &[1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_recorded_ids_are_filtered_out() {
        let mut cache = DedupCache::new();
        cache.record("alice", 2);

        assert_eq!(cache.filter_new("alice", &[1, 2, 3]), vec![1, 3]);
    }

    #[test]
    fn test_histories_are_isolated_per_target() {
        let mut cache = DedupCache::new();
        cache.record("alice", 1);

        assert_eq!(cache.filter_new("bob", &[1]), vec![1]);
        assert_eq!(cache.filter_new("alice", &[1]), Vec::<u64>::new());
    }

    #[test]
    fn test_target_keys_are_case_insensitive() {
        let mut cache = DedupCache::new();
        cache.record("Alice", 1);

        assert_eq!(cache.filter_new("alice", &[1, 2]), vec![2]);
        assert_eq!(cache.history_len("ALICE"), 1);
    }

    #[test]
    fn test_duplicate_candidates_collapse_to_one() {
        let cache = DedupCache::new();
        assert_eq!(cache.filter_new("alice", &[5, 5, 6, 5]), vec![5, 6]);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut cache = DedupCache::new();
        for id in 0..HISTORY_CAPACITY as u64 + 10 {
            cache.record("alice", id);
        }

        assert_eq!(cache.history_len("alice"), HISTORY_CAPACITY);
    }

    #[test]
    fn test_evicted_ids_count_as_new_again() {
        let mut cache = DedupCache::with_capacity(3);
        for id in [1, 2, 3, 4] {
            cache.record("alice", id);
        }

        // 1 was pushed out by 4.
        assert_eq!(cache.filter_new("alice", &[1, 2, 3, 4]), vec![1]);
    }

    #[test]
    fn test_filter_then_record_round() {
        let mut cache = DedupCache::new();

        let fresh = cache.filter_new("alice", &[10, 11]);
        for id in &fresh {
            cache.record("alice", *id);
        }

        assert_eq!(cache.filter_new("alice", &[10, 11, 12]), vec![12]);
    }
}
