//! Watch list of target screen names.

/// Ordered set of watched screen names.
///
/// Insertion order is preserved for listing and polling; membership,
/// duplicate detection, and removal compare ASCII case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    entries: Vec<String>,
}

impl TargetList {
    /// Create an empty watch list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma-joined persisted form. Entries are trimmed, empty
    /// entries are discarded, and duplicates keep their first occurrence.
    pub fn from_joined(joined: &str) -> Self {
        let mut list = Self::new();
        for entry in joined.split(',') {
            let entry = entry.trim();
            if !entry.is_empty() {
                list.add(entry);
            }
        }
        list
    }

    /// Comma-joined persisted form.
    pub fn to_joined(&self) -> String {
        self.entries.join(",")
    }

    /// Whether `handle` is a member.
    pub fn contains(&self, handle: &str) -> bool {
        self.entries.iter().any(|t| t.eq_ignore_ascii_case(handle))
    }

    /// Append `handle` unless an equal member exists. Returns whether the
    /// list changed.
    pub fn add(&mut self, handle: &str) -> bool {
        if self.contains(handle) {
            return false;
        }
        self.entries.push(handle.to_string());
        true
    }

    /// Remove the member equal to `handle`. Returns whether the list
    /// changed.
    pub fn remove(&mut self, handle: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| !t.eq_ignore_ascii_case(handle));
        self.entries.len() != before
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Owned snapshot of the members in insertion order.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }
}

/// Check a screen name for use as a watch target: non-empty, ASCII
/// alphanumerics and underscores only. This also keeps the comma-joined
/// persisted form unambiguous.
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_duplicates_case_insensitively() {
        let mut list = TargetList::new();
        assert!(list.add("Alice"));
        assert!(!list.add("alice"));
        assert!(!list.add("ALICE"));
        assert_eq!(list.to_vec(), vec!["Alice"]);
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut list = TargetList::new();
        list.add("Alice");
        list.add("bob");
        assert!(list.remove("ALICE"));
        assert!(!list.remove("alice"));
        assert_eq!(list.to_vec(), vec!["bob"]);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut list = TargetList::new();
        list.add("charlie");
        list.add("alice");
        list.add("bob");
        assert_eq!(list.to_vec(), vec!["charlie", "alice", "bob"]);
    }

    #[test]
    fn test_joined_round_trip() {
        let mut list = TargetList::new();
        list.add("alice");
        list.add("bob");
        assert_eq!(list.to_joined(), "alice,bob");
        assert_eq!(TargetList::from_joined("alice,bob"), list);
    }

    #[test]
    fn test_from_joined_skips_blank_and_duplicate_entries() {
        let list = TargetList::from_joined(" alice , ,bob,ALICE,");
        assert_eq!(list.to_vec(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_from_joined_empty_string() {
        assert!(TargetList::from_joined("").is_empty());
    }

    #[test]
    fn test_handle_validation() {
        assert!(is_valid_handle("alice_99"));
        assert!(is_valid_handle("B0b"));
        assert!(!is_valid_handle(""));
        assert!(!is_valid_handle("has space"));
        assert!(!is_valid_handle("a,b"));
        assert!(!is_valid_handle("dot.name"));
    }
}
