use std::collections::BTreeMap;

use facet_types::{ComponentId, LaneId, Ref};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A component left mid-merge: `head` is the other side's tip that the next
/// snapshot must take as an extra parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmergedEntry {
    pub id: ComponentId,
    pub head: Ref,
    /// Conflicts were resolved in the working tree; snapshots are allowed.
    #[serde(default)]
    pub resolved: bool,
    /// Lane the other tip came from, `None` for main.
    #[serde(default)]
    pub lane: Option<LaneId>,
}

impl UnmergedEntry {
    pub fn new(id: &ComponentId, head: Ref) -> Self {
        Self {
            id: id.without_version(),
            head,
            resolved: false,
            lane: None,
        }
    }
}

/// Tracker of components with pending merges, keyed by `scope/name`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmergedComponents {
    entries: BTreeMap<String, UnmergedEntry>,
}

impl UnmergedComponents {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(id: &ComponentId) -> String {
        id.to_string_without_version()
    }

    /// Record an entry, replacing any existing one for the component.
    pub fn add_entry(&mut self, entry: UnmergedEntry) {
        self.entries.insert(Self::key(&entry.id), entry);
    }

    pub fn get_entry(&self, id: &ComponentId) -> Option<&UnmergedEntry> {
        self.entries.get(&Self::key(id))
    }

    /// Look up by the `scope/name` key.
    pub fn get_by_name(&self, name: &str) -> Option<&UnmergedEntry> {
        self.entries.get(name)
    }

    /// Remove an entry by key. Returns `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Flag an entry as resolved. Returns `false` if there is none.
    pub fn mark_resolved(&mut self, id: &ComponentId) -> bool {
        match self.entries.get_mut(&Self::key(id)) {
            Some(entry) => {
                entry.resolved = true;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &UnmergedEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log message of a snapshot that concludes the merge of `entry`.
    pub fn build_snap_message(entry: &UnmergedEntry) -> String {
        match &entry.lane {
            Some(lane) => format!("merge {lane}"),
            None => "merge main".to_string(),
        }
    }

    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> ComponentId {
        ComponentId::new(Some("acme"), "button")
    }

    #[test]
    fn entries_are_keyed_without_version() {
        let mut tracker = UnmergedComponents::new();
        let id = button().with_version("1.0");
        tracker.add_entry(UnmergedEntry::new(&id, Ref::from_hash([1; 32])));
        assert!(tracker.get_entry(&button()).is_some());
        assert!(tracker.get_by_name("acme/button").is_some());
        assert!(tracker.remove("acme/button"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn mark_resolved_flips_flag() {
        let mut tracker = UnmergedComponents::new();
        assert!(!tracker.mark_resolved(&button()));
        tracker.add_entry(UnmergedEntry::new(&button(), Ref::from_hash([1; 32])));
        assert!(tracker.mark_resolved(&button()));
        assert!(tracker.get_entry(&button()).unwrap().resolved);
    }

    #[test]
    fn snap_message_names_the_source_line() {
        let mut entry = UnmergedEntry::new(&button(), Ref::from_hash([1; 32]));
        assert_eq!(UnmergedComponents::build_snap_message(&entry), "merge main");
        entry.lane = Some(LaneId::new(Some("acme"), "dev").unwrap());
        assert_eq!(UnmergedComponents::build_snap_message(&entry), "merge acme/dev");
    }

    #[test]
    fn bytes_roundtrip() {
        let mut tracker = UnmergedComponents::new();
        tracker.add_entry(UnmergedEntry::new(&button(), Ref::from_hash([3; 32])));
        let decoded = UnmergedComponents::from_bytes(&tracker.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tracker);
        assert!(UnmergedComponents::from_bytes(b"not json").is_err());
    }
}
