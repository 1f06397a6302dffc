use std::collections::{BTreeMap, BTreeSet};

use facet_types::Ref;

use crate::error::StoreResult;
use crate::object::{ScopeObject, StoredObject};

/// What a batch knows about a ref.
#[derive(Debug, PartialEq)]
pub enum Staged<'a> {
    /// A write is staged for the ref.
    Object(&'a ScopeObject),
    /// A removal is staged for the ref.
    Removed,
    /// The batch has not touched the ref.
    Untouched,
}

/// Pending writes and removals of one repository operation.
///
/// Nothing in a batch is durable until it is persisted; dropping a batch
/// discards the operation. Staging a write cancels a staged removal of the
/// same ref and vice versa.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    objects: BTreeMap<Ref, ScopeObject>,
    removals: BTreeSet<Ref>,
    unmerged_removals: BTreeSet<String>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an object for write, replacing any earlier staged copy.
    pub fn stage(&mut self, object: impl Into<ScopeObject>) -> Ref {
        let object = object.into();
        let id = object.id();
        self.removals.remove(&id);
        self.objects.insert(id, object);
        id
    }

    pub fn stage_many<I, T>(&mut self, objects: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<ScopeObject>,
    {
        for object in objects {
            self.stage(object);
        }
    }

    /// Stage removal of a ref, dropping any staged write for it.
    pub fn remove(&mut self, id: Ref) {
        self.objects.remove(&id);
        self.removals.insert(id);
    }

    /// Stage removal of a component's unmerged-tracker entry.
    pub fn remove_unmerged(&mut self, name: impl Into<String>) {
        self.unmerged_removals.insert(name.into());
    }

    pub fn lookup(&self, id: &Ref) -> Staged<'_> {
        if let Some(object) = self.objects.get(id) {
            Staged::Object(object)
        } else if self.removals.contains(id) {
            Staged::Removed
        } else {
            Staged::Untouched
        }
    }

    pub fn get(&self, id: &Ref) -> Option<&ScopeObject> {
        self.objects.get(id)
    }

    pub fn is_removed(&self, id: &Ref) -> bool {
        self.removals.contains(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ScopeObject> {
        self.objects.values()
    }

    pub fn removals(&self) -> impl Iterator<Item = &Ref> {
        self.removals.iter()
    }

    pub fn unmerged_removals(&self) -> impl Iterator<Item = &String> {
        self.unmerged_removals.iter()
    }

    /// Fold another batch into this one; `other` wins on conflicts.
    pub fn extend(&mut self, other: WriteBatch) {
        for id in other.removals {
            self.remove(id);
        }
        for (_, object) in other.objects {
            self.stage(object);
        }
        self.unmerged_removals.extend(other.unmerged_removals);
    }

    /// Encode every staged write.
    pub fn to_stored_objects(&self) -> StoreResult<Vec<StoredObject>> {
        self.objects.values().map(ScopeObject::to_stored_object).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.removals.is_empty() && self.unmerged_removals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ModelComponent;
    use crate::source::Source;
    use facet_types::ComponentId;

    fn component() -> ModelComponent {
        ModelComponent::new(&ComponentId::new(Some("acme"), "button"))
    }

    #[test]
    fn stage_then_lookup() {
        let mut batch = WriteBatch::new();
        assert!(batch.is_empty());
        let id = batch.stage(Source::new("a"));
        assert!(matches!(batch.lookup(&id), Staged::Object(ScopeObject::Source(_))));
        assert_eq!(batch.lookup(&Ref::from_bytes(b"other")), Staged::Untouched);
    }

    #[test]
    fn removal_cancels_staged_write() {
        let mut batch = WriteBatch::new();
        let id = batch.stage(component());
        batch.remove(id);
        assert_eq!(batch.lookup(&id), Staged::Removed);
        assert!(batch.get(&id).is_none());
        assert_eq!(batch.objects().count(), 0);
    }

    #[test]
    fn write_cancels_staged_removal() {
        let mut batch = WriteBatch::new();
        let c = component();
        batch.remove(c.object_ref());
        batch.stage(c.clone());
        assert!(!batch.is_removed(&c.object_ref()));
        assert_eq!(batch.removals().count(), 0);
    }

    #[test]
    fn restaging_replaces_previous_copy() {
        let mut batch = WriteBatch::new();
        let mut c = component();
        batch.stage(c.clone());
        c.set_head(Some(Ref::from_hash([7; 32])));
        let id = batch.stage(c);
        match batch.get(&id) {
            Some(ScopeObject::Component(staged)) => {
                assert_eq!(staged.head, Some(Ref::from_hash([7; 32])))
            }
            other => panic!("unexpected staged object: {other:?}"),
        }
        assert_eq!(batch.objects().count(), 1);
    }

    #[test]
    fn extend_merges_batches() {
        let mut first = WriteBatch::new();
        let a = first.stage(Source::new("a"));
        let mut second = WriteBatch::new();
        second.remove(a);
        second.stage(Source::new("b"));
        second.remove_unmerged("acme/button");
        first.extend(second);
        assert!(first.is_removed(&a));
        assert_eq!(first.objects().count(), 1);
        assert_eq!(first.unmerged_removals().count(), 1);
    }

    #[test]
    fn stored_objects_are_encoded() {
        let mut batch = WriteBatch::new();
        batch.stage_many([Source::new("a"), Source::new("b")]);
        let stored = batch.to_stored_objects().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|o| o.verify().is_ok()));
    }
}
