use std::collections::HashMap;
use std::sync::RwLock;

use facet_types::Ref;

use crate::error::StoreResult;
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Object store kept entirely in memory.
///
/// Used by tests and by repositories without a configured path. Pointer
/// objects are replaced in place; everything is cloned in and out.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<Ref, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Every stored ref, sorted.
    pub fn all_ids(&self) -> Vec<Ref> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<Ref> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &Ref) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<Ref> {
        object.verify()?;
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(object.id, object.clone());
        Ok(object.id)
    }

    fn exists(&self, id: &Ref) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &Ref) -> StoreResult<bool> {
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
